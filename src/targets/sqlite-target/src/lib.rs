//! The archive writer.
//!
//! Records every forwarded event, including ignored ones, so an archive
//! replay can reconstruct the full show later. The table layout is shared
//! with the engine's archive reader.

use rusqlite::{params, Connection};
use tracing::info;
use trackcast_core::{
    EventTime, RunContext, Settings, Target, TargetError, TargetResult, Track,
};

const SECTION: &str = "SqliteTarget";

/// Episode id recorded when the run was started without one.
const UNKNOWN_EPISODE: &str = "XX";

pub struct SqliteTarget {
    conn: Option<Connection>,
    episode: String,
}

impl SqliteTarget {
    pub fn from_settings(settings: &Settings, ctx: &RunContext) -> TargetResult<Box<dyn Target>> {
        let db_path = settings
            .get_str(SECTION, "dbPath")
            .ok_or_else(|| TargetError::missing(settings, SECTION, "dbPath"))?;

        let conn = Connection::open(&db_path).map_err(db_err)?;
        conn.execute_batch(
            r#"CREATE TABLE IF NOT EXISTS trackupdate (
                episodeNumber integer NOT NULL,
                uniqueId char(128),
                title char(128),
                artist char(128),
                album char(128),
                length char(128),
                artworkFileName text(128),
                startTime timestamp(128),
                "ignore" integer(128) NOT NULL DEFAULT(0)
            );"#,
        )
        .map_err(db_err)?;

        info!(path = %db_path, "archive database open");
        Ok(Box::new(Self {
            conn: Some(conn),
            episode: ctx
                .episode
                .clone()
                .unwrap_or_else(|| UNKNOWN_EPISODE.to_owned()),
        }))
    }

    fn connection(&self) -> TargetResult<&Connection> {
        self.conn
            .as_ref()
            .ok_or_else(|| TargetError::other("archive database already closed"))
    }
}

impl Target for SqliteTarget {
    fn name(&self) -> &str {
        "Sqlite Writer"
    }

    fn log_track(&mut self, track: &Track, start_time: EventTime) -> TargetResult<()> {
        self.connection()?
            .execute(
                "INSERT INTO trackupdate VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    self.episode,
                    track.unique_id,
                    track.title,
                    track.artist,
                    track.album,
                    track.length,
                    track.artwork,
                    start_time,
                    track.ignore,
                ],
            )
            .map_err(db_err)?;
        Ok(())
    }

    fn close(&mut self) -> TargetResult<()> {
        if let Some(conn) = self.conn.take() {
            info!("closing archive database");
            conn.close().map_err(|(_, err)| db_err(err))?;
        }
        Ok(())
    }
}

fn db_err(err: rusqlite::Error) -> TargetError {
    TargetError::other(format!("database error: {err}"))
}
