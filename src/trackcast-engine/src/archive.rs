use crate::detector::ChangeDetector;
use crate::dispatch::dispatch_track;
use crate::registry::ActiveTarget;
use chrono::NaiveDateTime;
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use trackcast_core::Track;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("failed to open archive database {path}: {source}")]
    Open {
        path: PathBuf,
        source: rusqlite::Error,
    },
    #[error("archive query failed: {0}")]
    Query(#[from] rusqlite::Error),
}

/// One persisted row: the track, its recorded start time, and the ignore
/// flag as originally written. The recorded flag is kept for inspection
/// only; the detector recomputes `ignore` from the current configuration
/// before dispatch.
#[derive(Debug, Clone)]
pub struct ArchiveRow {
    pub track: Track,
    pub start_time: NaiveDateTime,
    pub recorded_ignore: bool,
}

/// Read-only view of a previously written episode archive. The table and
/// column names match what the sqlite target writes, so any prior archive
/// replays as-is.
pub struct ArchiveStore {
    conn: Connection,
}

impl ArchiveStore {
    /// Opens read-only so a missing or wrong path fails fast instead of
    /// silently creating an empty database and producing an empty run.
    pub fn open(path: &Path) -> Result<Self, ArchiveError> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY).map_err(
            |source| ArchiveError::Open {
                path: path.to_path_buf(),
                source,
            },
        )?;
        Ok(Self { conn })
    }

    /// All rows for one episode, ascending by recorded start time.
    pub fn episode_rows(&self, episode: &str) -> Result<Vec<ArchiveRow>, ArchiveError> {
        let mut stmt = self.conn.prepare(
            "SELECT uniqueId, title, artist, album, length, artworkFileName, startTime, \"ignore\"
             FROM trackupdate WHERE episodeNumber = ?1 ORDER BY startTime ASC",
        )?;
        let rows = stmt.query_map([episode], |row| {
            let text = |idx: usize| -> rusqlite::Result<String> {
                Ok(row.get::<_, Option<String>>(idx)?.unwrap_or_default())
            };
            Ok(ArchiveRow {
                track: Track {
                    unique_id: text(0)?,
                    title: text(1)?,
                    artist: text(2)?,
                    album: text(3)?,
                    length: text(4)?,
                    artwork: text(5)?,
                    ignore: false,
                },
                start_time: row.get(6)?,
                recorded_ignore: row.get::<_, Option<bool>>(7)?.unwrap_or(false),
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(ArchiveError::from)
    }
}

/// Replays one episode through the same change-detection path live mode
/// uses, dispatching each accepted row with its persisted timestamp. Returns
/// the number of dispatched events.
pub fn run_archive(
    store: &ArchiveStore,
    episode: &str,
    ignore_album: Option<String>,
    targets: &mut [ActiveTarget],
) -> Result<usize, ArchiveError> {
    let rows = store.episode_rows(episode)?;
    info!(episode, rows = rows.len(), "replaying archived episode");

    let mut detector = ChangeDetector::new(ignore_album);
    let mut dispatched = 0;
    for ArchiveRow {
        track, start_time, ..
    } in rows
    {
        if let Some(track) = detector.observe(track) {
            debug!(start_time = %start_time, "{}", track.summary());
            dispatch_track(targets, &track, start_time);
            dispatched += 1;
        }
    }
    Ok(dispatched)
}
