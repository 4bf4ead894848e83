use std::fs;
use std::path::PathBuf;
use tracing::info;
use trackcast_core::{
    EventTime, RunContext, Settings, Target, TargetError, TargetResult, Track,
};

const SECTION: &str = "NowPlayingTarget";

/// Rewrites a broadcast-style now-playing file on every event and removes it
/// at shutdown. Configured initial values are written at construction so the
/// file exists before the first track airs. Live-only: rewriting a single
/// file has no meaning during an archive replay.
pub struct NowPlayingTarget {
    path: PathBuf,
}

impl NowPlayingTarget {
    pub fn from_settings(settings: &Settings, _ctx: &RunContext) -> TargetResult<Box<dyn Target>> {
        let path = settings
            .get_str(SECTION, "filePath")
            .ok_or_else(|| TargetError::missing(settings, SECTION, "filePath"))?;
        let get = |key: &str| settings.get_str(SECTION, key).unwrap_or_default();

        let target = Self {
            path: PathBuf::from(path),
        };
        target.write_entry(
            &get("initTitle"),
            &get("initArtist"),
            &get("initAlbum"),
            &get("initTime"),
        )?;
        info!(path = %target.path.display(), "now-playing file initialized");
        Ok(Box::new(target))
    }

    fn write_entry(&self, title: &str, artist: &str, album: &str, time: &str) -> TargetResult<()> {
        let contents =
            format!("Title: {title}\nArtist: {artist}\nAlbum: {album}\nTime: {time}\n");
        fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl Target for NowPlayingTarget {
    fn name(&self) -> &str {
        "Now Playing File Updater"
    }

    fn log_track(&mut self, track: &Track, _start_time: EventTime) -> TargetResult<()> {
        if track.ignore {
            return Ok(());
        }
        self.write_entry(&track.title, &track.artist, &track.album, &track.length)
    }

    fn close(&mut self) -> TargetResult<()> {
        fs::remove_file(&self.path)?;
        Ok(())
    }
}
