use crate::{format_offset, LIST_SECTION};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;
use trackcast_core::{
    EventTime, RunContext, Settings, Target, TargetError, TargetResult, Track,
};

/// Appends one `Artist - Title (offset)` line per track to a date-stamped
/// list file. Archive-capable: offsets come from event start times, so a
/// replay reproduces the same file.
pub struct TrackListTarget {
    file: File,
    initial: Option<EventTime>,
}

impl TrackListTarget {
    pub fn from_settings(settings: &Settings, ctx: &RunContext) -> TargetResult<Box<dyn Target>> {
        let dir = settings
            .get_str(LIST_SECTION, "filePath")
            .ok_or_else(|| TargetError::missing(settings, LIST_SECTION, "filePath"))?;
        let path = PathBuf::from(dir).join(format!(
            "{}-list.txt",
            ctx.episode_date.format("%Y%m%d")
        ));
        let file = File::create(&path)?;
        info!(path = %path.display(), "writing track list");
        Ok(Box::new(Self {
            file,
            initial: None,
        }))
    }
}

impl Target for TrackListTarget {
    fn name(&self) -> &str {
        "Track List File Writer"
    }

    fn log_track(&mut self, track: &Track, start_time: EventTime) -> TargetResult<()> {
        let initial = *self.initial.get_or_insert(start_time);
        if track.ignore {
            return Ok(());
        }
        let offset = format_offset(start_time - initial);
        writeln!(self.file, "{} ({offset})", track.summary())?;
        self.file.flush()?;
        Ok(())
    }

    fn close(&mut self) -> TargetResult<()> {
        self.file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use std::fs;
    use tempfile::tempdir;
    use trackcast_core::RunOverrides;

    fn ctx() -> RunContext {
        RunContext::resolve(
            &Settings::empty(),
            &RunOverrides {
                episode_date: Some(NaiveDate::from_ymd_opt(2023, 6, 10).unwrap()),
                ..RunOverrides::default()
            },
            NaiveDate::from_ymd_opt(2023, 6, 10).unwrap(),
        )
    }

    fn track(artist: &str, title: &str, ignore: bool) -> Track {
        Track {
            title: title.into(),
            artist: artist.into(),
            album: "Album".into(),
            length: "3:00".into(),
            artwork: String::new(),
            unique_id: title.into(),
            ignore,
        }
    }

    fn start() -> EventTime {
        NaiveDate::from_ymd_opt(2023, 6, 10)
            .unwrap()
            .and_hms_opt(20, 0, 0)
            .unwrap()
    }

    #[test]
    fn writes_offset_stamped_lines() {
        let dir = tempdir().unwrap();
        let settings = Settings::from_toml(&format!(
            "[ListCommon]\nfilePath = {:?}",
            dir.path().to_str().unwrap()
        ))
        .unwrap();

        let mut target = TrackListTarget::from_settings(&settings, &ctx()).unwrap();
        target.log_track(&track("A", "First", false), start()).unwrap();
        target
            .log_track(&track("B", "Second", false), start() + Duration::seconds(95))
            .unwrap();
        target.close().unwrap();

        let contents = fs::read_to_string(dir.path().join("20230610-list.txt")).unwrap();
        assert_eq!(contents, "A - First (0:00)\nB - Second (1:35)\n");
    }

    #[test]
    fn ignored_tracks_are_omitted_but_anchor_the_offset() {
        let dir = tempdir().unwrap();
        let settings = Settings::from_toml(&format!(
            "[ListCommon]\nfilePath = {:?}",
            dir.path().to_str().unwrap()
        ))
        .unwrap();

        let mut target = TrackListTarget::from_settings(&settings, &ctx()).unwrap();
        target.log_track(&track("House", "Bumper", true), start()).unwrap();
        target
            .log_track(&track("A", "Opener", false), start() + Duration::seconds(30))
            .unwrap();
        target.close().unwrap();

        let contents = fs::read_to_string(dir.path().join("20230610-list.txt")).unwrap();
        assert_eq!(contents, "A - Opener (0:30)\n");
    }

    #[test]
    fn missing_section_is_reported() {
        let err = TrackListTarget::from_settings(&Settings::empty(), &ctx()).err().unwrap();
        assert!(matches!(err, TargetError::MissingSection { .. }));
    }
}
