use crate::{format_offset, LIST_SECTION};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;
use trackcast_core::{
    EventTime, RunContext, Settings, Target, TargetError, TargetResult, Track,
};

/// Writes a date-stamped CSV chapter file: a show header block followed by
/// one row per track with its offset from the first logged event.
/// Archive-capable for the same reason the track list is.
pub struct CsvTarget {
    file: File,
    initial: Option<EventTime>,
}

impl CsvTarget {
    pub fn from_settings(settings: &Settings, ctx: &RunContext) -> TargetResult<Box<dyn Target>> {
        let dir = settings
            .get_str(LIST_SECTION, "filePath")
            .ok_or_else(|| TargetError::missing(settings, LIST_SECTION, "filePath"))?;
        let show_title = settings
            .get_str(LIST_SECTION, "showTitle")
            .ok_or_else(|| TargetError::missing(settings, LIST_SECTION, "showTitle"))?;
        let show_artist = settings
            .get_str(LIST_SECTION, "showArtist")
            .ok_or_else(|| TargetError::missing(settings, LIST_SECTION, "showArtist"))?;

        let path = PathBuf::from(dir).join(format!("{}.csv", ctx.episode_date.format("%Y%m%d")));
        let mut file = File::create(&path)?;

        let episode_title = match &ctx.episode {
            Some(episode) => format!("{show_title} #{episode}"),
            None => format!("{show_title} {}", ctx.episode_date.format("%Y-%m-%d")),
        };
        write!(
            file,
            "PODCAST,\"{show_title}\",,,\n\
             TITLE,\"{episode_title}\",,,\n\
             AUTHOR,\"{show_artist}\",,,\n\
             DESCRIPTION,,,,\n\
             YEAR,{},,,\n",
            ctx.episode_date.format("%Y")
        )?;

        info!(path = %path.display(), "writing csv chapters");
        Ok(Box::new(Self {
            file,
            initial: None,
        }))
    }
}

impl Target for CsvTarget {
    fn name(&self) -> &str {
        "CSV File Writer"
    }

    fn log_track(&mut self, track: &Track, start_time: EventTime) -> TargetResult<()> {
        let initial = *self.initial.get_or_insert(start_time);
        if track.ignore {
            return Ok(());
        }
        let offset = format_offset(start_time - initial);
        writeln!(
            self.file,
            "\"{}\",{offset},,{},false",
            track.title, track.artwork
        )?;
        self.file.flush()?;
        Ok(())
    }

    fn close(&mut self) -> TargetResult<()> {
        self.file.flush()?;
        Ok(())
    }
}
