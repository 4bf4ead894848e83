use crate::settings::Settings;
use crate::track::Track;
use chrono::NaiveDate;
use std::path::PathBuf;

/// Name of the run-level settings section.
pub const RUN_SECTION: &str = "trackcast";

pub const DEFAULT_POLL_TIME: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Live,
    Archive,
}

/// Command-line overrides folded into the resolved context. CLI values win
/// over the config file.
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub episode: Option<String>,
    pub episode_date: Option<NaiveDate>,
    pub poll_time: Option<u64>,
    pub archive: bool,
}

/// Process-wide configuration resolved once at startup and passed by
/// reference into the loader and both loops. Immutable after resolution.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub episode: Option<String>,
    pub episode_date: NaiveDate,
    /// Seconds between live polls, clamped to at least 1.
    pub poll_time: u64,
    pub intro_album: Option<String>,
    pub ignore_album: Option<String>,
    pub use_stop_values: bool,
    pub stop_title: String,
    pub stop_artist: String,
    pub stop_album: String,
    pub stop_artwork: String,
    pub archive: bool,
    pub archive_db: Option<PathBuf>,
}

impl RunContext {
    /// Resolves the context from the `[trackcast]` section plus overrides.
    ///
    /// A missing run-level section is only a warning; the run continues on
    /// defaults. `today` is injected so archive re-runs and tests can pin
    /// the episode date.
    pub fn resolve(settings: &Settings, overrides: &RunOverrides, today: NaiveDate) -> Self {
        if !settings.has_section(RUN_SECTION) {
            tracing::warn!("no [{RUN_SECTION}] section in config, continuing with defaults");
        }

        let poll_time = overrides
            .poll_time
            .or_else(|| {
                settings
                    .get_i64(RUN_SECTION, "pollTime")
                    .map(|v| v.max(0) as u64)
            })
            .unwrap_or(DEFAULT_POLL_TIME)
            .max(1);

        let non_empty = |key: &str| settings.get_str(RUN_SECTION, key).filter(|v| !v.is_empty());

        RunContext {
            episode: overrides.episode.clone(),
            episode_date: overrides.episode_date.unwrap_or(today),
            poll_time,
            intro_album: non_empty("introAlbum"),
            ignore_album: non_empty("ignoreAlbum"),
            use_stop_values: settings
                .get_bool(RUN_SECTION, "useStopValues")
                .unwrap_or(false),
            stop_title: settings
                .get_str(RUN_SECTION, "stopTitle")
                .unwrap_or_default(),
            stop_artist: settings
                .get_str(RUN_SECTION, "stopArtist")
                .unwrap_or_default(),
            stop_album: settings
                .get_str(RUN_SECTION, "stopAlbum")
                .unwrap_or_default(),
            stop_artwork: settings
                .get_str(RUN_SECTION, "stopArtwork")
                .unwrap_or_default(),
            archive: overrides.archive,
            archive_db: settings
                .get_str(RUN_SECTION, "archiveDbPath")
                .map(PathBuf::from),
        }
    }

    pub fn mode(&self) -> RunMode {
        if self.archive {
            RunMode::Archive
        } else {
            RunMode::Live
        }
    }

    /// The sentinel track announced when nothing is playing and stop values
    /// are configured; signals an "off air" state to targets.
    pub fn stop_track(&self) -> Track {
        Track {
            title: self.stop_title.clone(),
            artist: self.stop_artist.clone(),
            album: self.stop_album.clone(),
            length: String::new(),
            artwork: self.stop_artwork.clone(),
            unique_id: self.stop_title.clone(),
            ignore: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 6, 10).unwrap()
    }

    #[test]
    fn defaults_when_section_missing() {
        let ctx = RunContext::resolve(&Settings::empty(), &RunOverrides::default(), today());
        assert_eq!(ctx.poll_time, DEFAULT_POLL_TIME);
        assert_eq!(ctx.intro_album, None);
        assert_eq!(ctx.ignore_album, None);
        assert!(!ctx.use_stop_values);
        assert_eq!(ctx.episode_date, today());
        assert_eq!(ctx.mode(), RunMode::Live);
    }

    #[test]
    fn poll_time_is_clamped_to_at_least_one() {
        let settings = Settings::from_toml("[trackcast]\npollTime = 0").unwrap();
        let ctx = RunContext::resolve(&settings, &RunOverrides::default(), today());
        assert_eq!(ctx.poll_time, 1);

        let settings = Settings::from_toml("[trackcast]\npollTime = -4").unwrap();
        let ctx = RunContext::resolve(&settings, &RunOverrides::default(), today());
        assert_eq!(ctx.poll_time, 1);

        let overrides = RunOverrides {
            poll_time: Some(0),
            ..RunOverrides::default()
        };
        let ctx = RunContext::resolve(&Settings::empty(), &overrides, today());
        assert_eq!(ctx.poll_time, 1);
    }

    #[test]
    fn overrides_win_over_settings() {
        let settings = Settings::from_toml("[trackcast]\npollTime = 30").unwrap();
        let overrides = RunOverrides {
            episode: Some("142".into()),
            poll_time: Some(2),
            archive: true,
            episode_date: Some(NaiveDate::from_ymd_opt(2020, 1, 4).unwrap()),
        };
        let ctx = RunContext::resolve(&settings, &overrides, today());
        assert_eq!(ctx.episode.as_deref(), Some("142"));
        assert_eq!(ctx.poll_time, 2);
        assert_eq!(ctx.mode(), RunMode::Archive);
        assert_eq!(ctx.episode_date, NaiveDate::from_ymd_opt(2020, 1, 4).unwrap());
    }

    #[test]
    fn stop_track_uses_configured_values() {
        let settings = Settings::from_toml(
            r#"
            [trackcast]
            useStopValues = true
            stopTitle = "Off Air"
            stopArtist = "WXYZ"
            stopAlbum = "Station"
            "#,
        )
        .unwrap();
        let ctx = RunContext::resolve(&settings, &RunOverrides::default(), today());
        assert!(ctx.use_stop_values);

        let stop = ctx.stop_track();
        assert_eq!(stop.title, "Off Air");
        assert_eq!(stop.artist, "WXYZ");
        assert_eq!(stop.album, "Station");
        assert_eq!(stop.unique_id, "Off Air");
        assert!(!stop.ignore);
    }

    #[test]
    fn empty_intro_album_counts_as_unset() {
        let settings = Settings::from_toml("[trackcast]\nintroAlbum = \"\"").unwrap();
        let ctx = RunContext::resolve(&settings, &RunOverrides::default(), today());
        assert_eq!(ctx.intro_album, None);
    }
}
