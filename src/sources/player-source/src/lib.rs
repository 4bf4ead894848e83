//! Live track source backed by a helper command.
//!
//! The helper is whatever queries the actual media player; it is run once
//! per poll and prints JSON on stdout: an object with optional
//! `title`/`artist`/`album`/`length`/`artwork`/`id` fields while something
//! is playing, or `null` (or nothing) when idle.

use std::process::Command;
use thiserror::Error;
use tracing::debug;
use trackcast_core::{NowPlaying, Settings, SourceError, SourceResult, TrackSource};

/// Config section consumed by [`CommandSource`].
pub const SECTION: &str = "PlayerSource";

#[derive(Debug, Error)]
pub enum SourceConfigError {
    #[error("no [PlayerSource] section in config")]
    MissingSection,
    #[error("missing command in [PlayerSource] config")]
    MissingCommand,
}

pub struct CommandSource {
    command: String,
    args: Vec<String>,
}

impl CommandSource {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    /// Reads `command` (required) and `args` (optional) from
    /// `[PlayerSource]`. Live mode cannot run without this, so a missing
    /// section is surfaced to the caller instead of being swallowed.
    pub fn from_settings(settings: &Settings) -> Result<Self, SourceConfigError> {
        if !settings.has_section(SECTION) {
            return Err(SourceConfigError::MissingSection);
        }
        let command = settings
            .get_str(SECTION, "command")
            .filter(|c| !c.is_empty())
            .ok_or(SourceConfigError::MissingCommand)?;
        let args = settings.get_str_list(SECTION, "args").unwrap_or_default();
        Ok(Self::new(command, args))
    }
}

impl TrackSource for CommandSource {
    fn poll(&mut self) -> SourceResult<Option<NowPlaying>> {
        let output = Command::new(&self.command).args(&self.args).output()?;
        if !output.status.success() {
            return Err(SourceError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let text = stdout.trim();
        if text.is_empty() {
            return Ok(None);
        }

        let now: Option<NowPlaying> = serde_json::from_str(text)?;
        debug!(playing = now.is_some(), "polled track source");
        Ok(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    fn shell(script: &str) -> CommandSource {
        CommandSource::new("sh", vec!["-c".into(), script.into()])
    }

    #[test]
    fn from_settings_requires_a_command() {
        let err = CommandSource::from_settings(&Settings::empty()).err().unwrap();
        assert!(matches!(err, SourceConfigError::MissingSection));

        let settings = Settings::from_toml("[PlayerSource]\nargs = []").unwrap();
        let err = CommandSource::from_settings(&settings).err().unwrap();
        assert!(matches!(err, SourceConfigError::MissingCommand));
    }

    #[test]
    #[cfg(unix)]
    fn parses_a_playing_track() {
        let mut source = shell(
            r#"printf '{"title":"Temptation","artist":"New Order","album":"Substance","length":"5:21"}'"#,
        );
        let now = source.poll().unwrap().unwrap();
        assert_eq!(now.title.as_deref(), Some("Temptation"));
        assert_eq!(now.artist.as_deref(), Some("New Order"));
        assert_eq!(now.id, None);
    }

    #[test]
    #[cfg(unix)]
    fn null_and_empty_output_mean_nothing_playing() {
        assert!(shell("printf null").poll().unwrap().is_none());
        assert!(shell("true").poll().unwrap().is_none());
    }

    #[test]
    #[cfg(unix)]
    fn nonzero_exit_is_a_source_error() {
        let err = shell("echo player gone >&2; exit 3").poll().unwrap_err();
        match err {
            SourceError::Failed { stderr, .. } => assert_eq!(stderr, "player gone"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    #[cfg(unix)]
    fn malformed_output_is_a_parse_error() {
        let err = shell("printf 'not json'").poll().unwrap_err();
        assert!(matches!(err, SourceError::Parse(_)));
    }
}
