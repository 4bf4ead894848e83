use crate::context::RunContext;
use crate::settings::Settings;
use crate::track::Track;
use chrono::NaiveDateTime;
use thiserror::Error;

/// Timestamp attached to a dispatched event: wall-clock "now" for live runs,
/// the persisted row timestamp for archive replays.
pub type EventTime = NaiveDateTime;

#[derive(Debug, Error)]
pub enum TargetError {
    #[error("no [{section}] section in config")]
    MissingSection { section: String },
    #[error("missing {key} in [{section}] config")]
    MissingKey { section: String, key: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("{message}")]
    Other { message: String },
}

impl TargetError {
    /// The right "not configured" error for a section/key pair,
    /// distinguishing a wholly absent section from a missing key.
    pub fn missing(settings: &Settings, section: &str, key: &str) -> Self {
        if settings.has_section(section) {
            TargetError::MissingKey {
                section: section.to_owned(),
                key: key.to_owned(),
            }
        } else {
            TargetError::MissingSection {
                section: section.to_owned(),
            }
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        TargetError::Other {
            message: message.into(),
        }
    }
}

pub type TargetResult<T> = Result<T, TargetError>;

/// An output target: receives every forwarded track-change event and is
/// closed exactly once at shutdown.
///
/// Implementations keep their own failures local where they can; the
/// dispatcher adds a second layer of containment around both operations.
pub trait Target {
    /// Display name used in logs (not required to be unique).
    fn name(&self) -> &str;

    /// Called once per forwarded event.
    fn log_track(&mut self, track: &Track, start_time: EventTime) -> TargetResult<()>;

    /// Called exactly once at shutdown; flushes and releases owned resources.
    fn close(&mut self) -> TargetResult<()>;
}

/// Fallible constructor: reads the target's own config section and either
/// produces a working instance or an error describing why it cannot run.
pub type TargetFactory = fn(&Settings, &RunContext) -> TargetResult<Box<dyn Target>>;

/// Statically registered identity of a target implementation.
///
/// `id` doubles as the config section name. `priority` orders dispatch
/// (higher first). `archive_safe` opts the target into archive replays;
/// most targets assume live wall-clock semantics and leave it false.
#[derive(Debug, Clone, Copy)]
pub struct TargetSpec {
    pub id: &'static str,
    pub priority: i32,
    pub archive_safe: bool,
    pub factory: TargetFactory,
}
