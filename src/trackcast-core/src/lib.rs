pub mod context;
pub mod logging;
pub mod paths;
pub mod settings;
pub mod source;
pub mod target;
pub mod track;

pub use context::{RunContext, RunMode, RunOverrides};
pub use logging::{init_logging, LoggingError, LoggingGuard, LoggingOptions};
pub use paths::{AppDirs, DirsError};
pub use settings::{ConfigError, Settings};
pub use source::{SourceError, SourceResult, TrackSource};
pub use target::{EventTime, Target, TargetError, TargetFactory, TargetResult, TargetSpec};
pub use track::{NowPlaying, Track};

pub const APP_NAME: &str = "trackcast";
pub const APP_AUTHOR: &str = "Trackcast";
pub const APP_QUALIFIER: &str = "org";
