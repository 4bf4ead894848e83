use crate::track::NowPlaying;
use thiserror::Error;

/// Failures while querying a live track source. All of these are tick-level:
/// the poll loop logs them and retries on the next tick.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to run track source command: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("track source exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    #[error("failed to parse track source output: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type SourceResult<T> = Result<T, SourceError>;

/// A pollable live track source.
///
/// Synchronous by design: the dispatch core queries it once per tick and
/// blocks until it answers. `Ok(None)` means nothing is playing.
pub trait TrackSource {
    fn poll(&mut self) -> SourceResult<Option<NowPlaying>>;
}
