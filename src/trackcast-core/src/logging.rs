use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Clone)]
pub struct LoggingOptions {
    /// Filter directive, e.g. "info" or "debug".
    pub directive: String,
    /// When set, a daily-rolling log file is written here as well as stdout.
    pub log_dir: Option<PathBuf>,
    pub file_name: String,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            directive: "info".into(),
            log_dir: None,
            file_name: "trackcast.log".into(),
        }
    }
}

/// Keeps the non-blocking file writer alive for the process lifetime.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

pub fn init_logging(options: &LoggingOptions) -> Result<LoggingGuard, LoggingError> {
    let env_filter =
        EnvFilter::try_new(&options.directive).map_err(|source| LoggingError::ParseDirective {
            directive: options.directive.clone(),
            source,
        })?;

    let (writer, file_guard) = match &options.log_dir {
        Some(dir) => {
            fs::create_dir_all(dir).map_err(|source| LoggingError::CreateDirectory {
                path: dir.clone(),
                source,
            })?;
            let appender = tracing_appender::rolling::daily(dir, &options.file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let writer = BoxMakeWriter::new(
                std::io::stdout
                    .with_max_level(tracing::Level::TRACE)
                    .and(non_blocking),
            );
            (writer, Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stdout), None),
    };

    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(writer)
        .try_init()
        .map_err(LoggingError::SubscriberInstall)?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to parse log directive {directive}: {source}")]
    ParseDirective {
        directive: String,
        source: tracing_subscriber::filter::ParseError,
    },
    #[error("failed to create log directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to install tracing subscriber: {0}")]
    SubscriberInstall(Box<dyn std::error::Error + Send + Sync>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_log_info_to_stdout() {
        let options = LoggingOptions::default();
        assert_eq!(options.directive, "info");
        assert!(options.log_dir.is_none());
    }
}
