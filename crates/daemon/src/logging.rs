use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_FILE_PREFIX: &str = "minfs";
const LOG_FILE_SUFFIX: &str = "log";

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("failed to open log directory: {0}")]
    Appender(#[from] tracing_appender::rolling::InitError),
    #[error("failed to install tracing subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Default filter when `RUST_LOG` is unset. Chatty dependencies stay at warn.
pub fn default_filter(level: tracing::Level) -> String {
    let level = level.as_str().to_ascii_lowercase();
    format!("{level},aws_config=warn,aws_smithy_runtime=warn,hyper=warn,hyper_util=warn")
}

/// Install the global subscriber: stderr always, plus a daily rolling file
/// under `log_dir` when given. The returned guard flushes the file writer
/// and must live as long as the process.
pub fn init(
    level: tracing::Level,
    log_dir: Option<&Path>,
) -> Result<Option<WorkerGuard>, LoggingError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(level)));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(LOG_FILE_PREFIX)
                .filename_suffix(LOG_FILE_SUFFIX)
                .build(dir)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()?;

    if let Some(dir) = log_dir {
        tracing::info!(log_dir = %dir.display(), "logging to file");
    }
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        for level in [tracing::Level::INFO, tracing::Level::DEBUG] {
            let directives = default_filter(level);
            assert!(EnvFilter::try_new(&directives).is_ok(), "{directives}");
        }
        assert!(default_filter(tracing::Level::DEBUG).starts_with("debug,"));
    }
}
