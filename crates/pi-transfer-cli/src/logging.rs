use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_FILE: &str = "pi-transfer.log";
/// Daily files kept before the oldest is pruned.
pub const MAX_LOG_FILES: usize = 7;

fn file_appender(log_dir: &Path) -> Result<RollingFileAppender, InitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE)
        .max_log_files(MAX_LOG_FILES)
        .build(log_dir)
}

/// Log to stdout and to a daily-rotated file under `log_dir`.
///
/// The returned guard flushes the file writer on drop and must outlive `main`.
pub fn init_logging(log_dir: &Path) -> Result<WorkerGuard, InitError> {
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender(log_dir)?);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pi_transfer=info,pi_transfer_cli=info"));

    let file_layer = fmt::layer()
        .with_target(false)
        .with_writer(non_blocking)
        .with_ansi(false);
    let stdout_layer = fmt::layer().with_target(false).with_ansi(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    Ok(guard)
}
