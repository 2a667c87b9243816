use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Append-only operational log written next to the session directory.
pub const LOG_FILE_NAME: &str = "spec_forge.log";

/// Route events to the append-only log file, mirroring warnings and
/// errors on stderr so remote failures stay visible between prompts.
///
/// Returns the guard that flushes the non-blocking writer; hold it for
/// the process lifetime.
pub fn init(dir: &Path) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = Registry::default()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .with_filter(LevelFilter::WARN),
        );
    tracing::subscriber::set_global_default(subscriber).ok();

    guard
}
