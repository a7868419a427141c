use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};

const DEFAULT_FILTER: &str = "fyyur_backend=debug,tower_http=debug";

/// Initializes console logging, plus `error.log` under `log_dir` when given.
///
/// The returned guard flushes the file writer on drop, so keep it alive for
/// the lifetime of the process.
pub fn init_logging(log_dir: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let console_layer = fmt::layer().with_writer(std::io::stdout);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let file_appender = tracing_appender::rolling::never(dir, "error.log");
            let (writer, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(LevelFilter::WARN);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    if let Some(dir) = log_dir {
        tracing::info!("Writing warnings and errors to {}", dir.join("error.log").display());
    }

    Ok(guard)
}
