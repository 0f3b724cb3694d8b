use std::path::Path;

use tracing_appender::rolling::Rotation;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Daily-rotated log files under the state dir. The TUI owns the terminal,
/// so stderr output is gated behind `show_std` (CLI mode only).
pub fn enable_logging(state_dir: &Path, show_std: bool) -> Result<(), String> {
    let appender = tracing_appender::rolling::Builder::new()
        .rotation(Rotation::DAILY)
        .max_log_files(5)
        .filename_prefix("tagwerk")
        .build(state_dir.join("logs"))
        .map_err(|e| e.to_string())?;

    let stderr = std::io::stderr.with_filter(move |_| show_std);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tagwerk=info")),
        )
        .with_writer(stderr.and(appender))
        .with_ansi(false)
        .try_init()
        .map_err(|e| e.to_string())
}
