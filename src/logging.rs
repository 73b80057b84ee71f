use crate::config::ConfigDocument;
use crate::output::DebugFlags;
use anyhow::Result;
use std::path::Path;
use termcolor::ColorChoice;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Most verbose level the enabled debug flags ask for
pub fn max_level(debug: &DebugFlags) -> Level {
    if debug.trace {
        Level::TRACE
    } else if debug.sensor_data {
        Level::DEBUG
    } else if debug.setup {
        Level::INFO
    } else {
        Level::WARN
    }
}

/// Level for a run: explicit flags win, then the flags of the document in use
pub fn level_for(debug: Option<&DebugFlags>, document: Option<&ConfigDocument>) -> Level {
    debug
        .or(document.map(|document| &document.output.debug))
        .map(max_level)
        .unwrap_or(Level::INFO)
}

/// Log to `dir/<crate>.log` and to coloured stderr.
///
/// The guards must be kept alive until exit or buffered lines are lost.
pub fn init(dir: impl AsRef<Path>, level: Level) -> Result<[WorkerGuard; 2]> {
    // initialise the file writer
    let log_file_name = format!("{}.log", env!("CARGO_PKG_NAME"));
    let file_appender = tracing_appender::rolling::never(dir, log_file_name);
    let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);

    // initialise the colored stderr logger
    let colored_stderr = termcolor::StandardStream::stderr(ColorChoice::Auto);
    let (stderr_writer, stderr_guard) = tracing_appender::non_blocking(colored_stderr);

    tracing_subscriber::fmt()
        .with_ansi(true)
        .with_max_level(level)
        .with_thread_names(true)
        .with_writer(file_writer.and(stderr_writer))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise logging - {e}"))?;

    Ok([file_guard, stderr_guard])
}
