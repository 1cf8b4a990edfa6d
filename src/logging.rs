//! Logging setup.

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget<'a> {
    /// Standard error, for the non-interactive commands.
    Stderr,
    /// A file, for the terminal view (which owns stdout/stderr).
    File(&'a Path),
    /// No logging.
    Off,
}

/// Initializes the global tracing subscriber.
///
/// The level comes from `RUST_LOG` if set, otherwise from `default_level`.
/// Calling this more than once is harmless; later calls are ignored.
pub fn init(default_level: &str, target: LogTarget<'_>) -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    let _ = match target {
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
        LogTarget::File(path) => {
            let file = File::create(path)?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
        }
        LogTarget::Off => return Ok(()),
    };
    Ok(())
}
