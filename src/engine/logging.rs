use std::fs::OpenOptions;
use std::path::Path;

use env_logger::{Builder, Env, Target};

use super::error::ReaderError;

/// Send `log` output to `file`, filtered by `RUST_LOG` (default `info`).
///
/// The terminal is in raw mode on the alternate screen while the reader
/// runs, so nothing is written to stderr.
pub fn init(file: &Path) -> Result<(), ReaderError> {
    let sink = OpenOptions::new().create(true).append(true).open(file)?;

    Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(sink)))
        .format_timestamp_millis()
        .try_init()
        .map_err(|e| ReaderError::Logging(e.to_string()))
}
