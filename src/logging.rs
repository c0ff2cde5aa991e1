//! Log output
//!
//! The dashboard owns the terminal, so log lines never go to stdout or stderr
//! while it runs. When a log file is given, a `tracing` subscriber appends
//! plain-text lines to it; otherwise events are dropped.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is not set
const DEFAULT_FILTER: &str = "info";

/// Opens `path` for appending, creating it if needed
fn open_log_file(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Filter from `RUST_LOG`, falling back to `info`
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber writing to `path`.
///
/// Does nothing when `path` is `None`. Returns an error if the file cannot be
/// opened; a subscriber that is already installed is left in place.
pub fn init(path: Option<&Path>) -> io::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };

    let file = open_log_file(path)?;
    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file))
        .try_init();

    if installed.is_ok() {
        tracing::info!(path = %path.display(), "Logging to file");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_no_path_is_noop() {
        assert!(init(None).is_ok());
    }

    #[test]
    fn test_open_log_file_creates_and_appends() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("weatherdash.log");

        std::fs::write(&path, "first\n").unwrap();
        {
            use std::io::Write;
            let mut file = open_log_file(&path).unwrap();
            writeln!(file, "second").unwrap();
        }

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn test_unwritable_path_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing-dir").join("weatherdash.log");
        assert!(init(Some(&path)).is_err());
    }
}
