//! Log file setup
//!
//! The terminal belongs to the UI, so tracing output goes to `tilechain.log`
//! in the platform data directory. Filter with `TILECHAIN_LOG` (default `info`).

use directories::ProjectDirs;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "TILECHAIN_LOG";
pub const LOG_FILE_NAME: &str = "tilechain.log";

/// OS-standard data directory, or the working directory if none can be resolved.
pub fn default_log_dir() -> PathBuf {
    ProjectDirs::from("", "", "tilechain")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Install the global subscriber. Returns the log file path.
pub fn init(dir: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(LOG_FILE_NAME);
    let log_file = File::create(&path)?;

    // a second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .try_init();

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_creates_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("logs");
        let path = init(&nested).unwrap();
        assert_eq!(path, nested.join(LOG_FILE_NAME));
        assert!(path.exists());
        // repeated init is harmless
        assert!(init(&nested).is_ok());
    }
}
