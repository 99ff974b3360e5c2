use ps_core::{Error, Result};
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Logs INFO and above to stdout and to `log_file`, which is truncated first
/// so each run starts with a fresh file.
pub fn init_logging(log_file: &Path) -> Result<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let file = File::create(log_file)?;
    tracing_subscriber::registry()
        .with(LevelFilter::INFO)
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(fmt::layer())
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to initialize logging: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_is_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "previous run\n").unwrap();

        init_logging(&path).unwrap();
        tracing::error!(url = "https://www.popsci.com/x/", "Error making request to article");
        tracing::debug!("not recorded");

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(!contents.contains("previous run"));
        assert!(contents.contains("ERROR"));
        assert!(contents.contains("Error making request to article"));
        assert!(!contents.contains("not recorded"));
    }
}
