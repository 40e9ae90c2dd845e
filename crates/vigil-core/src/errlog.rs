use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

use chrono::Local;

use crate::Result;

/// Append-only error log: one local-timestamped line per entry, no rotation.
///
/// The console shows only successes and alerts; failures land here.
pub struct ErrorLog {
    path: PathBuf,
}

impl ErrorLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, msg: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let line = format!("{} - {msg}\n", Local::now().format("%Y-%m-%d %H:%M:%S%.3f %z"));
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    /// Best-effort variant for callers that must never propagate failures.
    pub fn record(&self, msg: &str) {
        if let Err(e) = self.write(msg) {
            eprintln!("failed to append to {}: {e}", self.path.display());
        }
    }
}
