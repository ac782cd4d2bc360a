//! Observation persistence

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::core::error::Result;
use crate::trace::observation::Observation;

/// Append-only destination for completed observations.
///
/// Callers treat sinks as best-effort: a record failure is logged and
/// execution continues.
pub trait ObservationSink {
    fn record(&mut self, obs: &Observation) -> Result<()>;
}

/// One JSON line per observation, appended to a per-run timestamped
/// file under the log directory
pub struct JsonlSink {
    path: PathBuf,
    file: File,
}

impl JsonlSink {
    pub fn create(log_dir: &Path) -> Result<Self> {
        fs::create_dir_all(log_dir)?;
        let stamp = chrono::Local::now().format("%Y%m%d%H%M%S");
        let path = log_dir.join(format!("{}.jsonl", stamp));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        tracing::info!(path = %path.display(), "observation log opened");
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ObservationSink for JsonlSink {
    fn record(&mut self, obs: &Observation) -> Result<()> {
        let line = serde_json::to_string(obs)?;
        writeln!(self.file, "{}", line)?;
        Ok(())
    }
}
