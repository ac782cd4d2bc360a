//! Workbench configuration with documented constants
//!
//! All tunable values are collected here with explanations of their
//! purpose. Defaults match the physical bench; a TOML file can override
//! any subset of them.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::error::{LabError, Result};

/// Configuration for the command engine and the workbench
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabConfig {
    /// Lowest valid sample slot on the bed
    ///
    /// Slot numbers are 1-based; the operator-facing index grammar
    /// clamps everything into `[sample_min, sample_max]`.
    pub sample_min: u8,

    /// Highest valid sample slot on the bed
    pub sample_max: u8,

    /// Pause between dispatched steps, in milliseconds
    ///
    /// A pacing hint for the hardware, not a correctness requirement.
    /// The physical bench settles noticeably better with a short gap
    /// between consecutive pick/place sequences.
    pub settle_ms: u64,

    /// Simulated arm travel time per waypoint move, in milliseconds
    ///
    /// Zero keeps tests instant; a value around 200-500 makes console
    /// sessions feel like the real arm.
    pub move_delay_ms: u64,

    /// Timeout for one inference request, in seconds
    ///
    /// A timeout during compilation aborts the command; during
    /// execution it would surface as a step-level error.
    pub llm_timeout_secs: u64,

    /// Directory receiving the per-run JSONL observation logs
    pub log_dir: PathBuf,

    /// Fixed seed for the simulated potentiostat
    ///
    /// `None` draws a fresh seed per run; set it for reproducible
    /// reading sequences.
    pub instrument_seed: Option<u64>,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            sample_min: 1,
            sample_max: 5,
            settle_ms: 50,
            move_delay_ms: 0,
            llm_timeout_secs: 60,
            log_dir: PathBuf::from("experiment_logs"),
            instrument_seed: None,
        }
    }
}

impl LabConfig {
    /// Load a configuration file, falling back to defaults for any
    /// field the file omits
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| LabError::Config(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| LabError::Config(format!("failed to parse {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.sample_min < 1 {
            return Err(LabError::Config(format!(
                "sample_min ({}) must be at least 1; slot numbers are 1-based",
                self.sample_min
            )));
        }
        if self.sample_min > self.sample_max {
            return Err(LabError::Config(format!(
                "sample_min ({}) must be <= sample_max ({})",
                self.sample_min, self.sample_max
            )));
        }
        if self.llm_timeout_secs == 0 {
            return Err(LabError::Config("llm_timeout_secs must be positive".into()));
        }
        Ok(())
    }
}
