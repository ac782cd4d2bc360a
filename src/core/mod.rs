pub mod config;
pub mod error;

pub use config::LabConfig;
pub use error::{LabError, Result};
