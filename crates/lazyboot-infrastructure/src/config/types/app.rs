//! Main application configuration

use serde::{Deserialize, Serialize};

pub use super::bootstrap::{BootstrapConfig, WorkerKind};
pub use super::data::DataConfig;
pub use super::logging::LoggingConfig;

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Bootstrap and prewarm configuration
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
    /// Simulated data source configuration
    #[serde(default)]
    pub data: DataConfig,
}
