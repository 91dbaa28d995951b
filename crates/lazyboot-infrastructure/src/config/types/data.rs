//! Data source configuration types

use crate::constants::*;
use serde::{Deserialize, Serialize};

/// Connection settings for the root module's database provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Connection URL
    pub connection_url: String,

    /// Simulated connection latency in milliseconds
    pub connect_delay_ms: u64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            connection_url: DEFAULT_CONNECTION_URL.to_string(),
            connect_delay_ms: DEFAULT_CONNECT_DELAY_MS,
        }
    }
}
