//! Bootstrap configuration types
//!
//! ```toml
//! [bootstrap]
//! prewarm = ["report"]        # worker modules loaded right after bootstrap
//! worker_init_delay_ms = 20   # simulated worker initialization cost
//! ```

use crate::constants::*;
use lazyboot_domain::ModuleId;
use lazyboot_domain::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Worker modules an invocation can route to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerKind {
    /// Aggregates stored records into a report
    Report,
    /// Formats stored records for export
    Export,
}

impl WorkerKind {
    /// Every known worker
    pub const ALL: [WorkerKind; 2] = [WorkerKind::Report, WorkerKind::Export];

    /// Identity of the module implementing this worker
    pub fn module_id(self) -> ModuleId {
        ModuleId::from_static(self.as_str())
    }

    /// Lowercase name, as used in configuration
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Report => "report",
            Self::Export => "export",
        }
    }
}

impl fmt::Display for WorkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "report" => Ok(Self::Report),
            "export" => Ok(Self::Export),
            _ => Err(Error::configuration(format!(
                "Unknown worker: {s}. Use report or export"
            ))),
        }
    }
}

/// Bootstrap configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Workers loaded eagerly once the root container is ready
    pub prewarm: Vec<WorkerKind>,

    /// Simulated initialization latency of worker modules in milliseconds
    pub worker_init_delay_ms: u64,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            prewarm: Vec::new(),
            worker_init_delay_ms: DEFAULT_WORKER_INIT_DELAY_MS,
        }
    }
}
