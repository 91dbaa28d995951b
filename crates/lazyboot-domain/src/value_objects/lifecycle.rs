//! Lifecycle states and provider scopes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Provider lifetime within a container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Created once per container and reused for every resolution
    #[default]
    Singleton,
    /// Factory invoked anew on every resolution
    Transient,
}

/// Lifecycle state of a module container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerStatus {
    /// Singletons are still being resolved
    Initializing,
    /// Every singleton resolved, providers can be read
    Ready,
    /// A provider failed; the container reports the captured error forever
    Failed,
    /// Instances released; the container can no longer serve providers
    Disposed,
}

impl ContainerStatus {
    /// Whether the container has left the `Initializing` state
    pub fn is_settled(self) -> bool {
        !matches!(self, Self::Initializing)
    }
}

impl fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Initializing => "initializing",
            Self::Ready => "ready",
            Self::Failed => "failed",
            Self::Disposed => "disposed",
        };
        f.write_str(name)
    }
}

/// Lifecycle state of the process-wide bootstrap slot
///
/// Transitions `NotStarted -> InFlight -> {Ready | Failed}` and
/// `Ready -> ShutDown`, never backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BootstrapState {
    /// No invocation has asked for the root container yet
    NotStarted,
    /// The root container is being built
    InFlight,
    /// The root container is ready
    Ready,
    /// Root bootstrap failed; the process cannot serve invocations
    Failed,
    /// The root container was disposed by host shutdown
    ShutDown,
}

impl BootstrapState {
    /// Whether the slot can no longer produce a usable root container
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Failed | Self::ShutDown)
    }
}

impl fmt::Display for BootstrapState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotStarted => "not_started",
            Self::InFlight => "in_flight",
            Self::Ready => "ready",
            Self::Failed => "failed",
            Self::ShutDown => "shut_down",
        };
        f.write_str(name)
    }
}
