//! Error handling types
//!
//! Every error is `Clone`: a single failed bootstrap or module load is handed
//! to every caller that was waiting on it, so wrapped causes are held in `Arc`.

use crate::value_objects::{ModuleId, ProviderToken};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Shared, type-erased source error
pub type SharedSource = Arc<dyn std::error::Error + Send + Sync>;

/// Chain of tokens or modules visited while resolving, rendered as `a -> b -> a`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain<T>(pub Vec<T>);

impl<T: fmt::Display> fmt::Display for Chain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, item) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(crate::constants::CHAIN_SEPARATOR)?;
            }
            write!(f, "{item}")?;
        }
        Ok(())
    }
}

/// Main error type for lazyboot
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// Requested token has no registration reachable from the container
    #[error("Unknown provider `{token}` in module `{module}`")]
    UnknownProvider {
        /// The token that was requested
        token: ProviderToken,
        /// The container that was searched
        module: ModuleId,
    },

    /// Resolution chain revisits a token that is still being resolved
    #[error("Circular dependency: {chain}")]
    CircularDependency {
        /// Tokens on the resolution path, ending with the repeated one
        chain: Chain<ProviderToken>,
    },

    /// Module imports form a cycle
    #[error("Circular module import: {chain}")]
    CircularImport {
        /// Modules on the import path, ending with the repeated one
        chain: Chain<ModuleId>,
    },

    /// Token resolved through a typed handle whose type differs from the registration
    #[error("Provider `{token}` is registered as `{registered}`, requested as `{expected}`")]
    TypeMismatch {
        /// The requested token
        token: ProviderToken,
        /// Rust type name of the registration
        registered: &'static str,
        /// Rust type name the caller asked for
        expected: &'static str,
    },

    /// Descriptor registers the same token more than once
    #[error("Provider `{token}` registered twice in module `{module}`")]
    DuplicateProvider {
        /// The duplicated token
        token: ProviderToken,
        /// The module being described
        module: ModuleId,
    },

    /// Descriptor exports a token it does not register
    #[error("Module `{module}` exports unregistered provider `{token}`")]
    InvalidExport {
        /// The exported token
        token: ProviderToken,
        /// The module being described
        module: ModuleId,
    },

    /// `get` called while the container is still initializing
    #[error("Container `{module}` is not ready")]
    ContainerNotReady {
        /// The container module id
        module: ModuleId,
    },

    /// `get` called after the container was disposed
    #[error("Container `{module}` has been disposed")]
    ContainerDisposed {
        /// The container module id
        module: ModuleId,
    },

    /// A provider factory failed
    #[error("Provider `{token}` failed: {source}")]
    ProviderFailed {
        /// The token whose factory failed
        token: ProviderToken,
        /// The factory error
        #[source]
        source: Arc<Error>,
    },

    /// Root container bootstrap failed
    #[error("Bootstrap failed: {source}")]
    BootstrapFailure {
        /// Underlying cause
        #[source]
        source: Arc<Error>,
    },

    /// Lazy module load failed
    #[error("Loading module `{module}` failed: {source}")]
    ModuleLoadFailure {
        /// The module that failed to load
        module: ModuleId,
        /// Underlying cause
        #[source]
        source: Arc<Error>,
    },

    /// Module factory produced a descriptor for another module
    #[error("Module factory for `{expected}` produced descriptor `{actual}`")]
    ModuleIdMismatch {
        /// Id announced by the factory
        expected: ModuleId,
        /// Id carried by the produced descriptor
        actual: ModuleId,
    },

    /// Application factory error
    #[error("Factory error: {message}")]
    Factory {
        /// Description of the failure
        message: String,
        /// Optional source error
        #[source]
        source: Option<SharedSource>,
    },

    /// Configuration-related error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<SharedSource>,
    },

    /// Infrastructure operation error
    #[error("Infrastructure error: {message}")]
    Infrastructure {
        /// Description of the infrastructure error
        message: String,
        /// Optional source error
        #[source]
        source: Option<SharedSource>,
    },
}

// Resolution error creation methods
impl Error {
    /// Create an unknown provider error
    pub fn unknown_provider(token: ProviderToken, module: ModuleId) -> Self {
        Self::UnknownProvider { token, module }
    }

    /// Create a circular dependency error from the resolution path
    pub fn circular_dependency(chain: Vec<ProviderToken>) -> Self {
        Self::CircularDependency {
            chain: Chain(chain),
        }
    }

    /// Create a circular import error from the import path
    pub fn circular_import(chain: Vec<ModuleId>) -> Self {
        Self::CircularImport {
            chain: Chain(chain),
        }
    }

    /// Wrap a factory error with the token whose factory raised it
    pub fn provider_failed(token: ProviderToken, source: Error) -> Self {
        Self::ProviderFailed {
            token,
            source: Arc::new(source),
        }
    }
}

// Lifecycle error creation methods
impl Error {
    /// Wrap a root bootstrap failure
    pub fn bootstrap_failure(source: Error) -> Self {
        Self::BootstrapFailure {
            source: Arc::new(source),
        }
    }

    /// Wrap a lazy module load failure
    pub fn module_load_failure(module: ModuleId, source: Error) -> Self {
        Self::ModuleLoadFailure {
            module,
            source: Arc::new(source),
        }
    }
}

// Application-facing error creation methods
impl Error {
    /// Create a factory error
    pub fn factory<S: Into<String>>(message: S) -> Self {
        Self::Factory {
            message: message.into(),
            source: None,
        }
    }

    /// Create a factory error with source
    pub fn factory_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Factory {
            message: message.into(),
            source: Some(Arc::new(source)),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn configuration_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(Arc::new(source)),
        }
    }

    /// Create an infrastructure error
    pub fn infrastructure<S: Into<String>>(message: S) -> Self {
        Self::Infrastructure {
            message: message.into(),
            source: None,
        }
    }

    /// Create an infrastructure error with source
    pub fn infrastructure_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Infrastructure {
            message: message.into(),
            source: Some(Arc::new(source)),
        }
    }
}

// Inspection helpers
impl Error {
    /// Innermost error, looking through bootstrap, module load and provider wrappers
    pub fn root_cause(&self) -> &Error {
        match self {
            Self::ProviderFailed { source, .. }
            | Self::BootstrapFailure { source }
            | Self::ModuleLoadFailure { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Token of the innermost provider whose factory failed, if any
    pub fn failing_provider(&self) -> Option<&ProviderToken> {
        match self {
            Self::ProviderFailed { token, source } => {
                source.failing_provider().or(Some(token))
            }
            Self::BootstrapFailure { source } | Self::ModuleLoadFailure { source, .. } => {
                source.failing_provider()
            }
            _ => None,
        }
    }

    /// Whether this is a bootstrap failure
    pub fn is_bootstrap_failure(&self) -> bool {
        matches!(self, Self::BootstrapFailure { .. })
    }

    /// Whether this is a module load failure
    pub fn is_module_load_failure(&self) -> bool {
        matches!(self, Self::ModuleLoadFailure { .. })
    }

    /// Whether this is a dependency or import cycle, at any wrapping depth
    pub fn is_cycle(&self) -> bool {
        matches!(
            self.root_cause(),
            Self::CircularDependency { .. } | Self::CircularImport { .. }
        )
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Self::factory(s)
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Self::factory(s)
    }
}
