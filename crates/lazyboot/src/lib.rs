//! # lazyboot
//!
//! Bootstrap-once, load-on-demand dependency injection for applications
//! invoked as short-lived functions.
//!
//! The first invocation in a process builds the root container; every later
//! invocation reuses it. Worker modules are instantiated only when an
//! invocation needs them, so code paths pay their initialization cost only
//! when exercised.
//!
//! ## Example
//!
//! ```ignore
//! use lazyboot::infrastructure::config::{AppConfig, WorkerKind};
//! use lazyboot::infrastructure::di::{Invocation, InvocationDispatcher};
//!
//! let dispatcher = InvocationDispatcher::new(AppConfig::default());
//! let outcome = dispatcher
//!     .dispatch(Invocation::for_worker(WorkerKind::Report, serde_json::json!({})))
//!     .await?;
//! assert!(outcome.cold);
//! ```
//!
//! ## Architecture
//!
//! - `domain` - Tokens, module ids, lifecycle states and the error taxonomy
//! - `infrastructure` - Dependency graph, containers, lazy loader, bootstrap
//!   slot, configuration and logging
//! - `init` - Command line runner driving simulated invocations

pub mod init;

/// Domain layer - tokens, lifecycle states and errors
///
/// Re-exports from the domain crate for convenience
pub mod domain {
    pub use lazyboot_domain::*;
}

/// Infrastructure layer - DI core, config and logging
///
/// Re-exports from the infrastructure crate for convenience
pub mod infrastructure {
    pub use lazyboot_infrastructure::*;
}

// Re-export commonly used domain types at the crate root
pub use domain::*;

// Re-export the DI entry points at the crate root
pub use infrastructure::di::{
    BootstrapSlot, Invocation, InvocationDispatcher, InvocationOutcome, LazyModuleLoader,
    ModuleContainer, ModuleDescriptor, ModuleFactory, Provider,
};

// Re-export main entry point at the crate root
pub use init::run;
