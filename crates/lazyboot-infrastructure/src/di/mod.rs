//! Dependency Injection System - Bootstrap and Lazy Load
//!
//! Builds the application's dependency graph at most once per process and
//! pulls worker modules in only when an invocation needs them.
//!
//! ## Architecture Overview
//!
//! ```text
//! BootstrapSlot (one per process)
//! └── root ModuleContainer            settings, database
//!     └── LazyModuleLoader (parent = root)
//!         ├── report ModuleContainer  loaded on first report invocation
//!         └── export ModuleContainer  loaded on first export invocation
//! ```
//!
//! ## Components
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`graph`] | Per-container resolution with singleton memoization and cycle detection |
//! | [`container`] | Container lifecycle: instantiate, get, dispose |
//! | [`loader`] | On-demand container cache keyed by module id |
//! | [`bootstrap`] | Process-wide root container slot |
//! | [`dispatch`] | Reference invocation entry point wiring the above |
//!
//! ## Key Principles
//!
//! - **At most once**: singletons, container initialization, module loads and
//!   the bootstrap all go through [`Memo`], a shared memoized future
//! - **Explicit ownership**: the slot is a value handed to the dispatcher, never a global
//! - **Typed tokens**: `Token<T>` handles checked against registrations

pub mod bootstrap;
pub mod container;
pub mod descriptor;
pub mod dispatch;
pub mod factory;
pub mod graph;
pub mod loader;
pub mod memo;
pub mod modules;

pub use bootstrap::BootstrapSlot;
pub use container::ModuleContainer;
pub use descriptor::{
    Instance, ModuleDescriptor, ModuleDescriptorBuilder, Provider, ProviderRegistration,
    ResolvedDependencies,
};
pub use dispatch::{Invocation, InvocationDispatcher, InvocationOutcome};
pub use factory::{FnModuleFactory, ModuleFactory, module_factory};
pub use graph::DependencyGraph;
pub use loader::{LazyModuleLoader, LoadHandle};
pub use memo::{Memo, MemoPhase};
