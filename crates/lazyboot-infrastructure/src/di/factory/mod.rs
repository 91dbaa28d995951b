//! Module Factories
//!
//! The contract between application code and the loader: a factory names the
//! module it produces and creates its descriptor on demand.

pub mod traits;

pub use traits::{FnModuleFactory, ModuleFactory, module_factory};
