//! Configuration types module

pub mod app;
pub mod bootstrap;
pub mod data;
pub mod logging;

// Re-export main types
pub use app::*;
