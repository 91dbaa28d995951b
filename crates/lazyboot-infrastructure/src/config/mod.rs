//! Configuration
//!
//! Layered with figment: built-in defaults, then a TOML file, then
//! `LAZYBOOT_` environment variables.

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::*;
