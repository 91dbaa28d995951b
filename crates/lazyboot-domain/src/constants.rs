//! Domain layer constants
//!
//! Infrastructure-specific constants remain in `lazyboot_infrastructure::constants`.

/// Module id used for the root application container
pub const ROOT_MODULE_ID: &str = "root";

/// Separator used when rendering resolution and import chains
pub const CHAIN_SEPARATOR: &str = " -> ";
