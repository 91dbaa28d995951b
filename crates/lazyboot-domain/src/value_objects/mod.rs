//! Domain Value Objects
//!
//! | Value Object | Description |
//! |--------------|-------------|
//! | [`ProviderToken`] | Type-erased name of a requestable capability |
//! | [`Token`] | Typed, `const`-constructible handle for a provider |
//! | [`ModuleId`] | Identity of a module descriptor |
//! | [`Scope`] | Singleton or transient provider lifetime |
//! | [`ContainerStatus`] | Lifecycle state of a module container |
//! | [`BootstrapState`] | Lifecycle state of the process-wide bootstrap slot |

/// Lifecycle states
pub mod lifecycle;
/// Module identity
pub mod module;
/// Provider tokens
pub mod token;

pub use lifecycle::{BootstrapState, ContainerStatus, Scope};
pub use module::ModuleId;
pub use token::{ProviderToken, Token};
