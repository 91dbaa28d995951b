//! # lazyboot domain
//!
//! Core types shared by the bootstrap and lazy-load subsystem.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`error`] | Error taxonomy and `Result` alias |
//! | [`value_objects`] | Provider tokens, module ids, scopes and lifecycle states |
//! | [`constants`] | Domain-level constants |

pub mod constants;
pub mod error;
pub mod value_objects;

pub use error::{Error, Result};
pub use value_objects::*;
