//! Foundation types for sommand.
//!
//! This crate contains the host-agnostic types shared by the engine and its
//! front ends: the error enum, the identity abstraction used for permission
//! checks, completion suggestions, and the TOML configuration model.

pub mod config;
pub mod error;
pub mod identity;
pub mod suggestion;

pub use config::{EntityConfig, IdentityConfig, MessagesConfig, SommandConfig};
pub use error::{Result, SommandError};
pub use identity::{Identity, PermissionSet};
pub use suggestion::Suggestion;
