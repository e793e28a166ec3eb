//! Core module containing the traits and types every other layer builds on

pub mod auth;
pub mod dates;
pub mod entity;
pub mod error;
pub mod patch;
pub mod store;

pub use auth::{AuthError, AuthProvider, CallerIdentity, JwtAuthProvider, StaticTokenProvider};
pub use entity::Entity;
pub use error::{LedgerError, LedgerResult};
pub use patch::Patch;
pub use store::{OwnerScope, ScopedRepository, Store};
