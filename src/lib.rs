//! # project-ledger
//!
//! A multi-tenant project and payment tracker exposed as a REST API.
//!
//! ## Features
//!
//! - **Owner-scoped storage**: every store call carries an [`OwnerScope`](core::OwnerScope);
//!   records of other callers are indistinguishable from missing ones
//! - **Partial updates**: [`Patch<T>`](core::Patch) keeps "absent" and "null" apart
//! - **CSV interchange**: export all projects as an attachment, bulk import from an upload
//! - **Payment state machine**: Pending → Paid, stamped once
//! - **Pluggable backends**: in-memory by default, MongoDB behind `mongodb_backend`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ledger::prelude::*;
//!
//! let app = ServerBuilder::new()
//!     .with_storage(Storage::in_memory())
//!     .with_auth_provider(JwtAuthProvider::new("secret"))
//!     .build()?;
//! ```

pub mod config;
pub mod core;
pub mod entities;
pub mod interchange;
pub mod server;
pub mod services;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    pub use crate::config::AppConfig;
    pub use crate::core::{
        AuthError, AuthProvider, CallerIdentity, Entity, JwtAuthProvider, LedgerError,
        LedgerResult, OwnerScope, Patch, ScopedRepository, StaticTokenProvider, Store,
    };
    pub use crate::entities::{
        NewPayment, NewProject, Payment, PaymentStatus, PaymentView, Project, ProjectStatus,
    };
    pub use crate::interchange::{CsvInterchange, ImportSummary};
    pub use crate::server::{AppState, ServerBuilder};
    pub use crate::services::{PaymentService, ProjectService};
    pub use crate::storage::{InMemoryStore, Storage};
}
