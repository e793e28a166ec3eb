//! HTTP surface: state, extractors, handlers and the server builder

pub mod builder;
pub mod extractors;
pub mod handlers;
pub mod router;
pub mod state;

pub use builder::{ServerBuilder, auth_provider_from_config};
pub use extractors::{Caller, RecordId, ValidatedJson};
pub use router::build_router;
pub use state::AppState;
