//! Per-entity lifecycle rules on top of the scoped repositories

pub mod payment_service;
pub mod project_service;

pub use payment_service::PaymentService;
pub use project_service::ProjectService;
