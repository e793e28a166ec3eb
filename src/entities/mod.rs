//! Record types kept by the ledger

pub mod payment;
pub mod project;

pub use payment::{
    CreatePaymentRequest, NewPayment, Payment, PaymentPatch, PaymentStatus, PaymentView,
    TransitionError,
};
pub use project::{CreateProjectRequest, NewProject, Project, ProjectPatch, ProjectStatus};
