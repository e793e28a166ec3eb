//! Application state shared across handlers

use crate::core::AuthProvider;
use crate::interchange::CsvInterchange;
use crate::services::{PaymentService, ProjectService};
use crate::storage::Storage;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub projects: ProjectService,
    pub payments: PaymentService,
    pub interchange: CsvInterchange,
    pub auth: Arc<dyn AuthProvider>,
    /// Upper bound for an uploaded CSV file, in bytes
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Wire services onto the opened store handles
    pub fn new(
        storage: &Storage,
        auth: Arc<dyn AuthProvider>,
        transient_dir: impl Into<std::path::PathBuf>,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            projects: ProjectService::new(storage.projects.clone()),
            payments: PaymentService::new(storage.payments.clone(), storage.projects.clone()),
            interchange: CsvInterchange::new(storage.projects.clone(), transient_dir),
            auth,
            max_upload_bytes,
        }
    }
}
