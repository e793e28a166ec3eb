//! Typed error handling for project-ledger
//!
//! Every fallible service operation returns [`LedgerResult`]. Errors are
//! grouped by category so that handlers (and tests) can match on the exact
//! failure instead of inspecting strings.
//!
//! # Error Categories
//!
//! - [`EntityError`]: record lookups and state transitions
//! - [`ValidationError`]: malformed or missing input
//! - [`UploadError`]: CSV upload and import failures
//! - [`StorageError`]: store and filesystem faults
//! - [`RequestError`]: caller identity problems
//!
//! # Example
//!
//! ```rust,ignore
//! match service.get(&caller, id).await {
//!     Ok(project) => println!("Found: {}", project.title),
//!     Err(LedgerError::Entity(EntityError::NotFound { .. })) => println!("no such project"),
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// The main error type for project-ledger
#[derive(Debug)]
pub enum LedgerError {
    /// Record lookups and state transitions
    Entity(EntityError),

    /// Input validation errors
    Validation(ValidationError),

    /// CSV upload/import errors
    Upload(UploadError),

    /// Store and filesystem faults
    Storage(StorageError),

    /// Caller identity errors
    Request(RequestError),

    /// Internal errors (should not happen in normal operation)
    Internal(String),
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::Entity(e) => write!(f, "{}", e),
            LedgerError::Validation(e) => write!(f, "{}", e),
            LedgerError::Upload(e) => write!(f, "{}", e),
            LedgerError::Storage(e) => write!(f, "{}", e),
            LedgerError::Request(e) => write!(f, "{}", e),
            LedgerError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for LedgerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LedgerError::Entity(e) => Some(e),
            LedgerError::Validation(e) => Some(e),
            LedgerError::Upload(e) => Some(e),
            LedgerError::Storage(e) => Some(e),
            LedgerError::Request(e) => Some(e),
            LedgerError::Internal(_) => None,
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl LedgerError {
    /// Shorthand for a record that is absent or belongs to someone else
    pub fn not_found(entity_type: &str, id: Uuid) -> Self {
        LedgerError::Entity(EntityError::NotFound {
            entity_type: entity_type.to_string(),
            id,
        })
    }

    /// Wrap a backend failure
    pub fn storage(backend: &str, err: impl fmt::Display) -> Self {
        LedgerError::Storage(StorageError::Backend {
            backend: backend.to_string(),
            message: err.to_string(),
        })
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            LedgerError::Entity(e) => e.status_code(),
            LedgerError::Validation(_) => StatusCode::BAD_REQUEST,
            LedgerError::Upload(e) => e.status_code(),
            LedgerError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            LedgerError::Request(e) => e.status_code(),
            LedgerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            LedgerError::Entity(e) => e.error_code(),
            LedgerError::Validation(_) => "VALIDATION_ERROR",
            LedgerError::Upload(e) => e.error_code(),
            LedgerError::Storage(_) => "INTERNAL_ERROR",
            LedgerError::Request(e) => e.error_code(),
            LedgerError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    ///
    /// Storage faults are reported with a generic message; the real cause
    /// is only written to the log.
    pub fn to_response(&self) -> ErrorResponse {
        let message = match self {
            LedgerError::Storage(_) | LedgerError::Internal(_) => {
                "An error occurred while processing your request".to_string()
            }
            other => other.to_string(),
        };

        ErrorResponse {
            code: self.error_code().to_string(),
            message,
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            LedgerError::Entity(EntityError::NotFound { entity_type, id }) => {
                Some(serde_json::json!({
                    "entity_type": entity_type,
                    "id": id.to_string()
                }))
            }
            LedgerError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            LedgerError::Upload(UploadError::InvalidRows(rows)) => {
                Some(serde_json::json!({ "rows": rows }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for LedgerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        }
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Entity Errors
// =============================================================================

/// Errors related to record lookups and state transitions
#[derive(Debug)]
pub enum EntityError {
    /// Record is absent or not owned by the caller.
    ///
    /// The two cases answer identically.
    NotFound { entity_type: String, id: Uuid },

    /// The requested transition is not allowed from the current state
    StateConflict {
        entity_type: String,
        id: Uuid,
        message: String,
    },
}

impl fmt::Display for EntityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityError::NotFound { entity_type, .. } => {
                write!(f, "{} not found", capitalize(entity_type))
            }
            EntityError::StateConflict { message, .. } => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for EntityError {}

impl EntityError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            EntityError::NotFound { .. } => StatusCode::NOT_FOUND,
            // Reported as a client error, matching the public contract of /pay
            EntityError::StateConflict { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            EntityError::NotFound { .. } => "NOT_FOUND",
            EntityError::StateConflict { .. } => "CONFLICT",
        }
    }
}

impl From<EntityError> for LedgerError {
    fn from(err: EntityError) -> Self {
        LedgerError::Entity(err)
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to input validation
#[derive(Debug)]
pub enum ValidationError {
    /// One or more field-level problems
    FieldErrors(Vec<FieldValidationError>),

    /// Request body is not valid JSON for the expected shape
    InvalidJson { message: String },

    /// Path id is not a UUID
    InvalidUuid { value: String },
}

/// A single field validation error
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl FieldValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl ValidationError {
    /// Build a single-field error
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError::FieldErrors(vec![FieldValidationError::new(field, message)])
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::FieldErrors(errors) => {
                let msgs: Vec<String> = errors
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect();
                write!(f, "Validation errors: {}", msgs.join(", "))
            }
            ValidationError::InvalidJson { message } => write!(f, "Invalid JSON: {}", message),
            ValidationError::InvalidUuid { value } => write!(f, "Invalid id format: {}", value),
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for LedgerError {
    fn from(err: ValidationError) -> Self {
        LedgerError::Validation(err)
    }
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldValidationError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                // schema-level checks are reported under "__all__"
                let field = if field == "__all__" {
                    "record".to_string()
                } else {
                    field.to_string()
                };
                errs.iter().map(move |e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("failed '{}' check", e.code));
                    FieldValidationError::new(field.clone(), message)
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        ValidationError::FieldErrors(fields)
    }
}

impl From<validator::ValidationErrors> for LedgerError {
    fn from(errors: validator::ValidationErrors) -> Self {
        LedgerError::Validation(errors.into())
    }
}

// =============================================================================
// Upload Errors
// =============================================================================

/// Errors raised while accepting or importing a CSV upload
#[derive(Debug)]
pub enum UploadError {
    /// No file part in the request
    MissingFile,

    /// The uploaded part is not a CSV file
    UnsupportedType { content_type: String },

    /// The upload exceeds the configured size cap
    TooLarge { limit: usize },

    /// Multipart stream could not be read
    Multipart { message: String },

    /// The file could not be parsed as CSV
    Malformed { message: String },

    /// One or more rows failed per-row validation; nothing was inserted
    InvalidRows(Vec<RowError>),

    /// The batch insert failed
    InsertFailed { message: String },
}

/// Validation problem for a single CSV data row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowError {
    /// 1-based data row number (the header is row 0)
    pub row: usize,
    pub errors: Vec<FieldValidationError>,
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::MissingFile => write!(f, "Please upload a CSV file"),
            UploadError::UnsupportedType { content_type } => {
                write!(f, "Only CSV files are allowed (got '{}')", content_type)
            }
            UploadError::TooLarge { limit } => {
                write!(f, "Upload exceeds the {} byte limit", limit)
            }
            UploadError::Multipart { message } => write!(f, "Invalid upload: {}", message),
            UploadError::Malformed { message } => write!(f, "Error importing CSV: {}", message),
            UploadError::InvalidRows(rows) => {
                write!(f, "Error importing CSV: {} invalid row(s)", rows.len())
            }
            UploadError::InsertFailed { message } => {
                write!(f, "Error importing CSV: {}", message)
            }
        }
    }
}

impl std::error::Error for UploadError {}

impl UploadError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            UploadError::MissingFile => StatusCode::BAD_REQUEST,
            UploadError::UnsupportedType { .. } => StatusCode::BAD_REQUEST,
            UploadError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            UploadError::Multipart { .. } => StatusCode::BAD_REQUEST,
            UploadError::Malformed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            UploadError::InvalidRows(_) => StatusCode::BAD_REQUEST,
            UploadError::InsertFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            UploadError::MissingFile => "UPLOAD_MISSING_FILE",
            UploadError::UnsupportedType { .. } => "UPLOAD_UNSUPPORTED_TYPE",
            UploadError::TooLarge { .. } => "UPLOAD_TOO_LARGE",
            UploadError::Multipart { .. } => "UPLOAD_INVALID",
            UploadError::Malformed { .. } => "CSV_MALFORMED",
            UploadError::InvalidRows(_) => "CSV_INVALID_ROWS",
            UploadError::InsertFailed { .. } => "CSV_INSERT_FAILED",
        }
    }
}

impl From<UploadError> for LedgerError {
    fn from(err: UploadError) -> Self {
        LedgerError::Upload(err)
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Store and filesystem faults
#[derive(Debug)]
pub enum StorageError {
    /// The store backend reported a failure
    Backend { backend: String, message: String },

    /// Transient file I/O failed
    Filesystem { message: String },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Backend { backend, message } => {
                write!(f, "{} store error: {}", backend, message)
            }
            StorageError::Filesystem { message } => write!(f, "Filesystem error: {}", message),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<StorageError> for LedgerError {
    fn from(err: StorageError) -> Self {
        LedgerError::Storage(err)
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::Storage(StorageError::Filesystem {
            message: err.to_string(),
        })
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors related to the caller identity
#[derive(Debug)]
pub enum RequestError {
    /// Missing or rejected credential
    Unauthorized { message: String },
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::Unauthorized { message } => write!(f, "Unauthorized: {}", message),
        }
    }
}

impl std::error::Error for RequestError {}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::Unauthorized { .. } => "UNAUTHORIZED",
        }
    }
}

impl From<RequestError> for LedgerError {
    fn from(err: RequestError) -> Self {
        LedgerError::Request(err)
    }
}

impl From<crate::core::auth::AuthError> for LedgerError {
    fn from(err: crate::core::auth::AuthError) -> Self {
        LedgerError::Request(RequestError::Unauthorized {
            message: err.to_string(),
        })
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for project-ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
