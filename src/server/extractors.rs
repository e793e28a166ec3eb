//! Request extractors: caller identity, validated JSON bodies, record ids

use crate::core::auth::bearer_token;
use crate::core::error::{LedgerError, ValidationError};
use crate::core::CallerIdentity;
use crate::server::state::AppState;
use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use uuid::Uuid;
use validator::Validate;

/// Authenticated caller resolved from `Authorization: Bearer <token>`
///
/// ```ignore
/// async fn my_handler(Caller(caller): Caller) -> LedgerResult<Json<()>> {
///     tracing::info!(caller = %caller.id(), "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub CallerIdentity);

impl FromRequestParts<AppState> for Caller {
    type Rejection = LedgerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        let resolved = match bearer_token(header) {
            Ok(token) => state.auth.resolve_caller(token).await,
            Err(e) => Err(e),
        };

        match resolved {
            Ok(caller) => Ok(Caller(caller)),
            Err(e) => {
                tracing::warn!(
                    method = %parts.method,
                    path = %parts.uri.path(),
                    reason = %e,
                    "rejected credential"
                );
                Err(e.into())
            }
        }
    }
}

/// JSON body that has passed its `validator` rules
///
/// ```ignore
/// pub async fn create_payment(
///     ValidatedJson(body): ValidatedJson<CreatePaymentRequest>,
/// ) -> LedgerResult<Json<Payment>> {
///     // body is already validated
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = LedgerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            LedgerError::Validation(ValidationError::InvalidJson {
                message: e.body_text(),
            })
        })?;

        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

/// JSON body without extra validation, rejected as a validation error
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = LedgerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            LedgerError::Validation(ValidationError::InvalidJson {
                message: e.body_text(),
            })
        })?;
        Ok(JsonBody(value))
    }
}

/// `{id}` path segment parsed as a UUID
#[derive(Debug, Clone, Copy)]
pub struct RecordId(pub Uuid);

impl<S> FromRequestParts<S> for RecordId
where
    S: Send + Sync,
{
    type Rejection = LedgerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| LedgerError::Internal(e.body_text()))?;

        Uuid::parse_str(&raw)
            .map(RecordId)
            .map_err(|_| ValidationError::InvalidUuid { value: raw }.into())
    }
}
