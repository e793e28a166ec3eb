//! Payment records and the Pending → Paid state machine

use crate::core::error::{FieldValidationError, ValidationError};
use crate::core::{Entity, Patch};
use crate::entities::Project;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Pending => f.write_str("Pending"),
            PaymentStatus::Paid => f.write_str("Paid"),
        }
    }
}

/// Rejected status change
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Payment already marked as paid")]
    AlreadyPaid,
    #[error("A paid payment cannot return to Pending")]
    Reversal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub project_id: Uuid,
    pub amount: f64,
    pub status: PaymentStatus,
    pub paid_at: Option<DateTime<Utc>>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(owner_id: Uuid, project_id: Uuid, amount: f64, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_id,
            amount,
            status: PaymentStatus::Pending,
            paid_at: None,
            owner_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Pending → Paid, stamping `paid_at`. Fails if already paid.
    pub fn mark_paid(&mut self, now: DateTime<Utc>) -> Result<(), TransitionError> {
        match self.status {
            PaymentStatus::Paid => Err(TransitionError::AlreadyPaid),
            PaymentStatus::Pending => {
                self.status = PaymentStatus::Paid;
                self.paid_at = Some(now);
                Ok(())
            }
        }
    }

    /// Move to `target` through a general update.
    ///
    /// Paid → Paid is a no-op here, unlike [`Payment::mark_paid`].
    pub fn transition_to(
        &mut self,
        target: PaymentStatus,
        now: DateTime<Utc>,
    ) -> Result<(), TransitionError> {
        match (self.status, target) {
            (PaymentStatus::Pending, PaymentStatus::Paid) => self.mark_paid(now),
            (PaymentStatus::Paid, PaymentStatus::Pending) => Err(TransitionError::Reversal),
            _ => Ok(()),
        }
    }
}

impl Entity for Payment {
    fn resource_name() -> &'static str {
        "payments"
    }

    fn resource_name_singular() -> &'static str {
        "payment"
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// Body of `POST /api/payments`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreatePaymentRequest {
    #[serde(alias = "projectId")]
    #[validate(required(message = "Please provide a project id"))]
    pub project_id: Option<Uuid>,
    #[validate(required(message = "Please add an amount"))]
    pub amount: Option<f64>,
}

/// Validated input for a new payment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewPayment {
    pub project_id: Uuid,
    pub amount: f64,
}

impl TryFrom<CreatePaymentRequest> for NewPayment {
    type Error = ValidationError;

    fn try_from(req: CreatePaymentRequest) -> Result<Self, Self::Error> {
        req.validate()?;
        match (req.project_id, req.amount) {
            (Some(project_id), Some(amount)) if amount.is_finite() => {
                Ok(NewPayment { project_id, amount })
            }
            _ => Err(ValidationError::field(
                "amount",
                "Amount must be a finite number",
            )),
        }
    }
}

/// Body of `PUT /api/payments/{id}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentPatch {
    #[serde(default)]
    pub amount: Patch<f64>,
    #[serde(default)]
    pub status: Patch<PaymentStatus>,
}

/// Outcome of applying a [`PaymentPatch`]
#[derive(Debug)]
pub enum PatchError {
    Invalid(ValidationError),
    Transition(TransitionError),
}

impl PaymentPatch {
    /// Apply onto a fetched record. Nothing is modified when an error is returned.
    pub fn apply(self, payment: &mut Payment, now: DateTime<Utc>) -> Result<(), PatchError> {
        let mut errors = Vec::new();
        let mut next = payment.clone();

        match self.amount {
            Patch::Missing => {}
            Patch::Value(amount) if amount.is_finite() => next.amount = amount,
            Patch::Value(_) => errors.push(FieldValidationError::new(
                "amount",
                "Amount must be a finite number",
            )),
            Patch::Null => {
                errors.push(FieldValidationError::new("amount", "Please add an amount"))
            }
        }

        let target = match self.status {
            Patch::Missing => None,
            Patch::Value(status) => Some(status),
            Patch::Null => {
                errors.push(FieldValidationError::new("status", "Status cannot be null"));
                None
            }
        };

        if !errors.is_empty() {
            return Err(PatchError::Invalid(ValidationError::FieldErrors(errors)));
        }

        if let Some(target) = target {
            next.transition_to(target, now)
                .map_err(PatchError::Transition)?;
        }

        *payment = next;
        Ok(())
    }
}

/// A payment as returned to clients, with its project attached when the
/// project still exists
#[derive(Debug, Clone, Serialize)]
pub struct PaymentView {
    #[serde(flatten)]
    pub payment: Payment,
    pub project: Option<Project>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn pending() -> Payment {
        Payment::new(Uuid::new_v4(), Uuid::new_v4(), 250.0, Utc::now())
    }

    #[test]
    fn test_mark_paid_sets_paid_at_once() {
        let mut payment = pending();
        let first = Utc::now();
        payment.mark_paid(first).unwrap();
        assert_eq!(payment.status, PaymentStatus::Paid);
        assert_eq!(payment.paid_at, Some(first));

        let later = first + Duration::minutes(5);
        assert_eq!(payment.mark_paid(later), Err(TransitionError::AlreadyPaid));
        assert_eq!(payment.paid_at, Some(first));
    }

    #[test]
    fn test_transition_rules() {
        let mut payment = pending();
        let now = Utc::now();
        payment.transition_to(PaymentStatus::Pending, now).unwrap();
        assert!(payment.paid_at.is_none());

        payment.transition_to(PaymentStatus::Paid, now).unwrap();
        assert_eq!(payment.paid_at, Some(now));

        // no-op, keeps the original stamp
        payment
            .transition_to(PaymentStatus::Paid, now + Duration::hours(1))
            .unwrap();
        assert_eq!(payment.paid_at, Some(now));

        assert_eq!(
            payment.transition_to(PaymentStatus::Pending, now),
            Err(TransitionError::Reversal)
        );
    }

    #[test]
    fn test_patch_amount_zero_is_applied() {
        let mut payment = pending();
        let patch: PaymentPatch =
            serde_json::from_value(serde_json::json!({ "amount": 0 })).unwrap();
        patch.apply(&mut payment, Utc::now()).unwrap();
        assert_eq!(payment.amount, 0.0);
        assert_eq!(payment.status, PaymentStatus::Pending);
    }

    #[test]
    fn test_patch_reversal_leaves_record_untouched() {
        let mut payment = pending();
        payment.mark_paid(Utc::now()).unwrap();
        let before = payment.clone();

        let patch: PaymentPatch = serde_json::from_value(serde_json::json!({
            "amount": 10,
            "status": "Pending"
        }))
        .unwrap();

        assert!(matches!(
            patch.apply(&mut payment, Utc::now()),
            Err(PatchError::Transition(TransitionError::Reversal))
        ));
        assert_eq!(payment, before);
    }

    #[test]
    fn test_create_request_accepts_camel_case_project_id() {
        let project_id = Uuid::new_v4();
        let req: CreatePaymentRequest = serde_json::from_value(serde_json::json!({
            "projectId": project_id,
            "amount": 99.5
        }))
        .unwrap();
        let new = NewPayment::try_from(req).unwrap();
        assert_eq!(new.project_id, project_id);
        assert_eq!(new.amount, 99.5);
    }

    #[test]
    fn test_create_request_requires_amount() {
        let req: CreatePaymentRequest = serde_json::from_value(serde_json::json!({
            "project_id": Uuid::new_v4()
        }))
        .unwrap();
        assert!(NewPayment::try_from(req).is_err());
    }

    #[test]
    fn test_view_flattens_payment() {
        let payment = pending();
        let view = PaymentView {
            payment: payment.clone(),
            project: None,
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["id"], payment.id.to_string());
        assert_eq!(json["status"], "Pending");
        assert!(json["project"].is_null());
    }

    #[test]
    fn test_transition_error_is_a_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(TransitionError::AlreadyPaid);
        assert_eq!(err.to_string(), "Payment already marked as paid");
        assert_eq!(
            TransitionError::Reversal.to_string(),
            "A paid payment cannot return to Pending"
        );
    }
}
