//! Payment lifecycle
//!
//! A payment may only be created against a project the caller owns. After
//! that the link is informational: deleting the project leaves its payments
//! in place, and reads attach the project only while it still exists.

use crate::core::error::{EntityError, LedgerError};
use crate::core::{CallerIdentity, Entity, LedgerResult, ScopedRepository, Store};
use crate::entities::payment::PatchError;
use crate::entities::{NewPayment, Payment, PaymentPatch, PaymentView, Project, TransitionError};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct PaymentService {
    payments: Arc<dyn Store<Payment>>,
    projects: Arc<dyn Store<Project>>,
}

fn conflict(payment: &Payment, err: TransitionError) -> LedgerError {
    EntityError::StateConflict {
        entity_type: Payment::resource_name_singular().to_string(),
        id: payment.id,
        message: err.to_string(),
    }
    .into()
}

impl PaymentService {
    pub fn new(payments: Arc<dyn Store<Payment>>, projects: Arc<dyn Store<Project>>) -> Self {
        Self { payments, projects }
    }

    pub fn repository(&self, caller: &CallerIdentity) -> ScopedRepository<Payment> {
        ScopedRepository::new(self.payments.clone(), caller)
    }

    fn project_repository(&self, caller: &CallerIdentity) -> ScopedRepository<Project> {
        ScopedRepository::new(self.projects.clone(), caller)
    }

    /// Fails with `NotFound` for the project when it is absent or foreign
    pub async fn create(&self, caller: &CallerIdentity, new: NewPayment) -> LedgerResult<Payment> {
        let project = self.project_repository(caller).get(new.project_id).await?;

        let payment = Payment::new(caller.id(), project.id, new.amount, Utc::now());
        let payment = self.repository(caller).create(payment).await?;

        tracing::info!(caller = %caller.id(), payment = %payment.id, project = %project.id, "payment created");
        Ok(payment)
    }

    pub async fn list(&self, caller: &CallerIdentity) -> LedgerResult<Vec<PaymentView>> {
        let payments = self.repository(caller).list().await?;
        let projects: HashMap<Uuid, Project> = self
            .project_repository(caller)
            .list()
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        Ok(payments
            .into_iter()
            .map(|payment| PaymentView {
                project: projects.get(&payment.project_id).cloned(),
                payment,
            })
            .collect())
    }

    pub async fn get(&self, caller: &CallerIdentity, id: Uuid) -> LedgerResult<PaymentView> {
        let payment = self.repository(caller).get(id).await?;
        self.view(caller, payment).await
    }

    async fn view(&self, caller: &CallerIdentity, payment: Payment) -> LedgerResult<PaymentView> {
        let project = self
            .project_repository(caller)
            .find(payment.project_id)
            .await?;
        Ok(PaymentView { payment, project })
    }

    pub async fn update(
        &self,
        caller: &CallerIdentity,
        id: Uuid,
        patch: PaymentPatch,
    ) -> LedgerResult<Payment> {
        let repo = self.repository(caller);
        let mut payment = repo.get(id).await?;

        patch
            .apply(&mut payment, Utc::now())
            .map_err(|e| match e {
                PatchError::Invalid(v) => LedgerError::Validation(v),
                PatchError::Transition(t) => conflict(&payment, t),
            })?;

        repo.save(payment).await
    }

    pub async fn delete(&self, caller: &CallerIdentity, id: Uuid) -> LedgerResult<Payment> {
        let removed = self.repository(caller).delete(id).await?;
        tracing::info!(caller = %caller.id(), payment = %id, "payment removed");
        Ok(removed)
    }

    /// Pending → Paid. A second call fails with a conflict and leaves
    /// `paid_at` as it was.
    pub async fn mark_paid(&self, caller: &CallerIdentity, id: Uuid) -> LedgerResult<Payment> {
        let repo = self.repository(caller);
        let mut payment = repo.get(id).await?;

        if let Err(e) = payment.mark_paid(Utc::now()) {
            tracing::warn!(caller = %caller.id(), payment = %id, "payment already paid");
            return Err(conflict(&payment, e));
        }

        let payment = repo.save(payment).await?;
        tracing::info!(caller = %caller.id(), payment = %id, "payment marked as paid");
        Ok(payment)
    }
}
