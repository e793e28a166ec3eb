//! Owner-scoped store contract
//!
//! Every [`Store`] method takes an [`OwnerScope`]; there is no way to read,
//! replace or delete a record by id alone. A record owned by another caller
//! is treated exactly like a missing one.
//!
//! Services never hold a store directly. They open a [`ScopedRepository`]
//! bound to the caller once per operation and go through it.

use crate::core::auth::CallerIdentity;
use crate::core::entity::Entity;
use crate::core::error::{LedgerError, LedgerResult};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Ownership filter applied to every store access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerScope {
    owner_id: Uuid,
}

impl OwnerScope {
    pub fn new(owner_id: Uuid) -> Self {
        Self { owner_id }
    }

    pub fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    /// Whether the record falls inside this scope
    pub fn admits<T: Entity>(&self, record: &T) -> bool {
        record.owner_id() == self.owner_id
    }
}

impl From<&CallerIdentity> for OwnerScope {
    fn from(caller: &CallerIdentity) -> Self {
        OwnerScope::new(caller.id())
    }
}

/// Persistence backend for one record type
///
/// Implementations must apply the scope as part of the lookup itself
/// (a single filter on id and owner), never as a post-check in the caller.
/// `insert` and `insert_many` reject records whose owner differs from the
/// scope.
#[async_trait]
pub trait Store<T: Entity>: Send + Sync {
    /// Short backend name used in logs and errors
    fn backend_name(&self) -> &'static str;

    /// Persist a new record
    async fn insert(&self, scope: &OwnerScope, record: T) -> Result<T>;

    /// Persist several records in one batch, returning how many were written
    async fn insert_many(&self, scope: &OwnerScope, records: Vec<T>) -> Result<usize>;

    /// Fetch the record with this id inside the scope
    async fn find_one(&self, scope: &OwnerScope, id: &Uuid) -> Result<Option<T>>;

    /// Fetch every record inside the scope
    async fn find_many(&self, scope: &OwnerScope) -> Result<Vec<T>>;

    /// Overwrite an existing record; `None` when no record matched
    async fn replace(&self, scope: &OwnerScope, record: T) -> Result<Option<T>>;

    /// Remove the record with this id; `None` when no record matched
    async fn delete_one(&self, scope: &OwnerScope, id: &Uuid) -> Result<Option<T>>;
}

/// A store handle bound to one caller
///
/// Converts `None` results into `NotFound` and backend failures into
/// storage errors, so service code only deals with [`LedgerError`].
pub struct ScopedRepository<T: Entity> {
    store: Arc<dyn Store<T>>,
    scope: OwnerScope,
}

impl<T: Entity> ScopedRepository<T> {
    pub fn new(store: Arc<dyn Store<T>>, caller: &CallerIdentity) -> Self {
        Self {
            store,
            scope: OwnerScope::from(caller),
        }
    }

    fn backend_error(&self, err: anyhow::Error) -> LedgerError {
        LedgerError::storage(self.store.backend_name(), err)
    }

    pub async fn create(&self, record: T) -> LedgerResult<T> {
        self.store
            .insert(&self.scope, record)
            .await
            .map_err(|e| self.backend_error(e))
    }

    pub async fn create_many(&self, records: Vec<T>) -> LedgerResult<usize> {
        self.store
            .insert_many(&self.scope, records)
            .await
            .map_err(|e| self.backend_error(e))
    }

    /// Fetch a record, `NotFound` if it is absent or foreign
    pub async fn get(&self, id: Uuid) -> LedgerResult<T> {
        self.find(id)
            .await?
            .ok_or_else(|| LedgerError::not_found(T::resource_name_singular(), id))
    }

    /// Fetch a record without turning absence into an error
    pub async fn find(&self, id: Uuid) -> LedgerResult<Option<T>> {
        self.store
            .find_one(&self.scope, &id)
            .await
            .map_err(|e| self.backend_error(e))
    }

    pub async fn list(&self) -> LedgerResult<Vec<T>> {
        self.store
            .find_many(&self.scope)
            .await
            .map_err(|e| self.backend_error(e))
    }

    /// Write back a modified record, refreshing `updated_at`
    pub async fn save(&self, mut record: T) -> LedgerResult<T> {
        let id = record.id();
        record.touch(Utc::now());
        self.store
            .replace(&self.scope, record)
            .await
            .map_err(|e| self.backend_error(e))?
            .ok_or_else(|| LedgerError::not_found(T::resource_name_singular(), id))
    }

    pub async fn delete(&self, id: Uuid) -> LedgerResult<T> {
        self.store
            .delete_one(&self.scope, &id)
            .await
            .map_err(|e| self.backend_error(e))?
            .ok_or_else(|| LedgerError::not_found(T::resource_name_singular(), id))
    }
}

impl<T: Entity> Clone for ScopedRepository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            scope: self.scope,
        }
    }
}
