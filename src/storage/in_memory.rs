//! In-memory implementation of Store for testing and development

use crate::core::{Entity, OwnerScope, Store};
use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// In-memory store implementation
///
/// Useful for testing and development. Uses RwLock for thread-safe access;
/// a batch insert happens under a single write lock, so it is all-or-nothing.
#[derive(Clone)]
pub struct InMemoryStore<T: Entity> {
    records: Arc<RwLock<HashMap<Uuid, T>>>,
}

impl<T: Entity> InMemoryStore<T> {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of records across all owners
    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Entity> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn check_owner<T: Entity>(scope: &OwnerScope, record: &T) -> Result<()> {
    if !scope.admits(record) {
        bail!(
            "{} {} is not owned by {}",
            T::resource_name_singular(),
            record.id(),
            scope.owner_id()
        );
    }
    Ok(())
}

#[async_trait]
impl<T: Entity> Store<T> for InMemoryStore<T> {
    fn backend_name(&self) -> &'static str {
        "in-memory"
    }

    async fn insert(&self, scope: &OwnerScope, record: T) -> Result<T> {
        check_owner(scope, &record)?;

        let mut records = self
            .records
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        if records.contains_key(&record.id()) {
            bail!("Duplicate id {}", record.id());
        }
        records.insert(record.id(), record.clone());

        Ok(record)
    }

    async fn insert_many(&self, scope: &OwnerScope, batch: Vec<T>) -> Result<usize> {
        for record in &batch {
            check_owner(scope, record)?;
        }

        let mut records = self
            .records
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        if let Some(dup) = batch.iter().find(|r| records.contains_key(&r.id())) {
            bail!("Duplicate id {}", dup.id());
        }

        let count = batch.len();
        records.extend(batch.into_iter().map(|r| (r.id(), r)));

        Ok(count)
    }

    async fn find_one(&self, scope: &OwnerScope, id: &Uuid) -> Result<Option<T>> {
        let records = self
            .records
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(records.get(id).filter(|r| scope.admits(*r)).cloned())
    }

    async fn find_many(&self, scope: &OwnerScope) -> Result<Vec<T>> {
        let records = self
            .records
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let mut owned: Vec<T> = records
            .values()
            .filter(|r| scope.admits(*r))
            .cloned()
            .collect();
        owned.sort_by_key(|r| (r.created_at(), r.id()));

        Ok(owned)
    }

    async fn replace(&self, scope: &OwnerScope, record: T) -> Result<Option<T>> {
        check_owner(scope, &record)?;

        let mut records = self
            .records
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        match records.get_mut(&record.id()) {
            Some(existing) if scope.admits(existing) => {
                *existing = record.clone();
                Ok(Some(record))
            }
            _ => Ok(None),
        }
    }

    async fn delete_one(&self, scope: &OwnerScope, id: &Uuid) -> Result<Option<T>> {
        let mut records = self
            .records
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        if !records.get(id).is_some_and(|r| scope.admits(r)) {
            return Ok(None);
        }

        Ok(records.remove(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::test_support::Note;

    #[tokio::test]
    async fn test_scans_are_owner_filtered() {
        let store = InMemoryStore::<Note>::new();
        let alice = OwnerScope::new(Uuid::new_v4());
        let bob = OwnerScope::new(Uuid::new_v4());

        store
            .insert(&alice, Note::new(alice.owner_id(), "a1"))
            .await
            .unwrap();
        store
            .insert(&alice, Note::new(alice.owner_id(), "a2"))
            .await
            .unwrap();
        store
            .insert(&bob, Note::new(bob.owner_id(), "b1"))
            .await
            .unwrap();

        assert_eq!(store.find_many(&alice).await.unwrap().len(), 2);
        assert_eq!(store.find_many(&bob).await.unwrap().len(), 1);
        assert_eq!(store.len(), 3);
    }

    #[tokio::test]
    async fn test_foreign_replace_and_delete_match_nothing() {
        let store = InMemoryStore::<Note>::new();
        let alice = OwnerScope::new(Uuid::new_v4());
        let bob = OwnerScope::new(Uuid::new_v4());

        let note = store
            .insert(&alice, Note::new(alice.owner_id(), "mine"))
            .await
            .unwrap();

        assert!(store.find_one(&bob, &note.id).await.unwrap().is_none());
        assert!(store.delete_one(&bob, &note.id).await.unwrap().is_none());

        let mut hijacked = note.clone();
        hijacked.owner_id = bob.owner_id();
        hijacked.body = "theirs".to_string();
        assert!(store.replace(&bob, hijacked).await.unwrap().is_none());

        let stored = store.find_one(&alice, &note.id).await.unwrap().unwrap();
        assert_eq!(stored.body, "mine");
    }

    #[tokio::test]
    async fn test_insert_many_is_all_or_nothing() {
        let store = InMemoryStore::<Note>::new();
        let scope = OwnerScope::new(Uuid::new_v4());

        let batch = vec![
            Note::new(scope.owner_id(), "one"),
            Note::new(Uuid::new_v4(), "foreign"),
        ];
        assert!(store.insert_many(&scope, batch).await.is_err());
        assert!(store.is_empty());

        let batch = vec![
            Note::new(scope.owner_id(), "one"),
            Note::new(scope.owner_id(), "two"),
        ];
        assert_eq!(store.insert_many(&scope, batch).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_delete_returns_removed_record() {
        let store = InMemoryStore::<Note>::new();
        let scope = OwnerScope::new(Uuid::new_v4());
        let note = store
            .insert(&scope, Note::new(scope.owner_id(), "bye"))
            .await
            .unwrap();

        let removed = store.delete_one(&scope, &note.id).await.unwrap();
        assert_eq!(removed, Some(note.clone()));
        assert!(store.find_one(&scope, &note.id).await.unwrap().is_none());
    }
}
