//! MongoDB storage backend using the official MongoDB async driver.
//!
//! # Feature flag
//!
//! This module is gated behind the `mongodb_backend` feature flag.
//!
//! # Storage model
//!
//! Each `MongoStore<T>` operates on a collection named after
//! `T::resource_name()` ("projects", "payments"). The record `id` is stored
//! as `_id`; every filter is `{ _id, owner_id }` or `{ owner_id }` so a
//! foreign record never matches.
//!
//! # Serialization strategy
//!
//! Records are serialized via `serde_json::Value` as an intermediate format,
//! then converted to BSON documents. UUIDs and timestamps are stored as
//! strings. RFC 3339 strings with variable fraction width do not sort
//! chronologically, so each document also carries `created_at_ns`, an
//! integer used only for ordering.

use crate::core::{Entity, OwnerScope, Store};
use anyhow::{Result, anyhow, bail};
use chrono::{DateTime, Utc};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{Bson, Document, doc};
use mongodb::{Client, Database};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

/// Convert a serde_json::Value (expected to be an Object) into a BSON Document,
/// renaming `id` → `_id`.
fn json_to_document(json: serde_json::Value) -> Result<Document> {
    let bson_val = mongodb::bson::to_bson(&json)
        .map_err(|e| anyhow!("Failed to convert JSON to BSON: {}", e))?;

    let mut doc = match bson_val {
        Bson::Document(d) => d,
        _ => return Err(anyhow!("Expected BSON document, got non-object")),
    };

    if let Some(id) = doc.remove("id") {
        doc.insert("_id", id);
    }

    Ok(doc)
}

/// Convert a BSON Document back into a serde_json::Value, renaming `_id` → `id`.
fn document_to_json(mut doc: Document) -> serde_json::Value {
    if let Some(id) = doc.remove("_id") {
        doc.insert("id", id);
    }

    Bson::Document(doc).into_relaxed_extjson()
}

/// Integer sort key written next to the record fields
const ORDER_KEY: &str = "created_at_ns";

fn order_key(created_at: DateTime<Utc>) -> i64 {
    created_at
        .timestamp_nanos_opt()
        .unwrap_or_else(|| created_at.timestamp_micros().saturating_mul(1000))
}

/// Oldest first, ties broken by id
fn list_order() -> Document {
    let mut sort = Document::new();
    sort.insert(ORDER_KEY, 1);
    sort.insert("_id", 1);
    sort
}

fn uuid_bson(id: &Uuid) -> Bson {
    Bson::String(id.to_string())
}

fn scope_filter(scope: &OwnerScope) -> Document {
    doc! { "owner_id": uuid_bson(&scope.owner_id()) }
}

fn record_filter(scope: &OwnerScope, id: &Uuid) -> Document {
    doc! { "_id": uuid_bson(id), "owner_id": uuid_bson(&scope.owner_id()) }
}

// ---------------------------------------------------------------------------
// Connection handle
// ---------------------------------------------------------------------------

/// Owns the driver client for the lifetime of the process
#[derive(Clone, Debug)]
pub struct MongoConnection {
    client: Client,
    database: Database,
}

impl MongoConnection {
    pub async fn connect(uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| anyhow!("Failed to connect to MongoDB: {}", e))?;
        let database = client.database(database);

        Ok(Self { client, database })
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Close pooled connections
    pub async fn shutdown(self) {
        self.client.shutdown().await;
    }
}

// ---------------------------------------------------------------------------
// MongoStore<T>
// ---------------------------------------------------------------------------

/// Owner-scoped store backed by one MongoDB collection
#[derive(Clone, Debug)]
pub struct MongoStore<T> {
    database: Database,
    _marker: std::marker::PhantomData<T>,
}

impl<T> MongoStore<T> {
    pub fn new(database: Database) -> Self {
        Self {
            database,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<T: Entity + Serialize + DeserializeOwned> MongoStore<T> {
    fn collection(&self) -> mongodb::Collection<Document> {
        self.database.collection(T::resource_name())
    }

    fn to_document(scope: &OwnerScope, record: &T) -> Result<Document> {
        if !scope.admits(record) {
            bail!(
                "{} {} is not owned by {}",
                T::resource_name_singular(),
                record.id(),
                scope.owner_id()
            );
        }
        let json = serde_json::to_value(record)
            .map_err(|e| anyhow!("Failed to serialize record: {}", e))?;
        let mut doc = json_to_document(json)?;
        doc.insert(ORDER_KEY, order_key(record.created_at()));
        Ok(doc)
    }

    fn from_document(mut doc: Document) -> Result<T> {
        doc.remove(ORDER_KEY);
        serde_json::from_value(document_to_json(doc))
            .map_err(|e| anyhow!("Failed to deserialize record from document: {}", e))
    }
}

#[async_trait]
impl<T: Entity + Serialize + DeserializeOwned> Store<T> for MongoStore<T> {
    fn backend_name(&self) -> &'static str {
        "mongodb"
    }

    async fn insert(&self, scope: &OwnerScope, record: T) -> Result<T> {
        let doc = Self::to_document(scope, &record)?;

        self.collection()
            .insert_one(doc)
            .await
            .map_err(|e| anyhow!("Failed to insert {}: {}", T::resource_name_singular(), e))?;

        Ok(record)
    }

    /// Unordered semantics are not used: the driver stops at the first
    /// failing document and earlier documents stay written.
    async fn insert_many(&self, scope: &OwnerScope, records: Vec<T>) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let docs = records
            .iter()
            .map(|r| Self::to_document(scope, r))
            .collect::<Result<Vec<_>>>()?;

        let result = self
            .collection()
            .insert_many(docs)
            .await
            .map_err(|e| anyhow!("Failed to insert {}: {}", T::resource_name(), e))?;

        Ok(result.inserted_ids.len())
    }

    async fn find_one(&self, scope: &OwnerScope, id: &Uuid) -> Result<Option<T>> {
        let doc = self
            .collection()
            .find_one(record_filter(scope, id))
            .await
            .map_err(|e| anyhow!("Failed to get {}: {}", T::resource_name_singular(), e))?;

        doc.map(Self::from_document).transpose()
    }

    async fn find_many(&self, scope: &OwnerScope) -> Result<Vec<T>> {
        let cursor = self
            .collection()
            .find(scope_filter(scope))
            .sort(list_order())
            .await
            .map_err(|e| anyhow!("Failed to list {}: {}", T::resource_name(), e))?;

        let docs: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|e| anyhow!("Failed to collect {}: {}", T::resource_name(), e))?;

        docs.into_iter().map(Self::from_document).collect()
    }

    async fn replace(&self, scope: &OwnerScope, record: T) -> Result<Option<T>> {
        let doc = Self::to_document(scope, &record)?;

        let result = self
            .collection()
            .replace_one(record_filter(scope, &record.id()), doc)
            .await
            .map_err(|e| anyhow!("Failed to update {}: {}", T::resource_name_singular(), e))?;

        if result.matched_count == 0 {
            return Ok(None);
        }

        Ok(Some(record))
    }

    async fn delete_one(&self, scope: &OwnerScope, id: &Uuid) -> Result<Option<T>> {
        let removed = self
            .collection()
            .find_one_and_delete(record_filter(scope, id))
            .await
            .map_err(|e| anyhow!("Failed to delete {}: {}", T::resource_name_singular(), e))?;

        removed.map(Self::from_document).transpose()
    }
}
