//! Entity trait shared by every owned record type

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Base trait for all records kept by the ledger.
///
/// Every record has:
/// - id: Unique identifier
/// - owner_id: The caller that created it, fixed for its lifetime
/// - created_at / updated_at: Maintained by the service layer
///
/// Stores key every read and write on `owner_id`; see
/// [`Store`](crate::core::store::Store).
pub trait Entity: Clone + Send + Sync + 'static {
    /// The plural resource name, also used as the collection name ("projects")
    fn resource_name() -> &'static str;

    /// The singular resource name used in messages ("project")
    fn resource_name_singular() -> &'static str;

    /// Get the unique identifier for this record
    fn id(&self) -> Uuid;

    /// Get the owning caller's id
    fn owner_id(&self) -> Uuid;

    /// Get the creation timestamp
    fn created_at(&self) -> DateTime<Utc>;

    /// Get the last update timestamp
    fn updated_at(&self) -> DateTime<Utc>;

    /// Bump `updated_at` to the given instant
    fn touch(&mut self, now: DateTime<Utc>);
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use serde::{Deserialize, Serialize};

    /// Minimal record used by store tests
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Note {
        pub id: Uuid,
        pub owner_id: Uuid,
        pub body: String,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    impl Note {
        pub fn new(owner_id: Uuid, body: &str) -> Self {
            let now = Utc::now();
            Self {
                id: Uuid::new_v4(),
                owner_id,
                body: body.to_string(),
                created_at: now,
                updated_at: now,
            }
        }
    }

    impl Entity for Note {
        fn resource_name() -> &'static str {
            "notes"
        }

        fn resource_name_singular() -> &'static str {
            "note"
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
}
