//! Storage implementations for different backends

pub mod in_memory;
#[cfg(feature = "mongodb_backend")]
pub mod mongodb;

pub use in_memory::InMemoryStore;
#[cfg(feature = "mongodb_backend")]
pub use mongodb::{MongoConnection, MongoStore};

use crate::config::{StorageBackend, StorageConfig};
use crate::core::Store;
use crate::entities::{Payment, Project};
use std::sync::Arc;

/// Store handles for every record type, opened once at startup
///
/// Services receive clones of the `Arc`s; [`Storage::close`] releases the
/// backend at shutdown.
#[derive(Clone)]
pub struct Storage {
    pub projects: Arc<dyn Store<Project>>,
    pub payments: Arc<dyn Store<Payment>>,
    #[cfg(feature = "mongodb_backend")]
    connection: Option<MongoConnection>,
}

impl Storage {
    pub fn in_memory() -> Self {
        Self::from_stores(
            Arc::new(InMemoryStore::<Project>::new()),
            Arc::new(InMemoryStore::<Payment>::new()),
        )
    }

    /// Wrap stores built elsewhere
    pub fn from_stores(
        projects: Arc<dyn Store<Project>>,
        payments: Arc<dyn Store<Payment>>,
    ) -> Self {
        Self {
            projects,
            payments,
            #[cfg(feature = "mongodb_backend")]
            connection: None,
        }
    }

    /// Open the backend selected in the configuration
    pub async fn open(config: &StorageConfig) -> anyhow::Result<Self> {
        match config.backend {
            StorageBackend::InMemory => {
                tracing::info!("using in-memory storage");
                Ok(Self::in_memory())
            }
            #[cfg(feature = "mongodb_backend")]
            StorageBackend::Mongodb => {
                let connection =
                    MongoConnection::connect(&config.mongodb_uri, &config.database).await?;
                tracing::info!(database = %config.database, "connected to MongoDB");

                Ok(Self {
                    projects: Arc::new(MongoStore::<Project>::new(
                        connection.database().clone(),
                    )),
                    payments: Arc::new(MongoStore::<Payment>::new(
                        connection.database().clone(),
                    )),
                    connection: Some(connection),
                })
            }
            #[cfg(not(feature = "mongodb_backend"))]
            StorageBackend::Mongodb => anyhow::bail!(
                "storage.backend is 'mongodb' but the crate was built without the mongodb_backend feature"
            ),
        }
    }

    pub async fn close(self) {
        #[cfg(feature = "mongodb_backend")]
        if let Some(connection) = self.connection {
            connection.shutdown().await;
            tracing::info!("MongoDB connection closed");
        }
    }
}
