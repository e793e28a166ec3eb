//! ServerBuilder for fluent API to build HTTP servers

use super::router::build_router;
use super::state::AppState;
use crate::config::{AppConfig, AuthConfig, InterchangeConfig};
use crate::core::{AuthProvider, JwtAuthProvider, StaticTokenProvider};
use crate::storage::Storage;
use anyhow::{Result, anyhow};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builder for the ledger HTTP server
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_storage(Storage::in_memory())
///     .with_auth_provider(StaticTokenProvider::new().with_token("dev", user_id))
///     .build()?;
/// ```
pub struct ServerBuilder {
    storage: Option<Storage>,
    auth: Option<Arc<dyn AuthProvider>>,
    interchange: InterchangeConfig,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        Self {
            storage: None,
            auth: None,
            interchange: InterchangeConfig::default(),
        }
    }

    /// Builder preconfigured from application config and an opened store
    pub fn from_config(config: &AppConfig, storage: Storage) -> Result<Self> {
        Ok(Self::new()
            .with_storage(storage)
            .with_shared_auth_provider(auth_provider_from_config(&config.auth)?)
            .with_interchange_config(config.interchange.clone()))
    }

    /// Set the store handles (required)
    pub fn with_storage(mut self, storage: Storage) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Set the identity provider (required)
    pub fn with_auth_provider(mut self, provider: impl AuthProvider + 'static) -> Self {
        self.auth = Some(Arc::new(provider));
        self
    }

    pub fn with_shared_auth_provider(mut self, provider: Arc<dyn AuthProvider>) -> Self {
        self.auth = Some(provider);
        self
    }

    /// Transient directory and upload cap for CSV interchange
    pub fn with_interchange_config(mut self, config: InterchangeConfig) -> Self {
        self.interchange = config;
        self
    }

    /// Assemble the shared handler state
    pub fn build_state(self) -> Result<AppState> {
        let storage = self
            .storage
            .ok_or_else(|| anyhow!("Storage is required. Call .with_storage()"))?;
        let auth = self
            .auth
            .ok_or_else(|| anyhow!("Auth provider is required. Call .with_auth_provider()"))?;

        Ok(AppState::new(
            &storage,
            auth,
            self.interchange.transient_dir,
            self.interchange.max_upload_bytes,
        ))
    }

    /// Build the final router
    pub fn build(self) -> Result<Router> {
        Ok(build_router(self.build_state()?))
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to the provided address
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Pick the identity provider: JWT when a secret is set, else static tokens
pub fn auth_provider_from_config(config: &AuthConfig) -> Result<Arc<dyn AuthProvider>> {
    if let Some(secret) = config.jwt_secret.as_deref().filter(|s| !s.is_empty()) {
        tracing::info!("bearer tokens validated as HS256 JWTs");
        return Ok(Arc::new(JwtAuthProvider::new(secret)));
    }

    let tokens: StaticTokenProvider = config
        .static_tokens
        .iter()
        .map(|(token, id)| (token.clone(), *id))
        .collect();
    if tokens.is_empty() {
        return Err(anyhow!(
            "No identity provider configured: set auth.jwt_secret or auth.static_tokens"
        ));
    }

    tracing::warn!(count = config.static_tokens.len(), "using static bearer tokens");
    Ok(Arc::new(tokens))
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_build_requires_storage_and_auth() {
        assert!(ServerBuilder::new().build().is_err());
        assert!(
            ServerBuilder::new()
                .with_storage(Storage::in_memory())
                .build()
                .is_err()
        );
        assert!(
            ServerBuilder::new()
                .with_storage(Storage::in_memory())
                .with_auth_provider(StaticTokenProvider::new().with_token("t", Uuid::new_v4()))
                .build()
                .is_ok()
        );
    }

    #[test]
    fn test_auth_provider_selection() {
        let mut config = AuthConfig::default();
        assert!(auth_provider_from_config(&config).is_err());

        config.static_tokens.insert("dev".to_string(), Uuid::new_v4());
        assert!(auth_provider_from_config(&config).is_ok());

        config.jwt_secret = Some("secret".to_string());
        assert!(auth_provider_from_config(&config).is_ok());
    }
}
