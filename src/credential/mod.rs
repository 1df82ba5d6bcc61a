// ABOUTME: Credential module - the single authority for the external-service
// ABOUTME: access token used by authorization-requiring tools.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::CredentialError;

/// Holds the current external-service access token.
///
/// The token is produced by a browser-hosted identity flow and delivered
/// over the session transport as a sideband event. The broker is the only
/// synchronization point: concurrent tool invocations observe the most
/// recently delivered token, and a revoke is visible to every subsequent
/// read. Tools hold a broker handle and never cache the token themselves.
///
/// Exactly one credential is active at a time; `update` overwrites
/// unconditionally (last-write-wins, no merge).
#[derive(Default)]
pub struct CredentialBroker {
    token: Arc<RwLock<Option<String>>>,
}

impl CredentialBroker {
    /// Create a broker with no active credential.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a new token, replacing any prior one.
    pub async fn update(&self, token: impl Into<String>) {
        let mut guard = self.token.write().await;
        *guard = Some(token.into());
    }

    /// Clear the active credential. Safe to call when none is active.
    pub async fn revoke(&self) {
        let mut guard = self.token.write().await;
        *guard = None;
    }

    /// The current token, or `None` when no credential is active.
    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    /// The current token as a hard precondition.
    ///
    /// Authorized tools call this before any network I/O so an Absent
    /// credential becomes a structured failure instead of an empty-token
    /// request to the provider.
    pub async fn require(&self) -> Result<String, CredentialError> {
        self.token()
            .await
            .ok_or(CredentialError::NotAuthenticated)
    }

    /// Whether a credential is currently active.
    pub async fn is_active(&self) -> bool {
        self.token.read().await.is_some()
    }
}

impl Clone for CredentialBroker {
    fn clone(&self) -> Self {
        Self {
            token: Arc::clone(&self.token),
        }
    }
}
