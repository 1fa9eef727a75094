//! Persona directory — the gateway's view of merchant-configured personas
//!
//! Persona storage and usage accounting live outside this crate (a relational
//! store in production). The gateway only needs two questions answered per
//! token, so the collaborator is a small trait with an in-memory
//! implementation used by the default binary and the tests.

use crate::config::PersonaEntry;
use crate::protocol::WidgetConfig;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// External collaborator supplying per-persona state.
#[async_trait]
pub trait PersonaDirectory: Send + Sync {
    /// Widget config for a token. Unknown tokens yield the default config:
    /// the load contract documents every field as optional-with-default, and
    /// a visitor-facing widget must never break on backend state.
    async fn widget_config(&self, token: &str) -> WidgetConfig;

    /// Precomputed usage-limit flag for a token. The computation is owned by
    /// an external collaborator; this crate only reads the boolean.
    async fn limit_reached(&self, token: &str) -> bool;
}

#[derive(Debug, Clone)]
struct PersonaRecord {
    config: WidgetConfig,
    limit_reached: bool,
}

/// In-memory persona directory keyed by token.
#[derive(Default)]
pub struct MemoryDirectory {
    records: Arc<RwLock<HashMap<String, PersonaRecord>>>,
}

impl MemoryDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a directory from the static roster in the app config.
    pub async fn from_entries(entries: &[PersonaEntry]) -> Self {
        let directory = Self::new();
        for entry in entries {
            directory
                .register(&entry.token, entry.widget_config(), entry.limit_reached)
                .await;
        }
        directory
    }

    /// Register or replace a persona.
    pub async fn register(&self, token: &str, config: WidgetConfig, limit_reached: bool) {
        self.records.write().await.insert(
            token.to_string(),
            PersonaRecord {
                config,
                limit_reached,
            },
        );
        tracing::debug!(token, "Persona registered");
    }

    /// Flip the usage-limit flag for a persona.
    pub async fn set_limit_reached(&self, token: &str, limit_reached: bool) {
        if let Some(record) = self.records.write().await.get_mut(token) {
            record.limit_reached = limit_reached;
        }
    }

    /// Number of registered personas
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the directory is empty
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl PersonaDirectory for MemoryDirectory {
    async fn widget_config(&self, token: &str) -> WidgetConfig {
        self.records
            .read()
            .await
            .get(token)
            .map(|r| r.config.clone())
            .unwrap_or_default()
    }

    async fn limit_reached(&self, token: &str) -> bool {
        self.records
            .read()
            .await
            .get(token)
            .map(|r| r.limit_reached)
            .unwrap_or(false)
    }
}
