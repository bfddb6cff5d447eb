use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use crate::database::store::EntityStore;
use crate::models::{actor::Actor, audit_log::NewAuditLog};

pub struct AuditService<S> {
    store: Arc<S>,
}

impl<S> Clone for AuditService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: EntityStore> AuditService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Best-effort: a failed audit write is logged and never fails the
    /// transition that triggered it.
    pub async fn record_transition(
        &self,
        actor: &Actor,
        entity_type: &str,
        entity_id: Uuid,
        from: &str,
        to: &str,
    ) {
        let entry = NewAuditLog {
            user_id: Some(actor.user_id),
            action: "status_transition".to_string(),
            entity_type: entity_type.to_string(),
            entity_id,
            changes: Some(json!({
                "from": from,
                "to": to,
                "role": actor.role.to_string(),
            })),
        };

        if let Err(e) = self.store.insert_audit_log(entry).await {
            tracing::warn!(
                error = %e,
                entity_type,
                %entity_id,
                "Failed to record status transition"
            );
        }
    }
}
