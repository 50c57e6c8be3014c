use std::fmt;

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    StackPinned,
    StackUnpinned,
    RecommendationDisliked,
    SuggestionPersisted,
    ListRegenerated,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::StackPinned => "stack_pinned",
            AuditAction::StackUnpinned => "stack_unpinned",
            AuditAction::RecommendationDisliked => "recommendation_disliked",
            AuditAction::SuggestionPersisted => "suggestion_persisted",
            AuditAction::ListRegenerated => "list_regenerated",
        }
    }

    /// The kind of resource the action touches.
    pub fn resource_type(&self) -> &'static str {
        match self {
            AuditAction::StackPinned | AuditAction::StackUnpinned => "stack",
            AuditAction::RecommendationDisliked | AuditAction::SuggestionPersisted => {
                "recommendation"
            }
            AuditAction::ListRegenerated => "recommendation_list",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured audit event for a user-visible state change.
///
/// Emitted via `tracing`, so with the JSON subscriber each event is one
/// CloudWatch log line.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub action: AuditAction,
    pub user_id: Uuid,
    pub resource_id: String,
    pub details: Option<serde_json::Value>,
}

impl AuditEvent {
    pub fn new(action: AuditAction, user_id: Uuid, resource_id: impl ToString) -> Self {
        Self {
            action,
            user_id,
            resource_id: resource_id.to_string(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Emit this audit event via tracing.
    pub fn emit(&self) {
        let details = self
            .details
            .as_ref()
            .map(|d| d.to_string())
            .unwrap_or_default();
        info!(
            audit.action = %self.action,
            audit.resource_type = self.action.resource_type(),
            audit.resource_id = %self.resource_id,
            audit.user_id = %self.user_id,
            audit.details = %details,
            "audit event"
        );
    }
}
