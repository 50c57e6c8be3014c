//! The user's pinned stack.

use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use stackwise_audit::{AuditAction, AuditEvent};
use stackwise_core::models::disclaimer::{active_view, DisclaimerType};
use stackwise_core::models::log::RecommendationLogEntry;
use stackwise_core::models::recommendation::RecommendationAction;
use stackwise_core::models::stack::{PinnedRecommendation, Stack};

use crate::engine::Engine;
use crate::error::EngineError;

impl Engine {
    /// Pin one of the user's recommendations.
    ///
    /// Fails with `NotFound` if the recommendation does not exist or belongs
    /// to someone else, and with `Conflict` if it is already pinned.
    pub async fn add_to_stack(
        &self,
        user_id: Uuid,
        recommendation_id: Uuid,
    ) -> Result<Stack, EngineError> {
        let recommendation = self
            .stores
            .recommendations
            .get(recommendation_id)
            .await?
            .filter(|r| r.user_id == user_id)
            .ok_or_else(|| EngineError::NotFound("Recommendation not found".to_string()))?;

        if let Some(existing) = self.stores.stacks.get(user_id).await?
            && existing.contains(recommendation_id)
        {
            return Err(EngineError::Conflict("Already in stack".to_string()));
        }

        let supplement_id = recommendation.supplement_id;
        let stack = self.stores.stacks.pin(user_id, recommendation).await?;

        let entry = RecommendationLogEntry::new(user_id, supplement_id, RecommendationAction::Added)
            .with_meta(json!({ "recommendation_id": recommendation_id }));
        if let Err(e) = self.stores.logs.append(entry).await {
            error!(%user_id, error = %e, "failed to log stack addition");
        }

        info!(%user_id, %recommendation_id, items = stack.items.len(), "pinned recommendation");
        AuditEvent::new(AuditAction::StackPinned, user_id, recommendation_id)
            .with_details(json!({ "supplement_id": supplement_id }))
            .emit();

        Ok(stack)
    }

    /// Unpin a recommendation. Unpinning an id that is not pinned succeeds;
    /// a user without a stack gets `NotFound`.
    pub async fn remove_from_stack(
        &self,
        user_id: Uuid,
        recommendation_id: Uuid,
    ) -> Result<Stack, EngineError> {
        let stack = self
            .stores
            .stacks
            .unpin(user_id, recommendation_id)
            .await?
            .ok_or_else(|| EngineError::NotFound("Stack not found".to_string()))?;

        info!(%user_id, %recommendation_id, items = stack.items.len(), "unpinned recommendation");
        AuditEvent::new(AuditAction::StackUnpinned, user_id, recommendation_id).emit();

        Ok(stack)
    }

    /// The pinned snapshots, each joined with the currently active
    /// recommendation disclaimer.
    pub async fn get_stack(&self, user_id: Uuid) -> Result<Vec<PinnedRecommendation>, EngineError> {
        let (stack, disclaimer) = tokio::try_join!(
            self.stores.stacks.get(user_id),
            self.stores
                .disclaimers
                .active(DisclaimerType::SupplementRecommendation),
        )?;

        let Some(stack) = stack else {
            return Ok(Vec::new());
        };
        let disclaimer = active_view(disclaimer.as_ref());

        Ok(stack
            .items
            .into_iter()
            .map(|item| PinnedRecommendation {
                snapshot: item.snapshot,
                added_at: item.added_at,
                disclaimer: disclaimer.clone(),
            })
            .collect())
    }
}
