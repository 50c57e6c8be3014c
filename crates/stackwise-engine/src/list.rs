//! Persisted recommendation list: regeneration and paged reads.

use std::collections::HashSet;

use serde_json::json;
use tracing::info;
use uuid::Uuid;

use stackwise_audit::{AuditAction, AuditEvent};
use stackwise_core::models::disclaimer::DisclaimerView;
use stackwise_core::models::page::{Page, Pagination};
use stackwise_core::models::recommendation::{
    Recommendation, RecommendationAction, RecommendationPayload, RecommendationView,
};

use crate::engine::Engine;
use crate::error::EngineError;

impl Engine {
    /// Replace the user's `list_suggested` rows with a fresh list.
    ///
    /// Rows whose ids are in `locked` (pinned) survive. The delete and the
    /// insert run back to back; pinned rows are never touched by either.
    pub async fn regenerate_list(
        &self,
        user_id: Uuid,
        payloads: Vec<RecommendationPayload>,
        locked: &HashSet<Uuid>,
    ) -> Result<Vec<Recommendation>, EngineError> {
        let deleted = self
            .stores
            .recommendations
            .delete_by_action_except(user_id, RecommendationAction::ListSuggested, locked)
            .await?;

        let rows: Vec<Recommendation> = payloads
            .into_iter()
            .map(|payload| {
                Recommendation::from_payload(
                    user_id,
                    payload,
                    RecommendationAction::ListSuggested,
                    rand::random::<f64>(),
                )
            })
            .collect();
        let inserted = rows.len();

        self.stores
            .recommendations
            .insert_many(rows.clone())
            .await?;

        info!(%user_id, deleted, inserted, "regenerated recommendation list");
        AuditEvent::new(AuditAction::ListRegenerated, user_id, user_id)
            .with_details(json!({ "deleted": deleted, "inserted": inserted }))
            .emit();

        Ok(rows)
    }

    /// One page of the user's recommendation rows, excluding `exclude`, in
    /// shuffle order, each with `disclaimer` attached.
    pub async fn read_page(
        &self,
        user_id: Uuid,
        exclude: &HashSet<Uuid>,
        page: u32,
        limit: u32,
        disclaimer: Option<DisclaimerView>,
    ) -> Result<Page<RecommendationView>, EngineError> {
        let offset = Pagination::new(page, limit, 0).offset();
        let (rows, total) = self
            .stores
            .recommendations
            .page(user_id, exclude, offset, limit as usize)
            .await?;

        let items = rows
            .into_iter()
            .map(|recommendation| RecommendationView {
                recommendation,
                disclaimer: disclaimer.clone(),
            })
            .collect();

        Ok(Page {
            items,
            pagination: Pagination::new(page, limit, total),
        })
    }
}
