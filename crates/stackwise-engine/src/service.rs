//! User-facing recommendation flows built on the ranker.

use std::collections::HashSet;

use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use stackwise_audit::{AuditAction, AuditEvent};
use stackwise_core::models::disclaimer::{active_view, DisclaimerType};
use stackwise_core::models::log::RecommendationLogEntry;
use stackwise_core::models::page::Page;
use stackwise_core::models::recommendation::{
    PersistedSuggestion, Recommendation, RecommendationAction, RecommendationPayload,
    RecommendationView,
};

use crate::engine::Engine;
use crate::error::EngineError;

/// How many recent dislikes stay excluded from every flow.
pub const RECENT_DISLIKES: usize = 20;
/// How many recent single suggestions a refresh skips.
pub const RECENT_SUGGESTIONS: usize = 5;

/// Input to [`Engine::refresh`].
#[derive(Debug, Clone, Default)]
pub struct RefreshRequest {
    pub user_id: Uuid,
    /// The recommendation being replaced, if any.
    pub recommendation_id: Option<Uuid>,
    /// Whether the user disliked `recommendation_id`.
    pub is_dont_like: bool,
    pub disliked_supplement_id: Option<Uuid>,
}

/// Paging for [`Engine::list`]. Out-of-range values are clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    /// How many fresh items to generate.
    pub generate: u32,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            generate: 50,
        }
    }
}

impl ListQuery {
    pub fn clamped(self) -> Self {
        Self {
            page: self.page.max(1),
            limit: self.limit.clamp(1, 50),
            generate: self.generate.clamp(1, 100),
        }
    }
}

impl Engine {
    /// Next single suggestion, skipping recently disliked supplements.
    /// Nothing is persisted.
    pub async fn next(&self, user_id: Uuid) -> Result<Option<RecommendationPayload>, EngineError> {
        let exclude = self
            .recent_supplements(user_id, RecommendationAction::Disliked, RECENT_DISLIKES)
            .await?;
        self.pick_one(user_id, &exclude).await
    }

    /// Replace a suggestion with a new persisted one, optionally recording
    /// a dislike first.
    pub async fn refresh(
        &self,
        request: RefreshRequest,
    ) -> Result<Option<PersistedSuggestion>, EngineError> {
        let user_id = request.user_id;
        let mut exclude = HashSet::new();

        if request.is_dont_like
            && let Some(recommendation_id) = request.recommendation_id
            && let Some(disliked) = self
                .stores
                .recommendations
                .get(recommendation_id)
                .await?
                .filter(|r| r.user_id == user_id)
        {
            exclude.insert(disliked.supplement_id);
            self.stores
                .recommendations
                .delete(user_id, recommendation_id)
                .await?;
            self.log_dislike(user_id, disliked.supplement_id, Some(recommendation_id))
                .await;
        }

        if let Some(supplement_id) = request.disliked_supplement_id
            && exclude.insert(supplement_id)
        {
            self.log_dislike(user_id, supplement_id, None).await;
        }

        let (suggested, disliked) = tokio::try_join!(
            self.recent_supplements(user_id, RecommendationAction::Suggested, RECENT_SUGGESTIONS),
            self.recent_supplements(user_id, RecommendationAction::Disliked, RECENT_DISLIKES),
        )?;
        exclude.extend(suggested);
        exclude.extend(disliked);

        let Some(payload) = self.pick_one(user_id, &exclude).await? else {
            return Ok(None);
        };

        let row = Recommendation::from_payload(
            user_id,
            payload.clone(),
            RecommendationAction::Suggested,
            rand::random::<f64>(),
        );
        let id = row.id;
        self.stores.recommendations.insert(row).await?;

        AuditEvent::new(AuditAction::SuggestionPersisted, user_id, id)
            .with_details(json!({ "supplement_id": payload.supplement.id }))
            .emit();

        Ok(Some(PersistedSuggestion { id, payload }))
    }

    /// Regenerate the user's list and read back one page of it.
    ///
    /// When nothing can be generated the stored list is left alone and an
    /// empty page is returned.
    pub async fn list(
        &self,
        user_id: Uuid,
        query: ListQuery,
    ) -> Result<Page<RecommendationView>, EngineError> {
        let query = query.clamped();

        let (stack, disclaimer, disliked) = tokio::try_join!(
            async { Ok::<_, EngineError>(self.stores.stacks.get(user_id).await?) },
            async {
                Ok::<_, EngineError>(
                    self.stores
                        .disclaimers
                        .active(DisclaimerType::SupplementRecommendation)
                        .await?,
                )
            },
            self.recent_supplements(user_id, RecommendationAction::Disliked, RECENT_DISLIKES),
        )?;

        let fresh = self
            .pick_list(user_id, query.generate as usize, &disliked)
            .await?;
        if fresh.is_empty() {
            info!(%user_id, "nothing to generate, returning empty page");
            return Ok(Page::empty(query.page, query.limit));
        }

        let locked = stack
            .map(|s| s.locked_recommendation_ids())
            .unwrap_or_default();
        self.regenerate_list(user_id, fresh, &locked).await?;

        self.read_page(
            user_id,
            &locked,
            query.page,
            query.limit,
            active_view(disclaimer.as_ref()),
        )
        .await
    }

    async fn recent_supplements(
        &self,
        user_id: Uuid,
        action: RecommendationAction,
        limit: usize,
    ) -> Result<HashSet<Uuid>, EngineError> {
        Ok(self
            .stores
            .logs
            .recent(user_id, action, limit)
            .await?
            .into_iter()
            .map(|entry| entry.supplement_id)
            .collect())
    }

    async fn log_dislike(
        &self,
        user_id: Uuid,
        supplement_id: Uuid,
        recommendation_id: Option<Uuid>,
    ) {
        let mut entry =
            RecommendationLogEntry::new(user_id, supplement_id, RecommendationAction::Disliked);
        if let Some(recommendation_id) = recommendation_id {
            entry = entry.with_meta(json!({ "recommendation_id": recommendation_id }));
        }
        if let Err(e) = self.stores.logs.append(entry).await {
            error!(%user_id, %supplement_id, error = %e, "failed to log dislike");
        }

        AuditEvent::new(AuditAction::RecommendationDisliked, user_id, supplement_id).emit();
    }
}
