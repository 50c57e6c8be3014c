//! Candidate selection and ranking.
//!
//! Both modes score the same way; they differ in where goals come from, how
//! many candidates are considered and what the external step may change.
//!
//! | mode       | goals                   | pool | filter    | external step   |
//! |------------|-------------------------|------|-----------|-----------------|
//! | `pick_one` | thresholds              | 50   | none      | promotes a pick |
//! | `pick_list`| thresholds ∪ onboarding | 200  | score > 0 | relabels only   |

use std::collections::HashSet;

use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

use stackwise_bedrock::context::build_profile_context;
use stackwise_bedrock::rerank::{RerankOutcome, RerankRequest};
use stackwise_core::models::goal::Goal;
use stackwise_core::models::log::RecommendationLogEntry;
use stackwise_core::models::recommendation::{
    RecommendationAction, RecommendationPayload, RecommendationTag,
};
use stackwise_core::models::supplement::Supplement;
use stackwise_scoring::confidence::{resolve, rule_confidence};
use stackwise_scoring::goals::{derive_combined, derive_from_thresholds};
use stackwise_scoring::scorer::{rank, ScoredCandidate};

use crate::engine::Engine;
use crate::error::EngineError;

pub const SINGLE_POOL_SIZE: usize = 50;
pub const LIST_POOL_SIZE: usize = 200;
pub const MAX_LIST_LIMIT: usize = 50;

impl Engine {
    /// Pick the single best supplement for a user.
    ///
    /// Supplements in `exclude` and those behind the user's pinned stack are
    /// never considered. Returns `None` when no candidate is left.
    pub async fn pick_one(
        &self,
        user_id: Uuid,
        exclude: &HashSet<Uuid>,
    ) -> Result<Option<RecommendationPayload>, EngineError> {
        let (health_goals, onboarding, stack) = tokio::try_join!(
            self.stores.goals.health_goals(user_id),
            self.stores.goals.onboarding(user_id),
            self.stores.stacks.get(user_id),
        )?;

        let goals = derive_from_thresholds(health_goals.as_ref());

        let mut exclusions = exclude.clone();
        if let Some(stack) = &stack {
            exclusions.extend(stack.locked_supplement_ids());
        }

        let candidates = self
            .stores
            .catalog
            .available(&exclusions, SINGLE_POOL_SIZE)
            .await?;
        if candidates.is_empty() {
            info!(%user_id, "no candidates for single suggestion");
            return Ok(None);
        }

        let mut scored = rank(candidates, &goals);

        let profile_context = build_profile_context(onboarding.as_ref(), health_goals.as_ref());
        let outcome = self
            .external_rerank(&goals, supplements_of(&scored), profile_context)
            .await;

        let top_index = outcome
            .best_id
            .and_then(|id| scored.iter().position(|c| c.supplement.id == id))
            .unwrap_or(0);
        let top = scored.swap_remove(top_index);

        let tag = tag_for(outcome.used);
        let confidence = resolve(
            outcome.used,
            outcome.confidence,
            top.score,
            top.matched_goals.len(),
        );

        let entry = RecommendationLogEntry::new(
            user_id,
            top.supplement.id,
            RecommendationAction::Suggested,
        )
        .with_meta(json!({
            "user_goals": goals,
            "score": top.score,
            "tag": tag.as_str(),
            "confidence": confidence.score,
        }));
        let logs = self.stores.logs.clone();
        tokio::spawn(async move {
            if let Err(e) = logs.append(entry).await {
                error!(error = %e, "failed to log suggestion");
            }
        });

        info!(
            %user_id,
            supplement_id = %top.supplement.id,
            score = top.score,
            tag = tag.as_str(),
            confidence = confidence.score,
            "picked single suggestion"
        );

        Ok(Some(RecommendationPayload {
            supplement: top.supplement,
            confidence_score: confidence.score,
            confidence_label: confidence.label,
            matched_goals: top.matched_goals,
            recommendation_tag: tag,
            ai_insight: outcome.insight,
            reason: None,
        }))
    }

    /// Pick up to `limit` (clamped to `[1, 50]`) goal-matched supplements.
    ///
    /// Returns an empty list without reading the catalog when the user has
    /// no goals at all.
    pub async fn pick_list(
        &self,
        user_id: Uuid,
        limit: usize,
        exclude: &HashSet<Uuid>,
    ) -> Result<Vec<RecommendationPayload>, EngineError> {
        let (health_goals, onboarding, stack) = tokio::try_join!(
            self.stores.goals.health_goals(user_id),
            self.stores.goals.onboarding(user_id),
            self.stores.stacks.get(user_id),
        )?;

        let goals = derive_combined(health_goals.as_ref(), onboarding.as_ref());
        if goals.is_empty() {
            info!(%user_id, "no goals, skipping list generation");
            return Ok(Vec::new());
        }

        let mut exclusions = exclude.clone();
        if let Some(stack) = &stack {
            exclusions.extend(stack.locked_supplement_ids());
        }

        let candidates = self
            .stores
            .catalog
            .available(&exclusions, LIST_POOL_SIZE)
            .await?;

        let mut scored: Vec<ScoredCandidate> = rank(candidates, &goals)
            .into_iter()
            .filter(|c| c.score > 0)
            .collect();
        if scored.is_empty() {
            return Ok(Vec::new());
        }
        scored.truncate(limit.clamp(1, MAX_LIST_LIMIT));

        let profile_context = build_profile_context(onboarding.as_ref(), health_goals.as_ref());
        let outcome = self
            .external_rerank(&goals, supplements_of(&scored), profile_context.clone())
            .await;

        let ai_pick = outcome.best_id.filter(|_| outcome.used);

        Ok(scored
            .into_iter()
            .map(|c| {
                let tag = tag_for(ai_pick == Some(c.supplement.id));
                let confidence = rule_confidence(f64::from(c.score), c.matched_goals.len());
                RecommendationPayload {
                    reason: Some(list_reason(&c.matched_goals)),
                    ai_insight: Some(list_insight(&profile_context, &c.matched_goals)),
                    supplement: c.supplement,
                    confidence_score: confidence.score,
                    confidence_label: confidence.label,
                    matched_goals: c.matched_goals,
                    recommendation_tag: tag,
                }
            })
            .collect())
    }

    /// Run the configured reranker, bounded by the rerank timeout.
    ///
    /// Never fails: errors and timeouts degrade to an unused outcome so the
    /// caller continues rule-based.
    async fn external_rerank(
        &self,
        goals: &[Goal],
        candidates: Vec<Supplement>,
        profile_context: String,
    ) -> RerankOutcome {
        let Some(reranker) = &self.reranker else {
            return RerankOutcome::unused();
        };

        let request = RerankRequest {
            goals: goals.to_vec(),
            candidates,
            profile_context,
        };

        match tokio::time::timeout(self.rerank_timeout, reranker.rerank(request)).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                warn!(error = %e, "external rerank failed, falling back to rules");
                RerankOutcome::unused()
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.rerank_timeout.as_millis() as u64,
                    "external rerank timed out, falling back to rules"
                );
                RerankOutcome::unused()
            }
        }
    }
}

fn supplements_of(scored: &[ScoredCandidate]) -> Vec<Supplement> {
    scored.iter().map(|c| c.supplement.clone()).collect()
}

fn tag_for(ai: bool) -> RecommendationTag {
    if ai {
        RecommendationTag::AiSelected
    } else {
        RecommendationTag::SmartSuggestion
    }
}

fn join_goals(goals: &[Goal]) -> String {
    goals.iter().map(Goal::as_str).collect::<Vec<_>>().join(", ")
}

pub fn list_reason(matched_goals: &[Goal]) -> String {
    if matched_goals.is_empty() {
        "This supplement aligns with general wellness needs.".to_string()
    } else {
        format!(
            "Recommended for {} because this supplement directly supports those health goals.",
            join_goals(matched_goals)
        )
    }
}

pub fn list_insight(profile_context: &str, matched_goals: &[Goal]) -> String {
    let tail = if matched_goals.is_empty() {
        "It complements your lifestyle and overall health objectives.".to_string()
    } else {
        format!(
            "This supplement is chosen to enhance your {} journey.",
            join_goals(matched_goals)
        )
    };
    format!("Considering your profile: {profile_context}. {tail}")
}
