//! Local, deterministic reranker.
//!
//! Keeps the scorer's top candidate and explains it against the user's
//! profile. Needs no network access.

use async_trait::async_trait;

use crate::error::BedrockError;
use crate::rerank::{RerankOutcome, RerankRequest, Reranker};

/// Confidence reported for every pick.
pub const PROFILE_CONFIDENCE: f64 = 70.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileReranker;

#[async_trait]
impl Reranker for ProfileReranker {
    async fn rerank(&self, request: RerankRequest) -> Result<RerankOutcome, BedrockError> {
        let Some(best) = request.candidates.first() else {
            return Ok(RerankOutcome::unused());
        };

        let closing = if request.goals.is_empty() {
            "This supplement is the strongest overall fit for your health profile.".to_string()
        } else {
            let goals: Vec<&str> = request.goals.iter().map(|g| g.as_str()).collect();
            format!(
                "This supplement best matches your goals: {}.",
                goals.join(", ")
            )
        };

        Ok(RerankOutcome {
            best_id: Some(best.id),
            insight: Some(format!(
                "Based on your profile:\n{}\n\n{closing}",
                request.profile_context
            )),
            confidence: Some(PROFILE_CONFIDENCE),
            used: true,
        })
    }
}
