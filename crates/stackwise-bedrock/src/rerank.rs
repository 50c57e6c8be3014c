use async_trait::async_trait;
use uuid::Uuid;

use stackwise_core::models::goal::Goal;
use stackwise_core::models::supplement::Supplement;

use crate::error::BedrockError;

/// Input to one reranking call.
#[derive(Debug, Clone)]
pub struct RerankRequest {
    pub goals: Vec<Goal>,
    /// Scored candidates, best first.
    pub candidates: Vec<Supplement>,
    pub profile_context: String,
}

/// What the external step decided.
///
/// `used` is true when the step actually ran. `best_id` is only trusted by
/// callers if it names one of the request's candidates.
#[derive(Debug, Clone, PartialEq)]
pub struct RerankOutcome {
    pub best_id: Option<Uuid>,
    pub insight: Option<String>,
    /// Raw 0..=100 confidence as reported. May be absent.
    pub confidence: Option<f64>,
    pub used: bool,
}

impl RerankOutcome {
    /// The outcome of a step that did not run.
    pub fn unused() -> Self {
        Self {
            best_id: None,
            insight: None,
            confidence: None,
            used: false,
        }
    }
}

#[async_trait]
pub trait Reranker: Send + Sync {
    async fn rerank(&self, request: RerankRequest) -> Result<RerankOutcome, BedrockError>;
}
