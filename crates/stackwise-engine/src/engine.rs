use std::sync::Arc;
use std::time::Duration;

use stackwise_bedrock::rerank::Reranker;
use stackwise_storage::Stores;

pub const DEFAULT_RERANK_TIMEOUT: Duration = Duration::from_millis(3000);

/// Entry point for every recommendation operation.
#[derive(Clone)]
pub struct Engine {
    pub(crate) stores: Stores,
    pub(crate) reranker: Option<Arc<dyn Reranker>>,
    pub(crate) rerank_timeout: Duration,
}

impl Engine {
    /// An engine with rule-based ranking only.
    pub fn new(stores: Stores) -> Self {
        Self {
            stores,
            reranker: None,
            rerank_timeout: DEFAULT_RERANK_TIMEOUT,
        }
    }

    pub fn with_reranker(mut self, reranker: Arc<dyn Reranker>, timeout: Duration) -> Self {
        self.reranker = Some(reranker);
        self.rerank_timeout = timeout;
        self
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }
}
