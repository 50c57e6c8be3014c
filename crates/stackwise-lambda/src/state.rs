use std::path::Path;
use std::sync::Arc;

use stackwise_bedrock::converse::BedrockReranker;
use stackwise_bedrock::profile::ProfileReranker;
use stackwise_bedrock::rerank::Reranker;
use stackwise_engine::Engine;
use stackwise_storage::memory::{MemoryStore, Seed};
use stackwise_storage::s3::S3Store;
use stackwise_storage::Stores;

use crate::config::{AppConfig, RerankerKind, StoreKind};

/// Shared application state, injected into all route handlers via Axum state.
#[derive(Clone)]
pub struct AppState {
    pub engine: Engine,
}

impl AppState {
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }

    pub async fn from_config(config: &AppConfig) -> eyre::Result<Self> {
        let stores = match config.store {
            StoreKind::Memory => {
                let memory = MemoryStore::new();
                if let Some(path) = &config.seed_file {
                    memory.seed(load_seed(path).await?).await;
                    tracing::info!(path = %path.display(), "seeded memory store");
                }
                Stores::from_backend(Arc::new(memory))
            }
            StoreKind::S3 => {
                let client = stackwise_storage::client::build_client().await;
                Stores::from_backend(Arc::new(S3Store::new(client, config.bucket.clone())))
            }
        };

        let reranker: Option<Arc<dyn Reranker>> = match config.reranker {
            RerankerKind::Off => None,
            RerankerKind::Profile => Some(Arc::new(ProfileReranker)),
            RerankerKind::Bedrock => {
                let sdk = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
                let model_id = config.model_id.clone().unwrap_or_default();
                Some(Arc::new(BedrockReranker::new(&sdk, model_id)))
            }
        };

        let mut engine = Engine::new(stores);
        if let Some(reranker) = reranker {
            engine = engine.with_reranker(reranker, config.rerank_timeout);
        }

        tracing::info!(
            store = ?config.store,
            reranker = ?config.reranker,
            "application state ready"
        );
        Ok(Self { engine })
    }
}

/// Read a JSON seed file for the memory store.
pub async fn load_seed(path: &Path) -> eyre::Result<Seed> {
    let bytes = tokio::fs::read(path).await?;
    Ok(serde_json::from_slice(&bytes)?)
}
