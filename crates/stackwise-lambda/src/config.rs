//! Runtime configuration, read from `STACKWISE_*` environment variables.

use std::path::PathBuf;
use std::time::Duration;

use eyre::{bail, eyre};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Memory,
    S3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RerankerKind {
    Off,
    Profile,
    Bedrock,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub store: StoreKind,
    pub bucket: String,
    pub reranker: RerankerKind,
    pub model_id: Option<String>,
    pub rerank_timeout: Duration,
    pub seed_file: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> eyre::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup. Unset and empty values take
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> eyre::Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let store = match get("STACKWISE_STORE").as_deref() {
            None | Some("memory") => StoreKind::Memory,
            Some("s3") => StoreKind::S3,
            Some(other) => bail!("invalid STACKWISE_STORE: {other}"),
        };

        let reranker = match get("STACKWISE_RERANKER").as_deref() {
            None | Some("profile") => RerankerKind::Profile,
            Some("off") => RerankerKind::Off,
            Some("bedrock") => RerankerKind::Bedrock,
            Some(other) => bail!("invalid STACKWISE_RERANKER: {other}"),
        };

        let model_id = get("STACKWISE_MODEL_ID");
        if reranker == RerankerKind::Bedrock && model_id.is_none() {
            bail!("STACKWISE_MODEL_ID is required when STACKWISE_RERANKER=bedrock");
        }

        let rerank_timeout = match get("STACKWISE_RERANK_TIMEOUT_MS") {
            None => Duration::from_millis(3000),
            Some(raw) => Duration::from_millis(
                raw.parse()
                    .map_err(|e| eyre!("invalid STACKWISE_RERANK_TIMEOUT_MS {raw:?}: {e}"))?,
            ),
        };

        Ok(Self {
            store,
            bucket: get("STACKWISE_BUCKET").unwrap_or_else(|| "stackwise".to_string()),
            reranker,
            model_id,
            rerank_timeout,
            seed_file: get("STACKWISE_SEED_FILE").map(PathBuf::from),
        })
    }
}
