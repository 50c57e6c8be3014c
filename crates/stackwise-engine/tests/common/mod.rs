#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use stackwise_bedrock::error::BedrockError;
use stackwise_bedrock::rerank::{RerankOutcome, RerankRequest, Reranker};
use stackwise_core::models::goal::{Goal, HealthGoalRecord, OnboardingRecord};
use stackwise_core::models::log::RecommendationLogEntry;
use stackwise_core::models::recommendation::RecommendationAction;
use stackwise_core::models::supplement::Supplement;
use stackwise_engine::Engine;
use stackwise_storage::error::StorageError;
use stackwise_storage::memory::MemoryStore;
use stackwise_storage::store::{CatalogStore, LogStore};
use stackwise_storage::Stores;
use uuid::Uuid;

pub struct Fixture {
    pub memory: Arc<MemoryStore>,
    pub stores: Stores,
    pub user: Uuid,
    pub melatonin: Supplement,
    pub electrolytes: Supplement,
    pub sleep_and_hydration: Supplement,
    pub vitamin_c: Supplement,
}

/// A catalog of four supplements and a user with sleep and hydration
/// thresholds set.
pub async fn fixture() -> Fixture {
    let memory = Arc::new(MemoryStore::new());
    let stores = Stores::from_backend(memory.clone());
    let user = Uuid::new_v4();

    let vitamin_c = Supplement::new("Vitamin C", "Immune support");
    let melatonin = Supplement::new("Melatonin 3mg", "Helps you fall asleep");
    let electrolytes = Supplement::new("Electrolyte Mix", "Sodium and potassium blend");
    let sleep_and_hydration =
        Supplement::new("Night Recovery", "Magnesium with electrolytes for sleep");

    for s in [
        vitamin_c.clone(),
        melatonin.clone(),
        electrolytes.clone(),
        sleep_and_hydration.clone(),
    ] {
        stores.catalog.put_supplement(s).await.unwrap();
    }

    stores
        .goals
        .put_health_goals(HealthGoalRecord {
            user_id: user,
            sleep_target: 8.0,
            water_intake: 2000.0,
            ..Default::default()
        })
        .await
        .unwrap();

    Fixture {
        memory,
        stores,
        user,
        melatonin,
        electrolytes,
        sleep_and_hydration,
        vitamin_c,
    }
}

pub async fn set_onboarding_goals(stores: &Stores, user: Uuid, goals: Vec<Goal>) {
    stores
        .goals
        .put_onboarding(OnboardingRecord {
            user_id: user,
            goals,
            ..Default::default()
        })
        .await
        .unwrap();
}

/// Reranker that always answers with a fixed outcome.
pub struct ScriptedReranker {
    pub outcome: RerankOutcome,
    pub calls: AtomicUsize,
}

impl ScriptedReranker {
    pub fn picking(best_id: Uuid, confidence: Option<f64>) -> Arc<Self> {
        Arc::new(Self {
            outcome: RerankOutcome {
                best_id: Some(best_id),
                insight: Some("Scripted insight.".to_string()),
                confidence,
                used: true,
            },
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl Reranker for ScriptedReranker {
    async fn rerank(&self, _request: RerankRequest) -> Result<RerankOutcome, BedrockError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.outcome.clone())
    }
}

pub struct FailingReranker;

#[async_trait]
impl Reranker for FailingReranker {
    async fn rerank(&self, _request: RerankRequest) -> Result<RerankOutcome, BedrockError> {
        Err(BedrockError::Invocation("throttled".to_string()))
    }
}

pub struct SlowReranker;

#[async_trait]
impl Reranker for SlowReranker {
    async fn rerank(&self, _request: RerankRequest) -> Result<RerankOutcome, BedrockError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(RerankOutcome::unused())
    }
}

/// Catalog wrapper counting reads.
pub struct CountingCatalog {
    pub inner: Arc<MemoryStore>,
    pub reads: AtomicUsize,
}

#[async_trait]
impl CatalogStore for CountingCatalog {
    async fn available(
        &self,
        exclude: &HashSet<Uuid>,
        limit: usize,
    ) -> Result<Vec<Supplement>, StorageError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.available(exclude, limit).await
    }

    async fn put_supplement(&self, supplement: Supplement) -> Result<(), StorageError> {
        self.inner.put_supplement(supplement).await
    }
}

/// Log store whose writes always fail; reads see nothing.
pub struct FailingLogs;

#[async_trait]
impl LogStore for FailingLogs {
    async fn append(&self, _entry: RecommendationLogEntry) -> Result<(), StorageError> {
        Err(StorageError::PutObject("disk full".to_string()))
    }

    async fn recent(
        &self,
        _user_id: Uuid,
        _action: RecommendationAction,
        _limit: usize,
    ) -> Result<Vec<RecommendationLogEntry>, StorageError> {
        Ok(Vec::new())
    }
}

pub fn engine(stores: &Stores) -> Engine {
    Engine::new(stores.clone())
}

/// Wait for fire-and-forget log writes to land.
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}
