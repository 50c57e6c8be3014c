//! In-process backend. Used by tests and by the service when no bucket is
//! configured.
//!
//! All collections sit behind one lock, so every trait operation is atomic
//! with respect to every other.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use stackwise_core::models::disclaimer::{Disclaimer, DisclaimerType};
use stackwise_core::models::goal::{HealthGoalRecord, OnboardingRecord};
use stackwise_core::models::log::RecommendationLogEntry;
use stackwise_core::models::recommendation::{Recommendation, RecommendationAction};
use stackwise_core::models::stack::Stack;
use stackwise_core::models::supplement::Supplement;
use stackwise_core::s3_keys;

use crate::error::StorageError;
use crate::store::{
    shuffle_order, CatalogStore, DisclaimerStore, GoalStore, LogStore, RecommendationStore,
    StackStore,
};

#[derive(Default)]
struct Collections {
    health_goals: HashMap<Uuid, HealthGoalRecord>,
    onboarding: HashMap<Uuid, OnboardingRecord>,
    /// Insertion order is catalog order.
    supplements: Vec<Supplement>,
    recommendations: HashMap<Uuid, Recommendation>,
    /// Append order is chronological order.
    logs: Vec<RecommendationLogEntry>,
    stacks: HashMap<Uuid, Stack>,
    disclaimers: Vec<Disclaimer>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

/// Reference data a memory store can be seeded with.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Seed {
    pub supplements: Vec<Supplement>,
    pub health_goals: Vec<HealthGoalRecord>,
    pub onboarding: Vec<OnboardingRecord>,
    pub disclaimers: Vec<Disclaimer>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed(&self, seed: Seed) {
        let mut inner = self.inner.write().await;
        inner.supplements.extend(seed.supplements);
        for record in seed.health_goals {
            inner.health_goals.insert(record.user_id, record);
        }
        for record in seed.onboarding {
            inner.onboarding.insert(record.user_id, record);
        }
        inner.disclaimers.extend(seed.disclaimers);
    }
}

#[async_trait]
impl GoalStore for MemoryStore {
    async fn health_goals(&self, user_id: Uuid) -> Result<Option<HealthGoalRecord>, StorageError> {
        Ok(self.inner.read().await.health_goals.get(&user_id).cloned())
    }

    async fn onboarding(&self, user_id: Uuid) -> Result<Option<OnboardingRecord>, StorageError> {
        Ok(self.inner.read().await.onboarding.get(&user_id).cloned())
    }

    async fn put_health_goals(&self, record: HealthGoalRecord) -> Result<(), StorageError> {
        self.inner
            .write()
            .await
            .health_goals
            .insert(record.user_id, record);
        Ok(())
    }

    async fn put_onboarding(&self, record: OnboardingRecord) -> Result<(), StorageError> {
        self.inner
            .write()
            .await
            .onboarding
            .insert(record.user_id, record);
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn available(
        &self,
        exclude: &HashSet<Uuid>,
        limit: usize,
    ) -> Result<Vec<Supplement>, StorageError> {
        let inner = self.inner.read().await;
        Ok(inner
            .supplements
            .iter()
            .filter(|s| s.is_available && !exclude.contains(&s.id))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn put_supplement(&self, supplement: Supplement) -> Result<(), StorageError> {
        let mut inner = self.inner.write().await;
        match inner.supplements.iter_mut().find(|s| s.id == supplement.id) {
            Some(existing) => *existing = supplement,
            None => inner.supplements.push(supplement),
        }
        Ok(())
    }
}

#[async_trait]
impl RecommendationStore for MemoryStore {
    async fn get(&self, id: Uuid) -> Result<Option<Recommendation>, StorageError> {
        Ok(self.inner.read().await.recommendations.get(&id).cloned())
    }

    async fn insert(&self, recommendation: Recommendation) -> Result<(), StorageError> {
        self.inner
            .write()
            .await
            .recommendations
            .insert(recommendation.id, recommendation);
        Ok(())
    }

    async fn insert_many(&self, recommendations: Vec<Recommendation>) -> Result<(), StorageError> {
        let mut inner = self.inner.write().await;
        for recommendation in recommendations {
            inner
                .recommendations
                .insert(recommendation.id, recommendation);
        }
        Ok(())
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, StorageError> {
        let mut inner = self.inner.write().await;
        let owned = inner
            .recommendations
            .get(&id)
            .is_some_and(|r| r.user_id == user_id);
        if owned {
            inner.recommendations.remove(&id);
        }
        Ok(owned)
    }

    async fn delete_by_action_except(
        &self,
        user_id: Uuid,
        action: RecommendationAction,
        keep: &HashSet<Uuid>,
    ) -> Result<usize, StorageError> {
        let mut inner = self.inner.write().await;
        let before = inner.recommendations.len();
        inner.recommendations.retain(|id, r| {
            r.user_id != user_id || r.action != action || keep.contains(id)
        });
        Ok(before - inner.recommendations.len())
    }

    async fn page(
        &self,
        user_id: Uuid,
        exclude: &HashSet<Uuid>,
        offset: usize,
        limit: usize,
    ) -> Result<(Vec<Recommendation>, u64), StorageError> {
        let inner = self.inner.read().await;
        let mut rows: Vec<&Recommendation> = inner
            .recommendations
            .values()
            .filter(|r| r.user_id == user_id && !exclude.contains(&r.id))
            .collect();
        rows.sort_by(|a, b| shuffle_order(a, b));

        let total = rows.len() as u64;
        let page = rows
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        Ok((page, total))
    }
}

#[async_trait]
impl LogStore for MemoryStore {
    async fn append(&self, entry: RecommendationLogEntry) -> Result<(), StorageError> {
        self.inner.write().await.logs.push(entry);
        Ok(())
    }

    async fn recent(
        &self,
        user_id: Uuid,
        action: RecommendationAction,
        limit: usize,
    ) -> Result<Vec<RecommendationLogEntry>, StorageError> {
        let inner = self.inner.read().await;
        Ok(inner
            .logs
            .iter()
            .rev()
            .filter(|e| e.user_id == user_id && e.action == action)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl StackStore for MemoryStore {
    async fn get(&self, user_id: Uuid) -> Result<Option<Stack>, StorageError> {
        Ok(self.inner.read().await.stacks.get(&user_id).cloned())
    }

    async fn pin(&self, user_id: Uuid, snapshot: Recommendation) -> Result<Stack, StorageError> {
        let mut inner = self.inner.write().await;
        let stack = inner
            .stacks
            .entry(user_id)
            .or_insert_with(|| Stack::new(user_id));

        let recommendation_id = snapshot.id;
        if !stack.pin(snapshot) {
            return Err(StorageError::Conflict {
                key: s3_keys::stack(user_id),
                reason: format!("recommendation {recommendation_id} is already pinned"),
            });
        }
        Ok(stack.clone())
    }

    async fn unpin(
        &self,
        user_id: Uuid,
        recommendation_id: Uuid,
    ) -> Result<Option<Stack>, StorageError> {
        let mut inner = self.inner.write().await;
        Ok(inner.stacks.get_mut(&user_id).map(|stack| {
            stack.unpin(recommendation_id);
            stack.clone()
        }))
    }
}

#[async_trait]
impl DisclaimerStore for MemoryStore {
    async fn active(
        &self,
        disclaimer_type: DisclaimerType,
    ) -> Result<Option<Disclaimer>, StorageError> {
        let inner = self.inner.read().await;
        Ok(inner
            .disclaimers
            .iter()
            .filter(|d| d.disclaimer_type == disclaimer_type && d.is_active)
            .max_by_key(|d| d.created_at)
            .cloned())
    }

    async fn put(&self, disclaimer: Disclaimer) -> Result<(), StorageError> {
        let mut inner = self.inner.write().await;
        match inner.disclaimers.iter_mut().find(|d| d.id == disclaimer.id) {
            Some(existing) => *existing = disclaimer,
            None => inner.disclaimers.push(disclaimer),
        }
        Ok(())
    }
}
