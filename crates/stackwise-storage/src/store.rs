//! Store contracts consumed by the recommendation engine.
//!
//! Every store is user-scoped where it holds per-user data; there is no
//! cross-user state.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use stackwise_core::models::disclaimer::{Disclaimer, DisclaimerType};
use stackwise_core::models::goal::{HealthGoalRecord, OnboardingRecord};
use stackwise_core::models::log::RecommendationLogEntry;
use stackwise_core::models::recommendation::{Recommendation, RecommendationAction};
use stackwise_core::models::stack::Stack;
use stackwise_core::models::supplement::Supplement;

use crate::error::StorageError;

#[async_trait]
pub trait GoalStore: Send + Sync {
    async fn health_goals(&self, user_id: Uuid) -> Result<Option<HealthGoalRecord>, StorageError>;

    async fn onboarding(&self, user_id: Uuid) -> Result<Option<OnboardingRecord>, StorageError>;

    async fn put_health_goals(&self, record: HealthGoalRecord) -> Result<(), StorageError>;

    async fn put_onboarding(&self, record: OnboardingRecord) -> Result<(), StorageError>;
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Up to `limit` available supplements whose ids are not in `exclude`,
    /// in catalog order.
    async fn available(
        &self,
        exclude: &HashSet<Uuid>,
        limit: usize,
    ) -> Result<Vec<Supplement>, StorageError>;

    async fn put_supplement(&self, supplement: Supplement) -> Result<(), StorageError>;
}

#[async_trait]
pub trait RecommendationStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<Recommendation>, StorageError>;

    async fn insert(&self, recommendation: Recommendation) -> Result<(), StorageError>;

    async fn insert_many(&self, recommendations: Vec<Recommendation>) -> Result<(), StorageError>;

    /// Delete one of the user's rows. Returns whether it existed.
    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, StorageError>;

    /// Delete the user's rows carrying `action`, sparing every id in `keep`.
    /// Returns the number of rows deleted.
    async fn delete_by_action_except(
        &self,
        user_id: Uuid,
        action: RecommendationAction,
        keep: &HashSet<Uuid>,
    ) -> Result<usize, StorageError>;

    /// One page of the user's rows not in `exclude`, in [`shuffle_order`],
    /// plus the total count under the same filter.
    async fn page(
        &self,
        user_id: Uuid,
        exclude: &HashSet<Uuid>,
        offset: usize,
        limit: usize,
    ) -> Result<(Vec<Recommendation>, u64), StorageError>;
}

#[async_trait]
pub trait LogStore: Send + Sync {
    async fn append(&self, entry: RecommendationLogEntry) -> Result<(), StorageError>;

    /// The user's most recent entries with `action`, newest first.
    async fn recent(
        &self,
        user_id: Uuid,
        action: RecommendationAction,
        limit: usize,
    ) -> Result<Vec<RecommendationLogEntry>, StorageError>;
}

#[async_trait]
pub trait StackStore: Send + Sync {
    async fn get(&self, user_id: Uuid) -> Result<Option<Stack>, StorageError>;

    /// Create the user's stack if needed and pin `snapshot`.
    ///
    /// The store itself enforces that a recommendation id is pinned at most
    /// once: a duplicate fails with [`StorageError::Conflict`].
    async fn pin(&self, user_id: Uuid, snapshot: Recommendation) -> Result<Stack, StorageError>;

    /// Remove a pinned recommendation. `Ok(None)` when the user has no stack.
    async fn unpin(
        &self,
        user_id: Uuid,
        recommendation_id: Uuid,
    ) -> Result<Option<Stack>, StorageError>;
}

#[async_trait]
pub trait DisclaimerStore: Send + Sync {
    /// The newest active disclaimer of a type.
    async fn active(
        &self,
        disclaimer_type: DisclaimerType,
    ) -> Result<Option<Disclaimer>, StorageError>;

    async fn put(&self, disclaimer: Disclaimer) -> Result<(), StorageError>;
}

/// Stable page order: shuffle key ascending, then id ascending.
pub fn shuffle_order(a: &Recommendation, b: &Recommendation) -> Ordering {
    a.shuffle_key
        .total_cmp(&b.shuffle_key)
        .then_with(|| a.id.cmp(&b.id))
}

/// The full set of stores, injected into the engine.
#[derive(Clone)]
pub struct Stores {
    pub goals: Arc<dyn GoalStore>,
    pub catalog: Arc<dyn CatalogStore>,
    pub recommendations: Arc<dyn RecommendationStore>,
    pub logs: Arc<dyn LogStore>,
    pub stacks: Arc<dyn StackStore>,
    pub disclaimers: Arc<dyn DisclaimerStore>,
}

impl Stores {
    /// Use one backend for every store.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: GoalStore
            + CatalogStore
            + RecommendationStore
            + LogStore
            + StackStore
            + DisclaimerStore
            + 'static,
    {
        Self {
            goals: backend.clone(),
            catalog: backend.clone(),
            recommendations: backend.clone(),
            logs: backend.clone(),
            stacks: backend.clone(),
            disclaimers: backend,
        }
    }
}
