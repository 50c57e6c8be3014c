use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use super::disclaimer::DisclaimerView;
use super::recommendation::Recommendation;

/// A user's pinned set of recommendations.
///
/// Pinned recommendations survive list regeneration, and the supplements
/// behind them are kept out of future candidate pools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Stack {
    pub user_id: Uuid,
    pub items: Vec<StackItem>,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StackItem {
    pub recommendation_id: Uuid,
    /// Frozen copy of the recommendation at pin time.
    pub snapshot: Recommendation,
    pub added_at: jiff::Timestamp,
}

impl Stack {
    pub fn new(user_id: Uuid) -> Self {
        let now = jiff::Timestamp::now();
        Self {
            user_id,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn contains(&self, recommendation_id: Uuid) -> bool {
        self.items
            .iter()
            .any(|item| item.recommendation_id == recommendation_id)
    }

    /// Pin a recommendation snapshot. Returns `false` (and leaves the stack
    /// untouched) if the recommendation id is already pinned.
    pub fn pin(&mut self, snapshot: Recommendation) -> bool {
        if self.contains(snapshot.id) {
            return false;
        }
        let now = jiff::Timestamp::now();
        self.items.push(StackItem {
            recommendation_id: snapshot.id,
            snapshot,
            added_at: now,
        });
        self.updated_at = now;
        true
    }

    /// Remove a pinned recommendation. Returns whether anything was removed.
    pub fn unpin(&mut self, recommendation_id: Uuid) -> bool {
        let before = self.items.len();
        self.items
            .retain(|item| item.recommendation_id != recommendation_id);
        let removed = self.items.len() != before;
        if removed {
            self.updated_at = jiff::Timestamp::now();
        }
        removed
    }

    pub fn locked_recommendation_ids(&self) -> HashSet<Uuid> {
        self.items.iter().map(|item| item.recommendation_id).collect()
    }

    /// Supplement ids behind pinned recommendations, read from the snapshots.
    pub fn locked_supplement_ids(&self) -> HashSet<Uuid> {
        self.items
            .iter()
            .map(|item| item.snapshot.supplement_id)
            .collect()
    }
}

/// A pinned recommendation as served to readers.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PinnedRecommendation {
    #[serde(flatten)]
    pub snapshot: Recommendation,
    pub added_at: jiff::Timestamp,
    /// Joined at read time so disclaimer edits reach pinned items.
    pub disclaimer: Option<DisclaimerView>,
}
