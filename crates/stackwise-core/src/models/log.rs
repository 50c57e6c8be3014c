use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use super::recommendation::RecommendationAction;

/// One append-only row of the recommendation lifecycle log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RecommendationLogEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub supplement_id: Uuid,
    pub action: RecommendationAction,
    pub meta: Option<serde_json::Value>,
    pub created_at: jiff::Timestamp,
}

impl RecommendationLogEntry {
    pub fn new(user_id: Uuid, supplement_id: Uuid, action: RecommendationAction) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            supplement_id,
            action,
            meta: None,
            created_at: jiff::Timestamp::now(),
        }
    }

    pub fn with_meta(mut self, meta: serde_json::Value) -> Self {
        self.meta = Some(meta);
        self
    }
}
