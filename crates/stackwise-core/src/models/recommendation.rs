use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use super::disclaimer::DisclaimerView;
use super::goal::Goal;
use super::supplement::Supplement;
use crate::error::CoreError;

/// Whether a recommendation was chosen by the external ranking step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum RecommendationTag {
    #[serde(rename = "AI Selected")]
    AiSelected,
    #[serde(rename = "Smart Suggestion")]
    SmartSuggestion,
}

impl RecommendationTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationTag::AiSelected => "AI Selected",
            RecommendationTag::SmartSuggestion => "Smart Suggestion",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ConfidenceLabel {
    Low,
    Medium,
    High,
}

impl ConfidenceLabel {
    /// High at 70 and above, Medium at 40 and above, Low otherwise.
    pub fn from_score(score: u8) -> Self {
        if score >= 70 {
            ConfidenceLabel::High
        } else if score >= 40 {
            ConfidenceLabel::Medium
        } else {
            ConfidenceLabel::Low
        }
    }
}

/// Lifecycle action recorded on recommendations and log entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum RecommendationAction {
    Suggested,
    Disliked,
    Added,
    ListSuggested,
}

impl RecommendationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationAction::Suggested => "suggested",
            RecommendationAction::Disliked => "disliked",
            RecommendationAction::Added => "added",
            RecommendationAction::ListSuggested => "list_suggested",
        }
    }
}

impl fmt::Display for RecommendationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecommendationAction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "suggested" => Ok(RecommendationAction::Suggested),
            "disliked" => Ok(RecommendationAction::Disliked),
            "added" => Ok(RecommendationAction::Added),
            "list_suggested" => Ok(RecommendationAction::ListSuggested),
            other => Err(CoreError::InvalidAction(other.to_string())),
        }
    }
}

/// The user-facing shape of one recommendation, as produced by the ranker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RecommendationPayload {
    pub supplement: Supplement,
    pub confidence_score: u8,
    pub confidence_label: ConfidenceLabel,
    #[ts(type = "Array<string>")]
    pub matched_goals: Vec<Goal>,
    pub recommendation_tag: RecommendationTag,
    pub ai_insight: Option<String>,
    /// Only set in list mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub reason: Option<String>,
}

/// A persisted recommendation row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Recommendation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub supplement_id: Uuid,
    /// Snapshot of the catalog entry at generation time.
    pub supplement: Supplement,
    pub recommendation_tag: RecommendationTag,
    pub confidence_score: u8,
    pub confidence_label: ConfidenceLabel,
    #[ts(type = "Array<string>")]
    pub matched_goals: Vec<Goal>,
    pub ai_insight: Option<String>,
    pub reason: Option<String>,
    pub action: RecommendationAction,
    /// Random sort key in `[0, 1)` giving a stable shuffled page order.
    pub shuffle_key: f64,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
}

impl Recommendation {
    pub fn from_payload(
        user_id: Uuid,
        payload: RecommendationPayload,
        action: RecommendationAction,
        shuffle_key: f64,
    ) -> Self {
        let now = jiff::Timestamp::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            supplement_id: payload.supplement.id,
            supplement: payload.supplement,
            recommendation_tag: payload.recommendation_tag,
            confidence_score: payload.confidence_score,
            confidence_label: payload.confidence_label,
            matched_goals: payload.matched_goals,
            ai_insight: payload.ai_insight,
            reason: payload.reason,
            action,
            shuffle_key,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn payload(&self) -> RecommendationPayload {
        RecommendationPayload {
            supplement: self.supplement.clone(),
            confidence_score: self.confidence_score,
            confidence_label: self.confidence_label,
            matched_goals: self.matched_goals.clone(),
            recommendation_tag: self.recommendation_tag,
            ai_insight: self.ai_insight.clone(),
            reason: self.reason.clone(),
        }
    }
}

/// A recommendation row as served to list readers, with the active disclaimer joined in.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RecommendationView {
    #[serde(flatten)]
    pub recommendation: Recommendation,
    pub disclaimer: Option<DisclaimerView>,
}

/// A freshly persisted single suggestion, returned with its row id.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PersistedSuggestion {
    pub id: Uuid,
    #[serde(flatten)]
    pub payload: RecommendationPayload,
}
