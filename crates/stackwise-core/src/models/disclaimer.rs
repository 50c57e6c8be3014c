use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum DisclaimerType {
    #[serde(rename = "medicine_disclaimer")]
    Medicine,
    #[serde(rename = "vaccine_disclaimer")]
    Vaccine,
    #[serde(rename = "supplement_disclaimer")]
    Supplement,
    #[serde(rename = "supplement_recommendation_disclaimer")]
    SupplementRecommendation,
}

impl DisclaimerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisclaimerType::Medicine => "medicine_disclaimer",
            DisclaimerType::Vaccine => "vaccine_disclaimer",
            DisclaimerType::Supplement => "supplement_disclaimer",
            DisclaimerType::SupplementRecommendation => "supplement_recommendation_disclaimer",
        }
    }
}

impl fmt::Display for DisclaimerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisclaimerType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "medicine_disclaimer" => Ok(DisclaimerType::Medicine),
            "vaccine_disclaimer" => Ok(DisclaimerType::Vaccine),
            "supplement_disclaimer" => Ok(DisclaimerType::Supplement),
            "supplement_recommendation_disclaimer" => Ok(DisclaimerType::SupplementRecommendation),
            other => Err(CoreError::InvalidDisclaimerType(other.to_string())),
        }
    }
}

/// Admin-managed disclaimer text. The newest active record of a type wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Disclaimer {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub disclaimer_type: DisclaimerType,
    pub title: String,
    pub content: String,
    pub is_active: bool,
    pub created_at: jiff::Timestamp,
}

/// The slice of a disclaimer joined onto recommendation reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DisclaimerView {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub disclaimer_type: DisclaimerType,
    pub title: String,
    pub content: String,
    pub is_active: bool,
}

impl From<&Disclaimer> for DisclaimerView {
    fn from(d: &Disclaimer) -> Self {
        Self {
            id: d.id,
            disclaimer_type: d.disclaimer_type,
            title: d.title.clone(),
            content: d.content.clone(),
            is_active: d.is_active,
        }
    }
}

/// Join an optional disclaimer, dropping it unless it is active.
pub fn active_view(disclaimer: Option<&Disclaimer>) -> Option<DisclaimerView> {
    disclaimer.filter(|d| d.is_active).map(DisclaimerView::from)
}
