use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// A normalized health-objective tag used to match supplements.
///
/// The five named variants form the fixed vocabulary derived from health-goal
/// thresholds. Onboarding answers may carry other strings; those pass through
/// as [`Goal::Other`] and match nothing in the keyword table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Goal {
    BetterSleep,
    Hydration,
    WeightManagement,
    ActiveLifestyle,
    CalorieControl,
    Other(String),
}

impl Goal {
    pub fn as_str(&self) -> &str {
        match self {
            Goal::BetterSleep => "Better Sleep",
            Goal::Hydration => "Hydration",
            Goal::WeightManagement => "Weight Management",
            Goal::ActiveLifestyle => "Active Lifestyle",
            Goal::CalorieControl => "Calorie Control",
            Goal::Other(s) => s,
        }
    }
}

impl From<String> for Goal {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Better Sleep" => Goal::BetterSleep,
            "Hydration" => Goal::Hydration,
            "Weight Management" => Goal::WeightManagement,
            "Active Lifestyle" => Goal::ActiveLifestyle,
            "Calorie Control" => Goal::CalorieControl,
            _ => Goal::Other(s),
        }
    }
}

impl From<&str> for Goal {
    fn from(s: &str) -> Self {
        Goal::from(s.to_string())
    }
}

impl From<Goal> for String {
    fn from(goal: Goal) -> Self {
        match goal {
            Goal::Other(s) => s,
            named => named.as_str().to_string(),
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numeric health targets a user has set. A field counts as "set" when > 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct HealthGoalRecord {
    pub user_id: Uuid,
    pub daily_steps: f64,
    pub calories: f64,
    /// Millilitres per day.
    pub water_intake: f64,
    /// Hours per night.
    pub sleep_target: f64,
    /// Kilograms.
    pub weight_target: f64,
}

/// Answers collected during onboarding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct OnboardingRecord {
    pub user_id: Uuid,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub weight: Option<f64>,
    pub weight_unit: Option<String>,
    pub height: Option<f64>,
    pub height_unit: Option<String>,
    pub activity_level: Option<String>,
    /// Goal strings chosen by the user, already validated upstream.
    #[serde(rename = "goal")]
    #[ts(type = "Array<string>")]
    pub goals: Vec<Goal>,
}
