use std::collections::HashSet;

use stackwise_core::models::goal::{Goal, HealthGoalRecord, OnboardingRecord};

/// Keywords that mark a supplement as serving a goal.
///
/// Matching is a case-insensitive substring test against the supplement's
/// name and description. Goals outside the fixed vocabulary have no keywords.
pub fn keywords(goal: &Goal) -> &'static [&'static str] {
    match goal {
        Goal::BetterSleep => &[
            "sleep",
            "insomnia",
            "melatonin",
            "magnesium",
            "glycine",
            "l-theanine",
        ],
        Goal::Hydration => &[
            "hydration",
            "electrolyte",
            "electrolytes",
            "sodium",
            "potassium",
        ],
        Goal::WeightManagement => &[
            "weight",
            "fat burn",
            "metabolism",
            "appetite",
            "glucomannan",
            "garcinia",
        ],
        Goal::ActiveLifestyle => &["endurance", "recovery", "muscle", "stamina", "energy"],
        Goal::CalorieControl => &["calorie", "satiety", "appetite", "fiber"],
        Goal::Other(_) => &[],
    }
}

/// Goals implied by the thresholds a user has set (> 0), in a fixed order.
pub fn derive_from_thresholds(record: Option<&HealthGoalRecord>) -> Vec<Goal> {
    let Some(record) = record else {
        return Vec::new();
    };

    [
        (record.sleep_target, Goal::BetterSleep),
        (record.water_intake, Goal::Hydration),
        (record.weight_target, Goal::WeightManagement),
        (record.daily_steps, Goal::ActiveLifestyle),
        (record.calories, Goal::CalorieControl),
    ]
    .into_iter()
    .filter(|(target, _)| *target > 0.0)
    .map(|(_, goal)| goal)
    .collect()
}

/// The onboarding goal list, verbatim.
pub fn derive_from_onboarding(record: Option<&OnboardingRecord>) -> Vec<Goal> {
    record.map(|r| r.goals.clone()).unwrap_or_default()
}

/// Set union keeping first-occurrence order.
pub fn union(first: Vec<Goal>, second: Vec<Goal>) -> Vec<Goal> {
    let mut seen = HashSet::new();
    first
        .into_iter()
        .chain(second)
        .filter(|goal| seen.insert(goal.clone()))
        .collect()
}

/// Goals from both sources, deduplicated.
pub fn derive_combined(
    thresholds: Option<&HealthGoalRecord>,
    onboarding: Option<&OnboardingRecord>,
) -> Vec<Goal> {
    union(
        derive_from_thresholds(thresholds),
        derive_from_onboarding(onboarding),
    )
}
