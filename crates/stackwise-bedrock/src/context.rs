//! Profile context builder for reranking.
//!
//! Renders what we know about a user (onboarding answers and health-goal
//! thresholds) into a short plain-text paragraph. The paragraph is handed to
//! the reranker and embedded in list-mode insights.

use stackwise_core::models::goal::{HealthGoalRecord, OnboardingRecord};

pub const EMPTY_PROFILE_CONTEXT: &str = "No explicit user profile context provided.";

/// Build the profile context paragraph.
///
/// Onboarding lines come first, then one line per threshold that is set
/// (> 0). Returns [`EMPTY_PROFILE_CONTEXT`] when there is nothing to say.
pub fn build_profile_context(
    onboarding: Option<&OnboardingRecord>,
    goals: Option<&HealthGoalRecord>,
) -> String {
    let mut lines: Vec<String> = Vec::new();

    if let Some(o) = onboarding {
        if let Some(age) = o.age.filter(|a| *a > 0) {
            lines.push(format!("Age: {age}"));
        }
        if let Some(gender) = non_blank(o.gender.as_deref()) {
            lines.push(format!("Gender: {gender}"));
        }
        if let Some(weight) = o.weight.filter(|w| *w > 0.0) {
            let unit = non_blank(o.weight_unit.as_deref()).unwrap_or("kg");
            lines.push(format!("Weight: {weight}{unit}"));
        }
        if let Some(height) = o.height.filter(|h| *h > 0.0) {
            let unit = non_blank(o.height_unit.as_deref()).unwrap_or("cm");
            lines.push(format!("Height: {height}{unit}"));
        }
        if let Some(level) = non_blank(o.activity_level.as_deref()) {
            lines.push(format!("Activity level: {level}"));
        }
        if !o.goals.is_empty() {
            let joined: Vec<&str> = o.goals.iter().map(|g| g.as_str()).collect();
            lines.push(format!("Goals from onboarding: {}", joined.join(", ")));
        }
    }

    if let Some(g) = goals {
        if g.sleep_target > 0.0 {
            lines.push(format!(
                "Wants to improve sleep ({} hrs target)",
                g.sleep_target
            ));
        }
        if g.water_intake > 0.0 {
            lines.push(format!("Wants better hydration ({} ml)", g.water_intake));
        }
        if g.weight_target > 0.0 {
            lines.push(format!("Weight target: {} kg", g.weight_target));
        }
        if g.daily_steps > 0.0 {
            lines.push(format!("Daily steps goal: {}", g.daily_steps));
        }
        if g.calories > 0.0 {
            lines.push(format!("Calorie goal: {}", g.calories));
        }
    }

    if lines.is_empty() {
        EMPTY_PROFILE_CONTEXT.to_string()
    } else {
        format!("User Profile Context:\n{}", lines.join("\n"))
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}
