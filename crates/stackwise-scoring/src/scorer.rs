use serde::Serialize;

use stackwise_core::models::goal::Goal;
use stackwise_core::models::supplement::Supplement;

use crate::goals;

/// Points awarded per matched goal.
pub const POINTS_PER_GOAL: u32 = 30;

/// The outcome of scoring one supplement against a goal set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GoalMatch {
    pub score: u32,
    /// Matched goals in goal-set order.
    pub matched_goals: Vec<Goal>,
}

/// A supplement together with its score. Lives only inside one ranking call.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub supplement: Supplement,
    pub score: u32,
    pub matched_goals: Vec<Goal>,
}

/// Score a supplement: 30 points for every goal with at least one keyword
/// present in the supplement's name or description.
pub fn score_supplement(supplement: &Supplement, goals: &[Goal]) -> GoalMatch {
    let text = supplement.search_text();

    let matched_goals: Vec<Goal> = goals
        .iter()
        .filter(|goal| {
            goals::keywords(goal)
                .iter()
                .any(|kw| text.contains(&kw.to_lowercase()))
        })
        .cloned()
        .collect();

    GoalMatch {
        score: POINTS_PER_GOAL * matched_goals.len() as u32,
        matched_goals,
    }
}

/// Score every candidate and sort by score, highest first.
///
/// The sort is stable: equal scores keep catalog order, so the same inputs
/// always rank the same way.
pub fn rank(candidates: Vec<Supplement>, goals: &[Goal]) -> Vec<ScoredCandidate> {
    let mut scored: Vec<ScoredCandidate> = candidates
        .into_iter()
        .map(|supplement| {
            let GoalMatch {
                score,
                matched_goals,
            } = score_supplement(&supplement, goals);
            ScoredCandidate {
                supplement,
                score,
                matched_goals,
            }
        })
        .collect();

    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored
}
