use stackwise_core::models::recommendation::ConfidenceLabel;

/// Hard floor applied after the goal-count bands.
pub const MIN_CONFIDENCE: i64 = 15;
/// Hard ceiling.
pub const MAX_CONFIDENCE: i64 = 100;

/// A bounded confidence percentage and its label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confidence {
    pub score: u8,
    pub label: ConfidenceLabel,
}

impl Confidence {
    pub fn new(score: u8) -> Self {
        Self {
            score,
            label: ConfidenceLabel::from_score(score),
        }
    }
}

/// Minimum confidence for a given number of matched goals.
fn goal_band_floor(matched_goals: usize) -> Option<i64> {
    match matched_goals {
        0 => None,
        1 => Some(45),
        2 => Some(60),
        _ => Some(75),
    }
}

/// Rule-based confidence: the rounded score, lifted to the band floor for
/// the matched-goal count, then clamped to `[15, 100]`.
///
/// A single matched goal scores 30 and reports 45.
pub fn rule_confidence(score: f64, matched_goals: usize) -> Confidence {
    let mut conf = if score.is_finite() {
        score.round() as i64
    } else {
        0
    };

    if let Some(floor) = goal_band_floor(matched_goals) {
        conf = conf.max(floor);
    }

    let conf = conf.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE);
    Confidence::new(conf as u8)
}

/// Normalize a confidence supplied by the external ranking step.
///
/// Returns `None` for absent or non-finite values so callers fall back to the
/// rule. Finite values are clamped to `[0, 100]` and rounded.
pub fn external_confidence(value: Option<f64>) -> Option<Confidence> {
    let value = value.filter(|v| v.is_finite())?;
    Some(Confidence::new(value.clamp(0.0, 100.0).round() as u8))
}

/// Pick the confidence to report, in order of precedence:
///
/// 1. the external value, when the external step ran and gave a finite number;
/// 2. the rule-based value.
pub fn resolve(
    external_used: bool,
    external: Option<f64>,
    score: u32,
    matched_goals: usize,
) -> Confidence {
    external_used
        .then(|| external_confidence(external))
        .flatten()
        .unwrap_or_else(|| rule_confidence(f64::from(score), matched_goals))
}
