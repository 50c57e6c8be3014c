//! Tolerant normalization of a model's reranking answer.
//!
//! Models are asked for strict JSON but do not always comply. We accept, in
//! order: the whole reply as JSON, the first `{...}` span as JSON, and
//! finally field-by-field regex extraction.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use uuid::Uuid;

use stackwise_core::models::supplement::Supplement;

use crate::rerank::RerankOutcome;

static BEST_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)"bestId"\s*:\s*"?([^",}]+)"?"#).expect("valid regex"));
static INSIGHT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)"insight"\s*:\s*"([^"]*)""#).expect("valid regex"));
static CONFIDENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)"confidence"\s*:\s*(-?[0-9]+(?:\.[0-9]+)?)"#).expect("valid regex")
});

#[derive(Debug, Default, Deserialize)]
struct RawAnswer {
    #[serde(rename = "bestId", alias = "best_id")]
    best_id: Option<serde_json::Value>,
    insight: Option<String>,
    confidence: Option<serde_json::Value>,
}

/// Normalize a raw model reply into a [`RerankOutcome`] against the
/// candidates that were offered.
///
/// The outcome is always marked as used: the model did answer, even if
/// nothing useful could be read from it.
pub fn parse_rerank_answer(raw: &str, candidates: &[Supplement]) -> RerankOutcome {
    let answer = parse_json(raw).unwrap_or_else(|| extract_fields(raw));

    let best_id = answer
        .best_id
        .as_ref()
        .and_then(value_as_text)
        .and_then(|text| resolve_best_id(&text, candidates));

    let confidence = answer
        .confidence
        .as_ref()
        .and_then(value_as_f64)
        .filter(|c| c.is_finite())
        .map(|c| c.clamp(0.0, 100.0));

    let insight = answer
        .insight
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    RerankOutcome {
        best_id,
        insight,
        confidence,
        used: true,
    }
}

fn parse_json(raw: &str) -> Option<RawAnswer> {
    if let Ok(answer) = serde_json::from_str(raw.trim()) {
        return Some(answer);
    }
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&raw[start..=end]).ok()
}

fn extract_fields(raw: &str) -> RawAnswer {
    let capture = |re: &Regex| {
        re.captures(raw)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
    };
    RawAnswer {
        best_id: capture(&BEST_ID).map(serde_json::Value::String),
        insight: capture(&INSIGHT),
        confidence: capture(&CONFIDENCE).map(serde_json::Value::String),
    }
}

fn value_as_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_as_f64(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Map whatever the model put in `bestId` onto a candidate id.
///
/// Accepts an exact candidate id, a 1-based position in the offered list, or
/// a product name (case-insensitive).
fn resolve_best_id(text: &str, candidates: &[Supplement]) -> Option<Uuid> {
    if let Ok(id) = Uuid::parse_str(text)
        && candidates.iter().any(|c| c.id == id)
    {
        return Some(id);
    }

    if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
        let index: usize = text.parse().ok()?;
        return index
            .checked_sub(1)
            .and_then(|i| candidates.get(i))
            .map(|c| c.id);
    }

    candidates
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(text))
        .map(|c| c.id)
}
