//! S3 key/path conventions.
//!
//! Pure string functions with no AWS SDK dependency. These define the canonical
//! layout of objects in the stackwise S3 bucket.

use uuid::Uuid;

pub const SUPPLEMENTS_PREFIX: &str = "supplements/";

pub fn supplement(id: Uuid) -> String {
    format!("supplements/{id}.json")
}

pub fn health_goals(user_id: Uuid) -> String {
    format!("health-goals/{user_id}.json")
}

pub fn onboarding(user_id: Uuid) -> String {
    format!("onboarding/{user_id}.json")
}

pub fn recommendations_prefix(user_id: Uuid) -> String {
    format!("recommendations/{user_id}/")
}

pub fn recommendation(user_id: Uuid, id: Uuid) -> String {
    format!("recommendations/{user_id}/{id}.json")
}

/// Index from a bare recommendation id to its owner, so lookups by id alone
/// don't need to scan every user prefix.
pub fn recommendation_owner(id: Uuid) -> String {
    format!("recommendation-owners/{id}")
}

pub fn recommendation_logs_prefix(user_id: Uuid) -> String {
    format!("recommendation-logs/{user_id}/")
}

/// Log keys lead with a zero-padded millisecond timestamp so a lexicographic
/// listing is chronological.
pub fn recommendation_log(user_id: Uuid, created_at: jiff::Timestamp, id: Uuid) -> String {
    let millis = created_at.as_millisecond().max(0);
    format!("recommendation-logs/{user_id}/{millis:020}-{id}.json")
}

pub fn stack(user_id: Uuid) -> String {
    format!("stacks/{user_id}.json")
}

pub const DISCLAIMERS_PREFIX: &str = "disclaimers/";

pub fn disclaimer(id: Uuid) -> String {
    format!("disclaimers/{id}.json")
}
