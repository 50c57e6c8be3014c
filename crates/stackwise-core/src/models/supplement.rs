use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// A catalog supplement eligible for recommendation.
///
/// Owned by the catalog; the recommendation engine only reads it and copies
/// it into recommendation snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Supplement {
    pub id: Uuid,
    #[serde(alias = "productName")]
    pub name: String,
    #[serde(default)]
    pub brand_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub claims: Vec<String>,
    #[serde(default)]
    pub usage_groups: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default = "default_available")]
    pub is_available: bool,
    #[serde(default)]
    pub image: Option<String>,
}

fn default_available() -> bool {
    true
}

impl Supplement {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            brand_name: None,
            description: Some(description.into()),
            claims: Vec::new(),
            usage_groups: Vec::new(),
            warnings: Vec::new(),
            is_available: true,
            image: None,
        }
    }

    /// Lowercased `name + " " + description`, the text keywords are matched against.
    pub fn search_text(&self) -> String {
        format!(
            "{} {}",
            self.name,
            self.description.as_deref().unwrap_or_default()
        )
        .to_lowercase()
    }
}
