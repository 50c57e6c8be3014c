use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use stackwise_core::models::page::Page;
use stackwise_core::models::recommendation::{
    PersistedSuggestion, RecommendationPayload, RecommendationView,
};
use stackwise_engine::service::{ListQuery, RefreshRequest};

use crate::error::ApiError;
use crate::routes::UserQuery;
use crate::state::AppState;

pub async fn next_suggestion(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<RecommendationPayload>, ApiError> {
    let user_id = query.require()?;
    state
        .engine
        .next(user_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("No suggestions available".to_string()))
}

#[derive(Debug, Deserialize)]
pub struct RefreshBody {
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub is_dont_like: bool,
    pub disliked_supplement_id: Option<Uuid>,
}

/// Refresh a suggestion. A path segment that is not a recommendation id
/// (a client placeholder such as `none`) refreshes without replacing one.
pub async fn refresh_suggestion(
    State(state): State<AppState>,
    Path(user_reco_id): Path<String>,
    Json(body): Json<RefreshBody>,
) -> Result<Json<PersistedSuggestion>, ApiError> {
    let user_id = body
        .user_id
        .ok_or_else(|| ApiError::BadRequest("user_id is required".to_string()))?;

    state
        .engine
        .refresh(RefreshRequest {
            user_id,
            recommendation_id: Uuid::parse_str(&user_reco_id).ok(),
            is_dont_like: body.is_dont_like,
            disliked_supplement_id: body.disliked_supplement_id,
        })
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("No new suggestions available".to_string()))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub user_id: Option<Uuid>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub generate: Option<u32>,
}

pub async fn list_recommendations(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<RecommendationView>>, ApiError> {
    let user_id = params
        .user_id
        .ok_or_else(|| ApiError::BadRequest("user_id is required".to_string()))?;

    let defaults = ListQuery::default();
    let query = ListQuery {
        page: params.page.unwrap_or(defaults.page),
        limit: params.limit.unwrap_or(defaults.limit),
        generate: params.generate.unwrap_or(defaults.generate),
    };

    Ok(Json(state.engine.list(user_id, query).await?))
}
