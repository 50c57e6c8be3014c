use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use stackwise_core::models::stack::{PinnedRecommendation, Stack};

use crate::error::ApiError;
use crate::routes::UserQuery;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StackBody {
    pub user_id: Option<Uuid>,
    pub supplement_recommendation_id: Option<Uuid>,
}

impl StackBody {
    fn require(&self) -> Result<(Uuid, Uuid), ApiError> {
        match (self.user_id, self.supplement_recommendation_id) {
            (Some(user_id), Some(recommendation_id)) => Ok((user_id, recommendation_id)),
            _ => Err(ApiError::BadRequest(
                "user_id and supplement_recommendation_id are required".to_string(),
            )),
        }
    }
}

pub async fn add_to_stack(
    State(state): State<AppState>,
    Json(body): Json<StackBody>,
) -> Result<Json<Stack>, ApiError> {
    let (user_id, recommendation_id) = body.require()?;
    let stack = state
        .engine
        .add_to_stack(user_id, recommendation_id)
        .await?;
    Ok(Json(stack))
}

pub async fn remove_from_stack(
    State(state): State<AppState>,
    Json(body): Json<StackBody>,
) -> Result<Json<Stack>, ApiError> {
    let (user_id, recommendation_id) = body.require()?;
    let stack = state
        .engine
        .remove_from_stack(user_id, recommendation_id)
        .await?;
    Ok(Json(stack))
}

pub async fn get_stack(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<PinnedRecommendation>>, ApiError> {
    let user_id = query.require()?;
    Ok(Json(state.engine.get_stack(user_id).await?))
}
