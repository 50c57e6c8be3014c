pub mod health;
pub mod recommendations;
pub mod stack;

use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

/// `?user_id=` on read routes.
#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: Option<Uuid>,
}

impl UserQuery {
    pub fn require(&self) -> Result<Uuid, ApiError> {
        self.user_id
            .ok_or_else(|| ApiError::BadRequest("user_id is required".to_string()))
    }
}
