//! Optimistic read-modify-write of a user's stack document.
//!
//! [`pin`] and [`unpin`] load the document with its ETag, apply the change
//! and save it back conditionally. A `PreconditionFailed` save means another
//! writer got there first; the whole cycle is retried from a fresh load.

use async_trait::async_trait;
use tracing::warn;
use uuid::Uuid;

use stackwise_core::models::recommendation::Recommendation;
use stackwise_core::models::stack::Stack;
use stackwise_core::s3_keys;

use crate::error::StorageError;
use crate::state::Versioned;

/// Attempts at a read-modify-write of the stack document before giving up.
pub const MAX_STACK_ATTEMPTS: usize = 5;

/// Versioned storage for one stack document per user.
#[async_trait]
pub trait StackDocument: Send + Sync {
    async fn load(&self, user_id: Uuid) -> Result<Option<Versioned<Stack>>, StorageError>;

    /// Save `stack`. `expected_etag` of `None` means the document must not
    /// exist yet. Returns the new ETag.
    async fn save(
        &self,
        user_id: Uuid,
        stack: &Stack,
        expected_etag: Option<&str>,
    ) -> Result<String, StorageError>;
}

/// Pin `snapshot`, failing with `Conflict` if the freshly loaded stack
/// already holds it.
pub async fn pin<D: StackDocument + ?Sized>(
    doc: &D,
    user_id: Uuid,
    snapshot: Recommendation,
) -> Result<Stack, StorageError> {
    for attempt in 1..=MAX_STACK_ATTEMPTS {
        let (mut stack, etag) = match doc.load(user_id).await? {
            Some(v) => (v.value, Some(v.etag)),
            None => (Stack::new(user_id), None),
        };

        if !stack.pin(snapshot.clone()) {
            return Err(StorageError::Conflict {
                key: s3_keys::stack(user_id),
                reason: format!("recommendation {} is already pinned", snapshot.id),
            });
        }

        match doc.save(user_id, &stack, etag.as_deref()).await {
            Ok(_) => return Ok(stack),
            Err(StorageError::PreconditionFailed { .. }) => {
                warn!(%user_id, attempt, "stack changed during pin, retrying");
            }
            Err(e) => return Err(e),
        }
    }

    Err(StorageError::PreconditionFailed {
        key: s3_keys::stack(user_id),
    })
}

/// Unpin `recommendation_id`. Returns `None` when the user has no stack.
/// Nothing is written when the id was not pinned.
pub async fn unpin<D: StackDocument + ?Sized>(
    doc: &D,
    user_id: Uuid,
    recommendation_id: Uuid,
) -> Result<Option<Stack>, StorageError> {
    for attempt in 1..=MAX_STACK_ATTEMPTS {
        let Some(versioned) = doc.load(user_id).await? else {
            return Ok(None);
        };
        let mut stack = versioned.value;
        if !stack.unpin(recommendation_id) {
            return Ok(Some(stack));
        }

        match doc.save(user_id, &stack, Some(&versioned.etag)).await {
            Ok(_) => return Ok(Some(stack)),
            Err(StorageError::PreconditionFailed { .. }) => {
                warn!(%user_id, attempt, "stack changed during unpin, retrying");
            }
            Err(e) => return Err(e),
        }
    }

    Err(StorageError::PreconditionFailed {
        key: s3_keys::stack(user_id),
    })
}
