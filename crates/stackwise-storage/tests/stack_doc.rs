use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use stackwise_core::models::goal::Goal;
use stackwise_core::models::recommendation::{
    ConfidenceLabel, Recommendation, RecommendationAction, RecommendationPayload,
    RecommendationTag,
};
use stackwise_core::models::stack::Stack;
use stackwise_core::models::supplement::Supplement;
use stackwise_storage::error::StorageError;
use stackwise_storage::objects::conditional_put_error;
use stackwise_storage::stack_doc::{self, StackDocument, MAX_STACK_ATTEMPTS};
use stackwise_storage::state::Versioned;

fn snapshot(user_id: Uuid) -> Recommendation {
    let payload = RecommendationPayload {
        supplement: Supplement::new("Magnesium", "Supports sleep"),
        confidence_score: 45,
        confidence_label: ConfidenceLabel::Medium,
        matched_goals: vec![Goal::BetterSleep],
        recommendation_tag: RecommendationTag::SmartSuggestion,
        ai_insight: None,
        reason: None,
    };
    Recommendation::from_payload(user_id, payload, RecommendationAction::Suggested, 0.5)
}

/// What a rejected save does to the stored document before failing.
enum Race {
    /// Reject without touching the document.
    Reject,
    /// Another writer pins this snapshot first.
    Pin(Recommendation),
}

#[derive(Default)]
struct Doc {
    stored: Option<(Stack, u64)>,
    races: Vec<Race>,
    saves: usize,
}

/// In-process stack document with ETag semantics and scripted save races.
#[derive(Default)]
struct FakeDocument {
    inner: Mutex<Doc>,
}

impl FakeDocument {
    fn with_stack(stack: Stack) -> Self {
        Self {
            inner: Mutex::new(Doc {
                stored: Some((stack, 1)),
                ..Default::default()
            }),
        }
    }

    fn race(self, race: Race) -> Self {
        self.inner.lock().unwrap().races.push(race);
        self
    }

    fn saves(&self) -> usize {
        self.inner.lock().unwrap().saves
    }

    fn stored(&self) -> Option<Stack> {
        self.inner.lock().unwrap().stored.as_ref().map(|(s, _)| s.clone())
    }
}

#[async_trait]
impl StackDocument for FakeDocument {
    async fn load(&self, _user_id: Uuid) -> Result<Option<Versioned<Stack>>, StorageError> {
        let doc = self.inner.lock().unwrap();
        Ok(doc.stored.as_ref().map(|(stack, version)| Versioned {
            value: stack.clone(),
            etag: version.to_string(),
        }))
    }

    async fn save(
        &self,
        user_id: Uuid,
        stack: &Stack,
        expected_etag: Option<&str>,
    ) -> Result<String, StorageError> {
        let mut doc = self.inner.lock().unwrap();
        doc.saves += 1;

        if !doc.races.is_empty() {
            match doc.races.remove(0) {
                Race::Reject => {}
                Race::Pin(other) => {
                    let (mut current, version) = doc
                        .stored
                        .take()
                        .unwrap_or_else(|| (Stack::new(user_id), 0));
                    current.pin(other);
                    doc.stored = Some((current, version + 1));
                }
            }
            return Err(StorageError::PreconditionFailed {
                key: "stack".to_string(),
            });
        }

        let current = doc.stored.as_ref().map(|(_, v)| v.to_string());
        if current.as_deref() != expected_etag {
            return Err(StorageError::PreconditionFailed {
                key: "stack".to_string(),
            });
        }
        let next = doc.stored.as_ref().map_or(1, |(_, v)| v + 1);
        doc.stored = Some((stack.clone(), next));
        Ok(next.to_string())
    }
}

#[tokio::test]
async fn pin_creates_missing_stack() {
    let user = Uuid::new_v4();
    let doc = FakeDocument::default();
    let rec = snapshot(user);

    let stack = stack_doc::pin(&doc, user, rec.clone()).await.unwrap();

    assert!(stack.contains(rec.id));
    assert_eq!(doc.saves(), 1);
    assert!(doc.stored().unwrap().contains(rec.id));
}

#[tokio::test]
async fn pin_retries_after_precondition_failure() {
    let user = Uuid::new_v4();
    let doc = FakeDocument::with_stack(Stack::new(user))
        .race(Race::Reject)
        .race(Race::Reject);
    let rec = snapshot(user);

    let stack = stack_doc::pin(&doc, user, rec.clone()).await.unwrap();

    assert!(stack.contains(rec.id));
    assert_eq!(doc.saves(), 3);
}

#[tokio::test]
async fn pin_keeps_concurrent_writer_changes() {
    let user = Uuid::new_v4();
    let theirs = snapshot(user);
    let doc = FakeDocument::with_stack(Stack::new(user)).race(Race::Pin(theirs.clone()));
    let ours = snapshot(user);

    let stack = stack_doc::pin(&doc, user, ours.clone()).await.unwrap();

    assert!(stack.contains(ours.id));
    assert!(stack.contains(theirs.id));
    assert_eq!(stack.items.len(), 2);
}

#[tokio::test]
async fn pin_gives_up_after_max_attempts() {
    let user = Uuid::new_v4();
    let mut doc = FakeDocument::with_stack(Stack::new(user));
    for _ in 0..MAX_STACK_ATTEMPTS {
        doc = doc.race(Race::Reject);
    }

    let err = stack_doc::pin(&doc, user, snapshot(user)).await.unwrap_err();

    assert!(matches!(err, StorageError::PreconditionFailed { .. }));
    assert_eq!(doc.saves(), MAX_STACK_ATTEMPTS);
    assert!(doc.stored().unwrap().items.is_empty());
}

#[tokio::test]
async fn duplicate_found_after_reload_is_conflict() {
    let user = Uuid::new_v4();
    let rec = snapshot(user);
    let doc = FakeDocument::with_stack(Stack::new(user)).race(Race::Pin(rec.clone()));

    let err = stack_doc::pin(&doc, user, rec.clone()).await.unwrap_err();

    assert!(matches!(err, StorageError::Conflict { .. }));
    assert_eq!(doc.saves(), 1);
    assert_eq!(doc.stored().unwrap().items.len(), 1);
}

#[tokio::test]
async fn unpin_without_stack_is_none() {
    let doc = FakeDocument::default();
    let result = stack_doc::unpin(&doc, Uuid::new_v4(), Uuid::new_v4())
        .await
        .unwrap();
    assert!(result.is_none());
    assert_eq!(doc.saves(), 0);
}

#[tokio::test]
async fn unpin_of_absent_id_skips_write() {
    let user = Uuid::new_v4();
    let mut stack = Stack::new(user);
    stack.pin(snapshot(user));
    let doc = FakeDocument::with_stack(stack);

    let result = stack_doc::unpin(&doc, user, Uuid::new_v4()).await.unwrap();

    assert_eq!(result.unwrap().items.len(), 1);
    assert_eq!(doc.saves(), 0);
}

#[tokio::test]
async fn unpin_retries_after_precondition_failure() {
    let user = Uuid::new_v4();
    let rec = snapshot(user);
    let mut stack = Stack::new(user);
    stack.pin(rec.clone());
    let doc = FakeDocument::with_stack(stack).race(Race::Reject);

    let result = stack_doc::unpin(&doc, user, rec.id).await.unwrap();

    assert!(result.unwrap().items.is_empty());
    assert_eq!(doc.saves(), 2);
    assert!(doc.stored().unwrap().items.is_empty());
}

#[test]
fn conditional_conflicts_map_to_precondition_failed() {
    let precondition = conditional_put_error(
        "stacks/u.json",
        "PreconditionFailed: At least one of the pre-conditions did not hold".to_string(),
    );
    assert!(
        matches!(precondition, StorageError::PreconditionFailed { ref key } if key == "stacks/u.json")
    );

    let raced = conditional_put_error(
        "stacks/u.json",
        "ConditionalRequestConflict: A conflicting conditional operation is in progress"
            .to_string(),
    );
    assert!(matches!(raced, StorageError::PreconditionFailed { .. }));

    let other = conditional_put_error("stacks/u.json", "AccessDenied".to_string());
    assert!(matches!(other, StorageError::PutObject(_)));
}
