//! S3-backed stores. One JSON object per record, laid out by [`s3_keys`].

use std::collections::HashSet;

use async_trait::async_trait;
use aws_sdk_s3::Client;
use tracing::info;
use uuid::Uuid;

use stackwise_core::models::disclaimer::{Disclaimer, DisclaimerType};
use stackwise_core::models::goal::{HealthGoalRecord, OnboardingRecord};
use stackwise_core::models::log::RecommendationLogEntry;
use stackwise_core::models::recommendation::{Recommendation, RecommendationAction};
use stackwise_core::models::stack::Stack;
use stackwise_core::models::supplement::Supplement;
use stackwise_core::s3_keys;

use crate::error::StorageError;
use crate::objects;
use crate::stack_doc::{self, StackDocument};
use crate::state::{load_json, load_versioned, save_json, save_json_conditional, Versioned};
use crate::store::{
    shuffle_order, CatalogStore, DisclaimerStore, GoalStore, LogStore, RecommendationStore,
    StackStore,
};

#[derive(Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    async fn load_all<T: serde::de::DeserializeOwned>(
        &self,
        keys: &[String],
    ) -> Result<Vec<T>, StorageError> {
        let mut out = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(value) = load_json(&self.client, &self.bucket, key).await? {
                out.push(value);
            }
        }
        Ok(out)
    }

    async fn user_recommendations(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Recommendation>, StorageError> {
        let keys = json_keys(
            objects::list_objects(
                &self.client,
                &self.bucket,
                &s3_keys::recommendations_prefix(user_id),
            )
            .await?,
        );
        self.load_all(&keys).await
    }

    async fn delete_recommendation(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<(), StorageError> {
        objects::delete_object(&self.client, &self.bucket, &s3_keys::recommendation(user_id, id))
            .await?;
        objects::delete_object(&self.client, &self.bucket, &s3_keys::recommendation_owner(id))
            .await
    }
}

fn json_keys(keys: Vec<String>) -> Vec<String> {
    keys.into_iter().filter(|k| k.ends_with(".json")).collect()
}

#[async_trait]
impl GoalStore for S3Store {
    async fn health_goals(&self, user_id: Uuid) -> Result<Option<HealthGoalRecord>, StorageError> {
        load_json(&self.client, &self.bucket, &s3_keys::health_goals(user_id)).await
    }

    async fn onboarding(&self, user_id: Uuid) -> Result<Option<OnboardingRecord>, StorageError> {
        load_json(&self.client, &self.bucket, &s3_keys::onboarding(user_id)).await
    }

    async fn put_health_goals(&self, record: HealthGoalRecord) -> Result<(), StorageError> {
        let key = s3_keys::health_goals(record.user_id);
        save_json(&self.client, &self.bucket, &key, &record).await?;
        Ok(())
    }

    async fn put_onboarding(&self, record: OnboardingRecord) -> Result<(), StorageError> {
        let key = s3_keys::onboarding(record.user_id);
        save_json(&self.client, &self.bucket, &key, &record).await?;
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for S3Store {
    async fn available(
        &self,
        exclude: &HashSet<Uuid>,
        limit: usize,
    ) -> Result<Vec<Supplement>, StorageError> {
        let keys = json_keys(
            objects::list_objects(&self.client, &self.bucket, s3_keys::SUPPLEMENTS_PREFIX).await?,
        );

        let mut out = Vec::new();
        for key in keys {
            if out.len() >= limit {
                break;
            }
            let Some(supplement) =
                load_json::<Supplement>(&self.client, &self.bucket, &key).await?
            else {
                continue;
            };
            if supplement.is_available && !exclude.contains(&supplement.id) {
                out.push(supplement);
            }
        }
        Ok(out)
    }

    async fn put_supplement(&self, supplement: Supplement) -> Result<(), StorageError> {
        let key = s3_keys::supplement(supplement.id);
        save_json(&self.client, &self.bucket, &key, &supplement).await?;
        Ok(())
    }
}

#[async_trait]
impl RecommendationStore for S3Store {
    async fn get(&self, id: Uuid) -> Result<Option<Recommendation>, StorageError> {
        let owner_key = s3_keys::recommendation_owner(id);
        let Some(user_id) = load_json::<Uuid>(&self.client, &self.bucket, &owner_key).await?
        else {
            return Ok(None);
        };
        load_json(
            &self.client,
            &self.bucket,
            &s3_keys::recommendation(user_id, id),
        )
        .await
    }

    async fn insert(&self, recommendation: Recommendation) -> Result<(), StorageError> {
        let key = s3_keys::recommendation(recommendation.user_id, recommendation.id);
        save_json(&self.client, &self.bucket, &key, &recommendation).await?;
        save_json(
            &self.client,
            &self.bucket,
            &s3_keys::recommendation_owner(recommendation.id),
            &recommendation.user_id,
        )
        .await?;
        Ok(())
    }

    async fn insert_many(&self, recommendations: Vec<Recommendation>) -> Result<(), StorageError> {
        for recommendation in recommendations {
            self.insert(recommendation).await?;
        }
        Ok(())
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, StorageError> {
        let key = s3_keys::recommendation(user_id, id);
        let existing: Option<Recommendation> = load_json(&self.client, &self.bucket, &key).await?;
        if existing.is_none() {
            return Ok(false);
        }
        self.delete_recommendation(user_id, id).await?;
        Ok(true)
    }

    async fn delete_by_action_except(
        &self,
        user_id: Uuid,
        action: RecommendationAction,
        keep: &HashSet<Uuid>,
    ) -> Result<usize, StorageError> {
        let mut deleted = 0;
        for recommendation in self.user_recommendations(user_id).await? {
            if recommendation.action != action || keep.contains(&recommendation.id) {
                continue;
            }
            self.delete_recommendation(user_id, recommendation.id).await?;
            deleted += 1;
        }
        info!(%user_id, action = %action, deleted, "recommendations purged");
        Ok(deleted)
    }

    async fn page(
        &self,
        user_id: Uuid,
        exclude: &HashSet<Uuid>,
        offset: usize,
        limit: usize,
    ) -> Result<(Vec<Recommendation>, u64), StorageError> {
        let mut rows: Vec<Recommendation> = self
            .user_recommendations(user_id)
            .await?
            .into_iter()
            .filter(|r| !exclude.contains(&r.id))
            .collect();
        rows.sort_by(shuffle_order);

        let total = rows.len() as u64;
        let page = rows.into_iter().skip(offset).take(limit).collect();
        Ok((page, total))
    }
}

#[async_trait]
impl LogStore for S3Store {
    async fn append(&self, entry: RecommendationLogEntry) -> Result<(), StorageError> {
        let key = s3_keys::recommendation_log(entry.user_id, entry.created_at, entry.id);
        save_json(&self.client, &self.bucket, &key, &entry).await?;
        Ok(())
    }

    async fn recent(
        &self,
        user_id: Uuid,
        action: RecommendationAction,
        limit: usize,
    ) -> Result<Vec<RecommendationLogEntry>, StorageError> {
        let mut keys = json_keys(
            objects::list_objects(
                &self.client,
                &self.bucket,
                &s3_keys::recommendation_logs_prefix(user_id),
            )
            .await?,
        );
        keys.reverse();

        let mut out = Vec::new();
        for key in keys {
            if out.len() >= limit {
                break;
            }
            let Some(entry) =
                load_json::<RecommendationLogEntry>(&self.client, &self.bucket, &key).await?
            else {
                continue;
            };
            if entry.action == action {
                out.push(entry);
            }
        }
        Ok(out)
    }
}

#[async_trait]
impl StackStore for S3Store {
    async fn get(&self, user_id: Uuid) -> Result<Option<Stack>, StorageError> {
        load_json(&self.client, &self.bucket, &s3_keys::stack(user_id)).await
    }

    async fn pin(&self, user_id: Uuid, snapshot: Recommendation) -> Result<Stack, StorageError> {
        stack_doc::pin(self, user_id, snapshot).await
    }

    async fn unpin(
        &self,
        user_id: Uuid,
        recommendation_id: Uuid,
    ) -> Result<Option<Stack>, StorageError> {
        stack_doc::unpin(self, user_id, recommendation_id).await
    }
}

#[async_trait]
impl StackDocument for S3Store {
    async fn load(&self, user_id: Uuid) -> Result<Option<Versioned<Stack>>, StorageError> {
        load_versioned(&self.client, &self.bucket, &s3_keys::stack(user_id)).await
    }

    async fn save(
        &self,
        user_id: Uuid,
        stack: &Stack,
        expected_etag: Option<&str>,
    ) -> Result<String, StorageError> {
        let key = s3_keys::stack(user_id);
        save_json_conditional(&self.client, &self.bucket, &key, stack, expected_etag).await
    }
}

#[async_trait]
impl DisclaimerStore for S3Store {
    async fn active(
        &self,
        disclaimer_type: DisclaimerType,
    ) -> Result<Option<Disclaimer>, StorageError> {
        let keys = json_keys(
            objects::list_objects(&self.client, &self.bucket, s3_keys::DISCLAIMERS_PREFIX).await?,
        );
        let disclaimers: Vec<Disclaimer> = self.load_all(&keys).await?;
        Ok(disclaimers
            .into_iter()
            .filter(|d| d.disclaimer_type == disclaimer_type && d.is_active)
            .max_by_key(|d| d.created_at))
    }

    async fn put(&self, disclaimer: Disclaimer) -> Result<(), StorageError> {
        let key = s3_keys::disclaimer(disclaimer.id);
        save_json(&self.client, &self.bucket, &key, &disclaimer).await?;
        Ok(())
    }
}
