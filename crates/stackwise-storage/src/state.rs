use aws_sdk_s3::Client;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::StorageError;
use crate::objects;

/// A JSON document loaded from S3 together with its ETag.
pub struct Versioned<T> {
    pub value: T,
    pub etag: String,
}

/// Load a JSON document. Returns `None` if the key does not exist.
pub async fn load_json<T: DeserializeOwned>(
    client: &Client,
    bucket: &str,
    key: &str,
) -> Result<Option<T>, StorageError> {
    Ok(load_versioned(client, bucket, key)
        .await?
        .map(|versioned| versioned.value))
}

/// Load a JSON document and its ETag. Returns `None` if the key does not exist.
pub async fn load_versioned<T: DeserializeOwned>(
    client: &Client,
    bucket: &str,
    key: &str,
) -> Result<Option<Versioned<T>>, StorageError> {
    let output = match objects::get_object(client, bucket, key).await {
        Ok(output) => output,
        Err(StorageError::NotFound { .. }) => return Ok(None),
        Err(e) => return Err(e),
    };
    let value: T = serde_json::from_slice(&output.body)?;
    Ok(Some(Versioned {
        value,
        etag: output.etag.unwrap_or_default(),
    }))
}

/// Save a JSON document unconditionally. Returns the new ETag.
pub async fn save_json<T: Serialize>(
    client: &Client,
    bucket: &str,
    key: &str,
    value: &T,
) -> Result<String, StorageError> {
    let body = serde_json::to_vec(value)?;
    objects::put_object(client, bucket, key, body).await
}

/// Save a JSON document with ETag optimistic locking.
///
/// `expected_etag` of `None` means the document must not exist yet.
pub async fn save_json_conditional<T: Serialize>(
    client: &Client,
    bucket: &str,
    key: &str,
    value: &T,
    expected_etag: Option<&str>,
) -> Result<String, StorageError> {
    let body = serde_json::to_vec(value)?;
    match expected_etag {
        Some(etag) => objects::put_object_if_match(client, bucket, key, body, etag).await,
        None => objects::put_object_if_absent(client, bucket, key, body).await,
    }
}
