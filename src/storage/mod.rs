//! Object storage integration.
//!
//! File bytes never pass through this service: the store only issues
//! time-boxed pre-signed PUT URLs that clients upload against directly.
//! Listing and deletion exist solely for the reconciliation sweep that
//! reclaims objects whose dataset row never materialized.

pub mod reconcile;
pub mod s3;

pub use reconcile::ReconciliationSweep;
pub use s3::S3ObjectStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage is not configured: {0}")]
    NotConfigured(String),
    #[error("invalid storage endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("failed to sign request: {0}")]
    Signing(String),
    #[error("storage request failed: {0}")]
    Request(String),
}

/// One object as reported by a bucket listing.
#[derive(Clone, Debug, PartialEq)]
pub struct StoredObject {
    pub key: String,
    pub last_modified: DateTime<Utc>,
}

/// Pre-signed upload broker backed by an S3-compatible object store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Returns a credential-free URL authorizing one PUT of `key` with the
    /// given content type, valid for `expires_secs` seconds.
    async fn presigned_put_url(
        &self,
        key: &str,
        content_type: &str,
        expires_secs: u64,
    ) -> Result<String, StorageError>;

    /// Lists every object under `prefix`.
    async fn list_objects(&self, prefix: &str) -> Result<Vec<StoredObject>, StorageError>;

    /// Removes an object. Deleting a key that does not exist is not an
    /// error.
    async fn delete_object(&self, key: &str) -> Result<(), StorageError>;
}

// Re-export MockObjectStore for tests and local development
pub use mock::MockObjectStore;

mod mock {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// In-memory stand-in for the object store. Records every requested key,
    /// hands back fake URLs, and keeps a key→timestamp map so the
    /// reconciliation sweep can be exercised without a bucket. Can be
    /// switched into a failing mode for downstream-failure paths.
    pub struct MockObjectStore {
        pub requests: Arc<Mutex<Vec<String>>>,
        pub objects: Arc<Mutex<Vec<StoredObject>>>,
        fail: bool,
    }

    impl MockObjectStore {
        pub fn new() -> Self {
            Self {
                requests: Arc::new(Mutex::new(Vec::new())),
                objects: Arc::new(Mutex::new(Vec::new())),
                fail: false,
            }
        }

        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new()
            }
        }

        /// Seeds an object as if a client had uploaded it at `last_modified`.
        pub fn put_object(&self, key: &str, last_modified: DateTime<Utc>) {
            self.objects
                .lock()
                .expect("mock lock poisoned")
                .push(StoredObject {
                    key: key.to_string(),
                    last_modified,
                });
        }

        pub fn keys(&self) -> Vec<String> {
            self.objects
                .lock()
                .expect("mock lock poisoned")
                .iter()
                .map(|o| o.key.clone())
                .collect()
        }
    }

    impl Default for MockObjectStore {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl ObjectStore for MockObjectStore {
        async fn presigned_put_url(
            &self,
            key: &str,
            _content_type: &str,
            expires_secs: u64,
        ) -> Result<String, StorageError> {
            if self.fail {
                return Err(StorageError::NotConfigured("mock failure".to_string()));
            }
            self.requests
                .lock()
                .expect("mock lock poisoned")
                .push(key.to_string());
            Ok(format!(
                "https://mock-storage.invalid/{}?X-Amz-Expires={}",
                key, expires_secs
            ))
        }

        async fn list_objects(&self, prefix: &str) -> Result<Vec<StoredObject>, StorageError> {
            if self.fail {
                return Err(StorageError::Request("mock failure".to_string()));
            }
            Ok(self
                .objects
                .lock()
                .expect("mock lock poisoned")
                .iter()
                .filter(|o| o.key.starts_with(prefix))
                .cloned()
                .collect())
        }

        async fn delete_object(&self, key: &str) -> Result<(), StorageError> {
            if self.fail {
                return Err(StorageError::Request("mock failure".to_string()));
            }
            self.objects
                .lock()
                .expect("mock lock poisoned")
                .retain(|o| o.key != key);
            Ok(())
        }
    }
}
