//! Key-value backends the blob store runs on.
//!
//! The core only ever needs `get`, `put` and `delete` on opaque string keys;
//! everything else (replication, durability, connection handling) belongs to
//! the backend service and its client crate.

pub mod etcd;
pub mod memory;
pub mod redis;

pub use etcd::EtcdBackend;
pub use memory::MemoryBackend;
pub use redis::RedisBackend;

use crate::error::{BlobError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

/// A flat key-value store with size-limited byte values.
///
/// `put` overwrites unconditionally (last writer wins), `get` distinguishes
/// an absent key from an empty value, and `delete` of an absent key is not an
/// error. Implementations must be shareable across concurrent readers and
/// writers; any transport failure surfaces as [`BlobError::Backend`] and is
/// never retried here.
#[async_trait]
pub trait KvBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Bytes>>;

    async fn put(&self, key: &str, value: Bytes) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct BackendBuilder {
    backend: Option<String>,
    namespace: Option<String>,
    redis_url: Option<String>,
    etcd_endpoints: Option<Vec<String>>,
}

impl BackendBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = Some(backend.into());
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn redis_url(mut self, url: impl Into<String>) -> Self {
        self.redis_url = Some(url.into());
        self
    }

    pub fn etcd_endpoints(mut self, endpoints: Vec<String>) -> Self {
        self.etcd_endpoints = Some(endpoints);
        self
    }

    fn resolve_namespace(&self) -> Result<String> {
        let namespace = self
            .namespace
            .as_deref()
            .unwrap_or_default()
            .trim()
            .to_string();
        if namespace.is_empty() {
            return Err(BlobError::Config(
                "backend namespace cannot be empty".to_string(),
            ));
        }

        Ok(namespace)
    }

    pub async fn build(&self) -> Result<Arc<dyn KvBackend>> {
        let namespace = self.resolve_namespace()?;
        let backend = self
            .backend
            .as_deref()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match backend.as_str() {
            "redis" => {
                let url = self.redis_url.as_deref().unwrap_or_default().trim();
                if url.is_empty() {
                    return Err(BlobError::Config(
                        "redis url is required for redis backend".to_string(),
                    ));
                }

                let backend = RedisBackend::connect(url, &namespace).await?;
                Ok(Arc::new(backend))
            }
            "etcd" => {
                let endpoints = self.etcd_endpoints.clone().ok_or_else(|| {
                    BlobError::Config("etcd endpoints are required for etcd backend".to_string())
                })?;

                if endpoints.is_empty() {
                    return Err(BlobError::Config(
                        "etcd endpoints cannot be empty for etcd backend".to_string(),
                    ));
                }

                let backend = EtcdBackend::connect(&endpoints, &namespace).await?;
                Ok(Arc::new(backend))
            }
            "memory" => Ok(Arc::new(MemoryBackend::new())),
            "" => Err(BlobError::Config("backend cannot be empty".to_string())),
            other => Err(BlobError::Config(format!(
                "unsupported backend: {}",
                other
            ))),
        }
    }
}
