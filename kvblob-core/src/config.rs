use crate::backend::BackendBuilder;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Store configuration, typically loaded from a YAML or TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: BackendKind,
    #[serde(default)]
    pub namespace: Option<String>,
    pub redis: Option<RedisConfig>,
    pub etcd: Option<EtcdConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Redis,
    Etcd,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EtcdConfig {
    pub endpoints: Vec<String>,
}

impl StoreConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    pub fn namespace_or_default(&self) -> &str {
        self.namespace
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or("blobs")
    }

    pub(crate) fn backend_builder(&self) -> BackendBuilder {
        let mut builder = BackendBuilder::new().namespace(self.namespace_or_default());
        builder = match self.backend {
            BackendKind::Redis => builder.backend("redis"),
            BackendKind::Etcd => builder.backend("etcd"),
            BackendKind::Memory => builder.backend("memory"),
        };
        if let Some(redis) = &self.redis {
            builder = builder.redis_url(redis.url.clone());
        }
        if let Some(etcd) = &self.etcd {
            builder = builder.etcd_endpoints(etcd.endpoints.clone());
        }
        builder
    }
}
