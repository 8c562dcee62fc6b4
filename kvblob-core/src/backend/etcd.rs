use super::KvBackend;
use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;
use etcd_client::Client;

/// etcd-backed key-value backend.
///
/// Connects against a set of node endpoints; keys are namespaced the same way
/// as the Redis backend.
#[derive(Clone)]
pub struct EtcdBackend {
    client: Client,
    namespace: String,
}

impl EtcdBackend {
    pub async fn connect(endpoints: &[String], namespace: &str) -> Result<Self> {
        let client = Client::connect(endpoints, None).await?;
        tracing::debug!(
            "connected etcd backend with {} endpoint(s) namespace={}",
            endpoints.len(),
            namespace
        );
        Ok(Self {
            client,
            namespace: namespace.to_string(),
        })
    }

    fn record_key(&self, key: &str) -> String {
        format!("{}/{}", self.namespace, key)
    }
}

#[async_trait]
impl KvBackend for EtcdBackend {
    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        let mut client = self.client.clone();
        let response = client.get(self.record_key(key), None).await?;
        Ok(response
            .kvs()
            .first()
            .map(|kv| Bytes::copy_from_slice(kv.value())))
    }

    async fn put(&self, key: &str, value: Bytes) -> Result<()> {
        let mut client = self.client.clone();
        client.put(self.record_key(key), value.to_vec(), None).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut client = self.client.clone();
        client.delete(self.record_key(key), None).await?;
        Ok(())
    }
}
