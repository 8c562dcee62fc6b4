use super::KvBackend;
use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

/// Redis-backed key-value backend.
///
/// Chunk keys are stored under `{namespace}/{key}` so several stores can
/// share one Redis deployment without colliding.
#[derive(Clone)]
pub struct RedisBackend {
    conn: ConnectionManager,
    namespace: String,
}

impl RedisBackend {
    pub async fn connect(url: &str, namespace: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        tracing::debug!("connected redis backend at {} namespace={}", url, namespace);
        Ok(Self {
            conn,
            namespace: namespace.to_string(),
        })
    }

    fn record_key(&self, key: &str) -> String {
        format!("{}/{}", self.namespace, key)
    }
}

#[async_trait]
impl KvBackend for RedisBackend {
    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        let mut conn = self.conn.clone();
        let value: Option<Vec<u8>> = conn.get(self.record_key(key)).await?;
        Ok(value.map(Bytes::from))
    }

    async fn put(&self, key: &str, value: Bytes) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.set(self.record_key(key), value.as_ref()).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(self.record_key(key)).await?;
        Ok(())
    }
}
