use crate::backend::KvBackend;
use crate::blob::BlobId;
use crate::error::{BlobError, Result};
use crate::header::{BlobHeader, HEADER_SIZE};
use bytes::{Bytes, BytesMut};
use std::sync::Arc;

/// Stateless mapping from (blob, chunk index) to backend records.
///
/// Writes overwrite unconditionally and failures propagate without retry;
/// whether a retry is safe depends on the backend, which is not decided here.
#[derive(Clone)]
pub struct ChunkAccessor {
    backend: Arc<dyn KvBackend>,
}

impl ChunkAccessor {
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self { backend }
    }

    /// Write one chunk record. Passing a header marks this as chunk 0 and
    /// prefixes the encoded header to the payload.
    pub async fn store_chunk(
        &self,
        blob: &BlobId,
        index: u64,
        payload: Bytes,
        header: Option<&BlobHeader>,
    ) -> Result<()> {
        let key = blob.chunk_key(index);
        let record = match header {
            Some(header) => {
                let mut record = BytesMut::with_capacity(HEADER_SIZE + payload.len());
                record.extend_from_slice(&header.encode());
                record.extend_from_slice(&payload);
                record.freeze()
            }
            None => payload,
        };

        self.backend.put(&key, record).await?;
        tracing::debug!("stored chunk {} of blob {}", index, blob.master_key());
        Ok(())
    }

    /// Fetch an interior chunk's payload.
    pub async fn fetch_chunk(&self, blob: &BlobId, index: u64) -> Result<Bytes> {
        let key = blob.chunk_key(index);
        match self.backend.get(&key).await? {
            Some(record) => Ok(record),
            None => Err(BlobError::NotFound(key)),
        }
    }

    /// Fetch chunk 0, returning the decoded header alongside the payload with
    /// the header bytes stripped.
    pub async fn fetch_first_chunk(&self, blob: &BlobId) -> Result<(BlobHeader, Bytes)> {
        let key = blob.chunk_key(0);
        let record = match self.backend.get(&key).await? {
            Some(record) => record,
            None => return Err(BlobError::NotFound(key)),
        };
        BlobHeader::decode(record)
    }

    /// Delete one chunk record. The deletion protocol only ever applies this
    /// to chunk 0, the commit marker.
    pub async fn delete_chunk(&self, blob: &BlobId, index: u64) -> Result<()> {
        self.backend.delete(&blob.chunk_key(index)).await?;
        tracing::debug!("deleted chunk {} of blob {}", index, blob.master_key());
        Ok(())
    }
}
