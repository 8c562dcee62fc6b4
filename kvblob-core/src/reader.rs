use crate::blob::{chunk_count, BlobId};
use crate::chunks::ChunkAccessor;
use crate::error::Result;
use bytes::{Bytes, BytesMut};

/// Forward-only streaming reader over one blob.
///
/// Opening the reader fetches chunk 0 eagerly to learn the blob's total size;
/// every later chunk is fetched at the point of consumption. A reader is not
/// restartable, open a new one to read from the start again. Dropping a
/// reader early just releases its buffers.
pub struct BlobReader {
    chunks: ChunkAccessor,
    blob: BlobId,
    total_size: u64,
    total_chunks: u64,
    next_index: u64,
    first: Option<Bytes>,
    carry: BytesMut,
}

impl BlobReader {
    pub(crate) async fn open(chunks: ChunkAccessor, blob: BlobId) -> Result<Self> {
        let (header, payload) = chunks.fetch_first_chunk(&blob).await?;
        let total_chunks = chunk_count(header.total_size);
        tracing::debug!(
            "opened reader for blob {} size={} chunks={}",
            blob.master_key(),
            header.total_size,
            total_chunks
        );
        Ok(Self {
            chunks,
            blob,
            total_size: header.total_size,
            total_chunks,
            next_index: 1,
            first: Some(payload),
            carry: BytesMut::new(),
        })
    }

    /// Total payload size of the blob, from the chunk-0 header.
    pub fn size(&self) -> u64 {
        self.total_size
    }

    /// Number of chunks the blob occupies.
    pub fn chunk_count(&self) -> u64 {
        self.total_chunks
    }

    /// Next chunk payload in index order, `None` once all chunks have been
    /// consumed.
    pub async fn next_chunk(&mut self) -> Result<Option<Bytes>> {
        if let Some(first) = self.first.take() {
            return Ok(Some(first));
        }
        if self.next_index >= self.total_chunks {
            return Ok(None);
        }

        let payload = self.chunks.fetch_chunk(&self.blob, self.next_index).await?;
        self.next_index += 1;
        Ok(Some(payload))
    }

    /// Read at most `n` bytes, buffering any chunk excess for the next call.
    /// Returns an empty result once the blob is exhausted.
    pub async fn read(&mut self, n: usize) -> Result<Bytes> {
        while self.carry.len() < n {
            match self.next_chunk().await? {
                Some(chunk) => self.carry.extend_from_slice(&chunk),
                None => break,
            }
        }

        let take = n.min(self.carry.len());
        Ok(self.carry.split_to(take).freeze())
    }

    /// Drain the rest of the blob into one buffer. Only sensible for blobs
    /// known to be small.
    pub async fn read_to_end(&mut self) -> Result<Bytes> {
        let mut buf = std::mem::take(&mut self.carry);
        buf.reserve(self.total_size as usize);
        while let Some(chunk) = self.next_chunk().await? {
            buf.extend_from_slice(&chunk);
        }
        Ok(buf.freeze())
    }
}
