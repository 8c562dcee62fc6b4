use crate::blob::{chunk_count, BlobId, CHUNK_SIZE};
use crate::chunks::ChunkAccessor;
use crate::error::{BlobError, Result};
use crate::header::BlobHeader;
use bytes::{Bytes, BytesMut};

/// Streaming writer for one blob.
///
/// Interior chunks are committed as soon as they fill. Chunk 0 is held back
/// in memory: its header needs the blob's total size, which is only known at
/// `close`, so it is committed last and doubles as the commit marker. A
/// writer dropped without `close` leaves no visible blob, only orphaned
/// interior chunks.
pub struct BlobWriter {
    chunks: ChunkAccessor,
    blob: BlobId,
    index: u64,
    current: BytesMut,
    first_chunk: Option<Bytes>,
    written: u64,
    closed: bool,
}

impl BlobWriter {
    pub(crate) fn new(chunks: ChunkAccessor, blob: BlobId) -> Self {
        Self {
            chunks,
            blob,
            index: 0,
            current: BytesMut::with_capacity(CHUNK_SIZE),
            first_chunk: None,
            written: 0,
            closed: false,
        }
    }

    /// Identity of the blob being written.
    pub fn blob(&self) -> &BlobId {
        &self.blob
    }

    /// Total bytes accepted so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Append bytes to the blob. Calls may carry any amount of data,
    /// including none; full interior chunks are committed immediately.
    pub async fn write(&mut self, data: &[u8]) -> Result<()> {
        if self.closed {
            return Err(BlobError::WriterClosed);
        }

        let mut offset = 0;
        while offset < data.len() {
            let room = CHUNK_SIZE - self.current.len();
            let take = room.min(data.len() - offset);
            self.current.extend_from_slice(&data[offset..offset + take]);
            offset += take;

            if self.current.len() == CHUNK_SIZE {
                let full = std::mem::take(&mut self.current).freeze();
                if self.index == 0 {
                    // Chunk 0 cannot be committed yet: its header carries the
                    // total size, which is unknown until close.
                    self.first_chunk = Some(full);
                } else {
                    self.chunks
                        .store_chunk(&self.blob, self.index, full, None)
                        .await?;
                }
                self.index += 1;
                self.current.reserve(CHUNK_SIZE);
            }
        }

        self.written += data.len() as u64;
        Ok(())
    }

    /// Commit the blob. The trailing chunk is flushed first, then chunk 0 is
    /// written with the finalized header as the last operation; only at that
    /// point does the blob become visible to readers.
    pub async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Err(BlobError::WriterClosed);
        }
        self.closed = true;

        let total_chunks = chunk_count(self.written);

        let first_chunk = if self.index == 0 {
            std::mem::take(&mut self.current).freeze()
        } else {
            let tail = std::mem::take(&mut self.current).freeze();
            self.chunks
                .store_chunk(&self.blob, self.index, tail, None)
                .await?;
            self.first_chunk.take().unwrap_or_default()
        };

        // The chunk count charges the header against chunk capacity, so a
        // payload that lands within HEADER_SIZE of a chunk boundary computes
        // one more chunk than the fill loop produced. Commit empty records
        // for those indexes so every chunk below the count resolves.
        for index in self.index + 1..total_chunks {
            self.chunks
                .store_chunk(&self.blob, index, Bytes::new(), None)
                .await?;
        }

        let header = BlobHeader::new(self.written);
        self.chunks
            .store_chunk(&self.blob, 0, first_chunk, Some(&header))
            .await?;

        tracing::debug!(
            "committed blob {} size={} chunks={}",
            self.blob.master_key(),
            self.written,
            total_chunks
        );
        Ok(())
    }
}

impl Drop for BlobWriter {
    fn drop(&mut self) {
        if !self.closed {
            tracing::warn!(
                "writer for blob {} dropped without close, blob was not committed",
                self.blob.master_key()
            );
        }
    }
}
