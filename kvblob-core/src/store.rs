use crate::backend::KvBackend;
use crate::blob::{BlobId, CHUNK_SIZE};
use crate::chunks::ChunkAccessor;
use crate::config::StoreConfig;
use crate::error::{BlobError, Result};
use crate::reader::BlobReader;
use crate::writer::BlobWriter;
use bytes::Bytes;
use std::str::FromStr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Block size used by [`BlobStore::put`] when draining a source stream.
const PUT_BLOCK_SIZE: usize = 4 * CHUNK_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Read,
    Write,
}

impl FromStr for OpenMode {
    type Err = BlobError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "r" => Ok(OpenMode::Read),
            "w" => Ok(OpenMode::Write),
            other => Err(BlobError::InvalidMode(other.to_string())),
        }
    }
}

/// Handle returned by [`BlobStore::open`], one per call, independent of every
/// other handle.
pub enum BlobHandle {
    Reader(BlobReader),
    Writer(BlobWriter),
}

/// Facade over the chunked blob protocol.
///
/// Owns an explicitly constructed backend handle; the handle is shared by all
/// readers and writers the store opens and the store itself takes no locks.
/// Concurrent writers to the same name race with last-writer-wins semantics
/// per chunk; callers that need stronger guarantees serialize externally.
#[derive(Clone)]
pub struct BlobStore {
    chunks: ChunkAccessor,
}

impl BlobStore {
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self {
            chunks: ChunkAccessor::new(backend),
        }
    }

    /// Build a store from configuration, connecting the configured backend.
    pub async fn from_config(config: &StoreConfig) -> Result<Self> {
        let backend = config.backend_builder().build().await?;
        Ok(Self::new(backend))
    }

    /// Open a blob for reading or writing.
    pub async fn open(&self, name: &[u8], mode: OpenMode) -> Result<BlobHandle> {
        match mode {
            OpenMode::Read => Ok(BlobHandle::Reader(self.open_reader(name).await?)),
            OpenMode::Write => Ok(BlobHandle::Writer(self.open_writer(name)?)),
        }
    }

    /// Open a streaming reader. Fails with `NotFound` if the blob was never
    /// committed.
    pub async fn open_reader(&self, name: &[u8]) -> Result<BlobReader> {
        let blob = BlobId::from_name(name)?;
        BlobReader::open(self.chunks.clone(), blob).await
    }

    /// Open a streaming writer. Nothing is visible to readers until the
    /// writer's `close` succeeds.
    pub fn open_writer(&self, name: &[u8]) -> Result<BlobWriter> {
        let blob = BlobId::from_name(name)?;
        Ok(BlobWriter::new(self.chunks.clone(), blob))
    }

    /// Ingest a source stream under `name` without buffering the whole
    /// object, reading the source in multi-chunk blocks.
    pub async fn put<R>(&self, mut source: R, name: &[u8]) -> Result<()>
    where
        R: AsyncRead + Unpin,
    {
        let mut writer = self.open_writer(name)?;
        let mut block = vec![0u8; PUT_BLOCK_SIZE];
        loop {
            let n = source.read(&mut block).await?;
            if n == 0 {
                break;
            }
            writer.write(&block[..n]).await?;
        }
        writer.close().await
    }

    /// Whole-blob read. Only for small blobs, the entire contents end up in
    /// memory.
    pub async fn read(&self, name: &[u8]) -> Result<Bytes> {
        let mut reader = self.open_reader(name).await?;
        reader.read_to_end().await
    }

    /// Whole-blob write of an in-memory buffer.
    pub async fn write(&self, name: &[u8], contents: &[u8]) -> Result<()> {
        let mut writer = self.open_writer(name)?;
        writer.write(contents).await?;
        writer.close().await
    }

    /// Delete a blob by removing chunk 0, its commit marker. Reads fail with
    /// `NotFound` immediately afterwards; interior chunks are left behind as
    /// orphans since reclaiming them would need a chunk-count index this
    /// store does not keep.
    pub async fn delete(&self, name: &[u8]) -> Result<()> {
        let blob = BlobId::from_name(name)?;
        self.chunks.delete_chunk(&blob, 0).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::header::HEADER_SIZE;

    fn memory_store() -> (BlobStore, MemoryBackend) {
        let backend = MemoryBackend::new();
        (BlobStore::new(Arc::new(backend.clone())), backend)
    }

    #[tokio::test]
    async fn test_round_trip_small_blob() {
        let (store, _) = memory_store();
        store.write(b"file.txt", b"hello blob").await.unwrap();
        let contents = store.read(b"file.txt").await.unwrap();
        assert_eq!(contents.as_ref(), b"hello blob");
    }

    #[tokio::test]
    async fn test_round_trip_spanning_multiple_chunks() {
        let (store, _) = memory_store();
        for chunks in 1..=3usize {
            let payload: Vec<u8> = (0..chunks * CHUNK_SIZE + 17)
                .map(|i| (i % 251) as u8)
                .collect();
            let name = format!("blob-{}", chunks);
            store.write(name.as_bytes(), &payload).await.unwrap();
            let contents = store.read(name.as_bytes()).await.unwrap();
            assert_eq!(contents.len(), payload.len());
            assert_eq!(contents.as_ref(), &payload[..]);
        }
    }

    #[tokio::test]
    async fn test_three_chunk_payload_occupies_four_chunks() {
        let (store, backend) = memory_store();
        let payload = vec![0x78u8; 3 * CHUNK_SIZE];
        store.write(b"file.txt", &payload).await.unwrap();

        let mut reader = store.open_reader(b"file.txt").await.unwrap();
        assert_eq!(reader.size(), 3 * CHUNK_SIZE as u64);
        assert_eq!(reader.chunk_count(), 4);

        let blob = BlobId::from_name(b"file.txt").unwrap();
        for index in 0..4 {
            assert!(
                backend.get(&blob.chunk_key(index)).await.unwrap().is_some(),
                "chunk {} should exist",
                index
            );
        }
        assert!(backend.get(&blob.chunk_key(4)).await.unwrap().is_none());

        let contents = reader.read_to_end().await.unwrap();
        assert_eq!(contents.len(), 3 * CHUNK_SIZE);
        assert!(contents.iter().all(|&b| b == 0x78));
    }

    #[tokio::test]
    async fn test_payload_within_header_size_of_chunk_boundary() {
        // The header charge pushes this payload over one chunk's capacity.
        let (store, _) = memory_store();
        let payload = vec![0x61u8; CHUNK_SIZE - 4];
        store.write(b"edge", &payload).await.unwrap();

        let mut reader = store.open_reader(b"edge").await.unwrap();
        assert_eq!(reader.chunk_count(), 2);
        let contents = reader.read_to_end().await.unwrap();
        assert_eq!(contents.as_ref(), &payload[..]);
    }

    #[tokio::test]
    async fn test_zero_length_blob() {
        let (store, backend) = memory_store();
        store.write(b"empty", b"").await.unwrap();

        let contents = store.read(b"empty").await.unwrap();
        assert!(contents.is_empty());

        // Chunk 0 exists and carries only the header with total_size = 0.
        let blob = BlobId::from_name(b"empty").unwrap();
        let record = backend.get(&blob.chunk_key(0)).await.unwrap().unwrap();
        assert_eq!(record.len(), HEADER_SIZE);
        assert_eq!(record[1..], 0u64.to_le_bytes()[..]);
    }

    #[tokio::test]
    async fn test_unclosed_writer_leaves_no_visible_blob() {
        let (store, backend) = memory_store();
        let payload = vec![0x42u8; 2 * CHUNK_SIZE + 10];

        let mut writer = store.open_writer(b"crashed").unwrap();
        writer.write(&payload).await.unwrap();
        drop(writer);

        let result = store.read(b"crashed").await;
        assert!(matches!(result, Err(BlobError::NotFound(_))));

        // The rolled-over interior chunk was committed eagerly and is now
        // orphaned; the commit marker never appeared.
        let blob = BlobId::from_name(b"crashed").unwrap();
        assert!(backend.get(&blob.chunk_key(0)).await.unwrap().is_none());
        assert!(backend.get(&blob.chunk_key(1)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_removes_only_the_commit_marker() {
        let (store, backend) = memory_store();
        let payload = vec![0x13u8; CHUNK_SIZE + 100];
        store.write(b"doomed", &payload).await.unwrap();

        store.delete(b"doomed").await.unwrap();

        let result = store.read(b"doomed").await;
        assert!(matches!(result, Err(BlobError::NotFound(_))));

        // Interior chunks survive as orphans.
        let blob = BlobId::from_name(b"doomed").unwrap();
        assert!(backend.get(&blob.chunk_key(0)).await.unwrap().is_none());
        assert!(backend.get(&blob.chunk_key(1)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_overwrite_replaces_contents() {
        let (store, _) = memory_store();
        store.write(b"blob", b"first version").await.unwrap();
        store.write(b"blob", b"second").await.unwrap();
        let contents = store.read(b"blob").await.unwrap();
        assert_eq!(contents.as_ref(), b"second");
    }

    #[tokio::test]
    async fn test_concurrent_readers_see_identical_payload() {
        let (store, _) = memory_store();
        let payload: Vec<u8> = (0..CHUNK_SIZE + 1234).map(|i| (i % 199) as u8).collect();
        store.write(b"shared", &payload).await.unwrap();

        let mut a = store.open_reader(b"shared").await.unwrap();
        let mut b = store.open_reader(b"shared").await.unwrap();
        let mut got_a = Vec::new();
        let mut got_b = Vec::new();

        // Interleave reads with mismatched buffer sizes.
        loop {
            let chunk_a = a.read(4093).await.unwrap();
            let chunk_b = b.read(1021).await.unwrap();
            if chunk_a.is_empty() && chunk_b.is_empty() {
                break;
            }
            got_a.extend_from_slice(&chunk_a);
            got_b.extend_from_slice(&chunk_b);
        }

        assert_eq!(got_a, payload);
        assert_eq!(got_b, payload);
    }

    #[tokio::test]
    async fn test_writer_rejects_use_after_close() {
        let (store, _) = memory_store();
        let mut writer = store.open_writer(b"blob").unwrap();
        writer.write(b"data").await.unwrap();
        writer.close().await.unwrap();

        assert!(matches!(
            writer.write(b"more").await,
            Err(BlobError::WriterClosed)
        ));
        assert!(matches!(writer.close().await, Err(BlobError::WriterClosed)));
    }

    #[tokio::test]
    async fn test_open_mode_parsing() {
        assert_eq!("r".parse::<OpenMode>().unwrap(), OpenMode::Read);
        assert_eq!("w".parse::<OpenMode>().unwrap(), OpenMode::Write);
        assert!(matches!(
            "a".parse::<OpenMode>(),
            Err(BlobError::InvalidMode(_))
        ));
        assert!(matches!(
            "rw".parse::<OpenMode>(),
            Err(BlobError::InvalidMode(_))
        ));
    }

    #[tokio::test]
    async fn test_open_returns_matching_handle() {
        let (store, _) = memory_store();
        store.write(b"blob", b"contents").await.unwrap();

        match store.open(b"blob", OpenMode::Read).await.unwrap() {
            BlobHandle::Reader(mut reader) => {
                assert_eq!(reader.read_to_end().await.unwrap().as_ref(), b"contents");
            }
            BlobHandle::Writer(_) => panic!("expected a reader"),
        }

        match store.open(b"other", OpenMode::Write).await.unwrap() {
            BlobHandle::Writer(mut writer) => {
                writer.write(b"x").await.unwrap();
                writer.close().await.unwrap();
            }
            BlobHandle::Reader(_) => panic!("expected a writer"),
        }
    }

    #[tokio::test]
    async fn test_open_missing_blob_for_read() {
        let (store, _) = memory_store();
        let result = store.open(b"missing", OpenMode::Read).await;
        assert!(matches!(result, Err(BlobError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_empty_name_is_rejected_before_any_backend_call() {
        let (store, backend) = memory_store();
        assert!(matches!(
            store.write(b"", b"data").await,
            Err(BlobError::InvalidName(_))
        ));
        assert!(backend.is_empty().await);
    }

    #[tokio::test]
    async fn test_put_streams_a_source() {
        let (store, _) = memory_store();
        let payload: Vec<u8> = (0..2 * CHUNK_SIZE + 55).map(|i| (i % 241) as u8).collect();

        let source = std::io::Cursor::new(payload.clone());
        store.put(source, b"ingested").await.unwrap();

        let contents = store.read(b"ingested").await.unwrap();
        assert_eq!(contents.as_ref(), &payload[..]);
    }

    #[tokio::test]
    async fn test_malformed_first_chunk_record() {
        let (store, backend) = memory_store();
        let blob = BlobId::from_name(b"corrupt").unwrap();
        backend
            .put(&blob.chunk_key(0), Bytes::from_static(b"\x09\x01"))
            .await
            .unwrap();

        let result = store.read(b"corrupt").await;
        assert!(matches!(result, Err(BlobError::MalformedHeader(_))));
    }
}
