//! Kvblob Core - chunked blob storage over flat key-value backends
//!
//! Stores arbitrarily large named blobs on a network key-value store whose
//! values are size-limited byte records:
//! - blobs are split into fixed-size chunks, one backend record per chunk
//! - chunk 0 carries a small binary header with the blob's total size
//! - chunk 0 is written last, so its presence is the commit marker
//! - deletion removes only chunk 0, leaving interior chunks as orphans

pub mod backend;
pub mod blob;
pub mod chunks;
pub mod config;
pub mod error;
pub mod header;
pub mod reader;
pub mod store;
pub mod writer;

pub use backend::{BackendBuilder, EtcdBackend, KvBackend, MemoryBackend, RedisBackend};
pub use blob::{chunk_count, BlobId, CHUNK_SIZE};
pub use chunks::ChunkAccessor;
pub use config::{BackendKind, EtcdConfig, RedisConfig, StoreConfig};
pub use error::{BlobError, Result};
pub use header::{BlobHeader, HEADER_SIZE};
pub use reader::BlobReader;
pub use store::{BlobHandle, BlobStore, OpenMode};
pub use writer::BlobWriter;
