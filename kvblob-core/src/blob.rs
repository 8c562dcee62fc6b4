use crate::error::{BlobError, Result};
use crate::header::HEADER_SIZE;
use bytes::Bytes;
use sha2::{Digest, Sha256};

/// Payload capacity of a single backend record. Reader and writer must agree
/// on this exact value for stores to interoperate.
pub const CHUNK_SIZE: usize = 1_101_004;

/// Identity of a blob: its caller-supplied name and the derived master key
/// under which all of its chunks are stored.
#[derive(Debug, Clone)]
pub struct BlobId {
    name: Bytes,
    master_key: String,
}

impl BlobId {
    /// Derive the identity for a blob name.
    ///
    /// The master key is the lowercase hex SHA-256 digest of the name, which
    /// makes key derivation stable across processes and store instances.
    pub fn from_name(name: &[u8]) -> Result<Self> {
        if name.is_empty() {
            return Err(BlobError::InvalidName(
                "blob name cannot be empty".to_string(),
            ));
        }
        let master_key = hex::encode(Sha256::digest(name));
        Ok(Self {
            name: Bytes::copy_from_slice(name),
            master_key,
        })
    }

    pub fn name(&self) -> &[u8] {
        &self.name
    }

    pub fn master_key(&self) -> &str {
        &self.master_key
    }

    /// Backend key for one chunk of this blob.
    pub fn chunk_key(&self, index: u64) -> String {
        format!("{}/{}", self.master_key, index)
    }
}

/// Number of chunks a blob of `total_size` payload bytes occupies. The header
/// is charged against chunk capacity, so a zero-byte blob still takes one
/// chunk and an exact multiple of `CHUNK_SIZE` takes one extra.
pub fn chunk_count(total_size: u64) -> u64 {
    (total_size + HEADER_SIZE as u64).div_ceil(CHUNK_SIZE as u64)
}
