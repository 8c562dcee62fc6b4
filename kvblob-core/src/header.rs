//! Binary header carried at the front of every blob's chunk 0.
//!
//! Wire format: `[1 byte header_size][8 bytes total_size, little-endian]`.
//! `header_size` reports the encoded header length so that future, larger
//! headers can be skipped by readers that only understand this layout.

use crate::error::{BlobError, Result};
use bytes::Bytes;

/// Encoded length of the current header format.
pub const HEADER_SIZE: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlobHeader {
    pub header_size: u8,
    pub total_size: u64,
}

impl BlobHeader {
    pub fn new(total_size: u64) -> Self {
        Self {
            header_size: HEADER_SIZE as u8,
            total_size,
        }
    }

    /// Encode into the fixed 9-byte wire form.
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0] = self.header_size;
        buf[1..].copy_from_slice(&self.total_size.to_le_bytes());
        buf
    }

    /// Split a stored chunk-0 record into its header and payload.
    ///
    /// A record declaring a header larger than the current format has its
    /// reserved trailing header bytes skipped without being parsed.
    pub fn decode(raw: Bytes) -> Result<(Self, Bytes)> {
        if raw.len() < HEADER_SIZE {
            return Err(BlobError::MalformedHeader(format!(
                "record is {} bytes, expected at least {}",
                raw.len(),
                HEADER_SIZE
            )));
        }

        let header_size = raw[0];
        if (header_size as usize) < HEADER_SIZE {
            return Err(BlobError::MalformedHeader(format!(
                "declared header size {} is below the fixed minimum {}",
                header_size, HEADER_SIZE
            )));
        }
        if raw.len() < header_size as usize {
            return Err(BlobError::MalformedHeader(format!(
                "record is {} bytes, declared header size is {}",
                raw.len(),
                header_size
            )));
        }

        let mut size_bytes = [0u8; 8];
        size_bytes.copy_from_slice(&raw[1..HEADER_SIZE]);
        let total_size = u64::from_le_bytes(size_bytes);

        let payload = raw.slice(header_size as usize..);
        // This record is a single chunk of the blob, so its payload can never
        // exceed the declared total.
        if total_size < payload.len() as u64 {
            return Err(BlobError::MalformedHeader(format!(
                "payload of {} bytes exceeds declared blob size {}",
                payload.len(),
                total_size
            )));
        }

        Ok((
            Self {
                header_size,
                total_size,
            },
            payload,
        ))
    }
}
