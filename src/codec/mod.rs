//! Encoding model for stored records.
//!
//! Records are stored as binary objects: a small header, a per-field offset
//! table and the bincode-encoded field payloads. The offset table lets a
//! reader decode one field (see [`BinaryRecord::field`]) without touching the
//! rest, while [`RecordCodec::decode`] materializes the whole record.

mod binary;

pub use binary::{BinaryRecord, RecordCodec, RECORD_HEADER_SIZE, RECORD_MAGIC};

/// Deterministic 64-bit xxh3 hash, used for shard selection and schema ids.
#[inline]
pub fn hash64(bytes: &[u8]) -> u64 {
    xxhash_rust::xxh3::xxh3_64(bytes)
}
