//! Binary record layout.
//!
//! ## Format
//!
//! ```text
//! [magic: u16][field_count: u16][schema_id: u32]
//! [offset table: field_count x u32]
//! [payload: one bincode-encoded FieldValue per field]
//! ```
//!
//! Integers are little-endian. Offsets are relative to the payload start; a
//! field ends where the next one begins (the last one at the end of the
//! buffer).

use crate::record::{FieldValue, Record};
use crate::status::Status;

/// Magic number at the start of every encoded record.
pub const RECORD_MAGIC: u16 = 0xB1F0;

/// Size of the fixed header (magic, field count, schema id).
pub const RECORD_HEADER_SIZE: usize = 8;

const OFFSET_SIZE: usize = std::mem::size_of::<u32>();

/// Encoder and full decoder for binary records.
pub struct RecordCodec;

impl RecordCodec {
    /// Encoded length of `record` in bytes.
    pub fn encoded_len(record: &Record) -> Result<usize, Status> {
        let mut payload_len = 0usize;
        for value in record.fields() {
            payload_len += Self::field_len(value)?;
        }
        Ok(RECORD_HEADER_SIZE + record.len() * OFFSET_SIZE + payload_len)
    }

    #[inline]
    fn field_len(value: &FieldValue) -> Result<usize, Status> {
        let n = bincode::serialized_size(value).map_err(|_| Status::InvalidArgument)?;
        usize::try_from(n).map_err(|_| Status::ResourceExhausted)
    }

    /// Encode `record`, tagging it with `schema_id`.
    pub fn encode(record: &Record, schema_id: u32) -> Result<Vec<u8>, Status> {
        let field_count = u16::try_from(record.len()).map_err(|_| Status::ResourceExhausted)?;
        let table_end = RECORD_HEADER_SIZE + record.len() * OFFSET_SIZE;

        let mut buf = Vec::with_capacity(Self::encoded_len(record)?);
        buf.extend_from_slice(&RECORD_MAGIC.to_le_bytes());
        buf.extend_from_slice(&field_count.to_le_bytes());
        buf.extend_from_slice(&schema_id.to_le_bytes());
        buf.resize(table_end, 0);

        for (idx, value) in record.fields().iter().enumerate() {
            let offset =
                u32::try_from(buf.len() - table_end).map_err(|_| Status::ResourceExhausted)?;
            let slot = RECORD_HEADER_SIZE + idx * OFFSET_SIZE;
            buf[slot..slot + OFFSET_SIZE].copy_from_slice(&offset.to_le_bytes());
            bincode::serialize_into(&mut buf, value).map_err(|_| Status::InvalidArgument)?;
        }

        u32::try_from(buf.len() - table_end).map_err(|_| Status::ResourceExhausted)?;
        Ok(buf)
    }

    /// Decode every field of an encoded record.
    pub fn decode(bytes: &[u8]) -> Result<Record, Status> {
        BinaryRecord::parse(bytes)?.to_record()
    }
}

/// Borrowed view of an encoded record that decodes fields on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryRecord<'a> {
    offsets: &'a [u8],
    payload: &'a [u8],
    field_count: usize,
    schema_id: u32,
}

impl<'a> BinaryRecord<'a> {
    /// Parse the header and offset table. Field payloads are not inspected.
    pub fn parse(bytes: &'a [u8]) -> Result<Self, Status> {
        if bytes.len() < RECORD_HEADER_SIZE {
            return Err(Status::Corruption);
        }
        if read_u16(bytes, 0) != RECORD_MAGIC {
            return Err(Status::Corruption);
        }
        let field_count = usize::from(read_u16(bytes, 2));
        let schema_id = read_u32(bytes, 4);

        let table_end = RECORD_HEADER_SIZE + field_count * OFFSET_SIZE;
        if bytes.len() < table_end {
            return Err(Status::Corruption);
        }
        let (head, payload) = bytes.split_at(table_end);

        Ok(Self {
            offsets: &head[RECORD_HEADER_SIZE..],
            payload,
            field_count,
            schema_id,
        })
    }

    /// Number of fields.
    #[inline]
    pub fn field_count(&self) -> usize {
        self.field_count
    }

    /// Schema identifier the record was encoded with.
    #[inline]
    pub fn schema_id(&self) -> u32 {
        self.schema_id
    }

    #[inline]
    fn offset(&self, index: usize) -> usize {
        read_u32(self.offsets, index * OFFSET_SIZE) as usize
    }

    /// Encoded bytes of the field at `index`.
    pub fn field_bytes(&self, index: usize) -> Result<&'a [u8], Status> {
        if index >= self.field_count {
            return Err(Status::InvalidArgument);
        }
        let start = self.offset(index);
        let end = if index + 1 < self.field_count {
            self.offset(index + 1)
        } else {
            self.payload.len()
        };
        if start > end || end > self.payload.len() {
            return Err(Status::Corruption);
        }
        Ok(&self.payload[start..end])
    }

    /// Decode only the field at `index`.
    #[inline]
    pub fn field(&self, index: usize) -> Result<FieldValue, Status> {
        let bytes = self.field_bytes(index)?;
        bincode::deserialize(bytes).map_err(|_| Status::Corruption)
    }

    /// Decode all fields.
    pub fn to_record(&self) -> Result<Record, Status> {
        (0..self.field_count)
            .map(|idx| self.field(idx))
            .collect::<Result<Vec<_>, _>>()
            .map(Record::from_fields)
    }
}

#[inline]
fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

#[inline]
fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}
