use std::sync::Arc;

use crate::codec::BinaryRecord;
use crate::record::{FieldValue, Record, RecordSchema};
use crate::status::Status;

/// Owned handle over an encoded record.
///
/// Fields are decoded one at a time on request; the rest of the record stays
/// in its binary form.
#[derive(Debug, Clone)]
pub struct RecordHandle {
    bytes: Arc<[u8]>,
    schema: Arc<RecordSchema>,
}

impl RecordHandle {
    /// Wrap encoded record bytes written with `schema`.
    pub fn new(bytes: Arc<[u8]>, schema: Arc<RecordSchema>) -> Self {
        Self { bytes, schema }
    }

    /// Schema the record was written with.
    #[inline]
    pub fn schema(&self) -> &Arc<RecordSchema> {
        &self.schema
    }

    /// Raw encoded bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    fn view(&self) -> Result<BinaryRecord<'_>, Status> {
        let view = BinaryRecord::parse(&self.bytes)?;
        if view.schema_id() != self.schema.id() {
            return Err(Status::Corruption);
        }
        Ok(view)
    }

    /// Decode the field called `name`.
    pub fn field(&self, name: &str) -> Result<FieldValue, Status> {
        let index = self.schema.index_of(name).ok_or(Status::InvalidArgument)?;
        self.field_at(index)
    }

    /// Decode the field at `index`.
    #[inline]
    pub fn field_at(&self, index: usize) -> Result<FieldValue, Status> {
        self.view()?.field(index)
    }

    /// Decode the whole record.
    pub fn deserialize(&self) -> Result<Record, Status> {
        self.view()?.to_record()
    }
}
