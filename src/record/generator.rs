//! Synthetic record generation.

use std::sync::Arc;

use rand::Rng;

use crate::key::Key;
use crate::record::schema::{FieldRole, RecordSchema};
use crate::record::value::{FieldType, FieldValue, Record};

/// Produces records that conform to a schema.
///
/// The key-echo and key-tag fields are derived from the key alone. Filler
/// fields draw from the caller's RNG: integers are uniform `i32` values, text
/// fields are random version-4 UUID strings. Seeding the RNG makes the output
/// reproducible.
#[derive(Debug, Clone)]
pub struct RecordGenerator {
    schema: Arc<RecordSchema>,
}

impl RecordGenerator {
    /// Create a generator for `schema`.
    pub fn new(schema: Arc<RecordSchema>) -> Self {
        Self { schema }
    }

    /// Schema of generated records.
    #[inline]
    pub fn schema(&self) -> &Arc<RecordSchema> {
        &self.schema
    }

    /// Generate the record for `key`.
    pub fn generate<R: Rng + ?Sized>(&self, key: &Key, rng: &mut R) -> Record {
        let fields = self
            .schema
            .fields()
            .iter()
            .map(|def| match def.role() {
                FieldRole::KeyEcho => key.canonical_form(),
                FieldRole::KeyTag => FieldValue::Text(key.tag()),
                FieldRole::Filler => random_value(def.field_type(), rng),
            })
            .collect();
        Record::from_fields(fields)
    }
}

fn random_value<R: Rng + ?Sized>(field_type: FieldType, rng: &mut R) -> FieldValue {
    match field_type {
        FieldType::Int => FieldValue::Int(i64::from(rng.gen::<i32>())),
        FieldType::Text => {
            let uuid = uuid::Builder::from_random_bytes(rng.gen()).into_uuid();
            FieldValue::Text(uuid.to_string())
        }
    }
}
