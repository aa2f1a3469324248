//! Synthetic fixed-schema records.
//!
//! - [`RecordSchema`]: ordered, typed field definitions
//! - [`RecordGenerator`]: builds records for a key from a caller-owned RNG
//! - [`Record`] / [`FieldValue`]: materialized values

mod generator;
mod schema;
mod value;

pub use generator::RecordGenerator;
pub use schema::{
    FieldDef, FieldRole, RecordSchema, KEY_ECHO_FIELD, KEY_TAG_FIELD, STANDARD_FIELD_COUNT,
};
pub use value::{FieldType, FieldValue, Record};
