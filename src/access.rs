//! Access modes: read strategies layered over the same store.
//!
//! - `Full` decodes the whole record and takes the field from it
//! - `LazyField` reads one field through a [`RecordHandle`] ("keep binary")
//! - `LazyFieldReadUncommitted` does the same at read-uncommitted isolation

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BenchError;
use crate::key::Key;
use crate::record::{FieldValue, RecordSchema, KEY_ECHO_FIELD};
use crate::status::Status;
use crate::store::{KvStore, ReadIsolation, RecordHandle};

/// How a read is performed against the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessMode {
    /// Fetch and decode the complete record
    Full,
    /// Fetch a binary handle and decode a single field
    LazyField,
    /// `LazyField` at read-uncommitted isolation
    LazyFieldReadUncommitted,
}

impl AccessMode {
    /// All modes, in benchmark order.
    pub const ALL: [AccessMode; 3] = [
        AccessMode::Full,
        AccessMode::LazyField,
        AccessMode::LazyFieldReadUncommitted,
    ];

    /// Mode name as used in configuration and bench ids.
    pub const fn as_str(&self) -> &'static str {
        match self {
            AccessMode::Full => "full",
            AccessMode::LazyField => "lazy_field",
            AccessMode::LazyFieldReadUncommitted => "lazy_field_read_uncommitted",
        }
    }

    /// Parse a mode name. Accepts the canonical names and a few aliases.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "full" | "object" => Some(Self::Full),
            "lazy_field" | "lazy" | "binary" | "keep_binary" => Some(Self::LazyField),
            "lazy_field_read_uncommitted" | "read_uncommitted" | "uncommitted" => {
                Some(Self::LazyFieldReadUncommitted)
            }
            _ => None,
        }
    }

    /// Isolation used for handle reads, `None` for full reads.
    #[inline]
    pub const fn isolation(&self) -> Option<ReadIsolation> {
        match self {
            AccessMode::Full => None,
            AccessMode::LazyField => Some(ReadIsolation::Committed),
            AccessMode::LazyFieldReadUncommitted => Some(ReadIsolation::ReadUncommitted),
        }
    }

    /// Read the key-echo field (`field1`) of the record stored under `key`.
    #[inline]
    pub fn read_field1<S: KvStore + ?Sized>(
        &self,
        store: &S,
        key: &Key,
    ) -> Result<FieldValue, BenchError> {
        self.read_field(store, key, &FieldRef::key_echo())
    }

    /// Read `field` of the record stored under `key`.
    pub fn read_field<S: KvStore + ?Sized>(
        &self,
        store: &S,
        key: &Key,
        field: &FieldRef,
    ) -> Result<FieldValue, BenchError> {
        match self.isolation() {
            None => {
                let record = store
                    .get(key)?
                    .ok_or_else(|| BenchError::KeyNotFound(key.clone()))?;
                record
                    .field(field.index())
                    .cloned()
                    .ok_or(BenchError::Store(Status::Corruption))
            }
            Some(isolation) => {
                let handle = store
                    .get_handle(key, isolation)?
                    .ok_or_else(|| BenchError::KeyNotFound(key.clone()))?;
                Ok(field.value(&handle)?)
            }
        }
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown access mode: {s}"))
    }
}

/// A field resolved against a schema once, then read by slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    name: String,
    index: usize,
}

impl FieldRef {
    /// Resolve `name` in `schema`.
    pub fn resolve(schema: &RecordSchema, name: &str) -> Option<Self> {
        schema.index_of(name).map(|index| Self {
            name: name.to_string(),
            index,
        })
    }

    /// The key-echo field, which is always the first slot.
    pub fn key_echo() -> Self {
        Self {
            name: KEY_ECHO_FIELD.to_string(),
            index: 0,
        }
    }

    /// Field name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field slot.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Read this field through a handle.
    #[inline]
    pub fn value(&self, handle: &RecordHandle) -> Result<FieldValue, Status> {
        handle.field_at(self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::KeyShape;
    use crate::record::{RecordGenerator, KEY_TAG_FIELD};
    use crate::store::MemStore;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn populated(shape: KeyShape, keys: &[Key]) -> MemStore {
        let schema = Arc::new(RecordSchema::standard(shape));
        let store = MemStore::with_schema(schema.clone());
        let generator = RecordGenerator::new(schema);
        let mut rng = StdRng::seed_from_u64(5);
        for key in keys {
            store
                .put(key.clone(), &generator.generate(key, &mut rng))
                .unwrap();
        }
        store
    }

    #[test]
    fn test_mode_names() {
        for mode in AccessMode::ALL {
            assert_eq!(AccessMode::parse(mode.as_str()), Some(mode));
            assert_eq!(mode.to_string().parse::<AccessMode>().unwrap(), mode);
        }
        assert_eq!(AccessMode::parse("keep-binary"), Some(AccessMode::LazyField));
        assert_eq!(
            AccessMode::parse("READ_UNCOMMITTED"),
            Some(AccessMode::LazyFieldReadUncommitted)
        );
        assert!(AccessMode::parse("sql").is_none());
    }

    #[test]
    fn test_all_modes_agree() {
        let keys: Vec<Key> = (0..20).map(Key::Int).collect();
        let store = populated(KeyShape::Integer, &keys);
        for key in &keys {
            for mode in AccessMode::ALL {
                assert_eq!(
                    mode.read_field1(&store, key).unwrap(),
                    key.canonical_form(),
                    "mode {mode} key {key}"
                );
            }
        }
    }

    #[test]
    fn test_missing_key_in_every_mode() {
        let store = populated(KeyShape::Integer, &[Key::Int(0)]);
        for mode in AccessMode::ALL {
            let err = mode.read_field1(&store, &Key::Int(1)).unwrap_err();
            assert!(matches!(err, BenchError::KeyNotFound(Key::Int(1))));
        }
    }

    #[test]
    fn test_read_other_field() {
        let key = Key::from("key_4");
        let store = populated(KeyShape::Text, &[key.clone()]);
        let tag = FieldRef::resolve(store.schema(), KEY_TAG_FIELD).unwrap();
        assert_eq!(tag.name(), KEY_TAG_FIELD);

        for mode in AccessMode::ALL {
            assert_eq!(
                mode.read_field(&store, &key, &tag).unwrap(),
                FieldValue::from("key_4")
            );
        }
    }

    #[test]
    fn test_field_ref_resolution() {
        let schema = RecordSchema::standard(KeyShape::Integer);
        assert_eq!(
            FieldRef::resolve(&schema, KEY_ECHO_FIELD),
            Some(FieldRef::key_echo())
        );
        assert!(FieldRef::resolve(&schema, "missing").is_none());
    }

    #[test]
    fn test_closed_store_is_store_error() {
        let store = populated(KeyShape::Integer, &[Key::Int(0)]);
        store.close().unwrap();
        for mode in AccessMode::ALL {
            let err = mode.read_field1(&store, &Key::Int(0)).unwrap_err();
            assert!(matches!(err, BenchError::Store(Status::InvalidOperation)));
        }
    }
}
