//! Read workloads over a populated store.

use std::hint::black_box;

use rand::Rng;

use crate::access::{AccessMode, FieldRef};
use crate::error::BenchError;
use crate::key::{Key, KeySpace};
use crate::record::{FieldValue, RecordSchema, KEY_ECHO_FIELD};
use crate::store::KvStore;

/// Default number of lookups per bulk read.
pub const DEFAULT_BULK_READS: u64 = 1000;

/// Which workloads to run and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadConfig {
    /// Access modes to exercise, in order
    pub modes: Vec<AccessMode>,
    /// Lookups per bulk read
    pub bulk_reads: u64,
    /// Worker threads
    pub threads: usize,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            modes: AccessMode::ALL.to_vec(),
            bulk_reads: DEFAULT_BULK_READS,
            threads: 1,
        }
    }
}

impl WorkloadConfig {
    /// Create a new configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the access modes
    pub fn with_modes(mut self, modes: impl Into<Vec<AccessMode>>) -> Self {
        self.modes = modes.into();
        self
    }

    /// Set the bulk read count
    pub fn with_bulk_reads(mut self, bulk_reads: u64) -> Self {
        self.bulk_reads = bulk_reads;
        self
    }

    /// Set the worker thread count (at least one)
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }
}

/// Random point reads of the key-echo field under one access mode.
///
/// A workload holds no mutable state; threads share one workload and one
/// store, each supplying its own RNG.
#[derive(Debug, Clone)]
pub struct ReadWorkload {
    mode: AccessMode,
    key_space: KeySpace,
    field: FieldRef,
}

impl ReadWorkload {
    /// Workload over `key_space` reading the key-echo field at its fixed slot.
    pub fn new(mode: AccessMode, key_space: KeySpace) -> Self {
        Self {
            mode,
            key_space,
            field: FieldRef::key_echo(),
        }
    }

    /// Workload whose key-echo slot is resolved from `schema`.
    pub fn for_schema(mode: AccessMode, key_space: KeySpace, schema: &RecordSchema) -> Self {
        let field = FieldRef::resolve(schema, KEY_ECHO_FIELD).unwrap_or_else(FieldRef::key_echo);
        Self {
            mode,
            key_space,
            field,
        }
    }

    /// Access mode.
    #[inline]
    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    /// Key space lookups are drawn from.
    #[inline]
    pub fn key_space(&self) -> KeySpace {
        self.key_space
    }

    /// One lookup of a uniformly chosen key.
    ///
    /// Returns the key-echo value read, after checking it equals the key's
    /// canonical form.
    pub fn read_once<S, R>(&self, store: &S, rng: &mut R) -> Result<FieldValue, BenchError>
    where
        S: KvStore + ?Sized,
        R: Rng + ?Sized,
    {
        let key = self.key_space.pick(rng);
        self.read_key(store, &key)
    }

    /// One lookup of `key`.
    pub fn read_key<S: KvStore + ?Sized>(
        &self,
        store: &S,
        key: &Key,
    ) -> Result<FieldValue, BenchError> {
        let observed = self.mode.read_field(store, key, &self.field)?;
        let expected = key.canonical_form();
        if observed != expected {
            return Err(BenchError::ConsistencyViolation {
                key: key.clone(),
                expected,
                observed,
            });
        }
        Ok(observed)
    }

    /// `count` independent lookups, each with a fresh key and checked like
    /// [`read_once`](Self::read_once). Stops at the first failure.
    pub fn read_many<S, R>(&self, store: &S, rng: &mut R, count: u64) -> Result<u64, BenchError>
    where
        S: KvStore + ?Sized,
        R: Rng + ?Sized,
    {
        for _ in 0..count {
            black_box(self.read_once(store, rng)?);
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::KeyShape;
    use crate::record::RecordGenerator;
    use crate::status::Status;
    use crate::store::{MemStore, ReadIsolation, RecordHandle};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn populated(key_space: KeySpace) -> MemStore {
        let schema = Arc::new(RecordSchema::standard(key_space.shape()));
        let store = MemStore::with_schema(schema.clone());
        let generator = RecordGenerator::new(schema);
        let mut rng = StdRng::seed_from_u64(9);
        for key in key_space.keys() {
            let record = generator.generate(&key, &mut rng);
            store.put(key, &record).unwrap();
        }
        store
    }

    /// Store that answers every lookup with the record of a fixed key.
    struct Misdirected {
        inner: MemStore,
        target: Key,
    }

    impl KvStore for Misdirected {
        fn put(&self, key: Key, record: &crate::record::Record) -> Result<(), Status> {
            self.inner.put(key, record)
        }

        fn get(&self, _key: &Key) -> Result<Option<crate::record::Record>, Status> {
            self.inner.get(&self.target)
        }

        fn get_handle(
            &self,
            _key: &Key,
            isolation: ReadIsolation,
        ) -> Result<Option<RecordHandle>, Status> {
            self.inner.get_handle(&self.target, isolation)
        }

        fn len(&self) -> usize {
            self.inner.len()
        }

        fn close(&self) -> Result<(), Status> {
            self.inner.close()
        }

        fn is_closed(&self) -> bool {
            self.inner.is_closed()
        }
    }

    #[test]
    fn test_workload_config_defaults() {
        let config = WorkloadConfig::default();
        assert_eq!(config.modes, AccessMode::ALL.to_vec());
        assert_eq!(config.bulk_reads, DEFAULT_BULK_READS);
        assert_eq!(config.threads, 1);
        assert_eq!(WorkloadConfig::new().with_threads(0).threads, 1);
    }

    #[test]
    fn test_read_once_every_mode() {
        for shape in [KeyShape::Integer, KeyShape::Text] {
            let key_space = KeySpace::new(shape, 50);
            let store = populated(key_space);
            let mut rng = StdRng::seed_from_u64(1);
            for mode in AccessMode::ALL {
                let workload = ReadWorkload::for_schema(mode, key_space, store.schema());
                for _ in 0..20 {
                    let value = workload.read_once(&store, &mut rng).unwrap();
                    match shape {
                        KeyShape::Integer => assert!((0..50).contains(&value.as_int().unwrap())),
                        KeyShape::Text => assert!(value.as_text().unwrap().starts_with("key_")),
                    }
                }
            }
        }
    }

    #[test]
    fn test_read_many_counts() {
        let key_space = KeySpace::new(KeyShape::Integer, 10);
        let store = populated(key_space);
        let workload = ReadWorkload::new(AccessMode::LazyField, key_space);
        let mut rng = StdRng::seed_from_u64(2);
        assert_eq!(workload.read_many(&store, &mut rng, 1000).unwrap(), 1000);
        assert_eq!(workload.read_many(&store, &mut rng, 0).unwrap(), 0);
    }

    #[test]
    fn test_empty_key_space_reports_not_found() {
        let key_space = KeySpace::new(KeyShape::Integer, 0);
        let store = populated(key_space);
        let mut rng = StdRng::seed_from_u64(3);
        for mode in AccessMode::ALL {
            let err = ReadWorkload::new(mode, key_space)
                .read_once(&store, &mut rng)
                .unwrap_err();
            assert!(matches!(err, BenchError::KeyNotFound(Key::Int(0))));
        }
    }

    #[test]
    fn test_wrong_record_is_violation() {
        let key_space = KeySpace::new(KeyShape::Integer, 4);
        let store = Misdirected {
            inner: populated(key_space),
            target: Key::Int(2),
        };
        for mode in AccessMode::ALL {
            let workload = ReadWorkload::new(mode, key_space);
            assert!(workload.read_key(&store, &Key::Int(2)).is_ok());
            let err = workload.read_key(&store, &Key::Int(1)).unwrap_err();
            match err {
                BenchError::ConsistencyViolation {
                    key,
                    expected,
                    observed,
                } => {
                    assert_eq!(key, Key::Int(1));
                    assert_eq!(expected, FieldValue::Int(1));
                    assert_eq!(observed, FieldValue::Int(2));
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }
}
