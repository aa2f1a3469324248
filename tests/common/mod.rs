//! Shared test utilities for fault injection and store fixtures.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;

use readbench::key::{Key, KeyShape};
use readbench::record::{Record, RecordSchema};
use readbench::status::Status;
use readbench::store::{KvStore, MemStore, ReadIsolation, RecordHandle};

/// A fault-injection wrapper around any `KvStore`.
///
/// Allows deterministic injection of:
/// - insert errors at a specific operation count
/// - lookups answered with another key's record
pub struct FaultInjectionStore<S> {
    inner: S,
    /// Total number of put calls observed so far.
    put_count: AtomicU64,
    /// When non-zero, the Nth put (1-based) will fail.
    fail_put_at: AtomicU64,
    /// When set, every lookup is answered with this key's record.
    redirect_reads_to: Mutex<Option<Key>>,
    /// Total number of close calls observed so far.
    close_count: AtomicU64,
}

impl<S: KvStore> FaultInjectionStore<S> {
    /// Wrap an existing store for fault injection.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            put_count: AtomicU64::new(0),
            fail_put_at: AtomicU64::new(0),
            redirect_reads_to: Mutex::new(None),
            close_count: AtomicU64::new(0),
        }
    }

    /// Make the Nth put (1-based) return `Status::ResourceExhausted`.
    pub fn inject_put_error_at(&self, operation_n: u64) {
        self.fail_put_at.store(operation_n, Ordering::SeqCst);
    }

    /// Answer every lookup with the record stored under `key`.
    pub fn redirect_reads_to(&self, key: Key) {
        *self.redirect_reads_to.lock() = Some(key);
    }

    /// Return the total number of put calls observed.
    pub fn put_count(&self) -> u64 {
        self.put_count.load(Ordering::SeqCst)
    }

    /// Return the total number of close calls observed.
    pub fn close_count(&self) -> u64 {
        self.close_count.load(Ordering::SeqCst)
    }

    /// The wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn target(&self, key: &Key) -> Key {
        self.redirect_reads_to
            .lock()
            .clone()
            .unwrap_or_else(|| key.clone())
    }
}

impl<S: KvStore> KvStore for FaultInjectionStore<S> {
    fn put(&self, key: Key, record: &Record) -> Result<(), Status> {
        let n = self.put_count.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_put_at.load(Ordering::SeqCst) == n {
            return Err(Status::ResourceExhausted);
        }
        self.inner.put(key, record)
    }

    fn get(&self, key: &Key) -> Result<Option<Record>, Status> {
        self.inner.get(&self.target(key))
    }

    fn get_handle(
        &self,
        key: &Key,
        isolation: ReadIsolation,
    ) -> Result<Option<RecordHandle>, Status> {
        self.inner.get_handle(&self.target(key), isolation)
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn close(&self) -> Result<(), Status> {
        self.close_count.fetch_add(1, Ordering::SeqCst);
        self.inner.close()
    }

    fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

/// Empty in-memory store with the standard schema for `shape`.
pub fn mem_store(shape: KeyShape) -> MemStore {
    MemStore::with_schema(Arc::new(RecordSchema::standard(shape)))
}

/// Deterministic RNG.
pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
