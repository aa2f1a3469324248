//! Key-value store abstraction and the in-memory reference store
//!
//! The benchmark reads through [`KvStore`]; any store able to return either a
//! fully decoded [`Record`] or a [`RecordHandle`] over the encoded bytes can be
//! plugged in. [`MemStore`] is the bundled sharded in-memory implementation.

mod handle;
mod mem_store;

use std::sync::Arc;

pub use handle::RecordHandle;
pub use mem_store::{MemStore, MemStoreConfig, PendingWrite, DEFAULT_SHARDS};

use crate::key::Key;
use crate::record::Record;
use crate::status::Status;

/// Isolation level for handle reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReadIsolation {
    /// Only committed writes are visible
    #[default]
    Committed,
    /// In-flight (staged, uncommitted) writes are visible
    ReadUncommitted,
}

/// Store operations used by the fixture and the read workload.
///
/// Implementations must be safe to read from many threads at once.
pub trait KvStore: Send + Sync {
    /// Insert or replace the record for `key`.
    fn put(&self, key: Key, record: &Record) -> Result<(), Status>;

    /// Fetch and fully decode the record for `key`.
    fn get(&self, key: &Key) -> Result<Option<Record>, Status>;

    /// Fetch a handle over the encoded record for `key` without decoding it.
    fn get_handle(
        &self,
        key: &Key,
        isolation: ReadIsolation,
    ) -> Result<Option<RecordHandle>, Status>;

    /// Number of committed keys.
    fn len(&self) -> usize;

    /// Whether the store holds no committed keys.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Release the store's resources. Closing twice is a no-op.
    fn close(&self) -> Result<(), Status>;

    /// Whether `close` has been called.
    fn is_closed(&self) -> bool;
}

impl<T: KvStore + ?Sized> KvStore for Arc<T> {
    #[inline]
    fn put(&self, key: Key, record: &Record) -> Result<(), Status> {
        (**self).put(key, record)
    }

    #[inline]
    fn get(&self, key: &Key) -> Result<Option<Record>, Status> {
        (**self).get(key)
    }

    #[inline]
    fn get_handle(
        &self,
        key: &Key,
        isolation: ReadIsolation,
    ) -> Result<Option<RecordHandle>, Status> {
        (**self).get_handle(key, isolation)
    }

    #[inline]
    fn len(&self) -> usize {
        (**self).len()
    }

    #[inline]
    fn close(&self) -> Result<(), Status> {
        (**self).close()
    }

    #[inline]
    fn is_closed(&self) -> bool {
        (**self).is_closed()
    }
}
