//! Sharded in-memory store
//!
//! Keys are spread over `shards` hash maps, each behind its own
//! `parking_lot::RwLock`. Every entry keeps the committed encoded record and
//! at most one staged (in-flight) write. Committed readers never see the
//! staged bytes; read-uncommitted readers prefer them.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::codec::{BinaryRecord, RecordCodec};
use crate::key::Key;
use crate::record::{Record, RecordSchema};
use crate::status::Status;
use crate::store::{KvStore, ReadIsolation, RecordHandle};

/// Default number of shards.
pub const DEFAULT_SHARDS: usize = 16;

/// Configuration for [`MemStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemStoreConfig {
    /// Number of shards (at least 1)
    pub shards: usize,
    /// Copy the encoded bytes into every handle instead of sharing them
    pub copy_on_read: bool,
}

impl Default for MemStoreConfig {
    fn default() -> Self {
        Self {
            shards: DEFAULT_SHARDS,
            copy_on_read: false,
        }
    }
}

impl MemStoreConfig {
    /// Create a new configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the shard count
    pub fn with_shards(mut self, shards: usize) -> Self {
        self.shards = shards;
        self
    }

    /// Enable or disable copy-on-read
    pub fn with_copy_on_read(mut self, copy_on_read: bool) -> Self {
        self.copy_on_read = copy_on_read;
        self
    }
}

#[derive(Debug, Default)]
struct Entry {
    committed: Option<Arc<[u8]>>,
    staged: Option<Arc<[u8]>>,
}

type Shard = RwLock<HashMap<Key, Entry>>;

/// Sharded in-memory [`KvStore`].
pub struct MemStore {
    schema: Arc<RecordSchema>,
    shards: Box<[Shard]>,
    copy_on_read: bool,
    len: AtomicUsize,
    closed: AtomicBool,
}

impl MemStore {
    /// Create an empty store for records of `schema`.
    pub fn new(schema: Arc<RecordSchema>, config: MemStoreConfig) -> Self {
        let shards = (0..config.shards.max(1))
            .map(|_| RwLock::new(HashMap::new()))
            .collect();
        Self {
            schema,
            shards,
            copy_on_read: config.copy_on_read,
            len: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
        }
    }

    /// Create an empty store with the default configuration.
    pub fn with_schema(schema: Arc<RecordSchema>) -> Self {
        Self::new(schema, MemStoreConfig::default())
    }

    /// Schema of stored records.
    #[inline]
    pub fn schema(&self) -> &Arc<RecordSchema> {
        &self.schema
    }

    /// Number of shards.
    #[inline]
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    #[inline]
    fn shard(&self, key: &Key) -> &Shard {
        let idx = key.hash64() % self.shards.len() as u64;
        &self.shards[idx as usize]
    }

    #[inline]
    fn check_open(&self) -> Result<(), Status> {
        if self.closed.load(Ordering::Acquire) {
            Err(Status::InvalidOperation)
        } else {
            Ok(())
        }
    }

    fn encode(&self, record: &Record) -> Result<Arc<[u8]>, Status> {
        self.schema.validate(record)?;
        let bytes = RecordCodec::encode(record, self.schema.id())?;
        Ok(Arc::from(bytes))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Record, Status> {
        let view = BinaryRecord::parse(bytes)?;
        if view.schema_id() != self.schema.id() {
            return Err(Status::Corruption);
        }
        view.to_record()
    }

    #[inline]
    fn read_bytes(
        &self,
        key: &Key,
        isolation: ReadIsolation,
    ) -> Result<Option<Arc<[u8]>>, Status> {
        self.check_open()?;
        let shard = self.shard(key).read();
        let Some(entry) = shard.get(key) else {
            return Ok(None);
        };
        let bytes = match isolation {
            ReadIsolation::Committed => entry.committed.as_ref(),
            ReadIsolation::ReadUncommitted => entry.staged.as_ref().or(entry.committed.as_ref()),
        };
        Ok(bytes.cloned())
    }

    /// Stage a write for `key` that stays invisible to committed readers until
    /// [`PendingWrite::commit`]. Only one write per key may be in flight; a
    /// second one fails with `Status::Aborted`.
    pub fn begin_write(&self, key: Key, record: &Record) -> Result<PendingWrite<'_>, Status> {
        self.check_open()?;
        let bytes = self.encode(record)?;
        {
            let mut shard = self.shard(&key).write();
            // close() may have drained this shard since the first check.
            self.check_open()?;
            let entry = shard.entry(key.clone()).or_default();
            if entry.staged.is_some() {
                return Err(Status::Aborted);
            }
            entry.staged = Some(bytes);
        }
        Ok(PendingWrite {
            store: self,
            key,
            finished: false,
        })
    }

    fn commit_staged(&self, key: &Key) -> Result<(), Status> {
        let mut shard = self.shard(key).write();
        self.check_open()?;
        let entry = shard.get_mut(key).ok_or(Status::Aborted)?;
        let staged = entry.staged.take().ok_or(Status::Aborted)?;
        if entry.committed.replace(staged).is_none() {
            self.len.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }

    fn abort_staged(&self, key: &Key) {
        let mut shard = self.shard(key).write();
        let orphaned = match shard.get_mut(key) {
            Some(entry) => {
                entry.staged = None;
                entry.committed.is_none()
            }
            None => false,
        };
        if orphaned {
            shard.remove(key);
        }
    }

    /// Copy of every committed entry's encoded bytes, ordered by key.
    pub fn dump_committed(&self) -> BTreeMap<Key, Vec<u8>> {
        let mut out = BTreeMap::new();
        for shard in self.shards.iter() {
            for (key, entry) in shard.read().iter() {
                if let Some(bytes) = &entry.committed {
                    out.insert(key.clone(), bytes.to_vec());
                }
            }
        }
        out
    }
}

impl KvStore for MemStore {
    fn put(&self, key: Key, record: &Record) -> Result<(), Status> {
        self.check_open()?;
        let bytes = self.encode(record)?;
        let mut shard = self.shard(&key).write();
        self.check_open()?;
        let entry = shard.entry(key).or_default();
        if entry.committed.replace(bytes).is_none() {
            self.len.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }

    fn get(&self, key: &Key) -> Result<Option<Record>, Status> {
        self.read_bytes(key, ReadIsolation::Committed)?
            .map(|bytes| self.decode(&bytes))
            .transpose()
    }

    fn get_handle(
        &self,
        key: &Key,
        isolation: ReadIsolation,
    ) -> Result<Option<RecordHandle>, Status> {
        Ok(self.read_bytes(key, isolation)?.map(|bytes| {
            let bytes = if self.copy_on_read {
                Arc::from(&bytes[..])
            } else {
                bytes
            };
            RecordHandle::new(bytes, self.schema.clone())
        }))
    }

    fn len(&self) -> usize {
        self.len.load(Ordering::Relaxed)
    }

    fn close(&self) -> Result<(), Status> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        for shard in self.shards.iter() {
            drop(std::mem::take(&mut *shard.write()));
        }
        let released = self.len.swap(0, Ordering::Relaxed);
        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!(released, shards = self.shards.len(), "mem store closed");
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl fmt::Debug for MemStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemStore")
            .field("schema_id", &self.schema.id())
            .field("shards", &self.shards.len())
            .field("copy_on_read", &self.copy_on_read)
            .field("len", &self.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// A staged write, visible only to read-uncommitted readers until committed.
///
/// Dropping the guard without calling [`PendingWrite::commit`] aborts the write.
#[must_use = "a pending write is aborted when dropped"]
pub struct PendingWrite<'a> {
    store: &'a MemStore,
    key: Key,
    finished: bool,
}

impl PendingWrite<'_> {
    /// Key being written.
    #[inline]
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// Publish the staged record to committed readers.
    pub fn commit(mut self) -> Result<(), Status> {
        self.finished = true;
        self.store.commit_staged(&self.key)
    }

    /// Discard the staged record.
    pub fn abort(mut self) {
        self.finished = true;
        self.store.abort_staged(&self.key);
    }
}

impl Drop for PendingWrite<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.store.abort_staged(&self.key);
        }
    }
}
