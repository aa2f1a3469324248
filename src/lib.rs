//! readbench - point-read microbenchmarks over a fixed-schema record store
//!
//! Populates a key-value store with synthetic 64-field records and measures
//! random point reads of a single field under three access modes:
//! - **Full**: fetch and decode the whole record
//! - **LazyField**: fetch the encoded record and decode one field
//! - **LazyFieldReadUncommitted**: lazy field reads at read-uncommitted isolation
//!
//! Every read checks that the key-echo field matches the key it was read
//! under, so a run that completes also proves the store returned the right
//! records.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use readbench::prelude::*;
//!
//! let population = PopulationConfig::new().with_size(10_000).with_seed(7);
//! let fixture = Fixture::in_memory(&population, MemStoreConfig::default(), &mut population.rng())?;
//!
//! let workload = fixture.workload(AccessMode::LazyField);
//! let mut rng = population.rng();
//! workload.read_many(fixture.store(), &mut rng, 1000)?;
//!
//! fixture.teardown()?;
//! ```

#![warn(missing_docs)]

pub mod access;
pub mod codec;
pub mod config;
pub mod error;
pub mod fixture;
pub mod key;
pub mod record;
pub mod stats;
pub mod status;
pub mod store;
pub mod workload;

// Re-exports for convenience
pub use access::{AccessMode, FieldRef};
pub use error::BenchError;
pub use fixture::{populate, Fixture, PopulationConfig};
pub use key::{derive_key, Key, KeyShape, KeySpace};
pub use record::{FieldValue, Record, RecordGenerator, RecordSchema};
pub use status::Status;
pub use store::{KvStore, MemStore, MemStoreConfig, ReadIsolation, RecordHandle};
pub use workload::{ReadWorkload, WorkloadConfig};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::access::AccessMode;
    pub use crate::config::BenchConfig;
    pub use crate::error::BenchError;
    pub use crate::fixture::{Fixture, PopulationConfig};
    pub use crate::key::{Key, KeyShape, KeySpace};
    pub use crate::record::{FieldValue, Record, RecordGenerator, RecordSchema};
    pub use crate::status::Status;
    pub use crate::store::{KvStore, MemStore, MemStoreConfig, ReadIsolation};
    pub use crate::workload::{ReadWorkload, WorkloadConfig};
}
