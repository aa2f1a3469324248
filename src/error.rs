//! Errors surfaced to the measurement harness.
//!
//! None of these are retried: population runs once, and lookups against a
//! static, fully populated store are expected to succeed. Each variant aborts
//! the current iteration and propagates to the caller.

use crate::config::ConfigError;
use crate::key::{Key, KeyShape};
use crate::record::FieldValue;
use crate::status::Status;

/// Errors returned by fixture setup and read workloads.
#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    /// The store rejected an insert during population.
    #[error("population failed at index {index} (key {key}): {status}")]
    Population {
        /// Population index of the failed insert.
        index: u64,
        /// Key of the failed insert.
        key: Key,
        /// Status reported by the store.
        status: Status,
    },
    /// The store did not hold exactly one record per key after population.
    #[error("store holds {stored} keys after populating {expected}")]
    PopulationMismatch {
        /// Size of the key space.
        expected: u64,
        /// Keys reported by the store.
        stored: u64,
    },
    /// A lookup found no record for a key that should exist.
    #[error("key not found: {0}")]
    KeyNotFound(Key),
    /// The key-echo field did not match the key's canonical form.
    #[error("consistency violation for key {key}: expected {expected}, observed {observed}")]
    ConsistencyViolation {
        /// Key that was read.
        key: Key,
        /// Canonical form of the key.
        expected: FieldValue,
        /// Value returned by the store.
        observed: FieldValue,
    },
    /// Records of the schema cannot echo keys of the configured shape.
    #[error("schema echoes {schema} keys but the key space holds {keys} keys")]
    SchemaMismatch {
        /// Key shape of the record schema.
        schema: KeyShape,
        /// Key shape of the key space.
        keys: KeyShape,
    },
    /// Any other store failure (closed store, corrupt record bytes).
    #[error("store error: {0}")]
    Store(#[from] Status),
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl BenchError {
    /// Whether this error means the store is missing data or returned wrong data,
    /// as opposed to a setup or infrastructure failure.
    pub fn is_correctness_failure(&self) -> bool {
        matches!(
            self,
            BenchError::KeyNotFound(_) | BenchError::ConsistencyViolation { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = BenchError::KeyNotFound(Key::from("key_9"));
        assert_eq!(err.to_string(), "key not found: key_9");

        let err = BenchError::ConsistencyViolation {
            key: Key::Int(3),
            expected: FieldValue::Int(3),
            observed: FieldValue::Int(4),
        };
        assert_eq!(
            err.to_string(),
            "consistency violation for key 3: expected 3, observed 4"
        );

        let err = BenchError::Population {
            index: 10,
            key: Key::Int(10),
            status: Status::Aborted,
        };
        assert_eq!(
            err.to_string(),
            "population failed at index 10 (key 10): Aborted"
        );
    }

    #[test]
    fn test_population_mismatch_display() {
        let err = BenchError::PopulationMismatch {
            expected: 10,
            stored: 11,
        };
        assert_eq!(err.to_string(), "store holds 11 keys after populating 10");
        assert!(!err.is_correctness_failure());
    }

    #[test]
    fn test_from_status() {
        let err: BenchError = Status::InvalidOperation.into();
        assert!(matches!(err, BenchError::Store(Status::InvalidOperation)));
        assert!(!err.is_correctness_failure());
        assert!(BenchError::KeyNotFound(Key::Int(0)).is_correctness_failure());
    }
}
