//! Store population and lifecycle.
//!
//! A [`Fixture`] owns a store for one benchmark run: it populates the store
//! once in [`Fixture::setup`] and closes it exactly once, either through
//! [`Fixture::teardown`] or when dropped (including when setup fails part way).

use std::sync::Arc;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::access::AccessMode;
use crate::error::BenchError;
use crate::key::{KeyShape, KeySpace};
use crate::record::{RecordGenerator, RecordSchema};
use crate::store::{KvStore, MemStore, MemStoreConfig};
use crate::workload::ReadWorkload;

/// Default number of records.
pub const DEFAULT_POPULATION_SIZE: u64 = 500_000;

/// What to populate the store with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopulationConfig {
    /// Number of records
    pub size: u64,
    /// Key shape
    pub key_shape: KeyShape,
    /// RNG seed for record generation; `None` seeds from OS entropy
    pub seed: Option<u64>,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_POPULATION_SIZE,
            key_shape: KeyShape::Integer,
            seed: None,
        }
    }
}

impl PopulationConfig {
    /// Create a new configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of records
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    /// Set the key shape
    pub fn with_key_shape(mut self, key_shape: KeyShape) -> Self {
        self.key_shape = key_shape;
        self
    }

    /// Set the RNG seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Key space described by this configuration.
    pub fn key_space(&self) -> KeySpace {
        KeySpace::new(self.key_shape, self.size)
    }

    /// RNG for record generation.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Insert one generated record per key of `key_space` into `store`.
///
/// The first rejected insert aborts population with [`BenchError::Population`].
/// Afterwards the store must hold exactly `key_space.size()` keys, otherwise
/// [`BenchError::PopulationMismatch`] is returned.
pub fn populate<S, R>(
    store: &S,
    generator: &RecordGenerator,
    key_space: &KeySpace,
    rng: &mut R,
) -> Result<(), BenchError>
where
    S: KvStore + ?Sized,
    R: Rng + ?Sized,
{
    let start = Instant::now();
    if tracing::enabled!(tracing::Level::INFO) {
        tracing::info!(
            size = key_space.size(),
            key_shape = %key_space.shape(),
            fields = generator.schema().len(),
            "populating store"
        );
    }

    for index in 0..key_space.size() {
        let key = key_space.key_at(index);
        let record = generator.generate(&key, rng);
        if let Err(status) = store.put(key.clone(), &record) {
            return Err(BenchError::Population { index, key, status });
        }
    }

    let stored = store.len() as u64;
    if stored != key_space.size() {
        return Err(BenchError::PopulationMismatch {
            expected: key_space.size(),
            stored,
        });
    }
    if tracing::enabled!(tracing::Level::INFO) {
        tracing::info!(
            size = key_space.size(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "store populated"
        );
    }
    Ok(())
}

/// A populated store scoped to one benchmark run.
pub struct Fixture<S: KvStore> {
    store: S,
    generator: RecordGenerator,
    key_space: KeySpace,
    released: bool,
}

impl<S: KvStore> Fixture<S> {
    /// Populate `store` with one record per key of `key_space`.
    ///
    /// On failure the store is closed before the error is returned.
    pub fn setup<R: Rng + ?Sized>(
        store: S,
        generator: RecordGenerator,
        key_space: KeySpace,
        rng: &mut R,
    ) -> Result<Self, BenchError> {
        let fixture = Self {
            store,
            generator,
            key_space,
            released: false,
        };

        let schema_shape = fixture.generator.schema().key_shape();
        if schema_shape != key_space.shape() {
            return Err(BenchError::SchemaMismatch {
                schema: schema_shape,
                keys: key_space.shape(),
            });
        }

        if let Err(err) = populate(&fixture.store, &fixture.generator, &fixture.key_space, rng) {
            tracing::warn!(error = %err, "population failed; releasing store");
            return Err(err);
        }
        Ok(fixture)
    }

    /// The populated store.
    #[inline]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Schema of the stored records.
    #[inline]
    pub fn schema(&self) -> &Arc<RecordSchema> {
        self.generator.schema()
    }

    /// The populated key space.
    #[inline]
    pub fn key_space(&self) -> KeySpace {
        self.key_space
    }

    /// Build a read workload over this fixture's key space and schema.
    pub fn workload(&self, mode: AccessMode) -> ReadWorkload {
        ReadWorkload::for_schema(mode, self.key_space, self.schema())
    }

    /// Close the store.
    pub fn teardown(mut self) -> Result<(), BenchError> {
        self.release()
    }

    fn release(&mut self) -> Result<(), BenchError> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        self.store.close()?;
        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!(size = self.key_space.size(), "fixture torn down");
        }
        Ok(())
    }
}

impl Fixture<MemStore> {
    /// Set up an in-memory store with the standard schema.
    pub fn in_memory<R: Rng + ?Sized>(
        population: &PopulationConfig,
        store_config: MemStoreConfig,
        rng: &mut R,
    ) -> Result<Self, BenchError> {
        let schema = Arc::new(RecordSchema::standard(population.key_shape));
        let store = MemStore::new(schema.clone(), store_config);
        Self::setup(
            store,
            RecordGenerator::new(schema),
            population.key_space(),
            rng,
        )
    }
}

impl<S: KvStore> Drop for Fixture<S> {
    fn drop(&mut self) {
        if let Err(err) = self.release() {
            tracing::warn!(error = %err, "failed to close store on drop");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Key;
    use crate::record::FieldValue;

    #[test]
    fn test_population_config_builder() {
        let config = PopulationConfig::new()
            .with_size(10)
            .with_key_shape(KeyShape::Text)
            .with_seed(3);
        assert_eq!(config.size, 10);
        assert_eq!(config.key_space(), KeySpace::new(KeyShape::Text, 10));
        assert_eq!(config.seed, Some(3));

        let default = PopulationConfig::default();
        assert_eq!(default.size, DEFAULT_POPULATION_SIZE);
        assert_eq!(default.key_shape, KeyShape::Integer);
        assert!(default.seed.is_none());
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let config = PopulationConfig::new().with_seed(17);
        let a: u64 = config.rng().gen();
        let b: u64 = config.rng().gen();
        assert_eq!(a, b);
    }

    #[test]
    fn test_in_memory_fixture() {
        let population = PopulationConfig::new().with_size(25).with_seed(1);
        let fixture =
            Fixture::in_memory(&population, MemStoreConfig::default(), &mut population.rng())
                .unwrap();

        assert_eq!(fixture.store().len(), 25);
        for key in fixture.key_space().keys() {
            let record = fixture.store().get(&key).unwrap().unwrap();
            assert_eq!(record.key_echo(), Some(&key.canonical_form()));
        }
        fixture.teardown().unwrap();
    }

    #[test]
    fn test_schema_mismatch_closes_store() {
        let schema = Arc::new(RecordSchema::standard(KeyShape::Integer));
        let store = Arc::new(MemStore::with_schema(schema.clone()));
        let result = Fixture::setup(
            store.clone(),
            RecordGenerator::new(schema),
            KeySpace::new(KeyShape::Text, 3),
            &mut StdRng::seed_from_u64(0),
        );

        assert!(matches!(
            result,
            Err(BenchError::SchemaMismatch {
                schema: KeyShape::Integer,
                keys: KeyShape::Text
            })
        ));
        assert!(store.is_closed());
    }

    #[test]
    fn test_drop_closes_store() {
        let schema = Arc::new(RecordSchema::standard(KeyShape::Integer));
        let store = Arc::new(MemStore::with_schema(schema.clone()));
        {
            let fixture = Fixture::setup(
                store.clone(),
                RecordGenerator::new(schema),
                KeySpace::new(KeyShape::Integer, 4),
                &mut StdRng::seed_from_u64(0),
            )
            .unwrap();
            assert_eq!(
                fixture.store().get(&Key::Int(3)).unwrap().unwrap().key_echo(),
                Some(&FieldValue::Int(3))
            );
        }
        assert!(store.is_closed());
    }
}
