//! Configuration loading helpers.
//!
//! A TOML file (optionally named by `READBENCH_CONFIG`) provides the base
//! values; `READBENCH__<section>__<field>` environment variables override
//! them. Anything left unset falls back to the defaults of
//! [`PopulationConfig`], [`WorkloadConfig`] and [`MemStoreConfig`].

use std::env;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::access::AccessMode;
use crate::fixture::PopulationConfig;
use crate::key::KeyShape;
use crate::store::MemStoreConfig;
use crate::workload::WorkloadConfig;

/// Environment variable naming a TOML config file.
pub const CONFIG_PATH_ENV: &str = "READBENCH_CONFIG";

const ENV_OVERRIDE_PREFIX: &str = "READBENCH__";

/// Errors returned by configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error while reading config files.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parse error.
    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),
    /// Invalid value for a key.
    #[error("invalid value for {key}: {value}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Raw value string.
        value: String,
    },
    /// Unknown configuration key.
    #[error("unknown config key: {0}")]
    UnknownKey(String),
}

/// Top-level configuration schema.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BenchConfig {
    /// Population overrides.
    pub population: Option<PopulationSpec>,
    /// Workload overrides.
    pub workload: Option<WorkloadSpec>,
    /// Store overrides.
    pub store: Option<StoreSpec>,
}

impl BenchConfig {
    /// Load configuration from a TOML file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Load configuration from the `READBENCH_CONFIG` env var (if set),
    /// then apply `READBENCH__section__field` overrides.
    pub fn load_from_env() -> Result<Self, ConfigError> {
        let mut config = match env::var(CONFIG_PATH_ENV).ok() {
            Some(path) => Self::load_from_path(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply environment overrides in-place.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        for (key, value) in env::vars() {
            let Some(path) = key.strip_prefix(ENV_OVERRIDE_PREFIX) else {
                continue;
            };
            let path = path.to_ascii_lowercase();
            let parts: Vec<&str> = path.split("__").collect();
            let value = value.trim();

            match parts.as_slice() {
                ["population", "size"] => {
                    self.population_mut().size = Some(parse_value(&key, value)?);
                }
                ["population", "key_shape"] => {
                    self.population_mut().key_shape = Some(parse_value(&key, value)?);
                }
                ["population", "seed"] => {
                    self.population_mut().seed = Some(parse_value(&key, value)?);
                }
                ["workload", "modes"] => {
                    self.workload_mut().modes = Some(parse_list(&key, value)?);
                }
                ["workload", "bulk_reads"] => {
                    self.workload_mut().bulk_reads = Some(parse_value(&key, value)?);
                }
                ["workload", "threads"] => {
                    self.workload_mut().threads = Some(parse_value(&key, value)?);
                }
                ["store", "shards"] => {
                    self.store_mut().shards = Some(parse_value(&key, value)?);
                }
                ["store", "copy_on_read"] => {
                    self.store_mut().copy_on_read = Some(parse_value(&key, value)?);
                }
                _ => return Err(ConfigError::UnknownKey(key)),
            }
        }

        Ok(())
    }

    /// Build a `PopulationConfig` using defaults plus overrides.
    pub fn to_population_config(&self) -> PopulationConfig {
        let mut config = PopulationConfig::default();
        if let Some(population) = &self.population {
            population.apply_to(&mut config);
        }
        config
    }

    /// Build a `WorkloadConfig` using defaults plus overrides.
    pub fn to_workload_config(&self) -> WorkloadConfig {
        let mut config = WorkloadConfig::default();
        if let Some(workload) = &self.workload {
            workload.apply_to(&mut config);
        }
        config
    }

    /// Build a `MemStoreConfig` using defaults plus overrides.
    pub fn to_store_config(&self) -> MemStoreConfig {
        let mut config = MemStoreConfig::default();
        if let Some(store) = &self.store {
            store.apply_to(&mut config);
        }
        config
    }

    fn population_mut(&mut self) -> &mut PopulationSpec {
        self.population.get_or_insert_with(PopulationSpec::default)
    }

    fn workload_mut(&mut self) -> &mut WorkloadSpec {
        self.workload.get_or_insert_with(WorkloadSpec::default)
    }

    fn store_mut(&mut self) -> &mut StoreSpec {
        self.store.get_or_insert_with(StoreSpec::default)
    }
}

/// `[population]` overrides.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PopulationSpec {
    /// Number of records.
    pub size: Option<u64>,
    /// Key shape: "integer" or "text".
    pub key_shape: Option<KeyShape>,
    /// RNG seed.
    pub seed: Option<u64>,
}

impl PopulationSpec {
    fn apply_to(&self, config: &mut PopulationConfig) {
        if let Some(value) = self.size {
            config.size = value;
        }
        if let Some(value) = self.key_shape {
            config.key_shape = value;
        }
        if let Some(value) = self.seed {
            config.seed = Some(value);
        }
    }
}

/// `[workload]` overrides.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkloadSpec {
    /// Access modes to run.
    pub modes: Option<Vec<AccessMode>>,
    /// Lookups per bulk read.
    pub bulk_reads: Option<u64>,
    /// Worker threads.
    pub threads: Option<usize>,
}

impl WorkloadSpec {
    fn apply_to(&self, config: &mut WorkloadConfig) {
        if let Some(modes) = &self.modes {
            if !modes.is_empty() {
                config.modes = modes.clone();
            }
        }
        if let Some(value) = self.bulk_reads {
            config.bulk_reads = value;
        }
        if let Some(value) = self.threads {
            config.threads = value.max(1);
        }
    }
}

/// `[store]` overrides.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreSpec {
    /// Shard count.
    pub shards: Option<usize>,
    /// Copy record bytes into each handle.
    pub copy_on_read: Option<bool>,
}

impl StoreSpec {
    fn apply_to(&self, config: &mut MemStoreConfig) {
        if let Some(value) = self.shards {
            config.shards = value.max(1);
        }
        if let Some(value) = self.copy_on_read {
            config.copy_on_read = value;
        }
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_list<T: std::str::FromStr>(key: &str, value: &str) -> Result<Vec<T>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| parse_value(key, item))
        .collect()
}
