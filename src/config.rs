//! Generator configuration (§6.1, §10.2).
//!
//! Loadable from a TOML file; every field carries `#[serde(default)]` so a
//! partial file is valid. Search order mirrors the rest of this family of
//! tools: `$FLEETGEN_CONFIG` env var, then `./fleetgen.toml`, then built-in
//! defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

fn default_trucks() -> u32 {
    200
}

fn default_days() -> u32 {
    183
}

fn default_seed() -> u64 {
    42
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./output")
}

fn default_workers() -> usize {
    1
}

fn default_train_count() -> u32 {
    120
}

fn default_val_count() -> u32 {
    50
}

fn default_test_count() -> u32 {
    30
}

/// Tunables for a generation run. Consumed by an external CLI/orchestrator
/// as well as by the bundled smoke binary (§10.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_trucks")]
    pub trucks: u32,

    #[serde(default = "default_days")]
    pub days: u32,

    #[serde(default = "default_seed")]
    pub seed: u64,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_workers")]
    pub workers: usize,

    #[serde(default)]
    pub skip_existing: bool,

    #[serde(default)]
    pub single_truck: Option<u32>,

    #[serde(default)]
    pub single_day: Option<u32>,

    /// 10 trucks x 1 day with a fixed, controlled fault manifest, for
    /// CI-style smoke checks rather than a full run.
    #[serde(default)]
    pub validation_checkpoint: bool,

    #[serde(default = "default_train_count")]
    pub train_count: u32,

    #[serde(default = "default_val_count")]
    pub val_count: u32,

    #[serde(default = "default_test_count")]
    pub test_count: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            trucks: default_trucks(),
            days: default_days(),
            seed: default_seed(),
            output_dir: default_output_dir(),
            workers: default_workers(),
            skip_existing: false,
            single_truck: None,
            single_day: None,
            validation_checkpoint: false,
            train_count: default_train_count(),
            val_count: default_val_count(),
            test_count: default_test_count(),
        }
    }
}

impl GeneratorConfig {
    /// Search order: `$FLEETGEN_CONFIG`, then `./fleetgen.toml`, then
    /// built-in defaults. Missing files at either of the first two steps
    /// fall through rather than error; a present-but-malformed file is an
    /// error.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = env::var("FLEETGEN_CONFIG") {
            return Self::load_from(Path::new(&path));
        }
        let default_path = Path::new("./fleetgen.toml");
        if default_path.exists() {
            return Self::load_from(default_path);
        }
        Ok(Self::default())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg: Self = toml::from_str(&text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trucks == 0 {
            return Err(ConfigError::InvalidFleetSize(self.trucks));
        }
        if self.days == 0 {
            return Err(ConfigError::InvalidHorizon(self.days));
        }
        let split_total = self.train_count + self.val_count + self.test_count;
        if split_total != self.trucks {
            return Err(ConfigError::InvalidSplitSizes(
                self.train_count,
                self.val_count,
                self.test_count,
                self.trucks,
            ));
        }
        Ok(())
    }
}
