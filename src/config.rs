//! Configuration management for basechain

use crate::error::ChainError;
use serde::Deserialize;
use std::fs;

const CONFIG_PATH: &str = "basechain.toml";

/// Hash digest length in hex digits; the difficulty can never exceed it.
const MAX_DIFFICULTY: u32 = 64;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub mining: MiningConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MiningConfig {
    #[serde(default = "default_difficulty")]
    pub difficulty: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_archive_path")]
    pub archive_path: String,
    #[serde(default = "default_keys_dir")]
    pub keys_dir: String,
}

impl Default for MiningConfig {
    fn default() -> Self {
        MiningConfig {
            difficulty: default_difficulty(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            archive_path: default_archive_path(),
            keys_dir: default_keys_dir(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            mining: MiningConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

fn default_difficulty() -> u32 {
    crate::blockchain::GENESIS_DIFFICULTY
}

fn default_archive_path() -> String {
    "blockchain.dat".to_string()
}

fn default_keys_dir() -> String {
    "keys".to_string()
}

/// Loads `basechain.toml`, falling back to defaults when the file is absent,
/// then validates the critical values.
pub fn load_config() -> Result<Config, ChainError> {
    let config_str = fs::read_to_string(CONFIG_PATH).unwrap_or_default();
    let config: Config = if config_str.is_empty() {
        Config::default()
    } else {
        toml::from_str(&config_str).map_err(|e| ChainError::ConfigError(e.to_string()))?
    };

    if config.storage.archive_path.is_empty() {
        return Err(ChainError::ConfigError(
            "storage.archive_path must not be empty".to_string(),
        ));
    }
    if config.storage.keys_dir.is_empty() {
        return Err(ChainError::ConfigError(
            "storage.keys_dir must not be empty".to_string(),
        ));
    }
    if config.mining.difficulty > MAX_DIFFICULTY {
        return Err(ChainError::ConfigError(format!(
            "mining.difficulty {} exceeds the hash width of {} hex digits",
            config.mining.difficulty, MAX_DIFFICULTY
        )));
    }

    Ok(config)
}
