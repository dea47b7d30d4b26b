//! Public-key registry and key-file management.
//!
//! The registry maps user names to compressed public keys and backs every
//! signature lookup in the ledger. Secret keys never enter the registry; they
//! live in per-user JSON key files on disk, created at registration time.

use crate::clock;
use crate::crypto::KeyPair;
use crate::error::ChainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct KeyRegistry {
    keys: BTreeMap<String, Vec<u8>>,
}

impl KeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an existing public key for `user`. Rejects duplicates.
    pub fn register(&mut self, user: &str, public_key: Vec<u8>) -> Result<(), ChainError> {
        if self.keys.contains_key(user) {
            return Err(ChainError::UserAlreadyExists(user.to_string()));
        }
        self.keys.insert(user.to_string(), public_key);
        Ok(())
    }

    /// Generates a fresh keypair for `user`, registers its public key, and
    /// returns the pair so the caller can persist the secret half.
    pub fn generate(&mut self, user: &str) -> Result<KeyPair, ChainError> {
        if self.keys.contains_key(user) {
            return Err(ChainError::UserAlreadyExists(user.to_string()));
        }
        let keypair = KeyPair::generate();
        self.keys
            .insert(user.to_string(), keypair.public_key_bytes().to_vec());
        Ok(keypair)
    }

    pub fn public_key(&self, user: &str) -> Option<&[u8]> {
        self.keys.get(user).map(|k| k.as_slice())
    }

    pub fn contains(&self, user: &str) -> bool {
        self.keys.contains_key(user)
    }

    pub fn users(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(|k| k.as_str())
    }

    pub fn user_count(&self) -> usize {
        self.keys.len()
    }
}

/// On-disk form of a user's keypair.
#[derive(Debug, Serialize, Deserialize)]
pub struct KeyFile {
    pub user: String,
    pub public_key_hex: String,
    pub secret_key_hex: String,
    pub created: String,
}

fn key_file_path(keys_dir: &Path, user: &str) -> PathBuf {
    keys_dir.join(format!("{}.key.json", user))
}

/// Writes `keypair` for `user` under `keys_dir`, creating the directory if
/// needed. Returns the path written.
pub fn save_key_file(keys_dir: &Path, user: &str, keypair: &KeyPair) -> Result<PathBuf, ChainError> {
    fs::create_dir_all(keys_dir)?;

    let key_file = KeyFile {
        user: user.to_string(),
        public_key_hex: hex::encode(keypair.public_key_bytes()),
        secret_key_hex: hex::encode(keypair.secret_key.secret_bytes()),
        created: clock::now(),
    };

    let path = key_file_path(keys_dir, user);
    let json = serde_json::to_string_pretty(&key_file)
        .map_err(|e| ChainError::IoError(format!("Failed to encode key file: {}", e)))?;
    fs::write(&path, json)?;
    Ok(path)
}

/// Reloads `user`'s keypair from its key file.
pub fn load_key_file(keys_dir: &Path, user: &str) -> Result<KeyPair, ChainError> {
    let path = key_file_path(keys_dir, user);
    let json = fs::read_to_string(&path)
        .map_err(|e| ChainError::IoError(format!("Failed to read {}: {}", path.display(), e)))?;
    let key_file: KeyFile = serde_json::from_str(&json)
        .map_err(|e| ChainError::IoError(format!("Malformed key file {}: {}", path.display(), e)))?;

    let secret = hex::decode(&key_file.secret_key_hex)
        .map_err(|e| ChainError::CryptoError(format!("Invalid secret key encoding: {}", e)))?;
    KeyPair::from_secret_bytes(&secret)
}

/// Shortens a key or hash for console display.
pub fn truncate_key(key: &str) -> String {
    const HEAD: usize = 12;
    const TAIL: usize = 12;
    if key.len() <= HEAD + TAIL {
        return key.to_string();
    }
    format!("{}...{}", &key[..HEAD], &key[key.len() - TAIL..])
}
