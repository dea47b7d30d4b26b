//! Chain archive: a deterministic text dump sealed with authenticated
//! encryption.
//!
//! The dump is one-way; nothing in the system parses it back. The archive
//! frame is `nonce ‖ ciphertext` with no header or version field, and the
//! file is written in a single call so an error never leaves a partial frame
//! on disk.

use crate::blockchain::Block;
use crate::crypto::{self, ARCHIVE_KEY_SIZE};
use crate::error::ChainError;
use std::fs;
use std::path::Path;
use tracing::info;

const BLOCK_DIVIDER: &str = "--------------------------";

/// Renders the chain as a human-readable dump, one section per block.
pub fn serialize_chain(chain: &[Block]) -> String {
    let mut out = String::new();
    for block in chain {
        out.push_str(&format!("Index: {}\n", block.index));
        out.push_str(&format!("Timestamp: {}\n", block.timestamp));
        out.push_str("Transactions:\n");
        for tx in &block.transactions {
            out.push_str(&format!("  - {}\n", tx));
        }
        out.push_str(&format!("Previous Hash: {}\n", block.previous_hash));
        out.push_str(&format!("Hash: {}\n", block.hash));
        out.push_str(BLOCK_DIVIDER);
        out.push('\n');
    }
    out
}

/// Encrypts a chain dump into an archive frame.
pub fn seal_archive(plaintext: &str, key: &[u8; ARCHIVE_KEY_SIZE]) -> Result<Vec<u8>, ChainError> {
    crypto::seal(plaintext.as_bytes(), key)
}

/// Decrypts an archive frame back into the dump text.
pub fn open_archive(framed: &[u8], key: &[u8; ARCHIVE_KEY_SIZE]) -> Result<String, ChainError> {
    let plaintext = crypto::open(framed, key)?;
    String::from_utf8(plaintext)
        .map_err(|e| ChainError::CryptoError(format!("Archive is not valid UTF-8: {}", e)))
}

/// Serializes, seals, and writes the chain to `path` in one shot.
pub fn save_archive(
    path: &Path,
    chain: &[Block],
    key: &[u8; ARCHIVE_KEY_SIZE],
) -> Result<(), ChainError> {
    let dump = serialize_chain(chain);
    let framed = seal_archive(&dump, key)?;
    fs::write(path, &framed)?;
    info!(
        path = %path.display(),
        blocks = chain.len(),
        bytes = framed.len(),
        "chain archive written"
    );
    Ok(())
}
