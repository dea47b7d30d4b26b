//! Cryptographic primitives for basechain

use crate::error::ChainError;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use once_cell::sync::Lazy;
use rand::rngs::OsRng;
use rand::RngCore;
use secp256k1::{
    constants::{COMPACT_SIGNATURE_SIZE, PUBLIC_KEY_SIZE, SECRET_KEY_SIZE},
    ecdsa::Signature,
    All, Message, PublicKey, Secp256k1, SecretKey,
};
use sha2::{Digest, Sha256};

/// A thread-safe, lazily initialized Secp256k1 context.
/// This prevents repeated, unnecessary context creation.
static SECP256K1_CONTEXT: Lazy<Secp256k1<All>> = Lazy::new(Secp256k1::new);

/// Key length for the archive cipher (AES-256).
pub const ARCHIVE_KEY_SIZE: usize = 32;
/// Nonce length for AES-256-GCM.
pub const ARCHIVE_NONCE_SIZE: usize = 12;

/// SHA-256 of `input`, lowercase hex. The canonical textual hash form used in
/// transaction ids and block hashes.
pub fn sha256_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

/// Derives a 32-byte archive key from an operator passphrase.
pub fn derive_archive_key(passphrase: &str) -> [u8; ARCHIVE_KEY_SIZE] {
    Sha256::digest(passphrase.as_bytes()).into()
}

#[derive(Debug, Clone)]
pub struct KeyPair {
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
}

impl KeyPair {
    /// Generates a new random KeyPair using the OS random number generator.
    pub fn generate() -> Self {
        let secret_key = SecretKey::new(&mut OsRng);
        let public_key = PublicKey::from_secret_key(&SECP256K1_CONTEXT, &secret_key);
        KeyPair {
            secret_key,
            public_key,
        }
    }

    /// Creates a KeyPair from raw secret key bytes.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self, ChainError> {
        let secret_key = SecretKey::from_slice(bytes).map_err(|e| {
            if bytes.len() != SECRET_KEY_SIZE {
                ChainError::CryptoError(format!(
                    "Secret key must be {} bytes, got {}",
                    SECRET_KEY_SIZE,
                    bytes.len()
                ))
            } else {
                ChainError::CryptoError(format!("Invalid secret key bytes: {}", e))
            }
        })?;
        let public_key = PublicKey::from_secret_key(&SECP256K1_CONTEXT, &secret_key);
        Ok(KeyPair {
            secret_key,
            public_key,
        })
    }

    /// Returns the KeyPair's public key as a compressed byte array.
    pub fn public_key_bytes(&self) -> [u8; PUBLIC_KEY_SIZE] {
        self.public_key.serialize()
    }

    /// Signs a message (hashed with SHA-256 first) and returns the compact
    /// signature bytes.
    pub fn sign(&self, message: &[u8]) -> Result<[u8; COMPACT_SIGNATURE_SIZE], ChainError> {
        let digest = Sha256::digest(message);
        let message = Message::from_digest_slice(&digest)
            .map_err(|e| ChainError::CryptoError(format!("Failed to create message: {}", e)))?;
        let signature = SECP256K1_CONTEXT.sign_ecdsa(&message, &self.secret_key);
        Ok(signature.serialize_compact())
    }
}

/// Verifies an ECDSA signature given the raw public key bytes, message, and
/// signature bytes. Never panics; every internal failure is an `Err`.
pub fn verify_signature(
    public_key_bytes: &[u8],
    message: &[u8],
    signature_bytes: &[u8],
) -> Result<(), ChainError> {
    if public_key_bytes.len() != PUBLIC_KEY_SIZE {
        return Err(ChainError::CryptoError(format!(
            "Public key must be exactly {} bytes (compressed), got {}",
            PUBLIC_KEY_SIZE,
            public_key_bytes.len()
        )));
    }
    if signature_bytes.len() != COMPACT_SIGNATURE_SIZE {
        return Err(ChainError::CryptoError(format!(
            "Signature must be exactly {} bytes (compact), got {}",
            COMPACT_SIGNATURE_SIZE,
            signature_bytes.len()
        )));
    }

    let public_key = PublicKey::from_slice(public_key_bytes)
        .map_err(|e| ChainError::CryptoError(format!("Invalid public key: {}", e)))?;

    let digest = Sha256::digest(message);
    let message = Message::from_digest_slice(&digest)
        .map_err(|e| ChainError::CryptoError(format!("Failed to create message: {}", e)))?;

    let signature = Signature::from_compact(signature_bytes)
        .map_err(|e| ChainError::CryptoError(format!("Invalid signature: {}", e)))?;

    SECP256K1_CONTEXT
        .verify_ecdsa(&message, &signature, &public_key)
        .map_err(|_| ChainError::CryptoError("Signature verification failed".to_string()))
}

/// Encrypts `plaintext` with AES-256-GCM under a fresh random nonce and
/// returns the framed output `nonce ‖ ciphertext`.
pub fn seal(plaintext: &[u8], key: &[u8; ARCHIVE_KEY_SIZE]) -> Result<Vec<u8>, ChainError> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let mut nonce_bytes = [0u8; ARCHIVE_NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| ChainError::CryptoError(format!("Encryption failed: {}", e)))?;

    let mut framed = Vec::with_capacity(ARCHIVE_NONCE_SIZE + ciphertext.len());
    framed.extend_from_slice(&nonce_bytes);
    framed.extend_from_slice(&ciphertext);
    Ok(framed)
}

/// Decrypts a frame produced by [`seal`]. Authentication failure is an `Err`.
pub fn open(framed: &[u8], key: &[u8; ARCHIVE_KEY_SIZE]) -> Result<Vec<u8>, ChainError> {
    if framed.len() < ARCHIVE_NONCE_SIZE {
        return Err(ChainError::CryptoError(format!(
            "Archive frame too short: {} bytes",
            framed.len()
        )));
    }
    let (nonce_bytes, ciphertext) = framed.split_at(ARCHIVE_NONCE_SIZE);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|_| ChainError::CryptoError("Archive authentication failed".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_generation() {
        let keypair = KeyPair::generate();
        assert_eq!(keypair.public_key_bytes().len(), PUBLIC_KEY_SIZE);
        assert_eq!(keypair.secret_key.as_ref().len(), SECRET_KEY_SIZE);
    }

    #[test]
    fn test_sha256_hex_is_canonical() {
        let digest = sha256_hex("abc");
        assert_eq!(digest.len(), 64);
        assert_eq!(
            digest,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_signing_and_verification() {
        let keypair = KeyPair::generate();
        let message = b"Hello, basechain!";

        let signature = keypair.sign(message).unwrap();
        let pubkey_bytes = keypair.public_key_bytes();

        assert!(verify_signature(&pubkey_bytes, message, &signature).is_ok());
        assert_eq!(signature.len(), COMPACT_SIGNATURE_SIZE);
    }

    #[test]
    fn test_wrong_key_rejected() {
        let keypair1 = KeyPair::generate();
        let keypair2 = KeyPair::generate();

        let message = b"Test message";
        let signature = keypair1.sign(message).unwrap();
        let pubkey2_bytes = keypair2.public_key_bytes();

        let result = verify_signature(&pubkey2_bytes, message, &signature);
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "Cryptographic error: Signature verification failed"
        );
    }

    #[test]
    fn test_tampered_message_rejected() {
        let keypair = KeyPair::generate();
        let signature = keypair.sign(b"Original message").unwrap();
        let pubkey_bytes = keypair.public_key_bytes();

        let result = verify_signature(&pubkey_bytes, b"Tampered message", &signature);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_key_or_sig_length_check() {
        let keypair = KeyPair::generate();
        let message = b"Test";
        let signature = keypair.sign(message).unwrap();
        let pubkey_bytes = keypair.public_key_bytes();

        let result = verify_signature(&pubkey_bytes[1..], message, &signature);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Public key must be exactly"));

        let result = verify_signature(&pubkey_bytes, message, &signature[1..]);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Signature must be exactly"));
    }

    #[test]
    fn test_seal_frames_nonce_then_ciphertext() {
        let key = derive_archive_key("test passphrase");
        let plaintext = b"chain dump";

        let framed = seal(plaintext, &key).unwrap();
        assert!(framed.len() >= ARCHIVE_NONCE_SIZE + plaintext.len());

        let recovered = open(&framed, &key).unwrap();
        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn test_open_rejects_wrong_key_and_tampering() {
        let key = derive_archive_key("right");
        let mut framed = seal(b"payload", &key).unwrap();

        let wrong = derive_archive_key("wrong");
        assert!(open(&framed, &wrong).is_err());

        let last = framed.len() - 1;
        framed[last] ^= 0x01;
        assert!(open(&framed, &key).is_err());
    }
}
