//! Error types for basechain

use std::fmt;

#[derive(Debug, Clone)]
pub enum ChainError {
    InvalidAddress(String),
    UserAlreadyExists(String),
    MissingPublicKey(String),
    InvalidTransaction(String),
    InsufficientFunds(String),
    AlreadySigned(String),
    CryptoError(String),
    ConfigError(String),
    IoError(String),
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ChainError::InvalidAddress(msg) => write!(f, "Invalid address: {}", msg),
            ChainError::UserAlreadyExists(msg) => write!(f, "User already exists: {}", msg),
            ChainError::MissingPublicKey(msg) => write!(f, "Public key not found: {}", msg),
            ChainError::InvalidTransaction(msg) => write!(f, "Invalid transaction: {}", msg),
            ChainError::InsufficientFunds(msg) => write!(f, "Insufficient funds: {}", msg),
            ChainError::AlreadySigned(msg) => write!(f, "Transaction already signed: {}", msg),
            ChainError::CryptoError(msg) => write!(f, "Cryptographic error: {}", msg),
            ChainError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            ChainError::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for ChainError {}

impl From<std::io::Error> for ChainError {
    fn from(err: std::io::Error) -> Self {
        ChainError::IoError(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ChainError>;
