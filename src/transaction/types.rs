//! Transaction types for basechain

use crate::address::is_valid_address;
use crate::clock;
use crate::crypto::{sha256_hex, KeyPair};
use crate::error::ChainError;
use fixed::types::I64F64;
use std::fmt;

/// Monetary type for balances and transfer amounts. Fixed-point keeps the
/// ledger's arithmetic deterministic across platforms.
pub type Amount = I64F64;

/// Maximum metadata length in characters; longer input is truncated.
pub const MAX_METADATA_CHARS: usize = 512;

/// Canonical decimal rendering of an amount: exactly six fractional digits.
///
/// This string enters the transaction id pre-image, the signing payload, and
/// (through the transaction display line) every block hash. Changing it
/// invalidates all existing signatures and sealed blocks.
pub fn format_amount(amount: Amount) -> String {
    format!("{:.6}", amount)
}

/// A signed value transfer. Immutable once constructed; `sign` is the only
/// permitted mutation and only succeeds once.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub receiver: String,
    pub amount: Amount,
    pub timestamp: String,
    pub metadata: String,
    pub tx_id: String,
    pub signature: String,
}

impl Transaction {
    /// Builds a transaction with field-level sanitising: invalid addresses
    /// become empty strings, non-positive amounts become zero, metadata is
    /// truncated. The id is derived from the stored (sanitised) fields.
    pub fn new(from: &str, to: &str, amount: Amount, metadata: &str) -> Self {
        let sender = if is_valid_address(from) {
            from.to_string()
        } else {
            String::new()
        };
        let receiver = if is_valid_address(to) {
            to.to_string()
        } else {
            String::new()
        };
        let amount = if amount > Amount::ZERO {
            amount
        } else {
            Amount::ZERO
        };
        let metadata: String = metadata.chars().take(MAX_METADATA_CHARS).collect();
        let timestamp = clock::now();

        let tx_id = sha256_hex(&format!(
            "{}{}{}{}{}",
            sender,
            receiver,
            format_amount(amount),
            timestamp,
            metadata
        ));

        Transaction {
            sender,
            receiver,
            amount,
            timestamp,
            metadata,
            tx_id,
            signature: String::new(),
        }
    }

    /// A transfer minted by the ledger itself. Carries no signature and skips
    /// signature and balance checks during validation.
    pub fn system(to: &str, amount: Amount) -> Self {
        Transaction::new(crate::address::SYSTEM_SENDER, to, amount, "")
    }

    /// The deterministic byte string a signature commits to. Its layout is
    /// part of the protocol; see [`format_amount`].
    pub fn signing_payload(&self) -> String {
        format!(
            "{}{}{}{}{}{}",
            self.tx_id,
            self.sender,
            self.receiver,
            format_amount(self.amount),
            self.timestamp,
            self.metadata
        )
    }

    /// Signs the transaction, storing the hex-encoded compact signature.
    /// Fails on re-sign and on transactions whose fields were sanitised away.
    pub fn sign(&mut self, keypair: &KeyPair) -> Result<(), ChainError> {
        if !self.signature.is_empty() {
            return Err(ChainError::AlreadySigned(self.tx_id.clone()));
        }
        if self.sender.is_empty() || self.receiver.is_empty() || self.amount <= Amount::ZERO {
            return Err(ChainError::InvalidTransaction(format!(
                "Refusing to sign transaction {} with invalid fields",
                self.tx_id
            )));
        }

        let signature = keypair.sign(self.signing_payload().as_bytes())?;
        self.signature = hex::encode(signature);
        Ok(())
    }

    pub fn is_signed(&self) -> bool {
        !self.signature.is_empty()
    }

    pub fn is_system(&self) -> bool {
        self.sender == crate::address::SYSTEM_SENDER
    }
}

/// Human-readable single-line rendering. Doubles as the per-transaction
/// component of the block hash pre-image, so the layout must stay stable.
impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "txId: {}, from: {}, to: {}, amount: {}, timestamp: {}, metadata: {}, signature: {}",
            self.tx_id,
            self.sender,
            self.receiver,
            format_amount(self.amount),
            self.timestamp,
            self.metadata,
            self.signature
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::sha256_hex;

    #[test]
    fn id_is_a_pure_function_of_the_stored_fields() {
        let tx = Transaction::new("Alice", "Bob_1", Amount::from_num(42), "coffee");
        let expected = sha256_hex(&format!(
            "{}{}{}{}{}",
            tx.sender,
            tx.receiver,
            format_amount(tx.amount),
            tx.timestamp,
            tx.metadata
        ));
        assert_eq!(tx.tx_id, expected);
    }

    #[test]
    fn invalid_addresses_are_stored_empty() {
        let tx = Transaction::new("xy", "Имя", Amount::from_num(1), "");
        assert!(tx.sender.is_empty());
        assert!(tx.receiver.is_empty());
    }

    #[test]
    fn non_positive_amounts_clamp_to_zero() {
        let tx = Transaction::new("Alice", "Bob_1", Amount::from_num(-5), "");
        assert_eq!(tx.amount, Amount::ZERO);
        let tx = Transaction::new("Alice", "Bob_1", Amount::ZERO, "");
        assert_eq!(tx.amount, Amount::ZERO);
    }

    #[test]
    fn metadata_is_truncated_to_512_chars() {
        let long = "x".repeat(2000);
        let tx = Transaction::new("Alice", "Bob_1", Amount::from_num(1), &long);
        assert_eq!(tx.metadata.chars().count(), MAX_METADATA_CHARS);

        // The id hashes the truncated metadata, so two inputs sharing a
        // 512-char prefix produce identical pre-images.
        let tx2 = Transaction::new("Alice", "Bob_1", Amount::from_num(1), &"x".repeat(512));
        assert_eq!(tx.metadata, tx2.metadata);
    }

    #[test]
    fn amount_formatting_is_fixed_width() {
        assert_eq!(format_amount(Amount::from_num(1000)), "1000.000000");
        assert_eq!(format_amount(Amount::from_num(2.5)), "2.500000");
        assert_eq!(format_amount(Amount::ZERO), "0.000000");
    }

    #[test]
    fn double_sign_is_rejected_and_signature_unchanged() {
        let keypair = KeyPair::generate();
        let mut tx = Transaction::new("Alice", "Bob_1", Amount::from_num(10), "");
        tx.sign(&keypair).unwrap();
        let first = tx.signature.clone();
        assert!(!first.is_empty());

        let err = tx.sign(&keypair).unwrap_err();
        assert!(matches!(err, ChainError::AlreadySigned(_)));
        assert_eq!(tx.signature, first);
    }

    #[test]
    fn signing_requires_valid_fields() {
        let keypair = KeyPair::generate();

        let mut no_receiver = Transaction::new("Alice", "x", Amount::from_num(10), "");
        assert!(no_receiver.sign(&keypair).is_err());

        let mut zero_amount = Transaction::new("Alice", "Bob_1", Amount::ZERO, "");
        assert!(zero_amount.sign(&keypair).is_err());
    }

    #[test]
    fn signature_is_hex_encoded_compact() {
        let keypair = KeyPair::generate();
        let mut tx = Transaction::new("Alice", "Bob_1", Amount::from_num(10), "");
        tx.sign(&keypair).unwrap();
        assert_eq!(tx.signature.len(), 128);
        assert!(tx.signature.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn system_transactions_need_no_signature() {
        let tx = Transaction::system("Genesis_User", Amount::from_num(1000));
        assert!(tx.is_system());
        assert!(!tx.is_signed());
        assert_eq!(tx.sender, "System");
    }
}
