//! Validation logic for transactions separated from type definitions

use crate::address::is_valid_address;
use crate::blockchain::BalanceMap;
use crate::error::ChainError;
use crate::transaction::types::{Amount, Transaction};
use tracing::warn;

impl Transaction {
    /// Validates this transaction against a working balance view.
    ///
    /// System transactions pass unconditionally. For everything else the
    /// checks run in a fixed order: signature presence, sender funds, strictly
    /// positive amount, receiver presence, receiver format (a soft warning
    /// only), and finally signature verification against the signing payload.
    pub fn validate(&self, public_key: &[u8], balances: &BalanceMap) -> Result<(), ChainError> {
        if self.is_system() {
            return Ok(());
        }

        if !self.is_signed() {
            return Err(ChainError::InvalidTransaction(format!(
                "Missing signature for TX {}",
                self.tx_id
            )));
        }

        match balances.get(&self.sender) {
            Some(balance) if *balance >= self.amount => {}
            _ => {
                return Err(ChainError::InsufficientFunds(format!(
                    "sender {} cannot cover {}",
                    self.sender,
                    crate::transaction::format_amount(self.amount)
                )))
            }
        }

        if self.amount <= Amount::ZERO {
            return Err(ChainError::InvalidTransaction(format!(
                "Non-positive amount for TX {}",
                self.tx_id
            )));
        }

        if self.receiver.is_empty() {
            return Err(ChainError::InvalidTransaction(format!(
                "Empty receiver for TX {}",
                self.tx_id
            )));
        }

        if !is_valid_address(&self.receiver) {
            warn!(
                receiver = %self.receiver,
                tx_id = %self.tx_id,
                "receiver address is malformed; funds may be unrecoverable"
            );
        }

        let signature = hex::decode(&self.signature).map_err(|e| {
            ChainError::InvalidTransaction(format!(
                "Malformed signature encoding for TX {}: {}",
                self.tx_id, e
            ))
        })?;

        crate::crypto::verify_signature(
            public_key,
            self.signing_payload().as_bytes(),
            &signature,
        )
        .map_err(|_| {
            ChainError::InvalidTransaction(format!("Signature INVALID for TX {}", self.tx_id))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;

    fn funded_balances(user: &str, amount: Amount) -> BalanceMap {
        let mut balances = BalanceMap::new();
        balances.insert(user.to_string(), amount);
        balances
    }

    #[test]
    fn system_transactions_skip_all_checks() {
        let tx = Transaction::system("Alice", Amount::from_num(100));
        let balances = BalanceMap::new();
        assert!(tx.validate(&[], &balances).is_ok());
    }

    #[test]
    fn unsigned_transactions_are_invalid() {
        let keypair = KeyPair::generate();
        let tx = Transaction::new("Alice", "Bob_1", Amount::from_num(10), "");
        let balances = funded_balances("Alice", Amount::from_num(100));
        assert!(tx
            .validate(&keypair.public_key_bytes(), &balances)
            .is_err());
    }

    #[test]
    fn insufficient_funds_are_rejected() {
        let keypair = KeyPair::generate();
        let mut tx = Transaction::new("Alice", "Bob_1", Amount::from_num(500), "");
        tx.sign(&keypair).unwrap();

        let balances = funded_balances("Alice", Amount::from_num(100));
        let err = tx
            .validate(&keypair.public_key_bytes(), &balances)
            .unwrap_err();
        assert!(matches!(err, ChainError::InsufficientFunds(_)));

        // An unknown sender fails the same check.
        let empty = BalanceMap::new();
        assert!(tx.validate(&keypair.public_key_bytes(), &empty).is_err());
    }

    #[test]
    fn valid_signed_transfer_passes() {
        let keypair = KeyPair::generate();
        let mut tx = Transaction::new("Alice", "Bob_1", Amount::from_num(10), "note");
        tx.sign(&keypair).unwrap();

        let balances = funded_balances("Alice", Amount::from_num(100));
        assert!(tx.validate(&keypair.public_key_bytes(), &balances).is_ok());
    }

    #[test]
    fn signature_from_another_key_is_rejected() {
        let alice_keys = KeyPair::generate();
        let mallory_keys = KeyPair::generate();

        let mut tx = Transaction::new("Alice", "Bob_1", Amount::from_num(10), "");
        tx.sign(&mallory_keys).unwrap();

        let balances = funded_balances("Alice", Amount::from_num(100));
        assert!(tx
            .validate(&alice_keys.public_key_bytes(), &balances)
            .is_err());
    }

    #[test]
    fn mutating_a_signed_field_invalidates_the_signature() {
        let keypair = KeyPair::generate();
        let mut tx = Transaction::new("Alice", "Bob_1", Amount::from_num(10), "original");
        tx.sign(&keypair).unwrap();

        tx.metadata = "tampered".to_string();

        let balances = funded_balances("Alice", Amount::from_num(100));
        assert!(tx
            .validate(&keypair.public_key_bytes(), &balances)
            .is_err());
    }
}
