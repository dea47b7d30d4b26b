//! Whole-chain validation: replays every block from scratch and checks every
//! invariant, reporting findings per block and never stopping early.

use crate::keyring::KeyRegistry;
use crate::miner;
use crate::transaction::Amount;
use tracing::{info, warn};

use super::chain::{Block, Blockchain};
use super::state::{self, BalanceMap};

impl Blockchain {
    /// Validates the entire chain against `keys` on a detached snapshot.
    pub fn is_chain_valid(&self, keys: &KeyRegistry) -> bool {
        let chain = self.chain_snapshot();
        validate_chain(&chain, keys)
    }
}

/// Replays `chain` block by block: proof-of-work, hash reproduction, linkage,
/// transaction signatures, balance sufficiency, and the stored snapshot. A
/// failed check taints the result but validation continues through every
/// block so all findings are reported.
pub fn validate_chain(chain: &[Block], keys: &KeyRegistry) -> bool {
    info!(blocks = chain.len(), "validating chain");

    let mut replayed = BalanceMap::new();
    let mut valid = true;

    for (i, block) in chain.iter().enumerate() {
        if i > 0 {
            replayed = chain[i - 1].balance_snapshot.clone();
        }

        if !miner::meets_difficulty(&block.hash, block.difficulty) {
            warn!(
                index = block.index,
                difficulty = block.difficulty,
                hash = %block.hash,
                "proof-of-work target not met"
            );
            valid = false;
        }

        if block.hash != block.compute_hash() {
            warn!(index = block.index, "stored hash does not reproduce from contents");
            valid = false;
        }

        if i > 0 && block.previous_hash != chain[i - 1].hash {
            warn!(
                index = block.index,
                expected = %chain[i - 1].hash,
                actual = %block.previous_hash,
                "chain link broken"
            );
            valid = false;
        }

        for tx in &block.transactions {
            replayed
                .entry(tx.receiver.clone())
                .or_insert(Amount::ZERO);

            if tx.is_system() {
                state::apply_transaction(&mut replayed, tx);
                continue;
            }

            let public_key = match keys.public_key(&tx.sender) {
                Some(key) => key,
                None => {
                    warn!(index = block.index, sender = %tx.sender, tx_id = %tx.tx_id, "no public key for sender");
                    valid = false;
                    continue;
                }
            };

            let signature_ok = hex::decode(&tx.signature)
                .ok()
                .map(|sig| {
                    crate::crypto::verify_signature(
                        public_key,
                        tx.signing_payload().as_bytes(),
                        &sig,
                    )
                    .is_ok()
                })
                .unwrap_or(false);
            if !signature_ok {
                warn!(index = block.index, tx_id = %tx.tx_id, "signature verification failed");
                valid = false;
            }

            let available = replayed
                .get(&tx.sender)
                .copied()
                .unwrap_or(Amount::ZERO);
            if available < tx.amount {
                warn!(
                    index = block.index,
                    sender = %tx.sender,
                    tx_id = %tx.tx_id,
                    "replayed balance cannot cover the transfer"
                );
                valid = false;
            }

            state::apply_transaction(&mut replayed, tx);
        }

        let filtered = state::filtered_snapshot(&replayed, &block.transactions);
        if filtered != block.balance_snapshot {
            warn!(index = block.index, "stored balance snapshot does not match the replay");
            valid = false;
        }
        replayed = filtered;
    }

    info!(valid, blocks = chain.len(), "chain validation finished");
    valid
}
