//! Balance bookkeeping shared by block append and chain validation.
//!
//! The snapshot filter lives here so both paths apply exactly the same rule:
//! a user appears in a block's snapshot iff their balance is non-zero or they
//! took part in the block's transactions.

use crate::transaction::{Amount, Transaction};
use std::collections::BTreeMap;

/// Live or replayed balances, keyed by user name. Ordered so snapshots and
/// console renderings are deterministic.
pub type BalanceMap = BTreeMap<String, Amount>;

/// True when `user` is a sender or receiver in any of `txs`.
pub fn is_involved(user: &str, txs: &[Transaction]) -> bool {
    txs.iter().any(|tx| tx.sender == user || tx.receiver == user)
}

/// Applies one transaction to a balance view. System transfers only credit
/// the receiver; signed transfers debit the sender as well. Missing entries
/// are created on demand.
pub fn apply_transaction(balances: &mut BalanceMap, tx: &Transaction) {
    if !tx.is_system() {
        *balances.entry(tx.sender.clone()).or_insert(Amount::ZERO) -= tx.amount;
    }
    *balances.entry(tx.receiver.clone()).or_insert(Amount::ZERO) += tx.amount;
}

/// Drops zero-balance entries the live ledger does not know, so a batch
/// cannot smuggle transient users into the committed state.
pub fn prune_transients<F>(working: &mut BalanceMap, is_live: F)
where
    F: Fn(&str) -> bool,
{
    working.retain(|user, balance| *balance != Amount::ZERO || is_live(user));
}

/// The snapshot stored in a block: every user with a non-zero balance plus
/// every participant of the block's transactions.
pub fn filtered_snapshot(balances: &BalanceMap, txs: &[Transaction]) -> BalanceMap {
    balances
        .iter()
        .filter(|(user, balance)| **balance != Amount::ZERO || is_involved(user.as_str(), txs))
        .map(|(user, balance)| (user.clone(), *balance))
        .collect()
}
