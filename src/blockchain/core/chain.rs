use crate::address::is_valid_address;
use crate::clock;
use crate::crypto::sha256_hex;
use crate::error::ChainError;
use crate::keyring::KeyRegistry;
use crate::miner;
use crate::transaction::{Amount, Transaction};
use parking_lot::Mutex;
use tracing::{info, warn};

use super::state::{self, BalanceMap};

/// Account endowed by the genesis block.
pub const GENESIS_USER: &str = "Genesis_User";
/// Value minted once at genesis; signed transfers conserve it forever after.
pub const GENESIS_ENDOWMENT: Amount = Amount::from_bits(1000i128 << 64);
/// Previous-hash sentinel carried by the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";
/// Leading zero hex digits required of every block hash on a fresh chain.
pub const GENESIS_DIFFICULTY: u32 = 4;

/// One sealed record in the chain. Immutable once mined: the constructor
/// fixes the nonce and hash and nothing mutates a block afterwards.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: String,
    pub previous_hash: String,
    pub transactions: Vec<Transaction>,
    pub balance_snapshot: BalanceMap,
    pub difficulty: u32,
    pub nonce: u64,
    pub hash: String,
}

impl Block {
    /// Builds and seals a block: records a fresh timestamp, then runs the
    /// proof-of-work search, which blocks until a satisfying nonce is found.
    pub fn new(
        index: u64,
        previous_hash: String,
        transactions: Vec<Transaction>,
        balance_snapshot: BalanceMap,
        difficulty: u32,
    ) -> Self {
        let mut block = Block {
            index,
            timestamp: clock::now(),
            previous_hash,
            transactions,
            balance_snapshot,
            difficulty,
            nonce: 0,
            hash: String::new(),
        };

        let (nonce, hash) = miner::mine_seal(|nonce| block.hash_with_nonce(nonce), difficulty);
        block.nonce = nonce;
        block.hash = hash;
        block
    }

    /// Hash of this block's contents under a candidate nonce. The pre-image
    /// concatenates index, timestamp, previous hash, nonce, and every
    /// transaction's display line; its layout must stay byte-stable.
    pub fn hash_with_nonce(&self, nonce: u64) -> String {
        let mut preimage = String::new();
        preimage.push_str(&self.index.to_string());
        preimage.push_str(&self.timestamp);
        preimage.push_str(&self.previous_hash);
        preimage.push_str(&nonce.to_string());
        for tx in &self.transactions {
            preimage.push_str(&tx.to_string());
        }
        sha256_hex(&preimage)
    }

    /// Recomputes the hash from the stored nonce; validators compare this
    /// against the stored hash.
    pub fn compute_hash(&self) -> String {
        self.hash_with_nonce(self.nonce)
    }
}

struct LedgerInner {
    chain: Vec<Block>,
    balances: BalanceMap,
}

/// The ledger: an append-only chain of blocks plus the live balance view.
///
/// One mutex guards both; every mutating operation and every consistent read
/// runs as a single critical section, so concurrent appends serialize and the
/// loser sees the winner's state as its baseline.
pub struct Blockchain {
    inner: Mutex<LedgerInner>,
}

impl Blockchain {
    /// A fresh chain at the standard difficulty.
    pub fn new() -> Self {
        Self::with_difficulty(GENESIS_DIFFICULTY)
    }

    /// A fresh chain whose genesis (and every later block) is mined at
    /// `difficulty`. Endows [`GENESIS_USER`] via a single system transaction.
    pub fn with_difficulty(difficulty: u32) -> Self {
        let mut balances = BalanceMap::new();
        balances.insert(GENESIS_USER.to_string(), GENESIS_ENDOWMENT);

        let genesis_tx = Transaction::system(GENESIS_USER, GENESIS_ENDOWMENT);
        let genesis = Block::new(
            0,
            GENESIS_PREVIOUS_HASH.to_string(),
            vec![genesis_tx],
            balances.clone(),
            difficulty,
        );
        info!(hash = %genesis.hash, "genesis block sealed");

        Blockchain {
            inner: Mutex::new(LedgerInner {
                chain: vec![genesis],
                balances,
            }),
        }
    }

    /// Registers a new user with a zero balance. Rejects duplicates and
    /// malformed names.
    pub fn register_user(&self, name: &str) -> Result<(), ChainError> {
        let mut inner = self.inner.lock();
        if inner.balances.contains_key(name) {
            return Err(ChainError::UserAlreadyExists(name.to_string()));
        }
        if !is_valid_address(name) {
            return Err(ChainError::InvalidAddress(name.to_string()));
        }
        inner.balances.insert(name.to_string(), Amount::ZERO);
        Ok(())
    }

    /// Validates `transactions` as a batch, commits the balance changes, and
    /// appends a freshly mined block.
    ///
    /// The whole append is atomic: any failure leaves balances and chain
    /// untouched. Unknown receivers are auto-registered, but only once the
    /// batch commits.
    pub fn add_block(
        &self,
        transactions: Vec<Transaction>,
        keys: &KeyRegistry,
    ) -> Result<(), ChainError> {
        let mut inner = self.inner.lock();
        let mut working = inner.balances.clone();
        let mut auto_registered: Vec<String> = Vec::new();

        for tx in &transactions {
            // System transfers carry no key and skip the sender debit, the
            // same way the validator replays them.
            let public_key = if tx.is_system() {
                &[][..]
            } else {
                keys.public_key(&tx.sender)
                    .ok_or_else(|| ChainError::MissingPublicKey(tx.sender.clone()))?
            };

            if !is_valid_address(&tx.receiver) {
                return Err(ChainError::InvalidAddress(format!(
                    "receiver '{}' in TX {}",
                    tx.receiver, tx.tx_id
                )));
            }

            tx.validate(public_key, &working)?;

            state::apply_transaction(&mut working, tx);

            if !inner.balances.contains_key(&tx.receiver)
                && !auto_registered.contains(&tx.receiver)
            {
                warn!(receiver = %tx.receiver, "receiver not registered; creating account");
                auto_registered.push(tx.receiver.clone());
            }
        }

        state::prune_transients(&mut working, |user| {
            inner.balances.contains_key(user) || auto_registered.iter().any(|u| u == user)
        });

        inner.balances = working;
        let snapshot = state::filtered_snapshot(&inner.balances, &transactions);

        let (next_index, previous_hash, difficulty) = {
            let prev = inner
                .chain
                .last()
                .expect("chain holds at least the genesis block");
            (prev.index + 1, prev.hash.clone(), prev.difficulty)
        };

        let block = Block::new(next_index, previous_hash, transactions, snapshot, difficulty);
        info!(
            index = block.index,
            txs = block.transactions.len(),
            hash = %block.hash,
            "block appended"
        );
        inner.chain.push(block);
        Ok(())
    }

    /// Current balance of `user`, zero if unknown.
    pub fn balance_of(&self, user: &str) -> Amount {
        self.inner
            .lock()
            .balances
            .get(user)
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    /// A consistent copy of the live balances.
    pub fn balances(&self) -> BalanceMap {
        self.inner.lock().balances.clone()
    }

    /// A consistent copy of the whole chain, for validation, rendering, and
    /// archiving.
    pub fn chain_snapshot(&self) -> Vec<Block> {
        self.inner.lock().chain.clone()
    }

    pub fn block_count(&self) -> usize {
        self.inner.lock().chain.len()
    }

    /// Total transactions across all blocks.
    pub fn transaction_count(&self) -> usize {
        self.inner
            .lock()
            .chain
            .iter()
            .map(|block| block.transactions.len())
            .sum()
    }
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new()
    }
}
