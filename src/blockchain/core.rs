pub mod chain;
pub mod state;
pub mod validation;

pub use chain::{
    Block, Blockchain, GENESIS_DIFFICULTY, GENESIS_ENDOWMENT, GENESIS_PREVIOUS_HASH, GENESIS_USER,
};
pub use state::{apply_transaction, filtered_snapshot, is_involved, prune_transients, BalanceMap};
pub use validation::validate_chain;
