// Thin re-export module: types and validation live under `transaction/` so
// the signing surface and the validation pipeline can evolve separately.

pub mod types;
pub mod validation;

pub use types::{format_amount, Amount, Transaction, MAX_METADATA_CHARS};
