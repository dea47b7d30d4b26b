//! Address format policy.
//!
//! An address doubles as a user name: 3 to 20 characters, ASCII letters,
//! digits and underscores only. The `"System"` sentinel passes the rule and
//! needs no special case.

/// Sender name reserved for transactions minted by the ledger itself.
pub const SYSTEM_SENDER: &str = "System";

const MIN_ADDRESS_LENGTH: usize = 3;
const MAX_ADDRESS_LENGTH: usize = 20;

/// Checks whether `address` satisfies the format rule. Unicode letters are
/// rejected; only ASCII alphanumerics and `_` count.
pub fn is_valid_address(address: &str) -> bool {
    let len = address.chars().count();
    if !(MIN_ADDRESS_LENGTH..=MAX_ADDRESS_LENGTH).contains(&len) {
        return false;
    }
    address
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
}
