//! Timestamp supplier for transactions and blocks.

use chrono::Local;

/// Timestamp format recorded in transactions and blocks. Part of every hash
/// pre-image, so it must never change.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local time as `YYYY-MM-DD HH:MM:SS`.
pub fn now() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}
