//! Proof-of-work nonce search.
//!
//! A pool of native threads pulls candidate nonces from a shared atomic
//! counter; the first worker whose hash meets the difficulty target flips a
//! shared flag and the rest exit at their next loop iteration. Any satisfying
//! `(nonce, hash)` pair is acceptable, so no attempt is made to prefer the
//! lowest nonce.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use tracing::{debug, info};

/// How often each worker reports search progress.
const PROGRESS_INTERVAL: u64 = 60_000;

/// True when the first `difficulty` hex digits of `hash` are all `'0'`.
pub fn meets_difficulty(hash: &str, difficulty: u32) -> bool {
    let prefix = difficulty as usize;
    hash.len() >= prefix && hash.bytes().take(prefix).all(|b| b == b'0')
}

/// Searches nonces in parallel until `hash_with_nonce` produces a hash with
/// the required zero prefix, returning the winning pair.
///
/// The search is unbounded; it blocks the caller until a seal is found.
pub fn mine_seal<F>(hash_with_nonce: F, difficulty: u32) -> (u64, String)
where
    F: Fn(u64) -> String + Sync,
{
    if difficulty == 0 {
        return (0, hash_with_nonce(0));
    }

    let workers = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    let next_nonce = AtomicU64::new(0);
    let found = AtomicBool::new(false);
    let winner: Mutex<Option<(u64, String)>> = Mutex::new(None);

    info!(workers, difficulty, "starting proof-of-work search");

    thread::scope(|scope| {
        for _ in 0..workers {
            scope.spawn(|| {
                while !found.load(Ordering::Acquire) {
                    let nonce = next_nonce.fetch_add(1, Ordering::Relaxed);
                    let hash = hash_with_nonce(nonce);

                    if nonce % PROGRESS_INTERVAL == 0 && nonce > 0 {
                        debug!(nonce, %hash, "still searching");
                    }

                    if meets_difficulty(&hash, difficulty) {
                        if found
                            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                            .is_ok()
                        {
                            *winner.lock() = Some((nonce, hash));
                        }
                        break;
                    }
                }
            });
        }
    });

    let (nonce, hash) = winner
        .into_inner()
        .expect("nonce space exhausted (practically impossible)");
    info!(nonce, %hash, "proof-of-work found");
    (nonce, hash)
}
