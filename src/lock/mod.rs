//! Per-key mutual exclusion
//!
//! Every read-modify-write cycle against a storage key runs under the key's
//! lock. Waiters on the same key are served strictly in arrival order; waiters
//! on different keys never block each other.
//!
//! # Nesting
//!
//! Operations that need two locks at once must acquire them in the order given
//! by [`LOCK_ORDER`]. Personnel removal is the only such operation today.
//!
//! # Limitations
//!
//! The lock table lives in process memory. Two processes (or two application
//! windows with separate processes) sharing one data directory are not
//! coordinated with each other.

mod key_lock;

pub use key_lock::{KeyLock, KeyLockGuard};

use crate::storage::StorageKey;

/// System-wide acquisition order for nested locks
pub const LOCK_ORDER: [StorageKey; 2] = [StorageKey::Personnel, StorageKey::SavedGames];
