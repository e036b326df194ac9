//! Poison recovery for `RwLock` and `Mutex`
//!
//! Store and hook state stays usable after a panicking listener; the stored
//! data is plain values, so a poisoned guard is still consistent.

use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// `RwLock` access that recovers from poisoning
pub trait RwLockExt<T> {
    /// Acquire a read lock, recovering from poison
    fn read_recovered(&self) -> RwLockReadGuard<'_, T>;

    /// Acquire a write lock, recovering from poison
    fn write_recovered(&self) -> RwLockWriteGuard<'_, T>;
}

impl<T> RwLockExt<T> for RwLock<T> {
    fn read_recovered(&self) -> RwLockReadGuard<'_, T> {
        self.read().unwrap_or_else(|poisoned| {
            log::warn!("RwLock was poisoned (read), recovering");
            poisoned.into_inner()
        })
    }

    fn write_recovered(&self) -> RwLockWriteGuard<'_, T> {
        self.write().unwrap_or_else(|poisoned| {
            log::warn!("RwLock was poisoned (write), recovering");
            poisoned.into_inner()
        })
    }
}

/// `Mutex` access that recovers from poisoning
pub trait MutexExt<T> {
    /// Acquire the lock, recovering from poison
    fn lock_recovered(&self) -> MutexGuard<'_, T>;
}

impl<T> MutexExt<T> for Mutex<T> {
    fn lock_recovered(&self) -> MutexGuard<'_, T> {
        self.lock().unwrap_or_else(|poisoned| {
            log::warn!("Mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}
