//! # Synchronization Utilities
//!
//! Mutex access with poison recovery.
//!
//! A thread that panics while holding one of our locks leaves behind data
//! that is still usable: the degradation cache only holds finished lookups,
//! the output writer is a byte sink, and the legacy console attribute word is
//! re-applied on the next color change anyway. Continuing to produce output
//! matters more than failing every later caller, so production code recovers
//! the guard instead of propagating the poison.
//!
//! | Scenario | Function |
//! |----------|----------|
//! | Production code | [`lock_recover`] |
//! | Test code | `.lock().unwrap()` |
//!
//! ```rust
//! use std::sync::Mutex;
//! use cmdcolor::sync::lock_recover;
//!
//! let attributes = Mutex::new(0x07u16);
//! assert_eq!(*lock_recover(&attributes), 0x07);
//! ```

use std::sync::{Mutex, MutexGuard};

/// Lock a mutex, recovering from poison if necessary.
///
/// In debug builds a recovered poison is reported through `log`.
///
/// # Panics
///
/// This function never panics. It always recovers from poison.
#[inline]
pub fn lock_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| {
        #[cfg(debug_assertions)]
        log::warn!("mutex poison recovered");
        e.into_inner()
    })
}
