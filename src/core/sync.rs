//! Synchronization utilities for robust lock handling
//!
//! Lock poisoning is turned into a domain error instead of a panic, so a
//! worker that panics while holding the queue lock shows up as a failed
//! operation on the other side rather than taking that thread down too.

use std::sync::LockResult;

/// Map a poisoned lock (or condvar wait) result into an application error
///
/// Works for anything that yields a `LockResult`: `Mutex::lock`,
/// `Condvar::wait`, `Condvar::wait_timeout`.
///
/// # Examples
/// ```
/// use std::sync::Mutex;
/// use drainq::core::sync::handle_mutex_poison;
/// use drainq::queue::QueueError;
///
/// let mutex = Mutex::new(42);
/// let guard = handle_mutex_poison(
///     mutex.lock(),
///     |msg| QueueError::Poisoned { message: msg }
/// ).unwrap();
/// assert_eq!(*guard, 42);
/// ```
pub fn handle_mutex_poison<T, E>(
    result: LockResult<T>,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<T, E> {
    result.map_err(|poison_err| {
        error_constructor(format!(
            "Internal synchronisation error (mutex poisoned). A thread panicked while holding the lock. PoisonError: {:?}",
            poison_err
        ))
    })
}
