use std::sync::{Mutex, PoisonError};

/// Scoped execution under a mutex.
pub trait LockExt<T> {
    /// Acquire the lock, run `work` with the guarded data, release the lock
    /// and return `work`'s result. The lock is released on unwind as well.
    ///
    /// A poisoned lock is recovered rather than propagated.
    fn execute<R, F>(&self, work: F) -> R
    where
        F: FnOnce(&mut T) -> R;
}

impl<T> LockExt<T> for Mutex<T> {
    fn execute<R, F>(&self, work: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        let mut guard = self.lock().unwrap_or_else(PoisonError::into_inner);
        work(&mut guard)
    }
}
