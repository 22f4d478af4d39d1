//! Shared, lock-guarded handles to columns and tables
//!
//! A [`Shared`] value is the only lock a column or table has. Entry points
//! that need exclusive or shared access take a [`WriteAccess`] or
//! [`ReadAccess`], which either acquires the lock for the duration of the
//! call or borrows data the caller already holds a guard for. The borrow in
//! the `AssumeHeld` variant is the proof that the lock is held, so nested
//! operations never try to take the same lock twice.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::column::Column;

/// A reference-counted, read/write locked handle
pub struct Shared<T: ?Sized> {
    inner: Arc<RwLock<T>>,
}

impl<T> Shared<T> {
    /// Wrap a value in a new lock
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(RwLock::new(value)),
        }
    }

    /// Take the value back out if this is the last handle
    ///
    /// # Errors
    /// Returns the handle unchanged while other clones are alive
    pub fn try_unwrap(self) -> Result<T, Self> {
        Arc::try_unwrap(self.inner)
            .map(|lock| lock.into_inner().unwrap_or_else(PoisonError::into_inner))
            .map_err(|inner| Self { inner })
    }
}

impl Shared<dyn Column> {
    /// Share a column behind its own lock
    pub fn column(column: impl Column + 'static) -> Self {
        let inner: Arc<RwLock<dyn Column>> = Arc::new(RwLock::new(column));
        Self { inner }
    }
}

impl<T: ?Sized> Shared<T> {
    /// Acquire the lock in shared (read) mode
    ///
    /// A poisoned lock is recovered: a panic in another holder does not make
    /// the data unreachable.
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Acquire the lock in exclusive (write) mode
    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: ?Sized> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Shared").field(&&*self.read()).finish()
    }
}

/// Shared access to `T` for a read-only operation
pub enum ReadAccess<'a, T: ?Sized> {
    /// Take the read lock for the duration of the call
    Acquire(&'a Shared<T>),
    /// The caller already holds a guard (or owns the data outright)
    AssumeHeld(&'a T),
}

impl<T: ?Sized> ReadAccess<'_, T> {
    /// Run `f` with shared access, releasing any acquired lock on every exit path
    pub fn with<R>(self, f: impl FnOnce(&T) -> R) -> R {
        match self {
            ReadAccess::Acquire(shared) => {
                let guard = shared.read();
                f(&*guard)
            }
            ReadAccess::AssumeHeld(value) => f(value),
        }
    }
}

/// Exclusive access to `T` for a mutating operation
pub enum WriteAccess<'a, T: ?Sized> {
    /// Take the write lock for the duration of the call
    Acquire(&'a Shared<T>),
    /// The caller already holds a write guard (or owns the data outright)
    AssumeHeld(&'a mut T),
}

impl<T: ?Sized> WriteAccess<'_, T> {
    /// Run `f` with exclusive access, releasing any acquired lock on every exit path
    pub fn with<R>(self, f: impl FnOnce(&mut T) -> R) -> R {
        match self {
            WriteAccess::Acquire(shared) => {
                let mut guard = shared.write();
                f(&mut *guard)
            }
            WriteAccess::AssumeHeld(value) => f(value),
        }
    }
}
