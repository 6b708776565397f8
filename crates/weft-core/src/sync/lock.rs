// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Non-reentrant mutual exclusion.

use parking_lot::{Mutex, MutexGuard};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::time::Duration;

/// A non-reentrant lock protecting a value of type `T`.
///
/// Ownership is represented by a [`LockGuard`]; the lock is released when the
/// guard is dropped or [`LockGuard::release`] is called. Acquiring the lock a
/// second time from the thread that already owns it deadlocks, use a
/// [`RecursiveLock`](super::RecursiveLock) for reentrant code paths.
///
/// With the default `T = ()` the lock is a plain exclusion token.
///
/// # Example
///
/// ```rust
/// use weft_core::sync::Lock;
///
/// let counter = Lock::new(0_u32);
/// {
///     let mut guard = counter.acquire();
///     *guard += 1;
/// }
/// assert_eq!(*counter.acquire(), 1);
/// ```
pub struct Lock<T: ?Sized = ()> {
    inner: Mutex<T>,
}

impl<T> Lock<T> {
    /// Creates a new, unlocked lock protecting `value`.
    pub fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(value),
        }
    }

    /// Consumes the lock and returns the protected value.
    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }
}

impl<T: ?Sized> Lock<T> {
    /// Blocks the calling thread until exclusive ownership is obtained.
    pub fn acquire(&self) -> LockGuard<'_, T> {
        LockGuard {
            inner: self.inner.lock(),
        }
    }

    /// Attempts to obtain ownership without blocking.
    ///
    /// Returns `None` if another owner currently holds the lock.
    pub fn try_acquire(&self) -> Option<LockGuard<'_, T>> {
        self.inner.try_lock().map(|inner| LockGuard { inner })
    }

    /// Attempts to obtain ownership, giving up after `timeout`.
    pub fn try_acquire_for(&self, timeout: Duration) -> Option<LockGuard<'_, T>> {
        self.inner
            .try_lock_for(timeout)
            .map(|inner| LockGuard { inner })
    }

    /// Returns `true` if some thread currently owns the lock.
    ///
    /// Only meaningful for inspection; the answer may be stale by the time the
    /// caller looks at it.
    pub fn is_locked(&self) -> bool {
        self.inner.is_locked()
    }

    /// Returns a mutable reference to the protected value.
    ///
    /// No locking is needed since the borrow checker proves exclusive access.
    pub fn get_mut(&mut self) -> &mut T {
        self.inner.get_mut()
    }
}

impl<T: Default> Default for Lock<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Lock<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_lock() {
            Some(guard) => f.debug_struct("Lock").field("value", &&*guard).finish(),
            None => f.debug_struct("Lock").field("value", &"<locked>").finish(),
        }
    }
}

/// Scoped ownership of a [`Lock`].
///
/// Gives exclusive access to the protected value until dropped.
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct LockGuard<'a, T: ?Sized = ()> {
    pub(super) inner: MutexGuard<'a, T>,
}

impl<T: ?Sized> LockGuard<'_, T> {
    /// Releases the lock. Equivalent to dropping the guard.
    pub fn release(self) {
        drop(self);
    }
}

impl<T: ?Sized> Deref for LockGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T: ?Sized> DerefMut for LockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.inner
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for LockGuard<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}
