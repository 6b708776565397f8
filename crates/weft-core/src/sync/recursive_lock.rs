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

//! Reentrant mutual exclusion.

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use std::cell::Cell;
use std::fmt;
use std::ops::Deref;
use std::time::Duration;

struct Owned<T> {
    // Only touched by the owning thread, while it holds the mutex.
    depth: Cell<usize>,
    value: T,
}

/// A reentrant lock.
///
/// The owning thread may acquire it again without blocking; every acquisition
/// yields its own [`RecursiveLockGuard`] and increments the acquisition depth.
/// Other threads are let in only once every guard of the owner has been
/// dropped and the depth is back to zero.
///
/// Because several guards of the same thread can be alive at once, the
/// protected value is only reachable through a shared reference. Wrap it in a
/// [`Cell`] or [`RefCell`](std::cell::RefCell) when it needs mutation.
///
/// # Example
///
/// ```rust
/// use weft_core::sync::RecursiveLock;
///
/// let lock = RecursiveLock::new(());
/// let outer = lock.acquire();
/// let inner = lock.acquire();
/// assert_eq!(inner.depth(), 2);
/// drop(inner);
/// assert_eq!(outer.depth(), 1);
/// ```
pub struct RecursiveLock<T = ()> {
    inner: ReentrantMutex<Owned<T>>,
}

impl<T> RecursiveLock<T> {
    /// Creates a new, unlocked recursive lock protecting `value`.
    pub fn new(value: T) -> Self {
        Self {
            inner: ReentrantMutex::new(Owned {
                depth: Cell::new(0),
                value,
            }),
        }
    }

    /// Blocks until the calling thread owns the lock.
    ///
    /// Returns immediately when the calling thread already owns it.
    pub fn acquire(&self) -> RecursiveLockGuard<'_, T> {
        RecursiveLockGuard::enter(self.inner.lock())
    }

    /// Attempts to obtain ownership without blocking.
    ///
    /// Always succeeds for the current owner.
    pub fn try_acquire(&self) -> Option<RecursiveLockGuard<'_, T>> {
        self.inner.try_lock().map(RecursiveLockGuard::enter)
    }

    /// Attempts to obtain ownership, giving up after `timeout`.
    pub fn try_acquire_for(&self, timeout: Duration) -> Option<RecursiveLockGuard<'_, T>> {
        self.inner
            .try_lock_for(timeout)
            .map(RecursiveLockGuard::enter)
    }

    /// Returns `true` if any thread, including the caller, owns the lock.
    pub fn is_locked(&self) -> bool {
        self.inner.is_locked()
    }

    /// Returns a mutable reference to the protected value.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner.get_mut().value
    }

    /// Consumes the lock and returns the protected value.
    pub fn into_inner(self) -> T {
        self.inner.into_inner().value
    }
}

impl<T: Default> Default for RecursiveLock<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for RecursiveLock<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_lock() {
            Some(owned) => f
                .debug_struct("RecursiveLock")
                .field("value", &owned.value)
                .finish(),
            None => f
                .debug_struct("RecursiveLock")
                .field("value", &"<locked>")
                .finish(),
        }
    }
}

/// Scoped ownership of a [`RecursiveLock`].
///
/// Dropping the guard undoes exactly one acquisition.
#[must_use = "the acquisition is undone as soon as the guard is dropped"]
pub struct RecursiveLockGuard<'a, T = ()> {
    inner: ReentrantMutexGuard<'a, Owned<T>>,
}

impl<'a, T> RecursiveLockGuard<'a, T> {
    fn enter(inner: ReentrantMutexGuard<'a, Owned<T>>) -> Self {
        inner.depth.set(inner.depth.get() + 1);
        Self { inner }
    }

    /// Number of acquisitions currently held by the owning thread, this guard
    /// included.
    pub fn depth(&self) -> usize {
        self.inner.depth.get()
    }

    /// Undoes this acquisition. Equivalent to dropping the guard.
    pub fn release(self) {
        drop(self);
    }
}

impl<T> Drop for RecursiveLockGuard<'_, T> {
    fn drop(&mut self) {
        // Runs before the inner guard unlocks, so the owner is still us.
        self.inner.depth.set(self.inner.depth.get() - 1);
    }
}

impl<T> Deref for RecursiveLockGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner.value
    }
}

impl<T: fmt::Debug> fmt::Debug for RecursiveLockGuard<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecursiveLockGuard")
            .field("depth", &self.depth())
            .field("value", &self.inner.value)
            .finish()
    }
}
