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

//! Condition variable paired with [`Lock`](super::Lock) guards.

use super::lock::LockGuard;
use parking_lot::Condvar;
use std::time::Duration;

/// Suspends threads until notified, atomically releasing a [`Lock`](super::Lock).
///
/// The variable keeps no state of its own: a notification issued while nobody
/// waits is lost. Waiters may also wake spuriously, so every wait belongs in a
/// loop that re-checks its predicate. [`wait_while`](Self::wait_while) and
/// [`wait_while_for`](Self::wait_while_for) write that loop for you.
#[derive(Debug, Default)]
pub struct ConditionVariable {
    inner: Condvar,
}

impl ConditionVariable {
    /// Creates a new condition variable.
    pub fn new() -> Self {
        Self {
            inner: Condvar::new(),
        }
    }

    /// Releases the guard's lock, suspends the thread, and re-acquires the
    /// lock before returning.
    ///
    /// The guard is never observed unlocked by the caller.
    pub fn wait<T: ?Sized>(&self, guard: &mut LockGuard<'_, T>) {
        self.inner.wait(&mut guard.inner);
    }

    /// Like [`wait`](Self::wait), but gives up after `timeout`.
    ///
    /// ## Returns
    /// `false` if the timeout elapsed. A timed-out wait consumes no
    /// notification. The lock is re-acquired in both cases.
    pub fn wait_for<T: ?Sized>(&self, guard: &mut LockGuard<'_, T>, timeout: Duration) -> bool {
        !self.inner.wait_for(&mut guard.inner, timeout).timed_out()
    }

    /// Blocks while `condition` returns `true`, re-checking after every wake.
    pub fn wait_while<T, F>(&self, guard: &mut LockGuard<'_, T>, condition: F)
    where
        T: ?Sized,
        F: FnMut(&mut T) -> bool,
    {
        self.inner.wait_while(&mut guard.inner, condition);
    }

    /// Blocks while `condition` returns `true`, for at most `timeout` overall.
    ///
    /// ## Returns
    /// `true` if the condition was satisfied, `false` if the deadline passed
    /// with the condition still holding.
    pub fn wait_while_for<T, F>(
        &self,
        guard: &mut LockGuard<'_, T>,
        mut condition: F,
        timeout: Duration,
    ) -> bool
    where
        T: ?Sized,
        F: FnMut(&mut T) -> bool,
    {
        if !self
            .inner
            .wait_while_for(&mut guard.inner, &mut condition, timeout)
            .timed_out()
        {
            return true;
        }
        // The deadline and a last-moment notification can coincide.
        !condition(&mut *guard.inner)
    }

    /// Wakes one waiting thread, if any.
    ///
    /// Returns whether a thread was woken.
    pub fn notify_one(&self) -> bool {
        self.inner.notify_one()
    }

    /// Wakes every waiting thread.
    ///
    /// Returns the number of threads woken.
    pub fn notify_all(&self) -> usize {
        self.inner.notify_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::Lock;
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_notify_without_waiters_is_a_no_op() {
        let cv = ConditionVariable::new();
        assert!(!cv.notify_one());
        assert_eq!(cv.notify_all(), 0);

        // The lost notification must not satisfy a later wait.
        let lock = Lock::new(());
        let mut guard = lock.acquire();
        assert!(!cv.wait_for(&mut guard, Duration::from_millis(10)));
    }

    #[test]
    fn test_wait_reacquires_before_returning() {
        let shared = Arc::new((Lock::new(false), ConditionVariable::new()));

        let waiter = {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                let (lock, cv) = &*shared;
                let mut ready = lock.acquire();
                while !*ready {
                    cv.wait(&mut ready);
                }
                // Still holding the lock: nobody else can observe the reset.
                *ready = false;
            })
        };

        thread::sleep(Duration::from_millis(10));
        {
            let (lock, cv) = &*shared;
            *lock.acquire() = true;
            cv.notify_all();
        }

        waiter.join().expect("waiter panicked");
        assert!(!*shared.0.acquire());
    }

    #[test]
    fn test_wait_for_times_out() {
        let lock = Lock::new(());
        let cv = ConditionVariable::new();
        let mut guard = lock.acquire();

        let start = Instant::now();
        assert!(!cv.wait_for(&mut guard, Duration::from_millis(25)));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_wait_while_for_reports_satisfied_predicate() {
        let shared = Arc::new((Lock::new(0_u32), ConditionVariable::new()));

        let producer = {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                for _ in 0..3 {
                    thread::sleep(Duration::from_millis(5));
                    let (lock, cv) = &*shared;
                    *lock.acquire() += 1;
                    cv.notify_one();
                }
            })
        };

        let (lock, cv) = &*shared;
        let mut count = lock.acquire();
        assert!(cv.wait_while_for(&mut count, |c| *c < 3, Duration::from_secs(5)));
        assert_eq!(*count, 3);
        drop(count);

        producer.join().expect("producer panicked");

        let mut count = lock.acquire();
        assert!(!cv.wait_while_for(&mut count, |c| *c < 10, Duration::from_millis(10)));
    }
}
