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

//! Counting semaphore.

use super::condvar::ConditionVariable;
use super::lock::{Lock, LockGuard};
use std::time::Duration;

/// A counting semaphore with edge-triggered wake-ups.
///
/// The semaphore holds a non-negative number of permits. [`wait`](Self::wait)
/// blocks while none are available and takes one otherwise. Posting only
/// wakes waiters on a transition away from zero; a waiter that leaves permits
/// behind wakes the next one, so a burst of posts never strands a sleeper
/// next to an available permit.
#[derive(Debug, Default)]
pub struct Semaphore {
    permits: Lock<usize>,
    available: ConditionVariable,
}

impl Semaphore {
    /// Creates a semaphore holding `initial` permits.
    pub fn new(initial: usize) -> Self {
        Self {
            permits: Lock::new(initial),
            available: ConditionVariable::new(),
        }
    }

    /// Adds one permit, waking one waiter if the count was zero.
    ///
    /// The count saturates at `usize::MAX`.
    pub fn post(&self) {
        let mut permits = self.permits.acquire();
        let was_empty = *permits == 0;
        *permits = permits.saturating_add(1);
        if was_empty {
            self.available.notify_one();
        }
    }

    /// Adds `n` permits, waking every waiter if the count was zero.
    ///
    /// `post_n(0)` does nothing. The count saturates at `usize::MAX`.
    pub fn post_n(&self, n: usize) {
        if n == 0 {
            return;
        }
        let mut permits = self.permits.acquire();
        let was_empty = *permits == 0;
        *permits = permits.saturating_add(n);
        if was_empty {
            self.available.notify_all();
        }
    }

    /// Blocks until a permit is available, then takes it.
    pub fn wait(&self) {
        let mut permits = self.permits.acquire();
        self.available.wait_while(&mut permits, |p| *p == 0);
        self.take(&mut permits);
    }

    /// Takes a permit if one is available, without blocking.
    pub fn try_wait(&self) -> bool {
        let mut permits = self.permits.acquire();
        if *permits == 0 {
            return false;
        }
        self.take(&mut permits);
        true
    }

    /// Blocks for at most `timeout` waiting for a permit.
    ///
    /// ## Returns
    /// `true` if a permit was taken.
    pub fn timed_wait(&self, timeout: Duration) -> bool {
        let mut permits = self.permits.acquire();
        if !self
            .available
            .wait_while_for(&mut permits, |p| *p == 0, timeout)
        {
            return false;
        }
        self.take(&mut permits);
        true
    }

    /// Returns the number of permits currently available.
    ///
    /// For inspection and tests; the value may change right after it is read.
    pub fn value(&self) -> usize {
        *self.permits.acquire()
    }

    fn take(&self, permits: &mut LockGuard<'_, usize>) {
        **permits -= 1;
        if **permits > 0 {
            // Pass the wake-up on: posts after the first one did not notify.
            self.available.notify_one();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn test_posted_permits_never_block() {
        let sem = Semaphore::new(0);
        for _ in 0..5 {
            sem.post();
        }
        assert_eq!(sem.value(), 5);

        for _ in 0..5 {
            sem.wait();
        }
        assert_eq!(sem.value(), 0);
        assert!(!sem.try_wait());
    }

    #[test]
    fn test_extra_wait_blocks_until_next_post() {
        let sem = Arc::new(Semaphore::new(1));
        sem.wait();

        let taken = Arc::new(AtomicUsize::new(0));
        let waiter = {
            let sem = Arc::clone(&sem);
            let taken = Arc::clone(&taken);
            thread::spawn(move || {
                sem.wait();
                taken.fetch_add(1, Ordering::SeqCst);
            })
        };

        thread::sleep(Duration::from_millis(30));
        assert_eq!(taken.load(Ordering::SeqCst), 0, "wait must block at zero");

        sem.post();
        waiter.join().expect("waiter panicked");
        assert_eq!(taken.load(Ordering::SeqCst), 1);
        assert_eq!(sem.value(), 0);
    }

    #[test]
    fn test_timed_wait() {
        let sem = Semaphore::new(0);
        assert!(!sem.timed_wait(Duration::from_millis(15)));

        sem.post();
        assert!(sem.timed_wait(Duration::from_millis(15)));
        assert_eq!(sem.value(), 0);
    }

    #[test]
    fn test_post_n_wakes_every_waiter() {
        const WAITERS: usize = 4;
        let sem = Arc::new(Semaphore::new(0));
        let started = Arc::new(Barrier::new(WAITERS + 1));

        let handles: Vec<_> = (0..WAITERS)
            .map(|_| {
                let sem = Arc::clone(&sem);
                let started = Arc::clone(&started);
                thread::spawn(move || {
                    started.wait();
                    sem.wait();
                })
            })
            .collect();

        started.wait();
        thread::sleep(Duration::from_millis(20));
        sem.post_n(WAITERS);

        for handle in handles {
            handle.join().expect("waiter panicked");
        }
        assert_eq!(sem.value(), 0);
    }

    #[test]
    fn test_burst_of_single_posts_reaches_every_waiter() {
        const WAITERS: usize = 6;
        let sem = Arc::new(Semaphore::new(0));
        let started = Arc::new(Barrier::new(WAITERS + 1));

        let handles: Vec<_> = (0..WAITERS)
            .map(|_| {
                let sem = Arc::clone(&sem);
                let started = Arc::clone(&started);
                thread::spawn(move || {
                    started.wait();
                    sem.timed_wait(Duration::from_secs(5))
                })
            })
            .collect();

        started.wait();
        thread::sleep(Duration::from_millis(20));
        for _ in 0..WAITERS {
            sem.post();
        }

        for handle in handles {
            assert!(handle.join().expect("waiter panicked"));
        }
    }

    #[test]
    fn test_post_n_zero_is_a_no_op() {
        let sem = Semaphore::new(2);
        sem.post_n(0);
        assert_eq!(sem.value(), 2);
    }

    #[test]
    fn test_post_saturates_at_max() {
        let sem = Semaphore::new(usize::MAX - 1);
        sem.post();
        sem.post();
        assert_eq!(sem.value(), usize::MAX);

        sem.post_n(5);
        assert_eq!(sem.value(), usize::MAX);
        assert!(sem.try_wait());
        assert_eq!(sem.value(), usize::MAX - 1);
    }
}
