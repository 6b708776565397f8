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

//! Resettable count-down latch.

use super::condvar::ConditionVariable;
use super::lock::Lock;
use std::time::Duration;

#[derive(Debug, Default)]
struct LatchState {
    count: usize,
    /// Bumped every time the count reaches zero.
    generation: u64,
}

impl LatchState {
    fn decrement(&mut self) -> bool {
        if self.count == 0 {
            return false;
        }
        self.count -= 1;
        if self.count == 0 {
            self.generation = self.generation.wrapping_add(1);
            return true;
        }
        false
    }

    fn blocks(&self, generation: u64) -> bool {
        self.count > 0 && self.generation == generation
    }
}

/// A count-down latch that can be re-armed.
///
/// Waiters block until the count reaches zero. Every waiter belongs to the
/// generation that was current when it started waiting and is released when
/// that generation reaches zero, even if [`reset`](Self::reset) re-arms the
/// latch before the waiter gets to run.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use std::thread;
/// use weft_core::sync::Latch;
///
/// let latch = Arc::new(Latch::new(2));
/// let workers: Vec<_> = (0..2)
///     .map(|_| {
///         let latch = Arc::clone(&latch);
///         thread::spawn(move || latch.count_down())
///     })
///     .collect();
///
/// latch.wait();
/// assert_eq!(latch.value(), 0);
/// # for w in workers { w.join().unwrap(); }
/// ```
#[derive(Debug, Default)]
pub struct Latch {
    state: Lock<LatchState>,
    released: ConditionVariable,
}

impl Latch {
    /// Creates a latch that opens after `count` calls to
    /// [`count_down`](Self::count_down).
    pub fn new(count: usize) -> Self {
        Self {
            state: Lock::new(LatchState {
                count,
                generation: 0,
            }),
            released: ConditionVariable::new(),
        }
    }

    /// Re-arms the latch with a new count.
    ///
    /// Resetting to zero opens the latch immediately.
    pub fn reset(&self, count: usize) {
        let mut state = self.state.acquire();
        state.count = count;
        if count == 0 {
            state.generation = state.generation.wrapping_add(1);
            self.released.notify_all();
        }
    }

    /// Decrements the count, waking every waiter when it reaches zero.
    ///
    /// Counting down an open latch does nothing.
    pub fn count_down(&self) {
        let mut state = self.state.acquire();
        if state.decrement() {
            self.released.notify_all();
        }
    }

    /// Decrements the count, then waits for the latch to open.
    ///
    /// Returns immediately when this call's own decrement opened the latch.
    pub fn count_down_and_wait(&self) {
        let mut state = self.state.acquire();
        if state.decrement() {
            self.released.notify_all();
            return;
        }
        if state.count == 0 {
            return;
        }
        let generation = state.generation;
        self.released.wait_while(&mut state, |s| s.blocks(generation));
    }

    /// Blocks until the count reaches zero.
    pub fn wait(&self) {
        let mut state = self.state.acquire();
        let generation = state.generation;
        self.released.wait_while(&mut state, |s| s.blocks(generation));
    }

    /// Returns `true` if the latch is open, without blocking.
    pub fn try_wait(&self) -> bool {
        self.state.acquire().count == 0
    }

    /// Blocks for at most `timeout` waiting for the count to reach zero.
    ///
    /// ## Returns
    /// `true` if the latch opened in time.
    pub fn wait_for(&self, timeout: Duration) -> bool {
        let mut state = self.state.acquire();
        let generation = state.generation;
        self.released
            .wait_while_for(&mut state, |s| s.blocks(generation), timeout)
    }

    /// Returns the current count.
    pub fn value(&self) -> usize {
        self.state.acquire().count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_waiters_released_only_by_last_count_down() {
        const COUNT: usize = 3;
        let latch = Arc::new(Latch::new(COUNT));
        let released = Arc::new(AtomicUsize::new(0));

        let waiters: Vec<_> = (0..2)
            .map(|_| {
                let latch = Arc::clone(&latch);
                let released = Arc::clone(&released);
                thread::spawn(move || {
                    latch.wait();
                    released.fetch_add(1, Ordering::SeqCst);
                })
            })
            .collect();

        for _ in 0..COUNT - 1 {
            latch.count_down();
        }
        thread::sleep(Duration::from_millis(30));
        assert_eq!(released.load(Ordering::SeqCst), 0);
        assert!(!latch.try_wait());
        assert_eq!(latch.value(), 1);

        latch.count_down();
        for waiter in waiters {
            waiter.join().expect("waiter panicked");
        }
        assert_eq!(released.load(Ordering::SeqCst), 2);
        assert_eq!(latch.value(), 0);
        assert!(latch.try_wait());
    }

    #[test]
    fn test_count_down_and_wait_rendezvous() {
        const PARTIES: usize = 4;
        let latch = Arc::new(Latch::new(PARTIES));

        let parties: Vec<_> = (0..PARTIES)
            .map(|_| {
                let latch = Arc::clone(&latch);
                thread::spawn(move || latch.count_down_and_wait())
            })
            .collect();

        for party in parties {
            party.join().expect("party panicked");
        }
        assert_eq!(latch.value(), 0);
    }

    #[test]
    fn test_reset_allows_reuse() {
        let latch = Latch::new(1);
        latch.count_down();
        assert!(latch.wait_for(Duration::from_millis(1)));

        latch.reset(2);
        assert_eq!(latch.value(), 2);
        assert!(!latch.wait_for(Duration::from_millis(10)));

        latch.count_down();
        latch.count_down();
        assert!(latch.try_wait());
    }

    #[test]
    fn test_count_down_on_open_latch_is_a_no_op() {
        let latch = Latch::new(0);
        latch.count_down();
        latch.count_down_and_wait();
        assert_eq!(latch.value(), 0);
    }

    #[test]
    fn test_waiter_released_even_if_reset_before_it_runs() {
        let latch = Arc::new(Latch::new(1));

        let waiter = {
            let latch = Arc::clone(&latch);
            thread::spawn(move || latch.wait_for(Duration::from_secs(5)))
        };

        thread::sleep(Duration::from_millis(50));
        latch.count_down();
        latch.reset(1);

        assert!(waiter.join().expect("waiter panicked"));
        assert_eq!(latch.value(), 1);
    }
}
