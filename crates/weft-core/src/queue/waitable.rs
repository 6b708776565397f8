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

use crate::sync::{ConditionVariable, Lock};
use std::collections::VecDeque;
use std::time::Duration;

/// A FIFO queue whose consumers can block until an item arrives.
///
/// Unlike [`BlockingQueue`](super::BlockingQueue) there is no way to interrupt
/// a blocked consumer; use [`try_dequeue_for`](Self::try_dequeue_for) in loops
/// that need to observe a shutdown condition.
#[derive(Debug)]
pub struct WaitableQueue<T> {
    items: Lock<VecDeque<T>>,
    not_empty: ConditionVariable,
}

impl<T> WaitableQueue<T> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            items: Lock::new(VecDeque::new()),
            not_empty: ConditionVariable::new(),
        }
    }

    /// Appends `item` at the tail and wakes one waiting consumer.
    pub fn enqueue(&self, item: T) {
        let mut items = self.items.acquire();
        items.push_back(item);
        self.not_empty.notify_one();
    }

    /// Removes and returns the head without blocking.
    pub fn try_dequeue(&self) -> Option<T> {
        self.items.acquire().pop_front()
    }

    /// Waits at most `timeout` for an item.
    ///
    /// Spurious wake-ups do not shorten the wait.
    pub fn try_dequeue_for(&self, timeout: Duration) -> Option<T> {
        let mut items = self.items.acquire();
        self.not_empty
            .wait_while_for(&mut items, |items| items.is_empty(), timeout);
        items.pop_front()
    }

    /// Blocks until an item is available and returns it.
    pub fn dequeue(&self) -> T {
        let mut items = self.items.acquire();
        loop {
            if let Some(item) = items.pop_front() {
                return item;
            }
            self.not_empty.wait(&mut items);
        }
    }

    /// Number of queued items.
    pub fn len(&self) -> usize {
        self.items.acquire().len()
    }

    /// Returns `true` if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.items.acquire().is_empty()
    }
}

impl<T> Default for WaitableQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_dequeue_blocks_until_enqueue() {
        let queue = Arc::new(WaitableQueue::new());

        let consumer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.dequeue())
        };

        thread::sleep(Duration::from_millis(20));
        queue.enqueue(42_u32);

        assert_eq!(consumer.join().expect("consumer panicked"), 42);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_try_dequeue_for_times_out_on_empty_queue() {
        let queue: WaitableQueue<u8> = WaitableQueue::new();
        assert_eq!(queue.try_dequeue_for(Duration::from_millis(15)), None);
        assert_eq!(queue.try_dequeue(), None);
    }

    #[test]
    fn test_try_dequeue_for_returns_late_item() {
        let queue = Arc::new(WaitableQueue::new());

        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(10));
                queue.enqueue("late");
            })
        };

        assert_eq!(queue.try_dequeue_for(Duration::from_secs(5)), Some("late"));
        producer.join().expect("producer panicked");
    }

    #[test]
    fn test_many_producers_one_consumer() {
        const PRODUCERS: usize = 4;
        const PER_PRODUCER: usize = 250;
        let queue = Arc::new(WaitableQueue::new());

        let producers: Vec<_> = (0..PRODUCERS)
            .map(|p| {
                let queue = Arc::clone(&queue);
                thread::spawn(move || {
                    for i in 0..PER_PRODUCER {
                        queue.enqueue((p, i));
                    }
                })
            })
            .collect();

        let mut last_seen = vec![None; PRODUCERS];
        for _ in 0..PRODUCERS * PER_PRODUCER {
            let (producer, index) = queue.dequeue();
            // Order is preserved per producer.
            if let Some(previous) = last_seen[producer] {
                assert!(index > previous);
            }
            last_seen[producer] = Some(index);
        }

        for producer in producers {
            producer.join().expect("producer panicked");
        }
        assert!(queue.is_empty());
    }
}
