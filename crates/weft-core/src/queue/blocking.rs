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

use super::locked::LockedQueue;
use crate::error::Cancelled;
use crate::sync::Semaphore;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// A growing queue whose consumer blocks while it is empty.
///
/// Any number of threads may [`enqueue`](Self::enqueue). A single logical
/// consumer calls [`dequeue`](Self::dequeue); the owner of that consumer can
/// interrupt it with [`cancel_dequeue`](Self::cancel_dequeue), typically to
/// stop a worker thread.
///
/// Cancellation is a one-shot flag, not a counter: it is consumed by exactly
/// one dequeue call, whether or not the consumer was already blocked, and
/// several cancellations issued before that call collapse into one.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use std::thread;
/// use weft_core::queue::BlockingQueue;
///
/// let queue = Arc::new(BlockingQueue::<u32>::new());
/// let worker = {
///     let queue = Arc::clone(&queue);
///     thread::spawn(move || {
///         let mut received = Vec::new();
///         while let Ok(sample) = queue.dequeue() {
///             received.push(sample);
///         }
///         received
///     })
/// };
///
/// queue.enqueue(1);
/// queue.enqueue(2);
/// while !queue.is_empty() {
///     thread::yield_now();
/// }
/// queue.cancel_dequeue();
/// assert_eq!(worker.join().unwrap(), vec![1, 2]);
/// ```
#[derive(Debug)]
pub struct BlockingQueue<T> {
    items: LockedQueue<T>,
    /// One permit per queued item, plus one while a cancellation is pending.
    ready: Semaphore,
    cancelled: AtomicBool,
    size: AtomicUsize,
}

impl<T> BlockingQueue<T> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            items: LockedQueue::new(),
            ready: Semaphore::new(0),
            cancelled: AtomicBool::new(false),
            size: AtomicUsize::new(0),
        }
    }

    /// Appends `item` at the tail and wakes the consumer. Never blocks.
    pub fn enqueue(&self, item: T) {
        // Counted before the push so `size` never underflows.
        self.size.fetch_add(1, Ordering::AcqRel);
        self.items.enqueue(item);
        self.ready.post();
        log::trace!("BlockingQueue: item enqueued.");
    }

    /// Removes the head item, blocking while the queue is empty.
    ///
    /// ## Returns
    /// `Err(Cancelled)` if a cancellation is pending or arrives while
    /// blocked. A pending cancellation wins even over queued items.
    pub fn dequeue(&self) -> Result<T, Cancelled> {
        loop {
            if let Some(item) = self.try_dequeue()? {
                return Ok(item);
            }
            self.ready.wait();
        }
    }

    /// Like [`dequeue`](Self::dequeue) but waits at most `timeout`.
    ///
    /// ## Returns
    /// `Ok(None)` if no item arrived before the deadline.
    pub fn dequeue_timeout(&self, timeout: Duration) -> Result<Option<T>, Cancelled> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(item) = self.try_dequeue()? {
                return Ok(Some(item));
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() || !self.ready.timed_wait(remaining) {
                // One last look: the item may have landed with the deadline.
                return self.try_dequeue();
            }
        }
    }

    /// Removes the head item without blocking.
    ///
    /// A pending cancellation is consumed and reported like in
    /// [`dequeue`](Self::dequeue).
    pub fn try_dequeue(&self) -> Result<Option<T>, Cancelled> {
        if self.cancelled.swap(false, Ordering::AcqRel) {
            log::debug!("BlockingQueue: dequeue cancelled.");
            return Err(Cancelled);
        }
        let Some(item) = self.items.try_dequeue() else {
            return Ok(None);
        };
        self.size.fetch_sub(1, Ordering::AcqRel);
        // Keep the permit count in step with the items we took directly.
        self.ready.try_wait();
        log::trace!("BlockingQueue: item dequeued.");
        Ok(Some(item))
    }

    /// Interrupts the consumer.
    ///
    /// If no dequeue is blocked right now, the next dequeue call returns
    /// `Cancelled` instead. Calling it again before that has no extra effect.
    pub fn cancel_dequeue(&self) {
        // A pending cancellation already owns a wake-up permit.
        if !self.cancelled.swap(true, Ordering::AcqRel) {
            self.ready.post();
        }
        log::debug!("BlockingQueue: cancellation requested.");
    }

    /// Drops every queued item without delivering it.
    ///
    /// ## Returns
    /// The number of items dropped.
    pub fn clear(&self) -> usize {
        let mut dropped = 0;
        while self.items.try_dequeue().is_some() {
            self.size.fetch_sub(1, Ordering::AcqRel);
            self.ready.try_wait();
            dropped += 1;
        }
        dropped
    }

    /// Number of items enqueued and not yet dequeued or cleared.
    pub fn size(&self) -> usize {
        self.size.load(Ordering::Acquire)
    }

    /// Returns `true` if [`size`](Self::size) is zero.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }
}

impl<T> Default for BlockingQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
