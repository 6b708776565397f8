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

use crate::sync::Lock;
use std::collections::VecDeque;

/// A lock-guarded FIFO queue with a non-blocking pop.
#[derive(Debug)]
pub struct LockedQueue<T> {
    items: Lock<VecDeque<T>>,
}

impl<T> LockedQueue<T> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            items: Lock::new(VecDeque::new()),
        }
    }

    /// Appends `item` at the tail.
    pub fn enqueue(&self, item: T) {
        self.items.acquire().push_back(item);
    }

    /// Removes and returns the head, or `None` if the queue is empty.
    pub fn try_dequeue(&self) -> Option<T> {
        self.items.acquire().pop_front()
    }

    /// Number of queued items.
    pub fn len(&self) -> usize {
        self.items.acquire().len()
    }

    /// Returns `true` if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.items.acquire().is_empty()
    }

    /// Drops every queued item and returns how many there were.
    pub fn clear(&self) -> usize {
        // Items are dropped outside the lock.
        let drained = std::mem::take(&mut *self.items.acquire());
        drained.len()
    }
}

impl<T> Default for LockedQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
