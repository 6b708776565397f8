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

//! Unbounded FIFO queues for handing work between threads.
//!
//! - [`LockedQueue`]: a lock-guarded FIFO with a non-blocking pop.
//! - [`WaitableQueue`]: adds blocking and timed pops via a condition variable.
//! - [`BlockingQueue`]: the worker hand-off queue. Multi-producer,
//!   single-consumer, with a one-shot cancellation request that lets the
//!   owner of a worker thread interrupt a blocked consumer.
//!
//! None of the queues bounds its length; backpressure is the caller's concern.

mod blocking;
mod locked;
mod waitable;

pub use self::blocking::BlockingQueue;
pub use self::locked::LockedQueue;
pub use self::waitable::WaitableQueue;
