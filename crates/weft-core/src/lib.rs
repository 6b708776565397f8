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

//! # Weft Core
//!
//! The concurrency substrate of a weft participant: synchronization
//! primitives, producer/consumer queues and the listener registry used to fan
//! out state and incident events to in-process subscribers.
//!
//! Everything in this crate runs on native OS threads. Suspension happens only
//! in the documented blocking calls ([`sync::ConditionVariable::wait`],
//! [`sync::Semaphore::wait`], [`queue::BlockingQueue::dequeue`], ...).

#![warn(missing_docs)]

pub mod error;
pub mod event;
pub mod queue;
pub mod sync;

pub use error::{Cancelled, RegistryError};
pub use event::ListenerRegistry;
pub use queue::{BlockingQueue, LockedQueue, WaitableQueue};
pub use sync::{ConditionVariable, Latch, Lock, RecursiveLock, Semaphore};
