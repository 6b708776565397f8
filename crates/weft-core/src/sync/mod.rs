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

//! Thread synchronization primitives.
//!
//! The layer is built leaves first:
//!
//! - [`Lock`]: non-reentrant mutual exclusion with scoped guards.
//! - [`RecursiveLock`]: reentrant mutual exclusion, depth counted per owner.
//! - [`ConditionVariable`]: suspends a thread while atomically releasing a
//!   [`Lock`] guard.
//! - [`Semaphore`] and [`Latch`]: counting primitives built on the two above.
//!
//! Ownership is always expressed by a guard. Releasing a lock the caller does
//! not own cannot be written.

mod condvar;
mod latch;
mod lock;
mod recursive_lock;
mod semaphore;

pub use self::condvar::ConditionVariable;
pub use self::latch::Latch;
pub use self::lock::{Lock, LockGuard};
pub use self::recursive_lock::{RecursiveLock, RecursiveLockGuard};
pub use self::semaphore::Semaphore;
