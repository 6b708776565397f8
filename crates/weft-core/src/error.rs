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

//! Error types shared by the queues and the listener registry.

use thiserror::Error;

/// Result alias for structural registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// An error returned synchronously by a structural registry operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The listener handle is null: it no longer refers to a live listener.
    #[error("invalid listener handle")]
    InvalidArgument,
    /// The listener is not registered, or all of its registrations were
    /// already removed.
    #[error("listener is not registered")]
    NotFound,
}

/// Returned by a dequeue that was interrupted by
/// [`BlockingQueue::cancel_dequeue`](crate::queue::BlockingQueue::cancel_dequeue).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("dequeue was cancelled")]
pub struct Cancelled;
