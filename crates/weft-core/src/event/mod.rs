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

//! Publish/notify plumbing for in-process listeners.
//!
//! The primary component is the [`ListenerRegistry`], an ordered,
//! thread-safe collection of listener handles that components hold to
//! broadcast lifecycle and incident events to their subscribers.
//!
//! The registry is generic over the listener type `L` (usually a
//! `dyn Trait`), so each publishing component defines its own listener
//! interface without `weft-core` knowing about it.

mod registry;

pub use self::registry::ListenerRegistry;
