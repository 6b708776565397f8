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

use crate::error::{RegistryError, RegistryResult};
use crate::sync::{ConditionVariable, Lock, LockGuard};
use std::convert::Infallible;
use std::fmt;
use std::sync::{Arc, Weak};
use std::thread::{self, ThreadId};

/// A callback that is currently running.
struct Delivery<L: ?Sized> {
    id: u64,
    listener: Weak<L>,
    thread: ThreadId,
}

/// A thread blocked in `unregister*` until deliveries of `listener` (or of
/// any listener, for `None`) on other threads have settled.
struct Waiter<L: ?Sized> {
    thread: ThreadId,
    listener: Option<Weak<L>>,
}

struct Membership<L: ?Sized> {
    listeners: Vec<Weak<L>>,
    in_flight: Vec<Delivery<L>>,
    waiting: Vec<Waiter<L>>,
    next_delivery: u64,
}

impl<L: ?Sized> Membership<L> {
    /// Whether `delivery` holds up a thread waiting in `unregister*`.
    fn delays(delivery: &Delivery<L>, waiter: ThreadId, listener: Option<&Weak<L>>) -> bool {
        delivery.thread != waiter && listener.map_or(true, |l| delivery.listener.ptr_eq(l))
    }

    /// Whether `current` has to keep waiting for a delivery of `listener`
    /// (or of any listener, for `None`) running on another thread.
    ///
    /// A delivery is not waited for when its thread is itself blocked, directly
    /// or through other waiters, on a callback running on `current`: that
    /// wait could never end.
    fn must_wait(&self, listener: Option<&Weak<L>>, current: ThreadId) -> bool {
        self.in_flight.iter().any(|d| {
            Self::delays(d, current, listener) && !self.blocked_on(d.thread, current)
        })
    }

    /// Whether `from` is waiting, transitively, on a delivery running on
    /// `target`.
    fn blocked_on(&self, from: ThreadId, target: ThreadId) -> bool {
        let mut pending = vec![from];
        let mut seen = Vec::new();
        while let Some(thread) = pending.pop() {
            if seen.contains(&thread) {
                continue;
            }
            seen.push(thread);

            let Some(waiter) = self.waiting.iter().find(|w| w.thread == thread) else {
                continue;
            };
            for delivery in self
                .in_flight
                .iter()
                .filter(|d| Self::delays(d, thread, waiter.listener.as_ref()))
            {
                if delivery.thread == target {
                    return true;
                }
                pending.push(delivery.thread);
            }
        }
        false
    }

    fn prune_dropped(&mut self) {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.strong_count() > 0);
        let pruned = before - self.listeners.len();
        if pruned > 0 {
            log::debug!("ListenerRegistry: pruned {pruned} dropped listener(s).");
        }
    }
}

/// Removes its delivery record when the callback is over, even by unwinding.
struct DeliveryToken<'a, L: ?Sized> {
    registry: &'a ListenerRegistry<L>,
    id: u64,
}

impl<L: ?Sized> Drop for DeliveryToken<'_, L> {
    fn drop(&mut self) {
        let mut membership = self.registry.membership.acquire();
        membership.in_flight.retain(|d| d.id != self.id);
        self.registry.settled.notify_all();
    }
}

/// An ordered registry of listeners, notified in registration order.
///
/// The registry stores non-owning [`Weak`] handles: the caller owns every
/// listener and the registry never keeps one alive beyond the callback it is
/// currently delivering. Listener identity is the identity of the shared
/// allocation, so the same listener may be registered several times; it then
/// needs as many [`unregister`](Self::unregister) calls to go away, but is
/// still called only once per [`notify`](Self::notify) pass.
///
/// Callbacks run with no registry lock held and may freely re-enter the
/// registry: registering a new listener, unregistering themselves, or
/// notifying again. An `unregister` issued from another thread while the
/// listener's callback runs waits until that callback has returned, so the
/// caller may destroy the listener right after `unregister` returns.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use weft_core::event::ListenerRegistry;
///
/// trait StateListener: Send + Sync {
///     fn on_state(&self, state: &str) -> Result<(), String>;
/// }
///
/// struct Printer;
/// impl StateListener for Printer {
///     fn on_state(&self, state: &str) -> Result<(), String> {
///         println!("entered {state}");
///         Ok(())
///     }
/// }
///
/// let registry: ListenerRegistry<dyn StateListener> = ListenerRegistry::new();
/// let printer: Arc<dyn StateListener> = Arc::new(Printer);
///
/// registry.register(&printer).unwrap();
/// registry.notify(|l| l.on_state("RUNNING")).unwrap();
/// registry.unregister(&printer).unwrap();
/// ```
pub struct ListenerRegistry<L: ?Sized> {
    membership: Lock<Membership<L>>,
    settled: ConditionVariable,
}

impl<L: ?Sized> ListenerRegistry<L> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            membership: Lock::new(Membership {
                listeners: Vec::new(),
                in_flight: Vec::new(),
                waiting: Vec::new(),
                next_delivery: 0,
            }),
            settled: ConditionVariable::new(),
        }
    }

    /// Appends `listener` at the end of the notification order.
    ///
    /// A pass that is still sweeping will reach it.
    pub fn register(&self, listener: &Arc<L>) -> RegistryResult<()> {
        self.register_weak(&Arc::downgrade(listener))
    }

    /// Appends the listener behind a weak handle.
    ///
    /// ## Errors
    /// [`RegistryError::InvalidArgument`] if the handle no longer refers to a
    /// live listener.
    pub fn register_weak(&self, listener: &Weak<L>) -> RegistryResult<()> {
        if listener.strong_count() == 0 {
            return Err(RegistryError::InvalidArgument);
        }
        let mut membership = self.membership.acquire();
        membership.listeners.push(listener.clone());
        log::debug!(
            "ListenerRegistry: registered listener ({} entries).",
            membership.listeners.len()
        );
        Ok(())
    }

    /// Removes the first registration of `listener`.
    ///
    /// If the listener's callback is running on another thread, this waits
    /// until it returns. Called from inside the listener's own callback it
    /// returns immediately.
    ///
    /// ## Errors
    /// [`RegistryError::NotFound`] if the listener is not registered.
    pub fn unregister(&self, listener: &Arc<L>) -> RegistryResult<()> {
        self.unregister_weak(&Arc::downgrade(listener))
    }

    /// Removes the first registration of the listener behind a weak handle.
    ///
    /// ## Errors
    /// [`RegistryError::InvalidArgument`] if the handle no longer refers to a
    /// live listener, [`RegistryError::NotFound`] if it is not registered.
    pub fn unregister_weak(&self, listener: &Weak<L>) -> RegistryResult<()> {
        if listener.strong_count() == 0 {
            return Err(RegistryError::InvalidArgument);
        }
        let mut membership = self.membership.acquire();
        let position = membership
            .listeners
            .iter()
            .position(|l| l.ptr_eq(listener))
            .ok_or(RegistryError::NotFound)?;
        membership.listeners.remove(position);
        log::debug!(
            "ListenerRegistry: unregistered listener ({} entries left).",
            membership.listeners.len()
        );

        self.wait_for_deliveries(&mut membership, Some(listener));
        Ok(())
    }

    /// Removes every registration.
    ///
    /// Waits until no callback is running on another thread.
    pub fn unregister_all(&self) -> RegistryResult<()> {
        let mut membership = self.membership.acquire();
        let removed = membership.listeners.len();
        membership.listeners.clear();
        log::debug!("ListenerRegistry: unregistered all {removed} listener(s).");

        self.wait_for_deliveries(&mut membership, None);
        Ok(())
    }

    /// Calls `callback` once for every registered listener, in order.
    ///
    /// Listeners registered while the pass is running are reached in the same
    /// pass. A listener unregistered before the sweep gets to it is skipped.
    ///
    /// ## Returns
    /// The first error returned by a callback. Later listeners are still
    /// called after a failure.
    pub fn notify<E, F>(&self, mut callback: F) -> Result<(), E>
    where
        F: FnMut(&L) -> Result<(), E>,
    {
        let mut visited = Vec::new();
        let mut first_error = None;
        let mut delivered = 0_usize;

        while let Some((token, listener)) = self.begin_delivery(&mut visited) {
            let outcome = callback(&listener);
            drop(listener);
            drop(token);

            delivered += 1;
            if let Err(error) = outcome {
                if first_error.is_none() {
                    first_error = Some(error);
                }
            }
        }

        log::trace!("ListenerRegistry: notified {delivered} listener(s).");
        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Calls an infallible `callback` once for every registered listener.
    pub fn broadcast<F>(&self, mut callback: F)
    where
        F: FnMut(&L),
    {
        let outcome = self.notify::<Infallible, _>(|listener| {
            callback(listener);
            Ok(())
        });
        if let Err(never) = outcome {
            match never {}
        }
    }

    /// Number of live registrations, duplicates included.
    pub fn len(&self) -> usize {
        self.membership
            .acquire()
            .listeners
            .iter()
            .filter(|l| l.strong_count() > 0)
            .count()
    }

    /// Returns `true` if no live listener is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if `listener` is registered at least once.
    pub fn contains(&self, listener: &Arc<L>) -> bool {
        let probe = Arc::downgrade(listener);
        self.membership
            .acquire()
            .listeners
            .iter()
            .any(|l| l.ptr_eq(&probe))
    }

    /// Picks the next listener of a pass and records its delivery.
    fn begin_delivery(
        &self,
        visited: &mut Vec<Weak<L>>,
    ) -> Option<(DeliveryToken<'_, L>, Arc<L>)> {
        let mut membership = self.membership.acquire();
        membership.prune_dropped();

        let (handle, listener) = membership
            .listeners
            .iter()
            .filter(|l| !visited.iter().any(|v| v.ptr_eq(l)))
            .find_map(|l| l.upgrade().map(|strong| (l.clone(), strong)))?;

        // Holding the weak handle keeps the allocation, and so the identity,
        // from being reused for the rest of the pass.
        visited.push(handle.clone());

        let id = membership.next_delivery;
        membership.next_delivery = id.wrapping_add(1);
        membership.in_flight.push(Delivery {
            id,
            listener: handle,
            thread: thread::current().id(),
        });

        Some((DeliveryToken { registry: self, id }, listener))
    }

    fn wait_for_deliveries(
        &self,
        membership: &mut LockGuard<'_, Membership<L>>,
        listener: Option<&Weak<L>>,
    ) {
        let current = thread::current().id();
        if !membership.must_wait(listener, current) {
            return;
        }

        log::debug!("ListenerRegistry: waiting for in-flight callbacks on other threads.");
        membership.waiting.push(Waiter {
            thread: current,
            listener: listener.cloned(),
        });
        // A waiter blocked on us may now see the cycle and go through.
        self.settled.notify_all();
        self.settled
            .wait_while(membership, |state| state.must_wait(listener, current));
        if let Some(position) = membership.waiting.iter().position(|w| w.thread == current) {
            membership.waiting.swap_remove(position);
        }
    }
}

impl<L: ?Sized> Default for ListenerRegistry<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: ?Sized> fmt::Debug for ListenerRegistry<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let membership = self.membership.acquire();
        f.debug_struct("ListenerRegistry")
            .field("listeners", &membership.listeners.len())
            .field("in_flight", &membership.in_flight.len())
            .finish()
    }
}
