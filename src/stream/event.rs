//! Event streams.
//!
//! An [`Event`] is an identity-bearing, push-based value: [`fire`](Event::fire)
//! stores the value and synchronously calls every subscriber in subscription
//! order. Derivations (`map`, `filter`, `reduce`, `tag`, ...) are new events
//! subscribed to their source.
//!
//! # Dispatch
//!
//! - Re-entrant fires run inline. There is no queue.
//! - Subscribers are snapshotted before dispatch, so subscribing or disposing
//!   inside a subscriber is safe. The change takes effect on the next fire.
//! - Each subscriber call is isolated: a panic becomes a
//!   [`Fault`](super::Fault) and the remaining subscribers still run.
//!
//! # Disposal
//!
//! [`subscribe`](Event::subscribe) returns a [`Subscription`]. Derived events
//! keep the link they hold on their source, so [`Event::dispose`] detaches a
//! whole chain of otherwise idle derivations. Subscriptions made under an
//! [`Owner`](super::Owner) are disposed with it.
//!
//! # Example
//!
//! ```
//! use reckoner::Event;
//!
//! let keys: Event<u32> = Event::new();
//! let enters = keys.filter(|code| *code == 13);
//! let count = enters.reduce(|n: &usize, _| n + 1, 0);
//!
//! keys.fire(65);
//! keys.fire(13);
//! keys.fire(13);
//! assert_eq!(count.value(), Some(2));
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};

use super::fault::{self, Fault, Journal};
use super::owner;
use crate::error::FireError;

// =============================================================================
// Identity
// =============================================================================

/// Identity of an event, unique per thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(u64);

impl EventId {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn as_raw(self) -> u64 {
        self.0
    }

    fn next() -> Self {
        NEXT_ID.with(|next| {
            let id = next.get();
            next.set(id + 1);
            Self(id)
        })
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

thread_local! {
    static NEXT_ID: Cell<u64> = const { Cell::new(0) };
}

// =============================================================================
// Subscription
// =============================================================================

type Callback<T> = Rc<dyn Fn(&T)>;

struct Subscriber<T> {
    key: u64,
    callback: Callback<T>,
}

/// Type-erased view of an event's subscriber list.
trait SubscriberList {
    fn remove(&self, key: u64) -> bool;
    fn contains(&self, key: u64) -> bool;
    /// Detach from upstream if nothing listens any more.
    fn release_if_idle(&self);
}

/// Handle to one subscription. Dropping it does nothing; call
/// [`dispose`](Subscription::dispose) to unsubscribe.
#[derive(Clone)]
pub struct Subscription {
    source: Weak<dyn SubscriberList>,
    key: u64,
}

impl Subscription {
    /// Remove the subscriber. Safe to call more than once.
    pub fn dispose(&self) {
        if let Some(source) = self.source.upgrade() {
            source.remove(self.key);
        }
    }

    /// Whether the subscriber is still registered on a live event.
    pub fn is_active(&self) -> bool {
        self.source
            .upgrade()
            .is_some_and(|source| source.contains(self.key))
    }

    fn release_source_if_idle(&self) {
        if let Some(source) = self.source.upgrade() {
            source.release_if_idle();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("key", &self.key)
            .field("active", &self.is_active())
            .finish()
    }
}

// =============================================================================
// Event
// =============================================================================

struct EventInner<T> {
    id: EventId,
    value: RefCell<Option<T>>,
    version: Cell<u64>,
    subscribers: RefCell<Vec<Subscriber<T>>>,
    next_key: Cell<u64>,
    /// Links this event holds on its sources (empty for root events).
    upstream: RefCell<Vec<Subscription>>,
}

impl<T> EventInner<T> {
    fn detach(&self) {
        let links = std::mem::take(&mut *self.upstream.borrow_mut());
        for link in links {
            link.dispose();
            link.release_source_if_idle();
        }
    }
}

impl<T: 'static> SubscriberList for EventInner<T> {
    fn remove(&self, key: u64) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|s| s.key != key);
        subscribers.len() != before
    }

    fn contains(&self, key: u64) -> bool {
        self.subscribers.borrow().iter().any(|s| s.key == key)
    }

    fn release_if_idle(&self) {
        let idle = self.subscribers.borrow().is_empty();
        if idle {
            self.detach();
        }
    }
}

/// A push-based stream of `T` values.
///
/// Cloning an `Event` clones the handle, not the stream: both handles fire and
/// observe the same subscribers.
pub struct Event<T: 'static> {
    inner: Rc<EventInner<T>>,
}

impl<T: 'static> Clone for Event<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + 'static> Default for Event<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> fmt::Debug for Event<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("id", &self.inner.id)
            .field("version", &self.inner.version.get())
            .field("subscribers", &self.inner.subscribers.borrow().len())
            .finish()
    }
}

impl<T: Clone + 'static> Event<T> {
    /// A stream with no value yet.
    pub fn new() -> Self {
        Self::from_initial(None)
    }

    /// A stream whose value is visible as `value` before the first fire.
    /// This is how signals start out.
    pub fn with_value(value: T) -> Self {
        Self::from_initial(Some(value))
    }

    fn from_initial(value: Option<T>) -> Self {
        Self {
            inner: Rc::new(EventInner {
                id: EventId::next(),
                value: RefCell::new(value),
                version: Cell::new(0),
                subscribers: RefCell::new(Vec::new()),
                next_key: Cell::new(0),
                upstream: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn id(&self) -> EventId {
        self.inner.id
    }

    /// The last fired value (or the seed).
    pub fn value(&self) -> Option<T> {
        self.inner.value.borrow().clone()
    }

    /// Number of fires so far.
    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    /// Whether both handles refer to the same stream.
    pub fn ptr_eq(&self, other: &Event<T>) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // -------------------------------------------------------------------------
    // Firing
    // -------------------------------------------------------------------------

    /// Store `value` and deliver it to every subscriber, in order.
    ///
    /// A panicking subscriber is caught and reported, but the process panic
    /// hook has already run by then. Applications that own the terminal
    /// should install a hook that does not write to stderr.
    pub fn fire(&self, value: T) {
        self.inner.value.replace(Some(value.clone()));
        self.inner.version.set(self.inner.version.get() + 1);

        let callbacks: Vec<Callback<T>> = self
            .inner
            .subscribers
            .borrow()
            .iter()
            .map(|s| s.callback.clone())
            .collect();

        for callback in callbacks {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| callback(&value))) {
                fault::panicked(self.id(), payload);
            }
        }
    }

    /// Like [`fire`](Event::fire), but returns every fault raised anywhere in
    /// the synchronous dispatch tree.
    pub fn try_fire(&self, value: T) -> Result<(), FireError> {
        let journal = Journal::open();
        self.fire(value);
        let faults = journal.close();
        if faults.is_empty() {
            Ok(())
        } else {
            Err(FireError::Faulted {
                event: self.id(),
                faults,
            })
        }
    }

    /// Append a subscriber. The subscription is also handed to the current
    /// owner, if any.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let key = self.inner.next_key.get();
        self.inner.next_key.set(key + 1);
        self.inner.subscribers.borrow_mut().push(Subscriber {
            key,
            callback: Rc::new(callback),
        });

        let weak = Rc::downgrade(&self.inner);
        let source: Weak<dyn SubscriberList> = weak;
        let subscription = Subscription { source, key };
        owner::track(&subscription);
        subscription
    }

    /// Drop every subscriber and detach from upstream. Upstream derivations
    /// left without subscribers are detached as well.
    pub fn dispose(&self) {
        self.inner.subscribers.borrow_mut().clear();
        self.inner.detach();
    }

    // -------------------------------------------------------------------------
    // Derivations
    // -------------------------------------------------------------------------

    /// Create a downstream event fed by `link` on every fire of `self`.
    fn derive<U, F>(&self, seed: Option<U>, link: F) -> Event<U>
    where
        U: Clone + 'static,
        F: Fn(&Event<U>, &T) + 'static,
    {
        let downstream = Event::from_initial(seed);
        let target = downstream.clone();
        let subscription = self.subscribe(move |value| link(&target, value));
        downstream.inner.upstream.borrow_mut().push(subscription);
        downstream
    }

    /// Fires `f(v)` for every `v`.
    pub fn map<U: Clone + 'static>(&self, f: impl Fn(&T) -> U + 'static) -> Event<U> {
        self.derive(None, move |target, value| target.fire(f(value)))
    }

    /// Fires `v` when `f(v)` holds.
    pub fn filter(&self, f: impl Fn(&T) -> bool + 'static) -> Event<T> {
        self.derive(None, move |target, value| {
            if f(value) {
                target.fire(value.clone());
            }
        })
    }

    /// Fires `u` for every `Some(u) = f(v)`.
    pub fn filter_map<U: Clone + 'static>(
        &self,
        f: impl Fn(&T) -> Option<U> + 'static,
    ) -> Event<U> {
        self.derive(None, move |target, value| {
            if let Some(mapped) = f(value) {
                target.fire(mapped);
            }
        })
    }

    /// Fold the stream into a signal starting at `seed`.
    pub fn reduce<A: Clone + 'static>(
        &self,
        f: impl Fn(&A, &T) -> A + 'static,
        seed: A,
    ) -> Event<A> {
        let acc = RefCell::new(seed.clone());
        self.derive(Some(seed), move |target, value| {
            let current = acc.borrow().clone();
            let next = f(&current, value);
            acc.replace(next.clone());
            target.fire(next);
        })
    }

    /// Sample this stream's current value each time `trigger` fires.
    ///
    /// The sample is `None` while this stream has never fired.
    pub fn tag<U: Clone + 'static>(&self, trigger: &Event<U>) -> Event<Option<T>> {
        let source = self.clone();
        trigger.derive(None, move |target, _| target.fire(source.value()))
    }

    /// Like [`map`](Event::map); an `Err` is reported as a rejection and
    /// nothing is fired.
    pub fn try_map<U, E>(&self, f: impl Fn(&T) -> Result<U, E> + 'static) -> Event<U>
    where
        U: Clone + 'static,
        E: fmt::Display,
    {
        let id = self.id();
        self.derive(None, move |target, value| match f(value) {
            Ok(mapped) => target.fire(mapped),
            Err(err) => fault::report(Fault::Rejected {
                event: id,
                message: err.to_string(),
            }),
        })
    }

    /// Like [`reduce`](Event::reduce); an `Err` leaves the accumulator
    /// unchanged and is reported as a rejection.
    pub fn try_reduce<A, E>(
        &self,
        f: impl Fn(&A, &T) -> Result<A, E> + 'static,
        seed: A,
    ) -> Event<A>
    where
        A: Clone + 'static,
        E: fmt::Display,
    {
        let id = self.id();
        let acc = RefCell::new(seed.clone());
        self.derive(Some(seed), move |target, value| {
            let current = acc.borrow().clone();
            match f(&current, value) {
                Ok(next) => {
                    acc.replace(next.clone());
                    target.fire(next);
                }
                Err(err) => fault::report(Fault::Rejected {
                    event: id,
                    message: err.to_string(),
                }),
            }
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
