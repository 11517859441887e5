//! Event collector - many sources folded into one signal.
//!
//! A [`Collector`] owns a merge stream and the single reduction of that stream.
//! The signal is built once, at construction, and every call to
//! [`signal`](Collector::signal) hands out the same event. Reading it twice
//! can never fork the fold.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use super::event::{Event, EventId, Subscription};

struct CollectorInner<S: 'static, E: 'static> {
    merge: Event<E>,
    signal: Event<S>,
    initial: S,
    sources: RefCell<HashMap<EventId, Subscription>>,
}

/// Merges event sources and folds them with a reducer.
pub struct Collector<S: 'static, E: 'static> {
    inner: Rc<CollectorInner<S, E>>,
}

impl<S: 'static, E: 'static> Clone for Collector<S, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S: Clone + 'static, E: Clone + 'static> Collector<S, E> {
    /// Build the merge stream and its one reduction.
    pub fn new(reducer: impl Fn(&S, &E) -> S + 'static, initial: S) -> Self {
        let merge = Event::new();
        let signal = merge.reduce(reducer, initial.clone());
        Self {
            inner: Rc::new(CollectorInner {
                merge,
                signal,
                initial,
                sources: RefCell::new(HashMap::new()),
            }),
        }
    }

    /// Forward every value of `source` into the fold.
    ///
    /// Collecting a source that is already collected returns the existing
    /// subscription.
    pub fn collect(&self, source: &Event<E>) -> Subscription {
        let existing = self.inner.sources.borrow().get(&source.id()).cloned();
        if let Some(existing) = existing {
            if existing.is_active() {
                tracing::trace!(source = %source.id(), "source already collected");
                return existing;
            }
        }

        let merge = self.inner.merge.clone();
        let subscription = source.subscribe(move |value| merge.fire(value.clone()));
        let mut sources = self.inner.sources.borrow_mut();
        sources.retain(|_, existing| existing.is_active());
        sources.insert(source.id(), subscription.clone());
        subscription
    }

    /// The folded state stream.
    pub fn signal(&self) -> Event<S> {
        self.inner.signal.clone()
    }

    /// The merged stream of collected values, before folding.
    pub fn events(&self) -> Event<E> {
        self.inner.merge.clone()
    }

    /// Current folded state.
    pub fn state(&self) -> S {
        self.inner
            .signal
            .value()
            .unwrap_or_else(|| self.inner.initial.clone())
    }

    /// Number of distinct sources currently feeding the fold.
    pub fn source_count(&self) -> usize {
        self.inner
            .sources
            .borrow()
            .values()
            .filter(|s| s.is_active())
            .count()
    }
}

impl<S: 'static, E: 'static> fmt::Debug for Collector<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collector")
            .field("signal", &self.inner.signal)
            .field("sources", &self.inner.sources.borrow().len())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
