//! Owners - disposal scopes for subscriptions.
//!
//! An [`Owner`] collects every [`Subscription`] created while it is the
//! current owner, plus cleanup callbacks and child owners. Disposing it tears
//! all of that down in one call.
//!
//! Components draw under an owner, so a re-render (or unmount) releases every
//! stream link the previous draw created.
//!
//! ```ignore
//! let owner = Owner::new();
//! owner.run(|| {
//!     let doubled = clicks.map(|n| n * 2);   // link owned by `owner`
//!     doubled.subscribe(|n| println!("{n}"));
//! });
//! owner.dispose(); // both links gone
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use super::event::Subscription;

type Cleanup = Box<dyn FnOnce()>;

#[derive(Default)]
struct OwnerInner {
    links: RefCell<Vec<Subscription>>,
    cleanups: RefCell<Vec<Cleanup>>,
    children: RefCell<Vec<Owner>>,
    disposed: Cell<bool>,
}

/// A disposal scope.
#[derive(Clone)]
pub struct Owner {
    inner: Rc<OwnerInner>,
}

thread_local! {
    static OWNER_STACK: RefCell<Vec<Owner>> = const { RefCell::new(Vec::new()) };
}

// =============================================================================
// Owner
// =============================================================================

impl Owner {
    /// Create an owner. It becomes a child of the current owner, if any, and
    /// is disposed with it.
    pub fn new() -> Self {
        let owner = Self::detached();
        if let Some(parent) = current_owner() {
            parent.adopt_child(owner.clone());
        }
        owner
    }

    /// Create an owner with no parent.
    pub fn detached() -> Self {
        Self {
            inner: Rc::new(OwnerInner::default()),
        }
    }

    /// Run `f` with this owner as the current owner.
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> R {
        OWNER_STACK.with(|stack| stack.borrow_mut().push(self.clone()));
        let _guard = StackGuard;
        f()
    }

    /// Take ownership of a subscription.
    ///
    /// Adopting into a disposed owner disposes the subscription right away.
    pub fn adopt(&self, subscription: Subscription) {
        if self.is_disposed() {
            subscription.dispose();
            return;
        }
        self.inner.links.borrow_mut().push(subscription);
    }

    /// Register a callback to run on dispose.
    pub fn on_dispose(&self, cleanup: impl FnOnce() + 'static) {
        if self.is_disposed() {
            cleanup();
            return;
        }
        self.inner.cleanups.borrow_mut().push(Box::new(cleanup));
    }

    fn adopt_child(&self, child: Owner) {
        if self.is_disposed() {
            child.dispose();
            return;
        }
        self.inner.children.borrow_mut().push(child);
    }

    /// Dispose children, then links, then cleanups (last registered first).
    /// Idempotent.
    pub fn dispose(&self) {
        if self.inner.disposed.replace(true) {
            return;
        }

        let children = std::mem::take(&mut *self.inner.children.borrow_mut());
        for child in children {
            child.dispose();
        }

        let links = std::mem::take(&mut *self.inner.links.borrow_mut());
        for link in links {
            link.dispose();
        }

        let cleanups = std::mem::take(&mut *self.inner.cleanups.borrow_mut());
        for cleanup in cleanups.into_iter().rev() {
            cleanup();
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    /// Number of subscriptions currently held.
    pub fn link_count(&self) -> usize {
        self.inner.links.borrow().len()
    }

    pub fn ptr_eq(&self, other: &Owner) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for Owner {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Owner")
            .field("links", &self.inner.links.borrow().len())
            .field("children", &self.inner.children.borrow().len())
            .field("disposed", &self.inner.disposed.get())
            .finish()
    }
}

/// Pops the owner stack even if the closure unwinds.
struct StackGuard;

impl Drop for StackGuard {
    fn drop(&mut self) {
        OWNER_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

// =============================================================================
// Current Owner
// =============================================================================

/// The innermost owner set by [`Owner::run`], if any.
pub fn current_owner() -> Option<Owner> {
    OWNER_STACK.with(|stack| stack.borrow().last().cloned())
}

/// Register a cleanup with the current owner. Without an owner the cleanup
/// never runs.
pub fn on_cleanup(cleanup: impl FnOnce() + 'static) {
    match current_owner() {
        Some(owner) => owner.on_dispose(cleanup),
        None => tracing::trace!("on_cleanup called with no current owner"),
    }
}

/// Run `f` with no current owner. Subscriptions made inside are not tracked.
pub fn untracked<R>(f: impl FnOnce() -> R) -> R {
    let saved = OWNER_STACK.with(|stack| std::mem::take(&mut *stack.borrow_mut()));
    let _restore = RestoreStack(Some(saved));
    f()
}

struct RestoreStack(Option<Vec<Owner>>);

impl Drop for RestoreStack {
    fn drop(&mut self) {
        if let Some(saved) = self.0.take() {
            OWNER_STACK.with(|stack| *stack.borrow_mut() = saved);
        }
    }
}

/// Hand a fresh subscription to the current owner.
pub(crate) fn track(subscription: &Subscription) {
    if let Some(owner) = current_owner() {
        owner.adopt(subscription.clone());
    }
}

// =============================================================================
// Tests
// =============================================================================
