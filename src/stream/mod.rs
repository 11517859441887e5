//! Reactive core - event streams, collectors, owners and fault reporting.
//!
//! - [`Event`] - push-based stream with `map` / `filter` / `reduce` / `tag`
//! - [`Collector`] - merges many events and folds them into one signal
//! - [`Owner`] - disposal scope for subscriptions made during a draw
//! - [`Fault`] - reported panic or rejection from a subscriber
//!
//! A *signal* is not a separate type: it is an `Event` seeded with a value,
//! usually the result of [`Event::reduce`].

mod collector;
mod event;
mod fault;
mod owner;

pub use collector::Collector;
pub use event::{Event, EventId, Subscription};
pub use fault::{clear_fault_handler, report, set_fault_handler, Fault, FaultHandler};
pub use owner::{current_owner, on_cleanup, untracked, Owner};
