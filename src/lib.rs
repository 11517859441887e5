//! # reckoner
//!
//! Push-based event streams, folded signals and a declarative tree builder
//! for reactive UIs.
//!
//! ## Architecture
//!
//! Application code describes its UI once with a [`Scope`]. Interaction
//! events on the emitted elements become [`Event`] streams, business code
//! derives domain events with `map` / `filter` / `reduce` / `tag` and feeds
//! them into a [`Collector`]. The collector's signal is spliced back into the
//! tree with [`Scope::with_signal`], which re-draws only that subtree:
//!
//! ```text
//! draw → element events → derived events → collector → signal → re-draw subtree
//! ```
//!
//! ```
//! use reckoner::{Collector, Event};
//!
//! let clicks: Event<i32> = Event::new();
//! let counter = Collector::new(|total: &i32, n: &i32| total + n, 0);
//! counter.collect(&clicks.map(|n| n * 10));
//!
//! clicks.fire(1);
//! clicks.fire(2);
//! assert_eq!(counter.state(), 30);
//! ```
//!
//! ## Modules
//!
//! - [`stream`] - events, collectors, owners, fault reporting
//! - [`builder`] - the tree builder, typed element config, DOM events
//! - [`host`] - host boundary, signal/collector components, retained and
//!   terminal hosts
//! - [`todomvc`] - the TodoMVC application
//! - [`config`] - per-thread runtime settings
//! - [`error`] - error types

pub mod builder;
pub mod config;
pub mod error;
pub mod host;
pub mod stream;
pub mod todomvc;

pub use builder::{
    Attr, ChangeInput, DomEvent, ElementConfig, ElementEvents, Env, EventKinds, InputType,
    KeyInput, Node, Scope, ValueInput, KEY_ENTER, KEY_ESCAPE,
};

pub use config::{
    config, reset_config, set_config, set_fault_policy, set_mount_gap, FaultPolicy, MountGap,
    RuntimeConfig,
};

pub use error::{FireError, HostError};

pub use host::{
    app, layout, materialize, Component, Host, Line, NodeId, Props, RenderTrigger, RetainedHost,
    TerminalApp,
};

pub use stream::{
    clear_fault_handler, current_owner, on_cleanup, set_fault_handler, untracked, Collector,
    Event, EventId, Fault, Owner, Subscription,
};
