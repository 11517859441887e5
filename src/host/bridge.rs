//! Host Bridge - signals and collectors as host components.
//!
//! - [`SignalBound`] - re-draws its subtree whenever a signal fires
//! - [`CollectorBound`] - owns one [`Collector`] and draws once
//! - [`app`] - root component drawing a whole application
//! - [`materialize`] - builder nodes to host nodes
//!
//! # Pattern: Owner per Render
//!
//! Every render runs its drawing function under a fresh [`Owner`]:
//! 1. Dispose the previous render's owner
//! 2. Create a new owner and draw inside `owner.run()`
//! 3. Keep the owner until the next render or unmount
//!
//! Streams derived during a draw (element events, `map`s, `collect`s) are
//! released with the render that created them.
//!
//! # Mount Gap
//!
//! A [`SignalBound`] subscribes on mount, after its first render. Under
//! [`MountGap::CatchUp`] it compares the signal's version with the version
//! it was built against and re-renders if a fire slipped in between. Under
//! [`MountGap::Drop`] such a fire is lost until the next one.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, warn};

use super::{Component, Host, Props, RenderTrigger};
use crate::builder::{Env, Node, Scope};
use crate::config::{config, MountGap};
use crate::stream::{untracked, Collector, Event, Owner, Subscription};

/// Tag of the wrapper element for nested-environment nodes.
pub const SCOPE_TAG: &str = "div";

// =============================================================================
// Materialize
// =============================================================================

/// Turn builder nodes into host nodes, in order.
///
/// A bound node whose component was already handed out is skipped.
pub fn materialize<H: Host>(host: &mut H, nodes: Vec<Node>) -> Vec<H::Node> {
    nodes
        .into_iter()
        .filter_map(|node| materialize_node(host, node))
        .collect()
}

fn materialize_node<H: Host>(host: &mut H, node: Node) -> Option<H::Node> {
    match node {
        Node::Text(text) => Some(host.create_text(&text)),
        Node::Element(element) => {
            let children = materialize(host, element.children);
            let props = Props {
                key: element.key,
                attrs: element.attrs,
                handlers: element.handlers,
            };
            Some(host.create_element(&element.tag, props, children))
        }
        Node::Env(env) => {
            let children = materialize(host, env.children);
            Some(host.create_element(SCOPE_TAG, Props::keyed(env.key), children))
        }
        Node::Signal(bound) | Node::Collector(bound) => match bound.take_component() {
            Some(component) => Some(host.create_component(bound.key, component)),
            None => {
                warn!(key = bound.key, "component already materialized, skipping");
                None
            }
        },
    }
}

/// Dispose `previous` and return a fresh owner for the next draw.
fn renew(previous: &mut Option<Owner>) -> Owner {
    if let Some(owner) = previous.take() {
        owner.dispose();
    }
    let owner = Owner::detached();
    *previous = Some(owner.clone());
    owner
}

// =============================================================================
// Signal Bound
// =============================================================================

/// Component that re-draws with the latest value of a signal.
pub struct SignalBound<T: 'static> {
    signal: Event<T>,
    state: Rc<RefCell<Option<T>>>,
    /// Signal version the state was taken at.
    seen_version: u64,
    draw: Rc<dyn Fn(&T, &mut Scope)>,
    env: Env,
    render_owner: Option<Owner>,
    subscription: Option<Subscription>,
}

impl<T: Clone + 'static> SignalBound<T> {
    /// Capture the signal's current value as the initial state.
    pub fn new(signal: &Event<T>, env: Env, draw: impl Fn(&T, &mut Scope) + 'static) -> Self {
        Self {
            signal: signal.clone(),
            state: Rc::new(RefCell::new(signal.value())),
            seen_version: signal.version(),
            draw: Rc::new(draw),
            env,
            render_owner: None,
            subscription: None,
        }
    }

    /// The value the next render draws.
    pub fn state(&self) -> Option<T> {
        self.state.borrow().clone()
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.as_ref().is_some_and(Subscription::is_active)
    }
}

impl<T: Clone + 'static> Component for SignalBound<T> {
    fn render(&mut self) -> Vec<Node> {
        let owner = renew(&mut self.render_owner);
        let mut scope = Scope::new(self.env.clone());
        let state = self.state.borrow().clone();
        match state {
            Some(value) => owner.run(|| (self.draw)(&value, &mut scope)),
            None => debug!(signal = %self.signal.id(), "signal has no value yet"),
        }
        scope.finish()
    }

    fn mounted(&mut self, trigger: RenderTrigger) {
        if let Some(previous) = self.subscription.take() {
            previous.dispose();
        }

        let state = self.state.clone();
        let request = trigger.clone();
        let subscription = untracked(|| {
            self.signal.subscribe(move |value| {
                state.replace(Some(value.clone()));
                request.request();
            })
        });
        self.subscription = Some(subscription);

        let version = self.signal.version();
        if version != self.seen_version && config().mount_gap == MountGap::CatchUp {
            debug!(
                signal = %self.signal.id(),
                built = self.seen_version,
                current = version,
                "signal fired before mount, catching up"
            );
            self.state.replace(self.signal.value());
            trigger.request();
        }
        self.seen_version = version;
    }

    fn unmounted(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.dispose();
        }
        if let Some(owner) = self.render_owner.take() {
            owner.dispose();
        }
    }
}

// =============================================================================
// Collector Bound
// =============================================================================

/// Component owning one collector. It never asks for a re-render, so its
/// drawing function runs once per mount.
pub struct CollectorBound<S: 'static, E: 'static> {
    collector: Collector<S, E>,
    /// Holds the collector's own links.
    owner: Owner,
    draw: Rc<dyn Fn(&Collector<S, E>, &mut Scope)>,
    env: Env,
    render_owner: Option<Owner>,
}

impl<S: Clone + 'static, E: Clone + 'static> CollectorBound<S, E> {
    pub fn new(
        reducer: impl Fn(&S, &E) -> S + 'static,
        initial: S,
        env: Env,
        draw: impl Fn(&Collector<S, E>, &mut Scope) + 'static,
    ) -> Self {
        let owner = Owner::new();
        let collector = owner.run(|| Collector::new(reducer, initial));
        Self {
            collector,
            owner,
            draw: Rc::new(draw),
            env,
            render_owner: None,
        }
    }

    pub fn collector(&self) -> &Collector<S, E> {
        &self.collector
    }
}

impl<S: Clone + 'static, E: Clone + 'static> Component for CollectorBound<S, E> {
    fn render(&mut self) -> Vec<Node> {
        let owner = renew(&mut self.render_owner);
        let mut scope = Scope::new(self.env.clone());
        owner.run(|| (self.draw)(&self.collector, &mut scope));
        scope.finish()
    }

    fn unmounted(&mut self) {
        if let Some(owner) = self.render_owner.take() {
            owner.dispose();
        }
        self.owner.dispose();
    }
}

// =============================================================================
// App Root
// =============================================================================

struct AppRoot {
    env: Env,
    draw: Box<dyn Fn(&mut Scope)>,
    render_owner: Option<Owner>,
}

impl Component for AppRoot {
    fn render(&mut self) -> Vec<Node> {
        let owner = renew(&mut self.render_owner);
        let mut scope = Scope::new(self.env.clone());
        owner.run(|| (self.draw)(&mut scope));
        scope.finish()
    }

    fn unmounted(&mut self) {
        if let Some(owner) = self.render_owner.take() {
            owner.dispose();
        }
    }
}

/// Root component for an application drawn by `draw` under `env`.
pub fn app(env: Env, draw: impl Fn(&mut Scope) + 'static) -> Box<dyn Component> {
    Box::new(AppRoot {
        env,
        draw: Box::new(draw),
        render_owner: None,
    })
}

// =============================================================================
// Tests
// =============================================================================
