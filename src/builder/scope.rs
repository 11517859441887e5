//! Scope - the declarative tree builder.
//!
//! A [`Scope`] is an ordered construction context. Drawing code calls its
//! primitives in order and the scope records one [`Node`] per call:
//!
//! - [`text`](Scope::text) - literal text
//! - [`dom`](Scope::dom) - host element with children, returns its event streams
//! - [`with_env`](Scope::with_env) - nested scope with a different environment
//! - [`with_signal`](Scope::with_signal) - subtree re-drawn when a signal changes
//! - [`with_event_collector`](Scope::with_event_collector) - subtree owning a
//!   collector
//!
//! # Pattern: Node List Stack
//!
//! Element children are drawn into a fresh list pushed on an explicit stack.
//! [`pop_scope`](Scope::pop_scope) hands back the finalized list, which becomes
//! the element's children. Parent and child lists never alias.
//!
//! ```
//! use reckoner::{ElementConfig, Env, Scope};
//!
//! let mut scope = Scope::new(Env::empty());
//! scope.dom("ul", ElementConfig::new(), |s| {
//!     s.dom("li", ElementConfig::new(), |s| s.text("one"));
//!     s.dom("li", ElementConfig::new(), |s| s.text("two"));
//! });
//! let nodes = scope.finish();
//! assert_eq!(nodes[0].outline(), r#"ul(li("one"),li("two"))"#);
//! ```

use super::element::{DomEvent, ElementConfig, ElementEvents, Handler};
use super::env::Env;
use super::node::{BoundNode, ElementNode, EnvNode, Node};
use crate::host::{CollectorBound, SignalBound};
use crate::stream::{Collector, Event};

/// Tree construction context for one subtree.
pub struct Scope {
    env: Env,
    /// Node lists being drawn into, innermost last. Never empty.
    stack: Vec<Vec<Node>>,
    /// Stack length `pop_scope` may not go below: the list of the element
    /// currently being drawn.
    floor: usize,
}

impl Scope {
    pub fn new(env: Env) -> Self {
        Self {
            env,
            stack: vec![Vec::new()],
            floor: 1,
        }
    }

    /// The environment threaded from the root.
    pub fn env(&self) -> &Env {
        &self.env
    }

    fn current(&mut self) -> &mut Vec<Node> {
        if self.stack.is_empty() {
            self.stack.push(Vec::new());
        }
        let top = self.stack.len() - 1;
        &mut self.stack[top]
    }

    fn append(&mut self, node: Node) {
        self.current().push(node);
    }

    /// Nodes drawn so far into the innermost list.
    pub fn nodes(&self) -> &[Node] {
        self.stack.last().map(Vec::as_slice).unwrap_or_default()
    }

    /// Length of the innermost list (the key the next node gets).
    pub fn len(&self) -> usize {
        self.nodes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes().is_empty()
    }

    /// Number of open lists, 1 at the root.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    // -------------------------------------------------------------------------
    // Node List Stack
    // -------------------------------------------------------------------------

    /// Start drawing into a fresh list.
    pub fn push_scope(&mut self) {
        self.stack.push(Vec::new());
    }

    /// Finish the innermost list and return it.
    ///
    /// Never pops the list of the element being drawn or anything above it:
    /// at that level (and at the root) this takes the list's nodes and leaves
    /// it empty.
    pub fn pop_scope(&mut self) -> Vec<Node> {
        if self.stack.len() > self.floor {
            self.stack.pop().unwrap_or_default()
        } else {
            std::mem::take(self.current())
        }
    }

    /// Fold unbalanced pushes above `len` back into their parents, then pop
    /// the list at `len`.
    fn close(&mut self, len: usize) -> Vec<Node> {
        while self.stack.len() > len {
            let orphaned = self.stack.pop().unwrap_or_default();
            self.current().extend(orphaned);
        }
        self.pop_scope()
    }

    /// Consume the scope and return its root list. Unbalanced pushes are
    /// folded back into their parents in order.
    pub fn finish(mut self) -> Vec<Node> {
        self.floor = 1;
        self.close(1)
    }

    // -------------------------------------------------------------------------
    // Primitives
    // -------------------------------------------------------------------------

    /// Append a text node.
    pub fn text(&mut self, text: impl Into<String>) {
        self.append(Node::Text(text.into()));
    }

    /// Append a host element whose children are drawn by `draw`.
    ///
    /// One handler is installed per observed event kind. Each handler fires
    /// the element's raw stream, and the returned [`ElementEvents`] splits it
    /// back per kind.
    pub fn dom(
        &mut self,
        tag: &str,
        config: ElementConfig,
        draw: impl FnOnce(&mut Scope),
    ) -> ElementEvents {
        self.push_scope();
        let own = self.stack.len();
        let outer = std::mem::replace(&mut self.floor, own);
        draw(self);
        self.floor = outer;
        let children = self.close(own);

        let raw: Event<DomEvent> = Event::new();
        let handlers = config
            .events
            .iter()
            .map(|kind| {
                let raw = raw.clone();
                Handler::new(kind, move |event| raw.fire(event))
            })
            .collect();
        let events = ElementEvents::new(&raw, config.events);

        let key = self.len();
        self.append(Node::Element(ElementNode {
            tag: tag.to_string(),
            key,
            attrs: config.attrs,
            handlers,
            children,
        }));
        events
    }

    /// [`dom`](Scope::dom) without children.
    pub fn element(&mut self, tag: &str, config: ElementConfig) -> ElementEvents {
        self.dom(tag, config, |_| {})
    }

    /// Draw into a nested scope carrying `env` and append it as one node.
    pub fn with_env<R>(&mut self, env: Env, draw: impl FnOnce(&mut Scope) -> R) -> R {
        let mut nested = Scope::new(env.clone());
        let result = draw(&mut nested);
        let key = self.len();
        self.append(Node::Env(EnvNode {
            key,
            env,
            children: nested.finish(),
        }));
        result
    }

    /// Append a subtree that is re-drawn with the latest value of `signal`.
    pub fn with_signal<T: Clone + 'static>(
        &mut self,
        signal: &Event<T>,
        draw: impl Fn(&T, &mut Scope) + 'static,
    ) {
        let component = SignalBound::new(signal, self.env.clone(), draw);
        let key = self.len();
        self.append(Node::Signal(BoundNode::new(key, Box::new(component))));
    }

    /// Append a subtree owning one fresh [`Collector`].
    ///
    /// `draw` receives the collector when the host renders the subtree.
    pub fn with_event_collector<S, E>(
        &mut self,
        reducer: impl Fn(&S, &E) -> S + 'static,
        initial: S,
        draw: impl Fn(&Collector<S, E>, &mut Scope) + 'static,
    ) where
        S: Clone + 'static,
        E: Clone + 'static,
    {
        let component = CollectorBound::new(reducer, initial, self.env.clone(), draw);
        let key = self.len();
        self.append(Node::Collector(BoundNode::new(key, Box::new(component))));
    }
}

// =============================================================================
// Tests
// =============================================================================
