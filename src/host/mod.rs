//! Host boundary.
//!
//! The reactive core needs two things from a rendering host:
//!
//! - a way to build an opaque node from a tag, props and children
//!   ([`Host::create_element`], [`Host::create_text`])
//! - a component model with a mount hook and a per-component re-render
//!   primitive ([`Component`], [`RenderTrigger`])
//!
//! [`bridge`] adapts signals and collectors to that model, [`retained`] is an
//! in-memory host and [`terminal`] draws a retained tree with crossterm.

pub mod bridge;
pub mod retained;
pub mod terminal;

use std::fmt;
use std::rc::Rc;

use crate::builder::{Attr, Handler, Node};

pub use bridge::{app, materialize, CollectorBound, SignalBound, SCOPE_TAG};
pub use retained::{HostComponent, HostElement, HostNode, NodeId, RetainedHost};
pub use terminal::{layout, Line, Segment, TerminalApp};

// =============================================================================
// Traits
// =============================================================================

/// A rendering host.
pub trait Host {
    /// Opaque renderable node.
    type Node;

    fn create_text(&mut self, text: &str) -> Self::Node;

    fn create_element(&mut self, tag: &str, props: Props, children: Vec<Self::Node>)
        -> Self::Node;

    /// Hand a component to the host. The host renders it, calls
    /// [`Component::mounted`] once it is in place and
    /// [`Component::unmounted`] when it is removed.
    fn create_component(&mut self, key: usize, component: Box<dyn Component>) -> Self::Node;
}

/// A host-managed component.
pub trait Component {
    /// Draw the component's subtree.
    fn render(&mut self) -> Vec<Node>;

    /// Called after the first render is in place. `trigger` requests a
    /// re-render of this component only.
    fn mounted(&mut self, _trigger: RenderTrigger) {}

    fn unmounted(&mut self) {}
}

// =============================================================================
// Props
// =============================================================================

/// Properties of a host element.
#[derive(Debug, Clone, Default)]
pub struct Props {
    /// Position among siblings at construction.
    pub key: usize,
    pub attrs: Vec<Attr>,
    pub handlers: Vec<Handler>,
}

impl Props {
    pub fn keyed(key: usize) -> Self {
        Self {
            key,
            ..Self::default()
        }
    }
}

// =============================================================================
// Render Trigger
// =============================================================================

/// Requests a re-render of one component.
#[derive(Clone)]
pub struct RenderTrigger {
    request: Rc<dyn Fn()>,
}

impl RenderTrigger {
    pub fn new(request: impl Fn() + 'static) -> Self {
        Self {
            request: Rc::new(request),
        }
    }

    /// A trigger that does nothing.
    pub fn noop() -> Self {
        Self::new(|| {})
    }

    pub fn request(&self) {
        (self.request)()
    }
}

impl fmt::Debug for RenderTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RenderTrigger")
    }
}
