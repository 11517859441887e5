//! Tree nodes produced by a [`Scope`](super::Scope).
//!
//! Nodes are a description, not host objects. The host bridge turns them into
//! host nodes with [`materialize`](crate::host::materialize).

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::element::{Attr, Handler};
use super::env::Env;
use crate::host::Component;

/// One node of a drawn tree.
#[derive(Clone)]
pub enum Node {
    Text(String),
    Element(ElementNode),
    /// Subtree drawn under an overridden environment.
    Env(EnvNode),
    /// Subtree re-drawn whenever a signal changes.
    Signal(BoundNode),
    /// Subtree owning its own collector.
    Collector(BoundNode),
}

/// A host element.
#[derive(Clone, Debug)]
pub struct ElementNode {
    pub tag: String,
    /// Position in the parent list at construction.
    pub key: usize,
    pub attrs: Vec<Attr>,
    pub handlers: Vec<Handler>,
    pub children: Vec<Node>,
}

impl ElementNode {
    pub fn class(&self) -> Option<&str> {
        self.attrs.iter().find_map(|attr| match attr {
            Attr::Class(class) => Some(class.as_str()),
            _ => None,
        })
    }
}

/// A nested scope's output.
#[derive(Clone, Debug)]
pub struct EnvNode {
    pub key: usize,
    pub env: Env,
    pub children: Vec<Node>,
}

/// A prepared component waiting to be handed to the host.
///
/// The component can be taken once. Cloning the node shares the slot.
#[derive(Clone)]
pub struct BoundNode {
    pub key: usize,
    slot: Rc<RefCell<Option<Box<dyn Component>>>>,
}

impl BoundNode {
    pub(crate) fn new(key: usize, component: Box<dyn Component>) -> Self {
        Self {
            key,
            slot: Rc::new(RefCell::new(Some(component))),
        }
    }

    /// Take the component out. `None` once it has been taken.
    pub fn take_component(&self) -> Option<Box<dyn Component>> {
        self.slot.borrow_mut().take()
    }

    pub fn is_taken(&self) -> bool {
        self.slot.borrow().is_none()
    }
}

impl fmt::Debug for BoundNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundNode")
            .field("key", &self.key)
            .field("taken", &self.is_taken())
            .finish()
    }
}

impl Node {
    pub fn as_element(&self) -> Option<&ElementNode> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Concatenated text of this node and its static descendants.
    /// Bound subtrees are not drawn yet and contribute nothing.
    pub fn text_content(&self) -> String {
        match self {
            Node::Text(text) => text.clone(),
            Node::Element(element) => element.children.iter().map(Node::text_content).collect(),
            Node::Env(env) => env.children.iter().map(Node::text_content).collect(),
            Node::Signal(_) | Node::Collector(_) => String::new(),
        }
    }

    /// Short shape summary, e.g. `li(div(input,label("a"),button))`.
    pub fn outline(&self) -> String {
        fn list(nodes: &[Node]) -> String {
            nodes.iter().map(Node::outline).collect::<Vec<_>>().join(",")
        }
        match self {
            Node::Text(text) => format!("{text:?}"),
            Node::Element(element) if element.children.is_empty() => element.tag.clone(),
            Node::Element(element) => format!("{}({})", element.tag, list(&element.children)),
            Node::Env(env) => format!("env({})", list(&env.children)),
            Node::Signal(_) => "signal".to_string(),
            Node::Collector(_) => "collector".to_string(),
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Node::Element(element) => f.debug_tuple("Element").field(element).finish(),
            Node::Env(env) => f.debug_tuple("Env").field(env).finish(),
            Node::Signal(bound) => f.debug_tuple("Signal").field(bound).finish(),
            Node::Collector(bound) => f.debug_tuple("Collector").field(bound).finish(),
        }
    }
}
