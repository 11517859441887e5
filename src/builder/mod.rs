//! Declarative tree builder.
//!
//! - [`Scope`] - ordered construction context and its primitives
//! - [`Node`] - the drawn description handed to the host bridge
//! - [`ElementConfig`] / [`Attr`] / [`EventKinds`] - typed element configuration
//! - [`DomEvent`] and payloads - raw interaction events from the host
//! - [`Env`] - opaque environment threaded through scopes

mod element;
mod env;
mod node;
mod scope;

pub use element::{
    Attr, ChangeInput, DomEvent, ElementConfig, ElementEvents, EventKinds, Handler, InputType,
    KeyInput, ValueInput, KEY_ENTER, KEY_ESCAPE,
};
pub use env::Env;
pub use node::{BoundNode, ElementNode, EnvNode, Node};
pub use scope::Scope;
