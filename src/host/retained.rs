//! Retained in-memory host.
//!
//! [`RetainedHost`] keeps the materialized tree in a node table, the way a
//! browser keeps a DOM:
//!
//! - elements keep their handlers and a live input state (`value`, `checked`)
//!   seeded from `DefaultValue` / `DefaultChecked`
//! - components keep their instance and the ids of their rendered subtree
//! - re-render requests are queued and performed by [`flush`](RetainedHost::flush)
//!
//! There is no diffing. A re-render removes the component's old subtree,
//! unmounting every component in it, and materializes the new one in place.
//!
//! ```
//! use reckoner::{app, ElementConfig, Env, RetainedHost};
//!
//! let mut host = RetainedHost::new();
//! host.mount(app(Env::empty(), |s| {
//!     s.dom("h1", ElementConfig::new(), |s| s.text("todos"));
//! }));
//! assert_eq!(host.markup(), "<h1>todos</h1>");
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use super::bridge::materialize;
use super::{Component, Host, Props, RenderTrigger};
use crate::builder::{Attr, ChangeInput, DomEvent, EventKinds, Handler, InputType, KeyInput, ValueInput};
use crate::config::config;
use crate::error::HostError;

/// Identity of a node in a [`RetainedHost`]. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

// =============================================================================
// Host Nodes
// =============================================================================

/// A live host element.
#[derive(Debug)]
pub struct HostElement {
    tag: String,
    key: usize,
    attrs: Vec<Attr>,
    handlers: Vec<Handler>,
    children: Vec<NodeId>,
    value: String,
    checked: bool,
}

impl HostElement {
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn key(&self) -> usize {
        self.key
    }

    pub fn attrs(&self) -> &[Attr] {
        &self.attrs
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Current text of an input.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Current state of a checkbox.
    pub fn checked(&self) -> bool {
        self.checked
    }

    pub fn class(&self) -> Option<&str> {
        self.attrs.iter().find_map(|attr| match attr {
            Attr::Class(class) => Some(class.as_str()),
            _ => None,
        })
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.class()
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    /// Event kinds this element has handlers for.
    pub fn observed(&self) -> EventKinds {
        self.handlers
            .iter()
            .fold(EventKinds::empty(), |acc, handler| acc | handler.kind())
    }

    pub fn observes(&self, kind: EventKinds) -> bool {
        self.observed().contains(kind)
    }

    pub fn input_type(&self) -> Option<InputType> {
        if self.tag != "input" {
            return None;
        }
        let declared = self.attrs.iter().find_map(|attr| match attr {
            Attr::Type(kind) => Some(*kind),
            _ => None,
        });
        Some(declared.unwrap_or_default())
    }

    pub fn is_checkbox(&self) -> bool {
        self.input_type() == Some(InputType::Checkbox)
    }

    pub fn is_text_input(&self) -> bool {
        self.input_type() == Some(InputType::Text)
    }

    fn autofocus(&self) -> bool {
        self.attrs.contains(&Attr::AutoFocus(true))
    }
}

/// A live component.
pub struct HostComponent {
    key: usize,
    instance: Option<Box<dyn Component>>,
    children: Vec<NodeId>,
    renders: usize,
}

impl HostComponent {
    pub fn key(&self) -> usize {
        self.key
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Number of times the component has rendered.
    pub fn renders(&self) -> usize {
        self.renders
    }
}

impl fmt::Debug for HostComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostComponent")
            .field("key", &self.key)
            .field("children", &self.children)
            .field("renders", &self.renders)
            .finish()
    }
}

/// One entry of the node table.
#[derive(Debug)]
pub enum HostNode {
    Text(String),
    Element(HostElement),
    Component(HostComponent),
}

// =============================================================================
// Retained Host
// =============================================================================

/// In-memory host with a node table and a re-render queue.
#[derive(Default)]
pub struct RetainedHost {
    nodes: HashMap<NodeId, HostNode>,
    next_id: u64,
    roots: Vec<NodeId>,
    /// Components that asked for a re-render, in request order.
    dirty: Rc<RefCell<Vec<NodeId>>>,
    /// Components rendered but not yet mounted, children first.
    pending_mounts: Vec<NodeId>,
    /// Elements inserted with `AutoFocus(true)`, oldest first.
    autofocus: Vec<NodeId>,
}

impl Host for RetainedHost {
    type Node = NodeId;

    fn create_text(&mut self, text: &str) -> NodeId {
        self.insert(HostNode::Text(text.to_string()))
    }

    fn create_element(&mut self, tag: &str, props: Props, children: Vec<NodeId>) -> NodeId {
        let value = props
            .attrs
            .iter()
            .find_map(|attr| match attr {
                Attr::DefaultValue(value) => Some(value.clone()),
                _ => None,
            })
            .unwrap_or_default();
        let checked = props.attrs.contains(&Attr::DefaultChecked(true));

        let element = HostElement {
            tag: tag.to_string(),
            key: props.key,
            attrs: props.attrs,
            handlers: props.handlers,
            children,
            value,
            checked,
        };
        let autofocus = element.autofocus();
        let id = self.insert(HostNode::Element(element));
        if autofocus {
            self.autofocus.retain(|live| self.nodes.contains_key(live));
            self.autofocus.push(id);
        }
        id
    }

    fn create_component(&mut self, key: usize, component: Box<dyn Component>) -> NodeId {
        let id = self.insert(HostNode::Component(HostComponent {
            key,
            instance: Some(component),
            children: Vec::new(),
            renders: 0,
        }));
        self.render_component(id);
        self.pending_mounts.push(id);
        id
    }
}

impl RetainedHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, node: HostNode) -> NodeId {
        self.next_id += 1;
        let id = NodeId(self.next_id);
        self.nodes.insert(id, node);
        id
    }

    /// Render a component and attach the materialized subtree to it.
    fn render_component(&mut self, id: NodeId) {
        let Some(mut instance) = self.component_mut(id).and_then(|c| c.instance.take()) else {
            return;
        };
        let nodes = instance.render();
        let children = materialize(self, nodes);
        if let Some(component) = self.component_mut(id) {
            component.instance = Some(instance);
            component.children = children;
            component.renders += 1;
        }
    }

    fn component_mut(&mut self, id: NodeId) -> Option<&mut HostComponent> {
        match self.nodes.get_mut(&id) {
            Some(HostNode::Component(component)) => Some(component),
            _ => None,
        }
    }

    fn trigger_for(&self, id: NodeId) -> RenderTrigger {
        let dirty = Rc::downgrade(&self.dirty);
        RenderTrigger::new(move || {
            if let Some(dirty) = dirty.upgrade() {
                let mut queue = dirty.borrow_mut();
                if !queue.contains(&id) {
                    queue.push(id);
                }
            }
        })
    }

    fn run_mounts(&mut self) {
        for id in std::mem::take(&mut self.pending_mounts) {
            let trigger = self.trigger_for(id);
            let Some(mut instance) = self.component_mut(id).and_then(|c| c.instance.take()) else {
                continue;
            };
            instance.mounted(trigger);
            if let Some(component) = self.component_mut(id) {
                component.instance = Some(instance);
            }
        }
    }

    /// Remove a node and everything below it, unmounting components.
    fn remove_subtree(&mut self, id: NodeId) {
        let Some(node) = self.nodes.remove(&id) else {
            return;
        };
        match node {
            HostNode::Text(_) => {}
            HostNode::Element(element) => {
                for child in element.children {
                    self.remove_subtree(child);
                }
            }
            HostNode::Component(mut component) => {
                for child in std::mem::take(&mut component.children) {
                    self.remove_subtree(child);
                }
                if let Some(mut instance) = component.instance.take() {
                    instance.unmounted();
                }
            }
        }
    }

    /// Replace a component's subtree. Returns `false` when the component is
    /// gone.
    fn rerender(&mut self, id: NodeId) -> bool {
        let Some(component) = self.component_mut(id) else {
            return false;
        };
        let old = std::mem::take(&mut component.children);
        for child in old {
            self.remove_subtree(child);
        }
        self.render_component(id);
        debug!(component = %id, "re-rendered");
        true
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Render a root component and run its mount hooks.
    pub fn mount(&mut self, component: Box<dyn Component>) -> NodeId {
        let id = self.create_component(self.roots.len(), component);
        self.roots.push(id);
        self.run_mounts();
        id
    }

    /// Perform queued re-renders until nothing is dirty. Returns the number
    /// of re-renders.
    pub fn flush(&mut self) -> Result<usize, HostError> {
        let passes = config().max_flush_passes;
        let mut rendered = 0;
        for _ in 0..passes {
            self.run_mounts();
            let dirty = std::mem::take(&mut *self.dirty.borrow_mut());
            if dirty.is_empty() {
                return Ok(rendered);
            }
            for id in dirty {
                if self.rerender(id) {
                    rendered += 1;
                }
            }
        }
        self.run_mounts();
        if self.dirty.borrow().is_empty() {
            Ok(rendered)
        } else {
            Err(HostError::RenderLoop { passes })
        }
    }

    /// Whether a re-render is queued.
    pub fn is_dirty(&self) -> bool {
        !self.dirty.borrow().is_empty()
    }

    /// Unmount and drop everything.
    pub fn teardown(&mut self) {
        for root in std::mem::take(&mut self.roots) {
            self.remove_subtree(root);
        }
        self.dirty.borrow_mut().clear();
        self.pending_mounts.clear();
        self.autofocus.clear();
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    fn element(&self, id: NodeId) -> Result<&HostElement, HostError> {
        match self.nodes.get(&id) {
            Some(HostNode::Element(element)) => Ok(element),
            Some(_) => Err(HostError::NotAnElement(id)),
            None => Err(HostError::UnknownNode(id)),
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut HostElement, HostError> {
        match self.nodes.get_mut(&id) {
            Some(HostNode::Element(element)) => Ok(element),
            Some(_) => Err(HostError::NotAnElement(id)),
            None => Err(HostError::UnknownNode(id)),
        }
    }

    /// Deliver `event` to the element's handler for its kind. An element that
    /// does not observe the kind ignores it.
    pub fn dispatch(&mut self, id: NodeId, event: DomEvent) -> Result<(), HostError> {
        let kind = event.kind();
        let handlers: Vec<Handler> = self
            .element(id)?
            .handlers
            .iter()
            .filter(|handler| handler.kind() == kind)
            .cloned()
            .collect();
        for handler in handlers {
            handler.invoke(event.clone());
        }
        Ok(())
    }

    pub fn click(&mut self, id: NodeId) -> Result<(), HostError> {
        self.dispatch(id, DomEvent::Click)
    }

    pub fn double_click(&mut self, id: NodeId) -> Result<(), HostError> {
        self.dispatch(id, DomEvent::DoubleClick)
    }

    pub fn key_down(&mut self, id: NodeId, key_code: u32) -> Result<(), HostError> {
        self.dispatch(id, DomEvent::KeyDown(KeyInput::new(key_code)))
    }

    pub fn blur(&mut self, id: NodeId) -> Result<(), HostError> {
        self.dispatch(id, DomEvent::Blur)
    }

    /// Replace an input's text, then fire `Input` and `Change`.
    pub fn set_input_value(&mut self, id: NodeId, value: &str) -> Result<(), HostError> {
        let element = self.element_mut(id)?;
        element.value = value.to_string();
        let checked = element.checked;
        self.dispatch(
            id,
            DomEvent::Input(ValueInput {
                value: value.to_string(),
            }),
        )?;
        self.dispatch(
            id,
            DomEvent::Change(ChangeInput {
                value: value.to_string(),
                checked,
            }),
        )
    }

    /// Flip a checkbox, then fire `Change`.
    pub fn toggle_checkbox(&mut self, id: NodeId) -> Result<(), HostError> {
        let element = self.element_mut(id)?;
        element.checked = !element.checked;
        let change = ChangeInput {
            value: element.value.clone(),
            checked: element.checked,
        };
        self.dispatch(id, DomEvent::Change(change))
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn node(&self, id: NodeId) -> Option<&HostNode> {
        self.nodes.get(&id)
    }

    pub fn get_element(&self, id: NodeId) -> Option<&HostElement> {
        self.element(id).ok()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn component_count(&self) -> usize {
        self.nodes
            .values()
            .filter(|node| matches!(node, HostNode::Component(_)))
            .count()
    }

    fn children_of(&self, id: NodeId) -> &[NodeId] {
        match self.nodes.get(&id) {
            Some(HostNode::Element(element)) => &element.children,
            Some(HostNode::Component(component)) => &component.children,
            _ => &[],
        }
    }

    /// Every live node in document order.
    pub fn document_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children_of(id).iter().rev().copied());
        }
        order
    }

    fn elements_where(&self, predicate: impl Fn(&HostElement) -> bool) -> Vec<NodeId> {
        self.document_order()
            .into_iter()
            .filter(|id| self.get_element(*id).is_some_and(&predicate))
            .collect()
    }

    /// First element with this tag.
    pub fn find_element(&self, tag: &str) -> Option<NodeId> {
        self.elements_where(|element| element.tag == tag)
            .into_iter()
            .next()
    }

    /// First element carrying `class`.
    pub fn find_by_class(&self, class: &str) -> Option<NodeId> {
        self.find_all_by_class(class).into_iter().next()
    }

    pub fn find_all_by_class(&self, class: &str) -> Vec<NodeId> {
        self.elements_where(|element| element.has_class(class))
    }

    /// Elements with at least one handler, in document order.
    pub fn interactive_elements(&self) -> Vec<NodeId> {
        self.elements_where(|element| !element.handlers.is_empty())
    }

    /// The most recently inserted live autofocus element, if any. Clears the
    /// autofocus list.
    pub fn take_autofocus(&mut self) -> Option<NodeId> {
        std::mem::take(&mut self.autofocus)
            .into_iter()
            .rev()
            .find(|id| self.nodes.contains_key(id))
    }

    /// Concatenated text below `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.nodes.get(&id) {
            Some(HostNode::Text(text)) => out.push_str(text),
            Some(_) => {
                for child in self.children_of(id) {
                    self.collect_text(*child, out);
                }
            }
            None => {}
        }
    }

    /// HTML-like serialization of the whole tree. Components are transparent
    /// and inputs show their live state.
    pub fn markup(&self) -> String {
        let mut out = String::new();
        for root in &self.roots {
            self.write_markup(*root, &mut out);
        }
        out
    }

    fn write_markup(&self, id: NodeId, out: &mut String) {
        match self.nodes.get(&id) {
            Some(HostNode::Text(text)) => escape_into(text, out),
            Some(HostNode::Component(component)) => {
                for child in &component.children {
                    self.write_markup(*child, out);
                }
            }
            Some(HostNode::Element(element)) => {
                out.push('<');
                out.push_str(&element.tag);
                for attr in &element.attrs {
                    if matches!(
                        attr,
                        Attr::DefaultValue(_) | Attr::DefaultChecked(_) | Attr::AutoFocus(_)
                    ) {
                        continue;
                    }
                    out.push(' ');
                    out.push_str(attr.name());
                    out.push_str("=\"");
                    escape_into(&attr.value(), out);
                    out.push('"');
                }
                match element.input_type() {
                    Some(InputType::Checkbox) => {
                        if element.checked {
                            out.push_str(" checked");
                        }
                        out.push_str("/>");
                    }
                    Some(InputType::Text) => {
                        if !element.value.is_empty() {
                            out.push_str(" value=\"");
                            escape_into(&element.value, out);
                            out.push('"');
                        }
                        out.push_str("/>");
                    }
                    None => {
                        out.push('>');
                        for child in &element.children {
                            self.write_markup(*child, out);
                        }
                        out.push_str("</");
                        out.push_str(&element.tag);
                        out.push('>');
                    }
                }
            }
            None => {}
        }
    }
}

/// Append `text` with markup-significant characters replaced by entities.
fn escape_into(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

impl fmt::Debug for RetainedHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetainedHost")
            .field("nodes", &self.nodes.len())
            .field("roots", &self.roots)
            .field("dirty", &self.dirty.borrow().len())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{ElementConfig, Env, KEY_ENTER};
    use crate::host::app;
    use crate::stream::Event;
    use std::cell::Cell;

    fn counter_app(clicks: Rc<Cell<u32>>) -> Box<dyn Component> {
        app(Env::empty(), move |s| {
            let clicks = clicks.clone();
            s.with_event_collector(
                |n: &u32, _: &()| n + 1,
                0,
                move |counter, s| {
                    let clicks = clicks.clone();
                    s.with_signal(&counter.signal(), |n, s| {
                        s.dom("p", ElementConfig::new(), |s| s.text(format!("count {n}")));
                    });
                    let button = s.dom(
                        "button",
                        ElementConfig::new().class("inc").observe(EventKinds::CLICK),
                        |s| s.text("+"),
                    );
                    let presses = button.clicks();
                    presses.subscribe(move |_| clicks.set(clicks.get() + 1));
                    counter.collect(&presses);
                },
            );
        })
    }

    #[test]
    fn test_mount_and_markup() {
        let mut host = RetainedHost::new();
        host.mount(counter_app(Rc::new(Cell::new(0))));

        assert_eq!(
            host.markup(),
            r#"<p>count 0</p><button class="inc">+</button>"#
        );
        assert_eq!(host.component_count(), 3);
    }

    #[test]
    fn test_click_rerenders_only_bound_subtree() {
        let clicks = Rc::new(Cell::new(0));
        let mut host = RetainedHost::new();
        host.mount(counter_app(clicks.clone()));

        let button = host.find_by_class("inc").unwrap();
        let before = host.find_element("p").unwrap();

        host.click(button).unwrap();
        assert!(host.is_dirty());
        assert_eq!(host.flush().unwrap(), 1);

        assert_eq!(clicks.get(), 1);
        assert!(host.contains(button));
        assert!(!host.contains(before));
        assert_eq!(host.text_content(host.roots()[0]), "count 1+");

        host.click(button).unwrap();
        host.click(button).unwrap();
        host.flush().unwrap();
        assert_eq!(host.text_content(host.roots()[0]), "count 3+");
    }

    #[test]
    fn test_dispatch_errors() {
        let mut host = RetainedHost::new();
        let root = host.mount(counter_app(Rc::new(Cell::new(0))));

        assert!(matches!(host.click(root), Err(HostError::NotAnElement(id)) if id == root));

        let button = host.find_by_class("inc").unwrap();
        host.teardown();
        assert!(matches!(host.click(button), Err(HostError::UnknownNode(_))));
    }

    #[test]
    fn test_unobserved_kind_is_ignored() {
        let mut host = RetainedHost::new();
        host.mount(counter_app(Rc::new(Cell::new(0))));
        let button = host.find_by_class("inc").unwrap();

        host.key_down(button, KEY_ENTER).unwrap();
        assert!(!host.is_dirty());
    }

    #[test]
    fn test_inputs_track_live_state() {
        let typed: Event<String> = Event::new();
        let checks: Event<bool> = Event::new();
        let (typed_sink, checks_sink) = (typed.clone(), checks.clone());

        let mut host = RetainedHost::new();
        host.mount(app(Env::empty(), move |s| {
            let text = s.element(
                "input",
                ElementConfig::new()
                    .class("field")
                    .attr(Attr::DefaultValue("draft".into()))
                    .attr(Attr::AutoFocus(true))
                    .observe(EventKinds::INPUT | EventKinds::CHANGE),
            );
            let sink = typed_sink.clone();
            text.inputs().subscribe(move |i| sink.fire(i.value.clone()));

            let toggle = s.element(
                "input",
                ElementConfig::new()
                    .class("toggle")
                    .attr(Attr::Type(InputType::Checkbox))
                    .observe(EventKinds::CHANGE),
            );
            let sink = checks_sink.clone();
            toggle.changes().subscribe(move |c| sink.fire(c.checked));
        }));

        let field = host.find_by_class("field").unwrap();
        let toggle = host.find_by_class("toggle").unwrap();
        assert_eq!(host.get_element(field).map(HostElement::value), Some("draft"));
        assert_eq!(host.take_autofocus(), Some(field));
        assert_eq!(host.take_autofocus(), None);

        host.set_input_value(field, "milk").unwrap();
        host.toggle_checkbox(toggle).unwrap();

        assert_eq!(typed.value(), Some("milk".to_string()));
        assert_eq!(checks.value(), Some(true));
        assert_eq!(
            host.markup(),
            r#"<input class="field" value="milk"/><input class="toggle" type="checkbox" checked/>"#
        );
        assert_eq!(host.interactive_elements(), vec![field, toggle]);
    }

    #[test]
    fn test_redraws_do_not_accumulate_autofocus_entries() {
        let mut host = RetainedHost::new();
        host.mount(app(Env::empty(), |s| {
            s.with_event_collector(
                |n: &u32, _: &()| n + 1,
                0,
                |redraws, s| {
                    s.with_signal(&redraws.signal(), |_, s| {
                        s.element(
                            "input",
                            ElementConfig::new()
                                .class("field")
                                .attr(Attr::AutoFocus(true))
                                .observe(EventKinds::INPUT),
                        );
                    });
                    let button = s.element(
                        "button",
                        ElementConfig::new().class("redraw").observe(EventKinds::CLICK),
                    );
                    redraws.collect(&button.clicks());
                },
            );
        }));

        let button = host.find_by_class("redraw").unwrap();
        for _ in 0..5 {
            host.click(button).unwrap();
            host.flush().unwrap();
        }

        assert_eq!(host.autofocus.len(), 1);
        assert_eq!(host.take_autofocus(), host.find_by_class("field"));
    }

    #[test]
    fn test_markup_escapes_text_and_values() {
        let mut host = RetainedHost::new();
        host.mount(app(Env::empty(), |s| {
            s.dom("label", ElementConfig::new().class("a&b"), |s| {
                s.text(r#"say "hi" <now>"#);
            });
            s.element(
                "input",
                ElementConfig::new().attr(Attr::DefaultValue(r#"5" & up"#.into())),
            );
        }));

        assert_eq!(
            host.markup(),
            concat!(
                r#"<label class="a&amp;b">say &quot;hi&quot; &lt;now&gt;</label>"#,
                r#"<input value="5&quot; &amp; up"/>"#,
            )
        );
    }

    #[test]
    fn test_teardown_unmounts_everything() {
        let clicks = Rc::new(Cell::new(0));
        let mut host = RetainedHost::new();
        host.mount(counter_app(clicks.clone()));
        let button = host.find_by_class("inc").unwrap();

        let handler = match host.node(button) {
            Some(HostNode::Element(element)) => element.handlers[0].clone(),
            _ => panic!("expected the button element"),
        };

        host.teardown();
        assert_eq!(host.node_count(), 0);

        handler.invoke(DomEvent::Click);
        assert_eq!(clicks.get(), 0);
    }

    struct Looping {
        trigger: Option<RenderTrigger>,
    }

    impl Component for Looping {
        fn render(&mut self) -> Vec<crate::builder::Node> {
            if let Some(trigger) = &self.trigger {
                trigger.request();
            }
            Vec::new()
        }

        fn mounted(&mut self, trigger: RenderTrigger) {
            trigger.request();
            self.trigger = Some(trigger);
        }
    }

    #[test]
    fn test_flush_detects_render_loop() {
        let mut host = RetainedHost::new();
        host.mount(Box::new(Looping { trigger: None }));

        let passes = config().max_flush_passes;
        assert!(matches!(host.flush(), Err(HostError::RenderLoop { passes: p }) if p == passes));
    }

    #[test]
    fn test_node_ids_are_not_reused() {
        let mut host = RetainedHost::new();
        let a = host.create_text("a");
        host.remove_subtree(a);
        let b = host.create_text("b");
        assert_ne!(a, b);
        assert!(b > a);
    }
}
