//! Element configuration and interaction events.
//!
//! [`ElementConfig`] is the typed replacement for a free-form attribute bag:
//! attributes are [`Attr`] variants and the events to observe are an
//! [`EventKinds`] set. Each kind has a concrete payload in [`DomEvent`].
//!
//! [`Scope::dom`](super::Scope::dom) installs one [`Handler`] per observed kind
//! and returns [`ElementEvents`], the per-kind streams for the element.

use std::fmt;
use std::rc::Rc;

use crate::stream::Event;

/// Key code for Enter.
pub const KEY_ENTER: u32 = 13;
/// Key code for Escape.
pub const KEY_ESCAPE: u32 = 27;

// =============================================================================
// Attributes
// =============================================================================

/// Input element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputType {
    #[default]
    Text,
    Checkbox,
}

/// Recognized element attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attr {
    Class(String),
    Placeholder(String),
    /// Initial text of an uncontrolled input.
    DefaultValue(String),
    /// Initial state of an uncontrolled checkbox.
    DefaultChecked(bool),
    AutoFocus(bool),
    Type(InputType),
    Href(String),
}

impl Attr {
    /// Attribute name as it appears in markup.
    pub fn name(&self) -> &'static str {
        match self {
            Attr::Class(_) => "class",
            Attr::Placeholder(_) => "placeholder",
            Attr::DefaultValue(_) => "value",
            Attr::DefaultChecked(_) => "checked",
            Attr::AutoFocus(_) => "autofocus",
            Attr::Type(_) => "type",
            Attr::Href(_) => "href",
        }
    }

    /// Attribute value as it appears in markup.
    pub fn value(&self) -> String {
        match self {
            Attr::Class(s) | Attr::Placeholder(s) | Attr::DefaultValue(s) | Attr::Href(s) => {
                s.clone()
            }
            Attr::DefaultChecked(b) | Attr::AutoFocus(b) => b.to_string(),
            Attr::Type(InputType::Text) => "text".to_string(),
            Attr::Type(InputType::Checkbox) => "checkbox".to_string(),
        }
    }
}

// =============================================================================
// Event Kinds
// =============================================================================

bitflags::bitflags! {
    /// Interaction events an element can observe.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EventKinds: u8 {
        const CLICK = 1 << 0;
        const DOUBLE_CLICK = 1 << 1;
        const KEY_DOWN = 1 << 2;
        const INPUT = 1 << 3;
        const CHANGE = 1 << 4;
        const BLUR = 1 << 5;
    }
}

const KIND_LABELS: [(EventKinds, &str); 6] = [
    (EventKinds::CLICK, "click"),
    (EventKinds::DOUBLE_CLICK, "double_click"),
    (EventKinds::KEY_DOWN, "key_down"),
    (EventKinds::INPUT, "input"),
    (EventKinds::CHANGE, "change"),
    (EventKinds::BLUR, "blur"),
];

impl EventKinds {
    /// Name of a single kind, `"mixed"` for combinations.
    pub fn label(self) -> &'static str {
        KIND_LABELS
            .iter()
            .find(|(kind, _)| *kind == self)
            .map_or("mixed", |(_, label)| *label)
    }
}

// =============================================================================
// Payloads
// =============================================================================

/// Key press payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyInput {
    pub key_code: u32,
    pub char_code: u32,
}

impl KeyInput {
    pub fn new(key_code: u32) -> Self {
        Self {
            key_code,
            char_code: 0,
        }
    }

    /// Character code when present, key code otherwise.
    pub fn code(&self) -> u32 {
        if self.char_code != 0 {
            self.char_code
        } else {
            self.key_code
        }
    }
}

/// Text input payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValueInput {
    pub value: String,
}

/// Change payload. `checked` is only meaningful for checkboxes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChangeInput {
    pub value: String,
    pub checked: bool,
}

/// A raw interaction event delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomEvent {
    Click,
    DoubleClick,
    KeyDown(KeyInput),
    Input(ValueInput),
    Change(ChangeInput),
    Blur,
}

impl DomEvent {
    /// The discriminator of this event.
    pub fn kind(&self) -> EventKinds {
        match self {
            DomEvent::Click => EventKinds::CLICK,
            DomEvent::DoubleClick => EventKinds::DOUBLE_CLICK,
            DomEvent::KeyDown(_) => EventKinds::KEY_DOWN,
            DomEvent::Input(_) => EventKinds::INPUT,
            DomEvent::Change(_) => EventKinds::CHANGE,
            DomEvent::Blur => EventKinds::BLUR,
        }
    }
}

// =============================================================================
// Handler
// =============================================================================

/// Host-facing callback for one event kind on one element.
#[derive(Clone)]
pub struct Handler {
    kind: EventKinds,
    callback: Rc<dyn Fn(DomEvent)>,
}

impl Handler {
    pub fn new(kind: EventKinds, callback: impl Fn(DomEvent) + 'static) -> Self {
        Self {
            kind,
            callback: Rc::new(callback),
        }
    }

    pub fn kind(&self) -> EventKinds {
        self.kind
    }

    pub fn invoke(&self, event: DomEvent) {
        (self.callback)(event)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handler").field(&self.kind.label()).finish()
    }
}

// =============================================================================
// Element Config
// =============================================================================

/// Attributes and observed events of one element.
///
/// ```
/// use reckoner::{Attr, ElementConfig, EventKinds};
///
/// let config = ElementConfig::new()
///     .class("new-todo")
///     .attr(Attr::AutoFocus(true))
///     .observe(EventKinds::KEY_DOWN | EventKinds::INPUT);
/// assert!(config.events.contains(EventKinds::INPUT));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementConfig {
    pub attrs: Vec<Attr>,
    pub events: EventKinds,
}

impl ElementConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attr(mut self, attr: Attr) -> Self {
        self.attrs.push(attr);
        self
    }

    pub fn class(self, class: impl Into<String>) -> Self {
        self.attr(Attr::Class(class.into()))
    }

    pub fn observe(mut self, kinds: EventKinds) -> Self {
        self.events |= kinds;
        self
    }
}

// =============================================================================
// Element Events
// =============================================================================

/// Per-kind event streams of one element.
///
/// Every stream is pre-filtered to its kind. Asking for a kind the element
/// does not observe logs a warning and returns a stream that never fires.
#[derive(Debug, Clone)]
pub struct ElementEvents {
    raw: Event<DomEvent>,
    by_kind: Vec<(EventKinds, Event<DomEvent>)>,
}

impl ElementEvents {
    pub(crate) fn new(raw: &Event<DomEvent>, observed: EventKinds) -> Self {
        let by_kind = observed
            .iter()
            .map(|kind| (kind, raw.filter(move |event| event.kind() == kind)))
            .collect();
        Self {
            raw: raw.clone(),
            by_kind,
        }
    }

    /// All observed events, unfiltered.
    pub fn raw(&self) -> Event<DomEvent> {
        self.raw.clone()
    }

    /// Stream for one kind, if observed.
    pub fn get(&self, kind: EventKinds) -> Option<Event<DomEvent>> {
        self.by_kind
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, event)| event.clone())
    }

    pub fn observed(&self) -> EventKinds {
        self.by_kind
            .iter()
            .fold(EventKinds::empty(), |acc, (kind, _)| acc | *kind)
    }

    fn typed<U: Clone + 'static>(
        &self,
        kind: EventKinds,
        extract: impl Fn(&DomEvent) -> Option<U> + 'static,
    ) -> Event<U> {
        match self.get(kind) {
            Some(stream) => stream.filter_map(extract),
            None => {
                tracing::warn!(kind = kind.label(), "event kind was not observed");
                Event::new()
            }
        }
    }

    pub fn clicks(&self) -> Event<()> {
        self.typed(EventKinds::CLICK, |e| matches!(e, DomEvent::Click).then_some(()))
    }

    pub fn double_clicks(&self) -> Event<()> {
        self.typed(EventKinds::DOUBLE_CLICK, |e| {
            matches!(e, DomEvent::DoubleClick).then_some(())
        })
    }

    pub fn key_downs(&self) -> Event<KeyInput> {
        self.typed(EventKinds::KEY_DOWN, |e| match e {
            DomEvent::KeyDown(key) => Some(*key),
            _ => None,
        })
    }

    pub fn inputs(&self) -> Event<ValueInput> {
        self.typed(EventKinds::INPUT, |e| match e {
            DomEvent::Input(input) => Some(input.clone()),
            _ => None,
        })
    }

    pub fn changes(&self) -> Event<ChangeInput> {
        self.typed(EventKinds::CHANGE, |e| match e {
            DomEvent::Change(change) => Some(change.clone()),
            _ => None,
        })
    }

    pub fn blurs(&self) -> Event<()> {
        self.typed(EventKinds::BLUR, |e| matches!(e, DomEvent::Blur).then_some(()))
    }
}

// =============================================================================
// Tests
// =============================================================================
