//! Terminal front end for a [`RetainedHost`].
//!
//! [`layout`] flattens the retained tree into styled lines. [`TerminalApp`]
//! owns the host and a focus, turns crossterm key events into raw
//! interaction events on the focused element and redraws after every key.
//!
//! # Key Map
//!
//! | Key                | Effect                                          |
//! |--------------------|-------------------------------------------------|
//! | Tab / Down         | focus next interactive element (blurs current) |
//! | Shift-Tab / Up     | focus previous interactive element              |
//! | characters, Bksp   | edit the focused text input                     |
//! | Space              | toggle the focused checkbox                     |
//! | Enter              | key code 13, else click, else double-click      |
//! | Esc                | key code 27                                     |
//! | Ctrl-C             | quit                                            |

use std::io::{self, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{execute, queue};
use tracing::{info, trace};

use super::retained::{HostElement, HostNode, NodeId, RetainedHost};
use crate::builder::{EventKinds, KEY_ENTER, KEY_ESCAPE};
use crate::error::HostError;

/// Tags that start and end their own line.
const BLOCK_TAGS: &[&str] = &["div", "section", "header", "footer", "ul", "li", "p", "h1"];

/// Columns of indent per list level.
const INDENT: usize = 2;

const STATUS: &str = "tab/shift-tab: move  enter: activate  space: toggle  esc: cancel  ctrl-c: quit";

// =============================================================================
// Layout
// =============================================================================

/// A run of text with one style.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub focused: bool,
    pub struck: bool,
}

/// One screen line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    pub indent: usize,
    pub segments: Vec<Segment>,
}

impl Line {
    /// Plain text of the line, segments separated by a space.
    pub fn text(&self) -> String {
        let body: Vec<&str> = self.segments.iter().map(|s| s.text.as_str()).collect();
        format!("{}{}", " ".repeat(self.indent), body.join(" "))
    }

    pub fn is_focused(&self) -> bool {
        self.segments.iter().any(|s| s.focused)
    }
}

struct Layout<'a> {
    host: &'a RetainedHost,
    focus: Option<NodeId>,
    lines: Vec<Line>,
    current: Line,
    depth: usize,
    struck: bool,
    /// The current line holds only a list bullet, so a nested block
    /// continues it instead of breaking.
    bullet_pending: bool,
}

impl<'a> Layout<'a> {
    fn push(&mut self, text: String, focused: bool) {
        if text.is_empty() {
            return;
        }
        if self.current.segments.is_empty() {
            self.current.indent = INDENT * self.depth;
        }
        self.bullet_pending = false;
        self.current.segments.push(Segment {
            text,
            focused,
            struck: self.struck,
        });
    }

    fn break_line(&mut self) {
        if self.bullet_pending {
            return;
        }
        if !self.current.segments.is_empty() {
            self.lines.push(std::mem::take(&mut self.current));
        }
    }

    fn visit(&mut self, id: NodeId, focused: bool) {
        let host = self.host;
        match host.node(id) {
            Some(HostNode::Text(text)) => self.push(text.trim().to_string(), focused),
            Some(HostNode::Component(component)) => {
                for child in component.children() {
                    self.visit(*child, focused);
                }
            }
            Some(HostNode::Element(element)) => self.visit_element(id, element, focused),
            None => {}
        }
    }

    fn visit_element(&mut self, id: NodeId, element: &'a HostElement, focused: bool) {
        let focused = focused || self.focus == Some(id);
        let block = BLOCK_TAGS.contains(&element.tag());
        let outer_struck = self.struck;
        if block {
            self.break_line();
        }

        match element.tag() {
            "input" if element.is_checkbox() => {
                let mark = if element.checked() { "[x]" } else { "[ ]" };
                self.push(mark.to_string(), focused);
            }
            "input" => self.push(format!("[{}]", element.value()), focused),
            "button" => {
                let label = self.host.text_content(id);
                let label = if label.is_empty() { "delete".to_string() } else { label };
                self.push(format!("[{label}]"), focused);
            }
            tag => {
                if tag == "ul" {
                    self.depth += 1;
                }
                if tag == "li" {
                    self.push("-".to_string(), false);
                    self.bullet_pending = true;
                    self.struck |= element.has_class("completed");
                }
                for child in element.children() {
                    self.visit(*child, focused);
                }
                if tag == "ul" {
                    self.depth -= 1;
                }
                if tag == "li" {
                    self.bullet_pending = false;
                }
            }
        }

        self.struck = outer_struck;
        if block {
            self.break_line();
        }
    }
}

/// Flatten the host's tree into lines. `focus` marks the segments drawn by
/// that element.
pub fn layout(host: &RetainedHost, focus: Option<NodeId>) -> Vec<Line> {
    let mut layout = Layout {
        host,
        focus,
        lines: Vec::new(),
        current: Line::default(),
        depth: 0,
        struck: false,
        bullet_pending: false,
    };
    for root in host.roots() {
        layout.visit(*root, false);
    }
    layout.break_line();
    layout.lines
}

// =============================================================================
// Terminal Guard
// =============================================================================

/// Raw mode plus alternate screen for as long as it lives.
struct TerminalGuard;

impl TerminalGuard {
    fn enter(out: &mut impl Write) -> io::Result<Self> {
        enable_raw_mode()?;
        execute!(out, EnterAlternateScreen, Hide)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

// =============================================================================
// Terminal App
// =============================================================================

/// A retained host driven from the keyboard.
pub struct TerminalApp {
    host: RetainedHost,
    focus: Option<NodeId>,
    quit: bool,
}

impl TerminalApp {
    /// Take over a mounted host and settle its initial focus.
    pub fn new(host: RetainedHost) -> Result<Self, HostError> {
        let mut app = Self {
            host,
            focus: None,
            quit: false,
        };
        app.settle()?;
        Ok(app)
    }

    pub fn host(&self) -> &RetainedHost {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut RetainedHost {
        &mut self.host
    }

    pub fn focus(&self) -> Option<NodeId> {
        self.focus
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn lines(&self) -> Vec<Line> {
        layout(&self.host, self.focus)
    }

    fn focused_element(&self) -> Option<&HostElement> {
        self.focus.and_then(|id| self.host.get_element(id))
    }

    /// Flush pending re-renders, then move focus to a new autofocus element
    /// or off a dead one.
    fn settle(&mut self) -> Result<(), HostError> {
        self.host.flush()?;
        if let Some(id) = self.host.take_autofocus() {
            self.focus = Some(id);
            return Ok(());
        }
        let alive = self
            .focused_element()
            .is_some_and(|element| !element.observed().is_empty());
        if !alive {
            self.focus = self.host.interactive_elements().first().copied();
        }
        Ok(())
    }

    fn move_focus(&mut self, forward: bool) -> Result<(), HostError> {
        let items = self.host.interactive_elements();
        if items.is_empty() {
            self.focus = None;
            return Ok(());
        }
        let len = items.len();
        let next = match self.focus.and_then(|f| items.iter().position(|id| *id == f)) {
            Some(i) if forward => (i + 1) % len,
            Some(i) => (i + len - 1) % len,
            None if forward => 0,
            None => len - 1,
        };

        if let Some(old) = self.focus {
            if self
                .focused_element()
                .is_some_and(|element| element.observes(EventKinds::BLUR))
            {
                self.host.blur(old)?;
            }
        }
        self.focus = Some(items[next]);
        Ok(())
    }

    fn activate(&mut self) -> Result<(), HostError> {
        let Some(id) = self.focus else {
            return Ok(());
        };
        let observed = self.host.get_element(id).map(HostElement::observed).unwrap_or_default();
        if observed.contains(EventKinds::KEY_DOWN) {
            self.host.key_down(id, KEY_ENTER)
        } else if observed.contains(EventKinds::CLICK) {
            self.host.click(id)
        } else if observed.contains(EventKinds::DOUBLE_CLICK) {
            self.host.double_click(id)
        } else {
            Ok(())
        }
    }

    fn send_key(&mut self, key_code: u32) -> Result<(), HostError> {
        match self.focus {
            Some(id)
                if self
                    .focused_element()
                    .is_some_and(|element| element.observes(EventKinds::KEY_DOWN)) =>
            {
                self.host.key_down(id, key_code)
            }
            _ => Ok(()),
        }
    }

    fn edit_text(&mut self, edit: impl FnOnce(&mut String)) -> Result<(), HostError> {
        let Some(id) = self.focus else {
            return Ok(());
        };
        let Some(element) = self.focused_element().filter(|e| e.is_text_input()) else {
            return Ok(());
        };
        let mut value = element.value().to_string();
        edit(&mut value);
        self.host.set_input_value(id, &value)
    }

    fn toggle(&mut self) -> Result<(), HostError> {
        match self.focus {
            Some(id) => self.host.toggle_checkbox(id),
            None => Ok(()),
        }
    }

    /// Apply one key press, then flush and settle focus.
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<(), HostError> {
        if key.kind == KeyEventKind::Release {
            return Ok(());
        }
        trace!(code = ?key.code, "key");
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let on_checkbox = self.focused_element().is_some_and(HostElement::is_checkbox);

        match key.code {
            KeyCode::Char('c') if ctrl => {
                self.quit = true;
                return Ok(());
            }
            KeyCode::Tab | KeyCode::Down => self.move_focus(true)?,
            KeyCode::BackTab | KeyCode::Up => self.move_focus(false)?,
            KeyCode::Enter => self.activate()?,
            KeyCode::Esc => self.send_key(KEY_ESCAPE)?,
            KeyCode::Char(' ') if on_checkbox => self.toggle()?,
            KeyCode::Char(c) => self.edit_text(|value| value.push(c))?,
            KeyCode::Backspace => self.edit_text(|value| {
                value.pop();
            })?,
            _ => return Ok(()),
        }
        self.settle()
    }

    /// Draw the current tree and a status line.
    pub fn draw(&self, out: &mut impl Write) -> io::Result<()> {
        queue!(out, MoveTo(0, 0), Clear(ClearType::All))?;
        let lines = self.lines();
        for (row, line) in lines.iter().enumerate() {
            let row = u16::try_from(row).unwrap_or(u16::MAX);
            let column = u16::try_from(line.indent).unwrap_or(u16::MAX);
            queue!(out, MoveTo(column, row))?;
            for (i, segment) in line.segments.iter().enumerate() {
                if i > 0 {
                    queue!(out, Print(' '))?;
                }
                if segment.focused {
                    queue!(out, SetAttribute(Attribute::Reverse))?;
                }
                if segment.struck {
                    queue!(out, SetAttribute(Attribute::CrossedOut))?;
                }
                queue!(out, Print(&segment.text), SetAttribute(Attribute::Reset))?;
            }
        }
        let status_row = u16::try_from(lines.len() + 1).unwrap_or(u16::MAX);
        queue!(
            out,
            MoveTo(0, status_row),
            SetAttribute(Attribute::Dim),
            Print(STATUS),
            SetAttribute(Attribute::Reset)
        )?;
        out.flush()
    }

    /// Run a blocking key loop on the real terminal until Ctrl-C. The
    /// terminal is restored on exit, including error exits.
    pub fn run(mut self) -> Result<(), HostError> {
        let mut stdout = io::stdout();
        let _guard = TerminalGuard::enter(&mut stdout)?;
        info!("terminal session started");

        while !self.quit {
            self.draw(&mut stdout)?;
            if let CrosstermEvent::Key(key) = event::read()? {
                self.handle_key(key)?;
            }
        }

        self.host.teardown();
        info!("terminal session ended");
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{Attr, ElementConfig, Env};
    use crate::host::app;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut TerminalApp, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c))).unwrap();
        }
    }

    /// A list with an entry field. Entries starting with `x` are completed,
    /// the clear button empties the list.
    fn list_app() -> TerminalApp {
        let mut host = RetainedHost::new();
        host.mount(app(Env::empty(), |s| {
            s.with_event_collector(
                |items: &Vec<String>, entry: &String| {
                    if entry.is_empty() {
                        Vec::new()
                    } else {
                        let mut next = vec![entry.clone()];
                        next.extend(items.iter().cloned());
                        next
                    }
                },
                Vec::new(),
                |store, s| {
                    s.dom("h1", ElementConfig::new(), |s| s.text("list"));
                    let entry = s.element(
                        "input",
                        ElementConfig::new()
                            .class("entry")
                            .attr(Attr::AutoFocus(true))
                            .observe(EventKinds::KEY_DOWN | EventKinds::INPUT),
                    );
                    let enters = entry.key_downs().filter(|k| k.code() == KEY_ENTER);
                    store.collect(
                        &entry
                            .inputs()
                            .map(|i| i.value.clone())
                            .tag(&enters)
                            .filter_map(|v| v.clone().filter(|v| !v.is_empty())),
                    );
                    let clear = s.dom(
                        "button",
                        ElementConfig::new().class("clear").observe(EventKinds::CLICK),
                        |s| s.text("clear"),
                    );
                    store.collect(&clear.clicks().map(|_| String::new()));

                    s.with_signal(&store.signal(), |items, s| {
                        s.dom("ul", ElementConfig::new(), |s| {
                            for item in items {
                                let config = if item.starts_with('x') {
                                    ElementConfig::new().class("completed")
                                } else {
                                    ElementConfig::new()
                                };
                                s.dom("li", config, |s| s.text(item.clone()));
                            }
                        });
                    });
                },
            );
        }));
        TerminalApp::new(host).unwrap()
    }

    fn texts(app: &TerminalApp) -> Vec<String> {
        app.lines().iter().map(Line::text).collect()
    }

    #[test]
    fn test_initial_layout_and_autofocus() {
        let app = list_app();
        assert_eq!(texts(&app), vec!["list", "[] [clear]"]);

        let entry = app.host().find_by_class("entry");
        assert_eq!(app.focus(), entry);
        assert!(!app.lines()[0].is_focused());
        assert!(app.lines()[1].segments[0].focused);
        assert!(!app.lines()[1].segments[1].focused);
    }

    #[test]
    fn test_typing_and_enter_add_items() {
        let mut app = list_app();
        type_text(&mut app, "milk");
        app.handle_key(key(KeyCode::Enter)).unwrap();

        assert_eq!(texts(&app), vec!["list", "[milk] [clear]", "  - milk"]);

        for _ in 0..4 {
            app.handle_key(key(KeyCode::Backspace)).unwrap();
        }
        type_text(&mut app, "xo");
        app.handle_key(key(KeyCode::Enter)).unwrap();

        let lines = app.lines();
        assert_eq!(lines[2].text(), "  - xo");
        assert!(!lines[2].segments[0].struck);
        assert!(lines[2].segments[1].struck);
        assert!(!lines[3].segments[1].struck);
    }

    #[test]
    fn test_tab_moves_focus_and_enter_clicks() {
        let mut app = list_app();
        type_text(&mut app, "tea");
        app.handle_key(key(KeyCode::Enter)).unwrap();
        assert_eq!(app.host().find_all_by_class("completed").len(), 0);
        assert_eq!(app.lines().len(), 3);

        app.handle_key(key(KeyCode::Tab)).unwrap();
        assert_eq!(app.focus(), app.host().find_by_class("clear"));

        app.handle_key(key(KeyCode::Enter)).unwrap();
        assert_eq!(texts(&app), vec!["list", "[tea] [clear]"]);

        app.handle_key(key(KeyCode::BackTab)).unwrap();
        assert_eq!(app.focus(), app.host().find_by_class("entry"));
    }

    #[test]
    fn test_ctrl_c_quits() {
        let mut app = list_app();
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL))
            .unwrap();
        assert!(app.should_quit());
    }

    #[test]
    fn test_draw_writes_lines_and_status() {
        let app = list_app();
        let mut out = Vec::new();
        app.draw(&mut out).unwrap();

        let written = String::from_utf8_lossy(&out);
        assert!(written.contains("list"));
        assert!(written.contains("[clear]"));
        assert!(written.contains(STATUS));
    }

    #[test]
    fn test_checkbox_and_button_marks() {
        let mut host = RetainedHost::new();
        host.mount(app(Env::empty(), |s| {
            s.dom("p", ElementConfig::new(), |s| {
                s.element(
                    "input",
                    ElementConfig::new()
                        .attr(Attr::Type(crate::builder::InputType::Checkbox))
                        .attr(Attr::DefaultChecked(true))
                        .observe(EventKinds::CHANGE),
                );
                s.element("button", ElementConfig::new().observe(EventKinds::CLICK));
            });
        }));
        let mut app = TerminalApp::new(host).unwrap();
        assert_eq!(texts(&app), vec!["[x] [delete]"]);

        app.handle_key(key(KeyCode::Char(' '))).unwrap();
        assert_eq!(texts(&app), vec!["[ ] [delete]"]);
    }

    #[test]
    fn test_list_item_keeps_bullet_before_block_child() {
        let mut host = RetainedHost::new();
        host.mount(app(Env::empty(), |s| {
            s.dom("ul", ElementConfig::new(), |s| {
                s.dom("li", ElementConfig::new().class("completed"), |s| {
                    s.dom("div", ElementConfig::new().class("view"), |s| {
                        s.dom("label", ElementConfig::new(), |s| s.text("first"));
                    });
                });
                s.dom("li", ElementConfig::new(), |s| {
                    s.dom("div", ElementConfig::new(), |s| s.text("second"));
                    s.dom("p", ElementConfig::new(), |s| s.text("below"));
                });
                s.dom("li", ElementConfig::new(), |_| {});
            });
        }));

        let lines = layout(&host, None);
        let texts: Vec<String> = lines.iter().map(Line::text).collect();
        assert_eq!(texts, vec!["  - first", "  - second", "  below", "  -"]);
        assert!(!lines[0].segments[0].struck);
        assert!(lines[0].segments[1].struck);
    }
}
