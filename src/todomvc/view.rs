//! TodoMVC view.
//!
//! ```text
//! store collector ─┬─ header: draft collector ─ signal ─ input.new-todo
//!                  ├─ signal(store) ─ ul.todo-list
//!                  │     └─ per item: edit collector ─ signal(editing) ─ li
//!                  └─ env(Credits) ─ footer.info
//! ```
//!
//! Every domain event reaches the store through `collect`. The list is the
//! only subtree bound to the store, so adding or toggling a todo redraws the
//! list and leaves the header and footer alone.

use tracing::debug;

use super::model::{reduce_todos, Todo, TodoEvent};
use crate::builder::{Attr, ElementConfig, Env, EventKinds, InputType, KeyInput, Scope, KEY_ENTER, KEY_ESCAPE};
use crate::host::{self, Component};
use crate::stream::Collector;

/// The todo store.
pub type Store = Collector<Vec<Todo>, TodoEvent>;

/// Footer text, handed to the footer through the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credits {
    pub hint: String,
    pub author: String,
    pub template_label: String,
    pub template_url: String,
}

impl Default for Credits {
    fn default() -> Self {
        Self {
            hint: "Double-click to edit a todo".to_string(),
            author: "Mitch Dzugan".to_string(),
            template_label: "tastejs/todomvc-app-template".to_string(),
            template_url: "https://github.com/tastejs/todomvc-app-template".to_string(),
        }
    }
}

/// Root component of the application.
pub fn todo_app() -> Box<dyn Component> {
    host::app(Env::empty(), app)
}

/// Draw the whole application.
pub fn app(s: &mut Scope) {
    s.with_event_collector(
        |todos: &Vec<Todo>, event: &TodoEvent| reduce_todos(todos, event),
        Vec::new(),
        |store, s| {
            store
                .signal()
                .subscribe(|todos| debug!(count = todos.len(), ?todos, "store updated"));

            s.dom("div", ElementConfig::new(), |s| {
                s.dom("section", ElementConfig::new().class("todoapp"), |s| {
                    s.dom("header", ElementConfig::new().class("header"), |s| {
                        s.dom("h1", ElementConfig::new(), |s| s.text("todos"));
                        new_todo(s, store);
                    });
                    let list_store = store.clone();
                    s.with_signal(&store.signal(), move |todos, s| {
                        todo_list(s, &list_store, todos);
                    });
                });
                s.with_env(Env::new(Credits::default()), footer);
            });
        },
    );
}

/// The new-todo input. Every Enter bumps a draft counter, which redraws the
/// input empty.
fn new_todo(s: &mut Scope, store: &Store) {
    let store = store.clone();
    s.with_event_collector(
        |drafts: &u32, _: &()| drafts + 1,
        0,
        move |drafts, s| {
            let store = store.clone();
            let draft_counter = drafts.clone();
            s.with_signal(&drafts.signal(), move |_, s| {
                let input = s.element(
                    "input",
                    ElementConfig::new()
                        .class("new-todo")
                        .attr(Attr::Placeholder("What needs to be done?".into()))
                        .attr(Attr::AutoFocus(true))
                        .observe(EventKinds::KEY_DOWN | EventKinds::INPUT),
                );
                let enters = input.key_downs().map(KeyInput::code).filter(|code| *code == KEY_ENTER);
                let adds = input
                    .inputs()
                    .map(|input| input.value.clone())
                    .tag(&enters)
                    .filter_map(non_empty)
                    .map(|text| TodoEvent::Add { text: text.clone() });
                store.collect(&adds);
                draft_counter.collect(&enters.map(|_| ()));
            });
        },
    );
}

fn non_empty(sample: &Option<String>) -> Option<String> {
    sample.clone().filter(|text| !text.is_empty())
}

fn todo_list(s: &mut Scope, store: &Store, todos: &[Todo]) {
    s.dom("div", ElementConfig::new(), |s| {
        s.dom("section", ElementConfig::new().class("main"), |s| {
            s.dom("ul", ElementConfig::new().class("todo-list"), |s| {
                for (id, todo) in todos.iter().enumerate() {
                    todo_item(s, store, id, todo);
                }
            });
        });
    });
}

/// One item with its own edit-mode collector.
fn todo_item(s: &mut Scope, store: &Store, id: usize, todo: &Todo) {
    let store = store.clone();
    let todo = todo.clone();
    s.with_event_collector(
        |_: &bool, editing: &bool| *editing,
        false,
        move |edit, s| {
            let store = store.clone();
            let todo = todo.clone();
            let edit_mode = edit.clone();
            s.with_signal(&edit.signal(), move |editing, s| {
                let mut classes = Vec::new();
                if *editing {
                    classes.push("editing");
                }
                if todo.completed {
                    classes.push("completed");
                }
                let config = if classes.is_empty() {
                    ElementConfig::new()
                } else {
                    ElementConfig::new().class(classes.join(" "))
                };

                s.dom("li", config, |s| {
                    if *editing {
                        todo_editor(s, &store, &edit_mode, id, &todo);
                    } else {
                        todo_view(s, &store, &edit_mode, id, &todo);
                    }
                });
            });
        },
    );
}

fn todo_editor(
    s: &mut Scope,
    store: &Store,
    edit_mode: &Collector<bool, bool>,
    id: usize,
    todo: &Todo,
) {
    let editor = s.element(
        "input",
        ElementConfig::new()
            .class("edit")
            .attr(Attr::AutoFocus(true))
            .attr(Attr::DefaultValue(todo.text.clone()))
            .observe(EventKinds::BLUR | EventKinds::KEY_DOWN | EventKinds::CHANGE),
    );
    edit_mode.collect(&editor.blurs().map(|_| false));

    let codes = editor.key_downs().map(KeyInput::code);
    let enters = codes.filter(|code| *code == KEY_ENTER);
    edit_mode.collect(&codes.filter(|code| *code == KEY_ESCAPE).map(|_| false));

    let edits = editor
        .changes()
        .map(|change| change.value.clone())
        .tag(&enters)
        .filter_map(non_empty)
        .map(move |text| TodoEvent::Edit {
            id,
            text: text.clone(),
        });
    store.collect(&edits);
}

fn todo_view(
    s: &mut Scope,
    store: &Store,
    edit_mode: &Collector<bool, bool>,
    id: usize,
    todo: &Todo,
) {
    s.dom("div", ElementConfig::new().class("view"), |s| {
        let toggle = s.element(
            "input",
            ElementConfig::new()
                .class("toggle")
                .attr(Attr::Type(InputType::Checkbox))
                .attr(Attr::DefaultChecked(todo.completed))
                .observe(EventKinds::CHANGE),
        );
        let completed = toggle
            .changes()
            .map(|change| change.checked)
            .reduce(|_, checked| *checked, todo.completed);
        store.collect(&completed.map(move |completed| TodoEvent::SetCompleted {
            id,
            completed: *completed,
        }));

        let label = s.dom(
            "label",
            ElementConfig::new().observe(EventKinds::DOUBLE_CLICK),
            |s| s.text(todo.text.clone()),
        );
        edit_mode.collect(&label.double_clicks().map(|_| true));

        let destroy = s.element(
            "button",
            ElementConfig::new().class("destroy").observe(EventKinds::CLICK),
        );
        store.collect(&destroy.clicks().map(move |_| TodoEvent::Delete { id }));
    });
}

fn footer(s: &mut Scope) {
    let credits = s.env().get::<Credits>().cloned().unwrap_or_default();
    s.dom("footer", ElementConfig::new().class("info"), |s| {
        s.dom("p", ElementConfig::new(), |s| s.text(credits.hint.clone()));
        s.dom("p", ElementConfig::new(), |s| {
            s.text(format!("Written by {}", credits.author));
        });
        s.dom("p", ElementConfig::new(), |s| {
            s.text("Based on template at ");
            s.dom(
                "a",
                ElementConfig::new().attr(Attr::Href(credits.template_url.clone())),
                |s| s.text(credits.template_label.clone()),
            );
        });
    });
}
