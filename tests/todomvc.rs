//! TodoMVC end to end: reducer cases, a full session on the retained host and
//! the same session driven through terminal key presses.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use reckoner::todomvc::{reduce_todos, todo_app, Todo, TodoEvent};
use reckoner::{NodeId, RetainedHost, TerminalApp, KEY_ENTER, KEY_ESCAPE};

fn mounted() -> RetainedHost {
    let mut host = RetainedHost::new();
    host.mount(todo_app());
    host
}

fn labels(host: &RetainedHost) -> Vec<NodeId> {
    host.document_order()
        .into_iter()
        .filter(|id| host.get_element(*id).is_some_and(|e| e.tag() == "label"))
        .collect()
}

fn label_texts(host: &RetainedHost) -> Vec<String> {
    labels(host)
        .into_iter()
        .map(|id| host.text_content(id))
        .collect()
}

fn add_todo(host: &mut RetainedHost, text: &str) {
    let input = host.find_by_class("new-todo").unwrap();
    host.set_input_value(input, text).unwrap();
    host.key_down(input, KEY_ENTER).unwrap();
    host.flush().unwrap();
}

// =============================================================================
// Reducer
// =============================================================================

#[test]
fn test_reducer_cases() {
    let added = reduce_todos(&[], &TodoEvent::Add { text: "Buy milk".into() });
    assert_eq!(
        added,
        vec![Todo {
            text: "Buy milk".into(),
            completed: false
        }]
    );

    let two = vec![Todo::new("A"), Todo::new("B")];
    assert_eq!(
        reduce_todos(&two, &TodoEvent::Delete { id: 0 }),
        vec![Todo::new("B")]
    );

    let toggled = reduce_todos(
        &two,
        &TodoEvent::SetCompleted {
            id: 0,
            completed: true,
        },
    );
    assert!(toggled[0].completed);
    assert_eq!(toggled[1], two[1]);
}

// =============================================================================
// Retained Host Session
// =============================================================================

#[test]
fn test_add_prepends_and_clears_input() {
    let mut host = mounted();
    add_todo(&mut host, "Buy milk");
    add_todo(&mut host, "Walk dog");

    assert_eq!(label_texts(&host), vec!["Walk dog", "Buy milk"]);

    let input = host.find_by_class("new-todo").unwrap();
    assert_eq!(host.get_element(input).map(|e| e.value()), Some(""));
    assert_eq!(host.take_autofocus(), Some(input));
}

#[test]
fn test_full_session() {
    let mut host = mounted();
    add_todo(&mut host, "Buy milk");
    add_todo(&mut host, "Walk dog");

    // toggle "Buy milk"
    let toggles = host.find_all_by_class("toggle");
    assert_eq!(toggles.len(), 2);
    host.toggle_checkbox(toggles[1]).unwrap();
    host.flush().unwrap();

    let completed = host.find_all_by_class("completed");
    assert_eq!(completed.len(), 1);
    assert_eq!(host.text_content(completed[0]), "Buy milk");

    // edit "Walk dog"
    host.double_click(labels(&host)[0]).unwrap();
    host.flush().unwrap();

    let editor = host.find_by_class("edit").unwrap();
    assert!(host.find_by_class("editing").is_some());
    assert_eq!(host.get_element(editor).map(|e| e.value()), Some("Walk dog"));

    host.set_input_value(editor, "Walk cat").unwrap();
    host.key_down(editor, KEY_ENTER).unwrap();
    host.flush().unwrap();

    assert!(host.find_by_class("edit").is_none());
    assert_eq!(label_texts(&host), vec!["Walk cat", "Buy milk"]);

    // escape leaves edit mode without committing
    host.double_click(labels(&host)[0]).unwrap();
    host.flush().unwrap();
    let editor = host.find_by_class("edit").unwrap();
    host.set_input_value(editor, "discarded").unwrap();
    host.key_down(editor, KEY_ESCAPE).unwrap();
    host.flush().unwrap();

    assert!(host.find_by_class("edit").is_none());
    assert_eq!(label_texts(&host), vec!["Walk cat", "Buy milk"]);

    // delete "Walk cat"
    let destroy = host.find_all_by_class("destroy");
    host.click(destroy[0]).unwrap();
    host.flush().unwrap();

    assert_eq!(label_texts(&host), vec!["Buy milk"]);
    assert!(host.markup().contains(concat!(
        r#"<ul class="todo-list">"#,
        r#"<li class="completed"><div class="view">"#,
        r#"<input class="toggle" type="checkbox" checked/>"#,
        r#"<label>Buy milk</label>"#,
        r#"<button class="destroy"></button>"#,
        r#"</div></li></ul>"#,
    )));
}

#[test]
fn test_blur_leaves_edit_mode() {
    let mut host = mounted();
    add_todo(&mut host, "Read");

    host.double_click(labels(&host)[0]).unwrap();
    host.flush().unwrap();
    let editor = host.find_by_class("edit").unwrap();

    host.blur(editor).unwrap();
    host.flush().unwrap();

    assert!(host.find_by_class("edit").is_none());
    assert_eq!(label_texts(&host), vec!["Read"]);
}

#[test]
fn test_rerenders_release_old_components() {
    let mut host = mounted();
    let baseline = host.component_count();

    add_todo(&mut host, "one");
    add_todo(&mut host, "two");
    // each item adds an edit collector and its signal
    assert_eq!(host.component_count(), baseline + 4);

    for _ in 0..2 {
        let destroy = host.find_by_class("destroy").unwrap();
        host.click(destroy).unwrap();
        host.flush().unwrap();
    }
    assert_eq!(label_texts(&host), Vec::<String>::new());
    assert_eq!(host.component_count(), baseline);
}

#[test]
fn test_teardown() {
    let mut host = mounted();
    add_todo(&mut host, "gone");
    host.teardown();
    assert_eq!(host.node_count(), 0);
    assert_eq!(host.markup(), "");
}

// =============================================================================
// Terminal Session
// =============================================================================

fn press(app: &mut TerminalApp, code: KeyCode) {
    app.handle_key(KeyEvent::new(code, KeyModifiers::NONE)).unwrap();
}

fn type_text(app: &mut TerminalApp, text: &str) {
    for c in text.chars() {
        press(app, KeyCode::Char(c));
    }
}

fn screen(app: &TerminalApp) -> Vec<String> {
    app.lines().iter().map(|line| line.text()).collect()
}

#[test]
fn test_terminal_session() {
    let mut app = TerminalApp::new(mounted()).unwrap();
    assert_eq!(app.focus(), app.host().find_by_class("new-todo"));
    assert_eq!(
        screen(&app),
        vec![
            "todos",
            "[]",
            "Double-click to edit a todo",
            "Written by Mitch Dzugan",
            "Based on template at tastejs/todomvc-app-template",
        ]
    );

    type_text(&mut app, "Buy milk");
    press(&mut app, KeyCode::Enter);
    assert_eq!(screen(&app)[1], "[]");
    assert_eq!(screen(&app)[2], "  - [ ] Buy milk [delete]");
    assert_eq!(app.focus(), app.host().find_by_class("new-todo"));

    // toggle: focus the checkbox and press space
    press(&mut app, KeyCode::Tab);
    assert_eq!(app.focus(), app.host().find_by_class("toggle"));
    press(&mut app, KeyCode::Char(' '));

    let line = &app.lines()[2];
    assert_eq!(line.text(), "  - [x] Buy milk [delete]");
    assert!(line.segments[1..].iter().all(|segment| segment.struck));

    // edit: focus the label, enter starts editing, type, enter commits
    press(&mut app, KeyCode::Tab);
    press(&mut app, KeyCode::Tab);
    assert_eq!(app.focus(), labels(app.host()).first().copied());
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.focus(), app.host().find_by_class("edit"));
    assert_eq!(screen(&app)[2], "  - [Buy milk]");

    type_text(&mut app, " now");
    press(&mut app, KeyCode::Enter);
    assert_eq!(screen(&app)[2], "  - [x] Buy milk now [delete]");

    // delete: the destroy button is the last interactive element
    press(&mut app, KeyCode::BackTab);
    assert_eq!(app.focus(), app.host().find_by_class("destroy"));
    press(&mut app, KeyCode::Enter);
    assert_eq!(label_texts(app.host()), Vec::<String>::new());
    assert_eq!(screen(&app).len(), 5);
}
