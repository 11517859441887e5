//! Todo list state and its reducer.

/// One todo item.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Todo {
    pub text: String,
    pub completed: bool,
}

impl Todo {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            completed: false,
        }
    }
}

/// Domain events folded into the store. `id` is the item's index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoEvent {
    Add { text: String },
    Delete { id: usize },
    Edit { id: usize, text: String },
    SetCompleted { id: usize, completed: bool },
}

/// Apply one event. An index past the end leaves the list unchanged.
pub fn reduce_todos(todos: &[Todo], event: &TodoEvent) -> Vec<Todo> {
    match event {
        TodoEvent::Add { text } => std::iter::once(Todo::new(text.clone()))
            .chain(todos.iter().cloned())
            .collect(),
        TodoEvent::Delete { id } => todos
            .iter()
            .enumerate()
            .filter(|(index, _)| index != id)
            .map(|(_, todo)| todo.clone())
            .collect(),
        TodoEvent::Edit { id, text } => update_at(todos, *id, |todo| todo.text = text.clone()),
        TodoEvent::SetCompleted { id, completed } => {
            update_at(todos, *id, |todo| todo.completed = *completed)
        }
    }
}

fn update_at(todos: &[Todo], id: usize, update: impl FnOnce(&mut Todo)) -> Vec<Todo> {
    let mut next = todos.to_vec();
    if let Some(todo) = next.get_mut(id) {
        update(todo);
    }
    next
}
