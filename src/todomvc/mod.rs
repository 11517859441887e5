//! TodoMVC on the reactive core.
//!
//! - [`model`] - `Todo`, `TodoEvent` and the pure reducer
//! - [`view`] - the drawing functions and the root component

pub mod model;
pub mod view;

pub use model::{reduce_todos, Todo, TodoEvent};
pub use view::{app, todo_app, Credits, Store};
