//! TodoMVC in the terminal.
//!
//! ```sh
//! RECKONER_LOG=todos.log RUST_LOG=reckoner=debug cargo run --example todos
//! ```
//!
//! Logs go to the file named by `RECKONER_LOG`; the terminal belongs to the UI.

use std::fs::File;
use std::sync::Mutex;

use reckoner::todomvc::todo_app;
use reckoner::{HostError, RetainedHost, TerminalApp};
use tracing_subscriber::EnvFilter;

fn init_logging() -> std::io::Result<()> {
    let Ok(path) = std::env::var("RECKONER_LOG") else {
        return Ok(());
    };
    let file = File::create(path)?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    Ok(())
}

fn main() -> Result<(), HostError> {
    init_logging()?;
    // Panics caught at dispatch boundaries would otherwise print over the
    // alternate screen.
    std::panic::set_hook(Box::new(|info| tracing::error!("{info}")));

    let mut host = RetainedHost::new();
    host.mount(todo_app());
    TerminalApp::new(host)?.run()
}
