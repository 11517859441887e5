//! Fault isolation and reporting.
//!
//! Every subscriber call made by [`Event::fire`](super::Event::fire) runs
//! behind `catch_unwind`. A panic turns into a [`Fault`] and delivery carries
//! on with the next subscriber. Fallible combinators report rejections the
//! same way.
//!
//! Faults go to three places:
//! - `tracing::error!`
//! - the thread-local handler installed with [`set_fault_handler`]
//! - every journal opened by an in-flight `try_fire`

use std::any::Any;
use std::cell::RefCell;
use std::panic;
use std::rc::Rc;

use thiserror::Error;

use super::event::EventId;
use crate::config::{config, FaultPolicy};

/// A failure raised while delivering a value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// A subscriber panicked.
    #[error("subscriber of event {event} panicked: {message}")]
    Panicked { event: EventId, message: String },

    /// A fallible combinator returned an error.
    #[error("event {event} rejected a value: {message}")]
    Rejected { event: EventId, message: String },
}

impl Fault {
    /// The event whose dispatch raised the fault.
    pub fn event(&self) -> EventId {
        match self {
            Fault::Panicked { event, .. } | Fault::Rejected { event, .. } => *event,
        }
    }

    /// Human readable cause.
    pub fn message(&self) -> &str {
        match self {
            Fault::Panicked { message, .. } | Fault::Rejected { message, .. } => message,
        }
    }
}

/// Fault handler callback.
pub type FaultHandler = Rc<dyn Fn(&Fault)>;

// =============================================================================
// State
// =============================================================================

thread_local! {
    static HANDLER: RefCell<Option<FaultHandler>> = const { RefCell::new(None) };

    /// One frame per in-flight `try_fire`, innermost last.
    static JOURNALS: RefCell<Vec<Vec<Fault>>> = const { RefCell::new(Vec::new()) };
}

/// Install a handler that sees every fault reported on this thread.
pub fn set_fault_handler(handler: impl Fn(&Fault) + 'static) {
    HANDLER.with(|h| *h.borrow_mut() = Some(Rc::new(handler)));
}

/// Remove the fault handler.
pub fn clear_fault_handler() {
    HANDLER.with(|h| *h.borrow_mut() = None);
}

// =============================================================================
// Reporting
// =============================================================================

/// Report a fault.
pub fn report(fault: Fault) {
    tracing::error!(event = %fault.event(), "{fault}");

    JOURNALS.with(|journals| {
        for frame in journals.borrow_mut().iter_mut() {
            frame.push(fault.clone());
        }
    });

    // Clone out so the handler may install another one.
    let handler = HANDLER.with(|h| h.borrow().clone());
    if let Some(handler) = handler {
        handler(&fault);
    }
}

/// Handle a panic payload caught at a dispatch boundary.
///
/// Under [`FaultPolicy::Propagate`] this resumes unwinding and never returns.
pub(crate) fn panicked(event: EventId, payload: Box<dyn Any + Send>) {
    if config().fault_policy == FaultPolicy::Propagate {
        panic::resume_unwind(payload);
    }
    report(Fault::Panicked {
        event,
        message: panic_message(payload.as_ref()),
    });
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

// =============================================================================
// Journal
// =============================================================================

/// Collects the faults reported while it is open.
///
/// The frame is popped on drop, so an unwinding `fire` cannot leave a stale
/// journal behind.
pub(crate) struct Journal {
    depth: usize,
    closed: bool,
}

impl Journal {
    pub(crate) fn open() -> Self {
        let depth = JOURNALS.with(|journals| {
            let mut journals = journals.borrow_mut();
            journals.push(Vec::new());
            journals.len()
        });
        Self { depth, closed: false }
    }

    pub(crate) fn close(mut self) -> Vec<Fault> {
        self.closed = true;
        self.pop()
    }

    fn pop(&self) -> Vec<Fault> {
        JOURNALS.with(|journals| {
            let mut journals = journals.borrow_mut();
            journals.truncate(self.depth);
            journals.pop().unwrap_or_default()
        })
    }
}

impl Drop for Journal {
    fn drop(&mut self) {
        if !self.closed {
            self.pop();
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
