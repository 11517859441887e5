//! Error types.

use thiserror::Error;

use crate::host::NodeId;
use crate::stream::{EventId, Fault};

/// Returned by [`Event::try_fire`](crate::Event::try_fire) when any subscriber
/// in the synchronous dispatch tree faulted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FireError {
    #[error("{} fault(s) while firing event {event}", faults.len())]
    Faulted {
        /// The event `try_fire` was called on.
        event: EventId,
        /// Every fault reported during the fire, in report order.
        faults: Vec<Fault>,
    },
}

impl FireError {
    /// The faults carried by this error.
    pub fn faults(&self) -> &[Fault] {
        match self {
            FireError::Faulted { faults, .. } => faults,
        }
    }
}

/// Errors raised by the hosts.
#[derive(Error, Debug)]
pub enum HostError {
    /// No live node has this id.
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    /// The node exists but cannot receive interaction events.
    #[error("node {0} is not an element")]
    NotAnElement(NodeId),

    /// Re-renders kept requesting more re-renders.
    #[error("render loop: still dirty after {passes} flush passes")]
    RenderLoop { passes: usize },

    /// Terminal I/O failed.
    #[error("terminal i/o: {0}")]
    Io(#[from] std::io::Error),
}
