//! Generation counter for discarding superseded async results.
//!
//! Each request takes a [`Ticket`] from the component's [`VersionGate`]
//! before suspending. When it resumes it checks the ticket; if a newer ticket
//! was issued (or the gate was invalidated) in the meantime, the result is
//! stale and must not touch shared state.

use std::cell::Cell;

/// Proof of which generation a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    /// Monotonically increasing id, starting at 1.
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Issues tickets and answers whether a ticket is still the latest.
///
/// Single-threaded: lives on the UI task alongside the state it guards.
#[derive(Debug, Default)]
pub struct VersionGate {
    generation: Cell<u64>,
}

impl VersionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new generation, superseding every earlier ticket.
    pub fn issue(&self) -> Ticket {
        let next = self.generation.get() + 1;
        self.generation.set(next);
        Ticket(next)
    }

    /// Supersede every outstanding ticket without starting a request.
    pub fn invalidate(&self) {
        self.generation.set(self.generation.get() + 1);
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.generation.get() == ticket.0
    }

    pub fn generation(&self) -> u64 {
        self.generation.get()
    }
}
