// Per-navigation timeout bookkeeping - pure logic, no Tauri imports.
// Renderers without a native request timeout arm one of these per load and
// report a timeout only if that exact navigation is still outstanding.

use std::sync::atomic::{AtomicU64, Ordering};

const NONE: u64 = 0;

#[derive(Debug, Default)]
pub struct NavigationDeadline {
    next: AtomicU64,
    pending: AtomicU64,
}

impl NavigationDeadline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a new navigation as outstanding and returns its ticket.
    /// Any earlier ticket stops being able to expire.
    pub fn arm(&self) -> u64 {
        let ticket = self.next.fetch_add(1, Ordering::AcqRel) + 1;
        self.pending.store(ticket, Ordering::Release);
        ticket
    }

    /// Arms a ticket and runs `start`. If `start` fails the navigation never
    /// began, so its ticket is withdrawn again.
    pub fn arm_with<E>(&self, start: impl FnOnce() -> Result<(), E>) -> Result<u64, E> {
        let ticket = self.arm();
        if let Err(e) = start() {
            self.expire(ticket);
            return Err(e);
        }
        Ok(ticket)
    }

    /// The outstanding navigation finished, one way or another.
    pub fn settle(&self) {
        self.pending.store(NONE, Ordering::Release);
    }

    /// Returns true exactly once, and only if `ticket` is still outstanding.
    pub fn expire(&self, ticket: u64) -> bool {
        self.pending
            .compare_exchange(ticket, NONE, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}
