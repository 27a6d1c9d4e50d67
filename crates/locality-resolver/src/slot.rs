//! Stale-response guard for superseded queries.
//!
//! Each logical query slot (one list on one screen) issues a ticket per
//! request. Only the response carrying the most recently issued ticket is
//! accepted, so a slow earlier request can never overwrite a newer result.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

/// Sequence number handed out by [`QuerySlot::issue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

#[derive(Debug, Default)]
pub struct QuerySlot {
    latest: AtomicU64,
}

impl QuerySlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a new ticket, superseding every earlier one.
    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    #[must_use]
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::Acquire) == ticket.0
    }

    /// Returns `value` only if `ticket` has not been superseded.
    pub fn accept<T>(&self, ticket: Ticket, value: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(value)
        } else {
            tracing::debug!(ticket = ticket.0, "discarding superseded response");
            None
        }
    }

    /// Issues a ticket now and resolves to `None` if a newer request was
    /// issued before `fut` completed.
    pub fn guard<'a, F>(&'a self, fut: F) -> impl Future<Output = Option<F::Output>> + 'a
    where
        F: Future + 'a,
    {
        let ticket = self.issue();
        async move {
            let value = fut.await;
            self.accept(ticket, value)
        }
    }
}
