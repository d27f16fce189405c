use std::collections::BTreeMap;

use foundation::ids::Generation;
use tracing::debug;

/// Handle for one asynchronous request issued under a generation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket {
    pub id: u64,
    pub generation: Generation,
}

/// What to do with a response that just arrived.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Completion {
    /// Issued under the current generation; apply it.
    Current,
    /// Issued under an older generation, or already cancelled; drop it.
    Stale,
}

/// Tracks in-flight requests and which generation is current.
///
/// Advancing the generation logically cancels everything issued before it:
/// those requests may still complete, but `complete` reports them as stale.
#[derive(Debug)]
pub struct RequestTracker<K> {
    current: Generation,
    next_id: u64,
    pending: BTreeMap<Ticket, K>,
}

impl<K> Default for RequestTracker<K> {
    fn default() -> Self {
        Self {
            current: Generation::ZERO,
            next_id: 0,
            pending: BTreeMap::new(),
        }
    }
}

impl<K> RequestTracker<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Generation {
        self.current
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        generation == self.current
    }

    /// Starts a new generation and forgets all pending requests.
    ///
    /// Returns the number of requests that were cancelled.
    pub fn advance(&mut self) -> usize {
        self.current = self.current.next();
        let cancelled = self.pending.len();
        self.pending.clear();
        if cancelled > 0 {
            debug!(generation = %self.current, cancelled, "cancelled in-flight requests");
        }
        cancelled
    }

    /// Registers a request under the current generation.
    pub fn issue(&mut self, key: K) -> Ticket {
        let ticket = Ticket {
            id: self.next_id,
            generation: self.current,
        };
        self.next_id = self.next_id.wrapping_add(1);
        self.pending.insert(ticket, key);
        ticket
    }

    /// Settles `ticket`. The key is returned only for current requests.
    pub fn complete(&mut self, ticket: Ticket) -> (Completion, Option<K>) {
        let key = self.pending.remove(&ticket);
        if ticket.generation != self.current || key.is_none() {
            return (Completion::Stale, None);
        }
        (Completion::Current, key)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
