#![forbid(unsafe_code)]

//! Staleness guard for deferred work.
//!
//! Each deferred normalization takes a [`Ticket`]. Starting newer work, or
//! applying a state synchronously, advances the sequence so that older
//! tickets stop matching. A result is applied only if its ticket is still
//! current; otherwise it is dropped. The in-flight work itself is never
//! aborted.

/// Sequence tag carried by a deferred result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    #[must_use]
    pub fn seq(self) -> u64 {
        self.0
    }
}

/// Monotonic ticket issuer. Last writer wins.
#[derive(Debug, Default, Clone)]
pub struct Freshness {
    latest: u64,
    pending: bool,
}

impl Freshness {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start deferred work, superseding any in flight.
    pub fn begin(&mut self) -> Ticket {
        self.latest += 1;
        self.pending = true;
        Ticket(self.latest)
    }

    /// Supersede any in-flight work without starting new work.
    pub fn invalidate(&mut self) {
        self.latest += 1;
        self.pending = false;
    }

    /// Whether `ticket` belongs to the most recent request.
    #[must_use]
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.pending && ticket.0 == self.latest
    }

    /// Accept the result for `ticket` if it is current.
    ///
    /// Returns `false` for stale tickets. A current ticket is consumed, so a
    /// duplicate delivery is also rejected.
    pub fn settle(&mut self, ticket: Ticket) -> bool {
        if self.is_current(ticket) {
            self.pending = false;
            true
        } else {
            false
        }
    }

    /// Whether a request is outstanding.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_ticket_wins() {
        let mut f = Freshness::new();
        let first = f.begin();
        let second = f.begin();

        assert!(!f.is_current(first));
        assert!(f.settle(second));
        assert!(!f.settle(first));
    }

    #[test]
    fn invalidate_discards_in_flight() {
        let mut f = Freshness::new();
        let t = f.begin();
        f.invalidate();

        assert!(!f.is_pending());
        assert!(!f.settle(t));
    }

    #[test]
    fn settle_consumes_ticket() {
        let mut f = Freshness::new();
        let t = f.begin();

        assert!(f.settle(t));
        assert!(!f.settle(t));
        assert!(!f.is_pending());
    }

    #[test]
    fn tickets_increase() {
        let mut f = Freshness::new();
        let a = f.begin();
        f.invalidate();
        let b = f.begin();
        assert!(b > a);
        assert_eq!(b.seq(), a.seq() + 2);
    }
}
