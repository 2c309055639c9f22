//! Debounce and supersession for calls to external services.
//!
//! Time is passed in by the caller so behaviour is deterministic under test.

use std::time::{Duration, Instant};

/// Cancel-and-restart timer: only the last scheduled value fires, once the
/// delay has elapsed without a newer schedule.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `value`, replacing anything still pending.
    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((now + self.delay, value));
    }

    /// Drop the pending value without firing.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, value)| value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value will fire.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(deadline, _)| *deadline)
    }

    /// Take the pending value if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if self.deadline().is_some_and(|deadline| now >= deadline) {
            self.cancel()
        } else {
            None
        }
    }
}

/// Identifies one dispatched request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Discards late responses from superseded requests.
///
/// Every issued ticket invalidates all older ones, whatever their target;
/// only the latest request's response is accepted. [`SupersessionGate::is_current_for`]
/// additionally checks that the response belongs to the target currently in focus.
#[derive(Debug, Clone)]
pub struct SupersessionGate<K> {
    next: u64,
    latest: Option<(Ticket, K)>,
}

impl<K> Default for SupersessionGate<K> {
    fn default() -> Self {
        Self {
            next: 0,
            latest: None,
        }
    }
}

impl<K: Clone + PartialEq> SupersessionGate<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket for a request about `target`.
    pub fn issue(&mut self, target: K) -> Ticket {
        self.next += 1;
        let ticket = Ticket(self.next);
        self.latest = Some((ticket, target));
        ticket
    }

    /// Whether a response carrying `ticket` should be applied.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.as_ref().is_some_and(|(latest, _)| *latest == ticket)
    }

    pub fn is_current_for(&self, ticket: Ticket, target: &K) -> bool {
        self.latest
            .as_ref()
            .is_some_and(|(latest, current)| *latest == ticket && current == target)
    }

    /// Invalidate every outstanding ticket.
    pub fn clear(&mut self) {
        self.latest = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(1500);

    #[test]
    fn last_schedule_wins() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.schedule("first", start);
        debouncer.schedule("second", start + Duration::from_millis(1000));

        assert_eq!(debouncer.poll(start + Duration::from_millis(1600)), None);
        assert_eq!(
            debouncer.poll(start + Duration::from_millis(2500)),
            Some("second")
        );
        assert_eq!(debouncer.poll(start + Duration::from_millis(5000)), None);
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn cancel_drops_pending_value() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.schedule(1, start);
        assert_eq!(debouncer.deadline(), Some(start + DELAY));
        assert_eq!(debouncer.cancel(), Some(1));
        assert_eq!(debouncer.poll(start + DELAY), None);
    }

    #[test]
    fn stale_tickets_are_rejected() {
        let mut gate = SupersessionGate::new();
        let first = gate.issue("fee-code-1");
        let second = gate.issue("fee-code-2");
        assert!(!gate.is_current(first));
        assert!(gate.is_current(second));
        assert!(gate.is_current_for(second, &"fee-code-2"));
        assert!(!gate.is_current_for(second, &"fee-code-1"));
        gate.clear();
        assert!(!gate.is_current(second));
    }
}
