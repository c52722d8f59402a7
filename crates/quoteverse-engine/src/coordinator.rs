//! Request coordination for live search.
//!
//! [`RequestCoordinator`] is a clock-free state machine: every operation takes
//! the current [`Instant`] and returns a [`Decision`] for the caller to act
//! on. It never performs I/O itself.
//!
//! Rules:
//! - Keystrokes are debounced; the due time moves with every keystroke.
//! - A query is accepted only if `min_interval` has elapsed since the last
//!   accepted one. A throttled query stays pending until the gate reopens and
//!   then fires with whatever the input is at that moment.
//! - Keystroke and poll triggers skip a query equal to the last processed one.
//!   An explicit submit does not.
//! - A mode switch re-runs the current input immediately, ignoring the gate
//!   and the duplicate check.
//! - Every accepted query gets a fresh generation. Only a response carrying
//!   the latest generation may be displayed.

use quoteverse_core::config::EngineSettings;
use quoteverse_core::error::Result;
use quoteverse_core::models::{QueryKey, Quote, SearchMode};
use std::time::{Duration, Instant};

/// What caused an attempt to send a query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Keystroke,
    Submit,
    Poll,
    ModeSwitch,
}

/// Permission to run one query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub generation: u64,
    pub key: QueryKey,
    pub trigger: Trigger,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Resolve this query now (cache or backend)
    Dispatch(Ticket),
    /// The input is empty; drop highlights and results
    Clear,
    /// Throttled; the coordinator will retry at `due`
    Deferred { due: Instant },
    /// Same query as the last one processed
    Duplicate,
    /// Nothing to do
    Ignored,
}

/// Observable coordinator state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    Idle,
    /// A keystroke or throttled query is waiting for its due time
    Pending { due: Instant },
    /// A dispatched query has not been reconciled yet
    InFlight { generation: u64 },
}

/// Result of a query, tagged with the ticket it answers
#[derive(Debug)]
pub struct TaggedResponse {
    pub generation: u64,
    pub key: QueryKey,
    pub payload: Result<Vec<Quote>>,
    /// Answered from the query cache rather than the backend
    pub from_cache: bool,
}

impl TaggedResponse {
    pub fn new(ticket: &Ticket, payload: Result<Vec<Quote>>, from_cache: bool) -> Self {
        Self {
            generation: ticket.generation,
            key: ticket.key.clone(),
            payload,
            from_cache,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    due: Instant,
    trigger: Trigger,
    force: bool,
}

#[derive(Debug, Clone)]
pub struct RequestCoordinator {
    min_interval: Duration,
    debounce: Duration,
    auto_send: bool,

    input: String,
    mode: SearchMode,

    last_accepted: Option<Instant>,
    last_processed: Option<QueryKey>,
    generation: u64,
    in_flight: Option<u64>,
    pending: Option<Pending>,
}

impl RequestCoordinator {
    pub fn new(min_interval: Duration, debounce: Duration, auto_send: bool) -> Self {
        Self {
            min_interval,
            debounce,
            auto_send,
            input: String::new(),
            mode: SearchMode::default(),
            last_accepted: None,
            last_processed: None,
            generation: 0,
            in_flight: None,
            pending: None,
        }
    }

    pub fn from_settings(settings: &EngineSettings) -> Self {
        Self::new(settings.min_request_interval, settings.debounce, settings.auto_send)
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    pub fn auto_send(&self) -> bool {
        self.auto_send
    }

    /// Generation of the most recent accepted query or clear
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn last_processed(&self) -> Option<&QueryKey> {
        self.last_processed.as_ref()
    }

    pub fn state(&self) -> CoordinatorState {
        match (self.pending, self.in_flight) {
            (Some(pending), _) => CoordinatorState::Pending { due: pending.due },
            (None, Some(generation)) => CoordinatorState::InFlight { generation },
            (None, None) => CoordinatorState::Idle,
        }
    }

    /// When [`tick`](Self::tick) next has work to do
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.map(|p| p.due)
    }

    /// Record new input text and (re)start the keystroke debounce.
    ///
    /// Auto-send only governs [`poll`](Self::poll); typing always schedules
    /// a query.
    pub fn on_input(&mut self, text: &str, now: Instant) -> Option<Instant> {
        self.input = text.to_string();
        self.pending = Some(Pending {
            due: now + self.debounce,
            trigger: Trigger::Keystroke,
            force: false,
        });
        self.next_deadline()
    }

    /// Record input that changed without a keystroke (paste, autofill).
    /// No debounce starts; the next [`poll`](Self::poll) or submit sends it.
    pub fn observe_input(&mut self, text: &str) {
        self.input = text.to_string();
    }

    /// Explicit submit of the current input
    pub fn submit(&mut self, now: Instant) -> Decision {
        self.attempt(now, Trigger::Submit, true)
    }

    /// Periodic re-check of the current input
    pub fn poll(&mut self, now: Instant) -> Decision {
        if !self.auto_send || self.pending.is_some() {
            return Decision::Ignored;
        }
        self.attempt(now, Trigger::Poll, false)
    }

    /// Switch search mode, re-running non-empty input at once
    pub fn set_mode(&mut self, mode: SearchMode, now: Instant) -> Decision {
        if mode == self.mode {
            return Decision::Ignored;
        }
        self.mode = mode;
        tracing::debug!(mode = %mode, "search mode changed");

        let key = QueryKey::new(self.mode, &self.input);
        if key.is_empty() {
            return Decision::Ignored;
        }
        self.accept(key, now, Trigger::ModeSwitch)
    }

    /// Fire the pending attempt if it is due
    pub fn tick(&mut self, now: Instant) -> Decision {
        match self.pending {
            Some(pending) if pending.due <= now => {
                self.pending = None;
                self.attempt(now, pending.trigger, pending.force)
            }
            _ => Decision::Ignored,
        }
    }

    /// Mark `generation` answered. Returns `false` for a stale response,
    /// which must not be displayed.
    pub fn complete(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            tracing::debug!(generation, current = self.generation, "discarding stale response");
            return false;
        }
        self.in_flight = None;
        true
    }

    fn attempt(&mut self, now: Instant, trigger: Trigger, force: bool) -> Decision {
        let key = QueryKey::new(self.mode, &self.input);

        if !force && self.last_processed.as_ref() == Some(&key) {
            self.pending = None;
            return Decision::Duplicate;
        }

        if key.is_empty() {
            self.pending = None;
            self.last_processed = Some(key);
            // Anything still in flight answers input that is gone
            self.generation += 1;
            self.in_flight = None;
            return Decision::Clear;
        }

        if let Some(last) = self.last_accepted {
            let due = last + self.min_interval;
            if now < due {
                tracing::trace!(query = %key, ?trigger, "request throttled");
                self.pending = Some(Pending { due, trigger, force });
                return Decision::Deferred { due };
            }
        }

        self.accept(key, now, trigger)
    }

    fn accept(&mut self, key: QueryKey, now: Instant, trigger: Trigger) -> Decision {
        self.generation += 1;
        self.last_accepted = Some(now);
        self.last_processed = Some(key.clone());
        self.in_flight = Some(self.generation);
        self.pending = None;

        tracing::debug!(query = %key, generation = self.generation, ?trigger, "request accepted");
        Decision::Dispatch(Ticket {
            generation: self.generation,
            key,
            trigger,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_millis(50);
    const DEBOUNCE: Duration = Duration::from_millis(10);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn manual() -> RequestCoordinator {
        RequestCoordinator::new(INTERVAL, DEBOUNCE, false)
    }

    fn live() -> RequestCoordinator {
        RequestCoordinator::new(INTERVAL, DEBOUNCE, true)
    }

    fn dispatched(decision: Decision) -> Ticket {
        match decision {
            Decision::Dispatch(ticket) => ticket,
            other => panic!("expected dispatch, got {:?}", other),
        }
    }

    #[test]
    fn test_second_submit_within_interval_is_throttled() {
        let t0 = Instant::now();
        let mut coordinator = manual();

        coordinator.on_input("hope", t0);
        dispatched(coordinator.submit(t0));

        coordinator.on_input("despair", t0 + ms(10));
        assert_eq!(
            coordinator.submit(t0 + ms(10)),
            Decision::Deferred { due: t0 + INTERVAL }
        );
    }

    #[test]
    fn test_second_submit_after_interval_is_accepted() {
        let t0 = Instant::now();
        let mut coordinator = manual();

        coordinator.on_input("hope", t0);
        dispatched(coordinator.submit(t0));

        coordinator.on_input("despair", t0 + ms(60));
        let ticket = dispatched(coordinator.submit(t0 + ms(60)));
        assert_eq!(ticket.key.text, "despair");
        assert_eq!(ticket.generation, 2);
    }

    #[test]
    fn test_throttled_request_fires_on_trailing_edge_with_latest_input() {
        let t0 = Instant::now();
        let mut coordinator = manual();

        coordinator.on_input("a", t0);
        dispatched(coordinator.submit(t0));
        coordinator.on_input("ab", t0 + ms(5));
        coordinator.submit(t0 + ms(5));
        coordinator.on_input("abc", t0 + ms(20));

        assert_eq!(coordinator.state(), CoordinatorState::Pending { due: t0 + INTERVAL });
        assert_eq!(coordinator.tick(t0 + ms(49)), Decision::Ignored);

        let ticket = dispatched(coordinator.tick(t0 + INTERVAL));
        assert_eq!(ticket.key.text, "abc");
        assert_eq!(ticket.trigger, Trigger::Submit);
    }

    #[test]
    fn test_keystrokes_are_debounced() {
        let t0 = Instant::now();
        let mut coordinator = live();

        coordinator.on_input("h", t0);
        let due = coordinator.on_input("ho", t0 + ms(5));
        assert_eq!(due, Some(t0 + ms(15)));

        assert_eq!(coordinator.tick(t0 + ms(12)), Decision::Ignored);
        let ticket = dispatched(coordinator.tick(t0 + ms(15)));
        assert_eq!(ticket.key.text, "ho");
        assert_eq!(ticket.trigger, Trigger::Keystroke);
    }

    #[test]
    fn test_poll_skips_duplicate_but_submit_does_not() {
        let t0 = Instant::now();
        let mut coordinator = live();

        coordinator.on_input("  stoic ", t0);
        dispatched(coordinator.tick(t0 + DEBOUNCE));

        assert_eq!(coordinator.poll(t0 + ms(1000)), Decision::Duplicate);
        let ticket = dispatched(coordinator.submit(t0 + ms(1000)));
        assert_eq!(ticket.key.text, "stoic");
    }

    #[test]
    fn test_keystrokes_fire_without_auto_send() {
        let t0 = Instant::now();
        let mut coordinator = manual();

        assert_eq!(coordinator.on_input("hope", t0), Some(t0 + DEBOUNCE));
        let ticket = dispatched(coordinator.tick(t0 + DEBOUNCE));
        assert_eq!(ticket.key.text, "hope");
        assert_eq!(ticket.trigger, Trigger::Keystroke);
    }

    #[test]
    fn test_poll_disabled_without_auto_send() {
        let t0 = Instant::now();
        let mut coordinator = manual();
        coordinator.on_input("hope", t0);
        let ticket = dispatched(coordinator.tick(t0 + DEBOUNCE));
        assert!(coordinator.complete(ticket.generation));

        coordinator.observe_input("hope springs");
        assert_eq!(coordinator.state(), CoordinatorState::Idle);
        assert_eq!(coordinator.poll(t0 + ms(1000)), Decision::Ignored);
        assert_eq!(coordinator.generation(), 1);
    }

    #[test]
    fn test_poll_sends_changed_input() {
        let t0 = Instant::now();
        let mut coordinator = live();

        coordinator.on_input("stoic", t0);
        let first = dispatched(coordinator.tick(t0 + DEBOUNCE));
        assert!(coordinator.complete(first.generation));
        assert_eq!(coordinator.poll(t0 + ms(1000)), Decision::Duplicate);

        coordinator.observe_input("stoicism");

        let ticket = dispatched(coordinator.poll(t0 + ms(2000)));
        assert_eq!(ticket.key.text, "stoicism");
        assert_eq!(ticket.trigger, Trigger::Poll);
        assert_eq!(ticket.generation, first.generation + 1);
    }

    #[test]
    fn test_poll_waits_for_pending_keystroke() {
        let t0 = Instant::now();
        let mut coordinator = live();

        coordinator.on_input("stoic", t0);
        assert_eq!(coordinator.poll(t0 + ms(5)), Decision::Ignored);
        assert_eq!(coordinator.generation(), 0);
    }

    #[test]
    fn test_mode_switch_bypasses_gate_and_dedupe() {
        let t0 = Instant::now();
        let mut coordinator = manual();

        coordinator.on_input("Austen", t0);
        dispatched(coordinator.submit(t0));

        let ticket = dispatched(coordinator.set_mode(SearchMode::Author, t0 + ms(1)));
        assert_eq!(ticket.key, QueryKey::new(SearchMode::Author, "Austen"));
        assert_eq!(ticket.trigger, Trigger::ModeSwitch);

        assert_eq!(coordinator.set_mode(SearchMode::Author, t0 + ms(2)), Decision::Ignored);
    }

    #[test]
    fn test_mode_switch_with_empty_input_does_nothing() {
        let mut coordinator = manual();
        assert_eq!(
            coordinator.set_mode(SearchMode::Book, Instant::now()),
            Decision::Ignored
        );
        assert_eq!(coordinator.mode(), SearchMode::Book);
        assert_eq!(coordinator.generation(), 0);
    }

    #[test]
    fn test_empty_input_clears_and_supersedes_in_flight() {
        let t0 = Instant::now();
        let mut coordinator = manual();

        coordinator.on_input("hope", t0);
        let ticket = dispatched(coordinator.submit(t0));

        coordinator.on_input("   ", t0 + ms(100));
        assert_eq!(coordinator.submit(t0 + ms(100)), Decision::Clear);
        assert!(!coordinator.complete(ticket.generation));
        assert_eq!(coordinator.state(), CoordinatorState::Idle);
    }

    #[test]
    fn test_only_latest_generation_completes() {
        let t0 = Instant::now();
        let mut coordinator = manual();

        coordinator.on_input("one", t0);
        let first = dispatched(coordinator.submit(t0));
        coordinator.on_input("two", t0 + ms(60));
        let second = dispatched(coordinator.submit(t0 + ms(60)));

        assert_eq!(
            coordinator.state(),
            CoordinatorState::InFlight {
                generation: second.generation
            }
        );
        assert!(!coordinator.complete(first.generation));
        assert!(coordinator.complete(second.generation));
        assert_eq!(coordinator.state(), CoordinatorState::Idle);
    }
}
