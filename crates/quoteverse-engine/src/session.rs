//! Async driver that owns every engine component for one exploration session

use quoteverse_core::config::EngineSettings;
use quoteverse_core::error::Result;
use quoteverse_core::models::{
    rank_for_display, Quote, SearchMode, SearchRequest, EMPTY_INPUT_HINT, NO_RESULTS_MESSAGE,
};
use quoteverse_core::ports::QuoteBackend;
use quoteverse_store::cache::CacheStats;
use quoteverse_store::{PointStore, QueryCache};
use quoteverse_view::{EmphasisStyle, GestureTracker, Rect, ViewEvent, ViewportTransform};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

use crate::coordinator::{CoordinatorState, Decision, RequestCoordinator, TaggedResponse, Ticket};
use crate::sync::{RenderAdapter, VisualizationSync};

/// Input delivered to [`Session::run`]
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The search box now holds this text
    Input(String),
    /// Input replaced without keystrokes
    Paste(String),
    Submit,
    SetMode(SearchMode),
    View(ViewEvent),
    Shutdown,
}

/// What reconciling a response did to the display
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciled {
    Applied { added: usize, matched: usize },
    /// Superseded by a newer query; nothing shown
    Stale,
    /// Backend failure; user-facing message
    Failed(String),
}

/// Point-in-time summary for status output
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStatus {
    pub points: usize,
    pub highlighted: usize,
    pub results: usize,
    pub mode: SearchMode,
    pub state: CoordinatorState,
    pub cache: CacheStats,
    pub scale: f64,
}

/// One user's exploration session.
///
/// Owns the point store, query cache, request coordinator, viewport, and
/// visualization sync, and wires them to a [`QuoteBackend`]. Backend calls run
/// on spawned tasks and come back as [`TaggedResponse`]s through a channel;
/// every response goes through [`reconcile`](Self::reconcile).
pub struct Session {
    settings: EngineSettings,
    backend: Arc<dyn QuoteBackend>,
    store: PointStore,
    cache: QueryCache,
    coordinator: RequestCoordinator,
    viewport: ViewportTransform,
    gestures: GestureTracker,
    sync: VisualizationSync,
    responses_tx: mpsc::UnboundedSender<TaggedResponse>,
    responses_rx: mpsc::UnboundedReceiver<TaggedResponse>,
    results: Vec<Quote>,
    message: Option<String>,
}

enum Step {
    Event(Option<SessionEvent>),
    Deadline,
    Poll,
    Response(TaggedResponse),
}

impl Session {
    pub fn new(
        settings: EngineSettings,
        backend: Arc<dyn QuoteBackend>,
        renderer: Box<dyn RenderAdapter>,
        container: Rect<f64>,
    ) -> Self {
        let store = PointStore::new(settings.max_points);
        let sync = VisualizationSync::attach(
            &store,
            renderer,
            EmphasisStyle::default(),
            settings.viewport.zoom_points,
        );
        let (responses_tx, responses_rx) = mpsc::unbounded_channel();

        tracing::debug!(backend = backend.name(), max_points = settings.max_points, "session created");

        Self {
            cache: QueryCache::new(settings.cache_capacity),
            coordinator: RequestCoordinator::from_settings(&settings),
            viewport: ViewportTransform::new(&settings.viewport, container),
            gestures: GestureTracker::new(settings.viewport.zoom_factor),
            settings,
            backend,
            store,
            sync,
            responses_tx,
            responses_rx,
            results: Vec::new(),
            message: Some(EMPTY_INPUT_HINT.to_string()),
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn store(&self) -> &PointStore {
        &self.store
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn coordinator(&self) -> &RequestCoordinator {
        &self.coordinator
    }

    pub fn viewport(&self) -> &ViewportTransform {
        &self.viewport
    }

    pub fn sync(&self) -> &VisualizationSync {
        &self.sync
    }

    /// Results of the last displayed query, closest first
    pub fn results(&self) -> &[Quote] {
        &self.results
    }

    /// Message for the result panel, if any
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            points: self.store.len(),
            highlighted: self.sync.highlighted(),
            results: self.results.len(),
            mode: self.coordinator.mode(),
            state: self.coordinator.state(),
            cache: self.cache.stats(),
            scale: self.viewport.scale(),
        }
    }

    /// Bulk-load the initial point set
    pub async fn load_initial(&mut self) -> Result<usize> {
        let loaded = self
            .backend
            .fetch_existing(self.settings.fetch_count, self.settings.randomize)
            .await;

        match loaded {
            Ok(quotes) => {
                self.store.replace_all(quotes);
                self.sync.refresh(&self.viewport);
                tracing::info!(points = self.store.len(), backend = self.backend.name(), "initial quotes loaded");
                Ok(self.store.len())
            }
            Err(e) => {
                tracing::warn!(error = %e, "initial load failed");
                self.message = Some(e.user_message());
                Err(e)
            }
        }
    }

    pub fn set_input(&mut self, text: &str, now: Instant) {
        self.coordinator.on_input(text, now);
    }

    /// Input replaced without typing; picked up by the next poll or submit
    pub fn paste_input(&mut self, text: &str) {
        self.coordinator.observe_input(text);
    }

    /// Explicit submit. Returns the outcome when it was resolved on the spot
    /// from the cache; backend queries finish later through
    /// [`next_response`](Self::next_response).
    pub fn submit(&mut self, now: Instant) -> Option<Reconciled> {
        let decision = self.coordinator.submit(now);
        self.apply_decision(decision)
    }

    pub fn poll(&mut self, now: Instant) -> Option<Reconciled> {
        let decision = self.coordinator.poll(now);
        self.apply_decision(decision)
    }

    pub fn set_mode(&mut self, mode: SearchMode, now: Instant) -> Option<Reconciled> {
        let decision = self.coordinator.set_mode(mode, now);
        self.apply_decision(decision)
    }

    /// Run whatever the coordinator has pending and due
    pub fn tick(&mut self, now: Instant) -> Option<Reconciled> {
        let decision = self.coordinator.tick(now);
        self.apply_decision(decision)
    }

    /// Feed a pointer or resize event to the viewport
    pub fn handle_view_event(&mut self, event: ViewEvent) -> bool {
        let moved = self.gestures.handle(event, &mut self.viewport);
        if moved {
            self.sync.viewport_changed(&self.viewport);
        }
        moved
    }

    fn apply_decision(&mut self, decision: Decision) -> Option<Reconciled> {
        match decision {
            Decision::Dispatch(ticket) => self.dispatch(ticket),
            Decision::Clear => {
                self.results.clear();
                self.sync.clear_highlights();
                self.message = Some(EMPTY_INPUT_HINT.to_string());
                self.sync.refresh(&self.viewport);
                None
            }
            Decision::Deferred { .. } | Decision::Duplicate | Decision::Ignored => None,
        }
    }

    fn dispatch(&mut self, ticket: Ticket) -> Option<Reconciled> {
        if let Some(hit) = self.cache.get(&ticket.key) {
            return Some(self.reconcile(TaggedResponse::new(&ticket, Ok(hit), true)));
        }

        let request =
            SearchRequest::new(&ticket.key, self.settings.neighbor_count, self.settings.max_distance);
        let backend = Arc::clone(&self.backend);
        let tx = self.responses_tx.clone();

        tokio::spawn(async move {
            let payload = backend.search(&request).await;
            // The receiver lives as long as the session
            let _ = tx.send(TaggedResponse::new(&ticket, payload, false));
        });
        None
    }

    /// Apply a response to the display if it is still current.
    ///
    /// Successful backend results are cached even when stale. Failures
    /// leave the store and cache untouched.
    pub fn reconcile(&mut self, response: TaggedResponse) -> Reconciled {
        let TaggedResponse {
            generation,
            key,
            payload,
            from_cache,
        } = response;

        if let (Ok(results), false) = (&payload, from_cache) {
            self.cache.put(key.clone(), results.clone());
        }

        if !self.coordinator.complete(generation) {
            return Reconciled::Stale;
        }

        match payload {
            Ok(results) => {
                let added = self.store.update_with_similar(&results, self.settings.max_points);
                self.sync.apply_results(&results);
                self.results = rank_for_display(&results);
                self.message = results.is_empty().then(|| NO_RESULTS_MESSAGE.to_string());
                self.sync.refresh(&self.viewport);

                tracing::debug!(query = %key, matched = results.len(), added, from_cache, "results applied");
                Reconciled::Applied {
                    added,
                    matched: results.len(),
                }
            }
            Err(e) => {
                tracing::warn!(query = %key, error = %e, "search failed");
                let message = e.user_message();
                self.message = Some(message.clone());
                Reconciled::Failed(message)
            }
        }
    }

    /// Wait for the next backend response and reconcile it
    pub async fn next_response(&mut self) -> Option<Reconciled> {
        let response = self.responses_rx.recv().await?;
        Some(self.reconcile(response))
    }

    /// Reconcile responses until no query is in flight
    pub async fn settle(&mut self) {
        while matches!(self.coordinator.state(), CoordinatorState::InFlight { .. }) {
            if self.next_response().await.is_none() {
                break;
            }
        }
    }

    /// Wait out pending and in-flight work until the coordinator is idle.
    ///
    /// Returns the last outcome reconciled along the way, or `None` when
    /// nothing was dispatched (cleared, duplicate, or already idle).
    pub async fn drive(&mut self) -> Option<Reconciled> {
        let mut last = None;
        loop {
            match self.coordinator.state() {
                CoordinatorState::Idle => break,
                CoordinatorState::Pending { due } => {
                    tokio::time::sleep_until(tokio::time::Instant::from_std(due)).await;
                    if let Some(outcome) = self.tick(Instant::now()) {
                        last = Some(outcome);
                    }
                }
                CoordinatorState::InFlight { .. } => match self.next_response().await {
                    Some(outcome) => last = Some(outcome),
                    None => break,
                },
            }
        }
        last
    }

    /// Drive the session until `events` closes or a shutdown arrives
    pub async fn run(&mut self, mut events: mpsc::Receiver<SessionEvent>) -> Result<()> {
        let period = self.settings.poll_interval;
        let mut poll = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        poll.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let polling = self.coordinator.auto_send();

        loop {
            let deadline = self.coordinator.next_deadline().map(tokio::time::Instant::from_std);

            let step = tokio::select! {
                event = events.recv() => Step::Event(event),
                _ = wait_until(deadline) => Step::Deadline,
                _ = poll.tick(), if polling => Step::Poll,
                Some(response) = self.responses_rx.recv() => Step::Response(response),
            };

            let now = Instant::now();
            match step {
                Step::Event(None) | Step::Event(Some(SessionEvent::Shutdown)) => break,
                Step::Event(Some(event)) => self.handle_event(event, now),
                Step::Deadline => {
                    self.tick(now);
                }
                Step::Poll => {
                    self.poll(now);
                }
                Step::Response(response) => {
                    self.reconcile(response);
                }
            }
        }

        tracing::debug!(status = ?self.status(), "session stopped");
        Ok(())
    }

    pub fn handle_event(&mut self, event: SessionEvent, now: Instant) {
        match event {
            SessionEvent::Input(text) => self.set_input(&text, now),
            SessionEvent::Paste(text) => self.paste_input(&text),
            SessionEvent::Submit => {
                self.submit(now);
            }
            SessionEvent::SetMode(mode) => {
                self.set_mode(mode, now);
            }
            SessionEvent::View(view) => {
                self.handle_view_event(view);
            }
            SessionEvent::Shutdown => {}
        }
    }
}

async fn wait_until(deadline: Option<tokio::time::Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
