//! Integration tests for the session driver
//!
//! A scripted backend answers each query text with a fixed result list after
//! an optional delay, so ordering and caching can be checked end to end.

use async_trait::async_trait;
use quoteverse_client::MemoryQuoteBackend;
use quoteverse_core::config::EngineSettings;
use quoteverse_core::error::{QuoteverseError, Result, TRANSPORT_FAILURE_MESSAGE};
use quoteverse_core::models::{
    Coords, Quote, QuoteId, SearchMode, SearchRequest, EMPTY_INPUT_HINT, NO_RESULTS_MESSAGE,
};
use quoteverse_core::ports::QuoteBackend;
use quoteverse_engine::{Reconciled, SceneRenderer, Session, SessionEvent};
use quoteverse_view::{Coord, EmphasisStyle, Rect, ViewEvent};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Default)]
struct ScriptedBackend {
    existing: Vec<Quote>,
    answers: HashMap<String, (Duration, Vec<Quote>)>,
    failing: HashSet<String>,
    requests: Mutex<Vec<SearchRequest>>,
}

impl ScriptedBackend {
    fn with_existing(mut self, quotes: Vec<Quote>) -> Self {
        self.existing = quotes;
        self
    }

    fn answer(mut self, text: &str, delay_ms: u64, results: Vec<Quote>) -> Self {
        self.answers
            .insert(text.to_string(), (Duration::from_millis(delay_ms), results));
        self
    }

    fn fail(mut self, text: &str) -> Self {
        self.failing.insert(text.to_string());
        self
    }

    fn requests(&self) -> Vec<SearchRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuoteBackend for ScriptedBackend {
    async fn fetch_existing(&self, count: usize, _randomize: bool) -> Result<Vec<Quote>> {
        Ok(self.existing.iter().take(count).cloned().collect())
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<Quote>> {
        self.requests.lock().unwrap().push(request.clone());
        if self.failing.contains(&request.text) {
            return Err(QuoteverseError::Transport {
                endpoint: "/get-similar-quotes/".to_string(),
                reason: "connection reset".to_string(),
            });
        }
        match self.answers.get(&request.text) {
            Some((delay, results)) => {
                tokio::time::sleep(*delay).await;
                Ok(results.clone())
            }
            None => Ok(Vec::new()),
        }
    }

    async fn similarity(&self, text: &str, k: usize, max_distance: f64) -> Result<Vec<Quote>> {
        let request = SearchRequest {
            text: text.to_string(),
            mode: SearchMode::Quote,
            k,
            max_distance: Some(max_distance),
        };
        self.search(&request).await
    }

    async fn coordinates(&self, _text: &str) -> Result<Coords> {
        Ok(Coords::new(0.0, 0.0))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn placed(id: &str, x: f64, y: f64) -> Quote {
    Quote::new(id, format!("quote {}", id)).with_coords(x, y)
}

fn settings(max_points: usize) -> EngineSettings {
    EngineSettings {
        max_points,
        auto_send: false,
        ..EngineSettings::default()
    }
}

fn container() -> Rect<f64> {
    Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 800.0, y: 600.0 })
}

fn session_with(backend: Arc<ScriptedBackend>, settings: EngineSettings) -> (Session, SceneRenderer) {
    let scene = SceneRenderer::new();
    let session = Session::new(settings, backend, Box::new(scene.clone()), container());
    (session, scene)
}

fn ids(quotes: &[Quote]) -> Vec<String> {
    quotes.iter().map(|q| q.id.to_string()).collect()
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[tokio::test]
async fn test_load_initial_plots_points() {
    let backend = Arc::new(ScriptedBackend::default().with_existing(vec![
        placed("a", 0.0, 0.0),
        placed("b", 1.0, 0.0),
        placed("c", 0.0, 1.0),
    ]));
    let (mut session, scene) = session_with(backend, settings(10));

    assert_eq!(session.load_initial().await.unwrap(), 3);
    assert_eq!(scene.len(), 3);
    assert_eq!(session.message(), Some(EMPTY_INPUT_HINT));
}

#[tokio::test]
async fn test_similar_results_merge_into_store() {
    let backend = Arc::new(
        ScriptedBackend::default()
            .with_existing(vec![placed("a", 0.0, 0.0), placed("b", 1.0, 0.0), placed("c", 0.0, 1.0)])
            .answer(
                "hope",
                0,
                vec![
                    placed("d", 2.0, 2.0).with_distance(0.2),
                    placed("b", 1.0, 0.0).with_distance(0.1),
                ],
            ),
    );
    let (mut session, scene) = session_with(Arc::clone(&backend), settings(3));
    session.load_initial().await.unwrap();

    let t0 = Instant::now();
    session.set_input("hope", t0);
    session.submit(t0);
    session.settle().await;

    assert_eq!(ids(&session.store().quotes()), vec!["b", "c", "d"]);
    assert_eq!(ids(session.results()), vec!["b", "d"]);
    assert_eq!(session.message(), None);
    assert_eq!(scene.len(), 3);

    let baseline = EmphasisStyle::default().baseline();
    let b = scene.get(&QuoteId::new("b")).unwrap();
    let c = scene.get(&QuoteId::new("c")).unwrap();
    assert!(b.emphasis.scale > baseline.scale);
    assert_eq!(c.emphasis, baseline);

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].k, 50);
    assert_eq!(requests[0].max_distance, Some(0.55));
}

#[tokio::test]
async fn test_repeated_query_served_from_cache() {
    let backend = Arc::new(ScriptedBackend::default().answer("hope", 0, vec![placed("x", 1.0, 1.0)]));
    let (mut session, _scene) = session_with(Arc::clone(&backend), settings(10));

    let t0 = Instant::now();
    session.set_input("hope", t0);
    session.submit(t0);
    session.settle().await;

    session.set_input("  hope  ", t0 + ms(100));
    session.submit(t0 + ms(100));

    assert_eq!(backend.requests().len(), 1);
    assert_eq!(session.cache().stats().hits, 1);
    assert_eq!(ids(session.results()), vec!["x"]);
}

#[tokio::test]
async fn test_stale_response_is_discarded() {
    let backend = Arc::new(
        ScriptedBackend::default()
            .answer("slow", 150, vec![placed("x", 1.0, 1.0)])
            .answer("fast", 0, vec![placed("y", 2.0, 2.0)]),
    );
    let (mut session, _scene) = session_with(Arc::clone(&backend), settings(10));

    let t0 = Instant::now();
    session.set_input("slow", t0);
    session.submit(t0);
    session.set_input("fast", t0 + ms(60));
    session.submit(t0 + ms(60));

    session.settle().await;
    assert_eq!(ids(session.results()), vec!["y"]);

    assert_eq!(session.next_response().await, Some(Reconciled::Stale));
    assert_eq!(ids(session.results()), vec!["y"]);
    assert!(!session.store().contains(&QuoteId::new("x")));

    // Late results are still remembered for next time
    assert_eq!(session.cache().len(), 2);
}

#[tokio::test]
async fn test_backend_failure_leaves_state_untouched() {
    let backend = Arc::new(
        ScriptedBackend::default()
            .with_existing(vec![placed("a", 0.0, 0.0)])
            .fail("boom"),
    );
    let (mut session, _scene) = session_with(backend, settings(10));
    session.load_initial().await.unwrap();

    let t0 = Instant::now();
    session.set_input("boom", t0);
    session.submit(t0);
    session.settle().await;

    assert_eq!(session.message(), Some(TRANSPORT_FAILURE_MESSAGE));
    assert_eq!(ids(&session.store().quotes()), vec!["a"]);
    assert!(session.cache().is_empty());
}

#[tokio::test]
async fn test_empty_input_clears_results() {
    let backend = Arc::new(ScriptedBackend::default().answer("hope", 0, vec![placed("x", 1.0, 1.0)]));
    let (mut session, _scene) = session_with(backend, settings(10));

    let t0 = Instant::now();
    session.set_input("hope", t0);
    session.submit(t0);
    session.settle().await;
    assert_eq!(session.status().highlighted, 1);

    session.set_input("   ", t0 + ms(100));
    session.submit(t0 + ms(100));

    assert!(session.results().is_empty());
    assert_eq!(session.status().highlighted, 0);
    assert_eq!(session.message(), Some(EMPTY_INPUT_HINT));
    // Points stay on the map
    assert!(session.store().contains(&QuoteId::new("x")));
}

#[tokio::test]
async fn test_no_results_message() {
    let backend = Arc::new(ScriptedBackend::default());
    let (mut session, _scene) = session_with(backend, settings(10));

    let t0 = Instant::now();
    session.set_input("nothing matches", t0);
    session.submit(t0);
    session.settle().await;

    assert_eq!(session.message(), Some(NO_RESULTS_MESSAGE));
}

#[tokio::test]
async fn test_mode_switch_reruns_query() {
    let backend = Arc::new(ScriptedBackend::default());
    let (mut session, _scene) = session_with(Arc::clone(&backend), settings(10));

    let t0 = Instant::now();
    session.set_input("Austen", t0);
    session.submit(t0);
    session.settle().await;

    session.set_mode(SearchMode::Author, t0 + ms(1));
    session.settle().await;

    let requests = backend.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].mode, SearchMode::Author);
    assert_eq!(requests[1].max_distance, None);
}

#[tokio::test]
async fn test_view_events_reposition_points() {
    let backend = Arc::new(ScriptedBackend::default().with_existing(vec![placed("a", 0.0, 0.0)]));
    let (mut session, scene) = session_with(backend, settings(10));
    session.load_initial().await.unwrap();
    let redraws = scene.redraws();

    session.handle_view_event(ViewEvent::DragStart(Coord { x: 100.0, y: 100.0 }));
    assert!(session.handle_view_event(ViewEvent::DragMove(Coord { x: 130.0, y: 120.0 })));
    session.handle_view_event(ViewEvent::DragEnd);

    let a = scene.get(&QuoteId::new("a")).unwrap();
    assert_eq!(a.position, Coord { x: 430.0, y: 320.0 });
    assert_eq!(scene.redraws(), redraws);
    assert_eq!(session.store().len(), 1);
}

#[tokio::test]
async fn test_run_loop_debounces_keystrokes() {
    let backend = Arc::new(MemoryQuoteBackend::new(vec![
        placed("1", 0.0, 0.0),
        Quote::new("2", "Hope springs").with_coords(1.0, 1.0),
    ]));
    let settings = EngineSettings {
        max_points: 10,
        fetch_count: 1,
        ..EngineSettings::default()
    };
    let scene = SceneRenderer::new();
    let mut session = Session::new(settings, backend, Box::new(scene.clone()), container());
    session.load_initial().await.unwrap();
    assert_eq!(session.store().len(), 1);

    let (tx, rx) = tokio::sync::mpsc::channel(16);
    tokio::spawn(async move {
        for text in ["h", "ho", "hop", "hope"] {
            tx.send(SessionEvent::Input(text.to_string())).await.unwrap();
        }
        tokio::time::sleep(ms(200)).await;
        tx.send(SessionEvent::Shutdown).await.unwrap();
    });

    session.run(rx).await.unwrap();

    assert!(session.store().contains(&QuoteId::new("2")));
    assert_eq!(scene.len(), 2);
    assert_eq!(session.coordinator().last_processed().map(|k| k.text.as_str()), Some("hope"));
}

#[tokio::test]
async fn test_drive_returns_at_once_when_input_is_blank() {
    let backend = Arc::new(ScriptedBackend::default());
    let (mut session, _scene) = session_with(Arc::clone(&backend), settings(10));

    let t0 = Instant::now();
    session.set_input("   ", t0);
    assert_eq!(session.submit(t0), None);

    let outcome = tokio::time::timeout(ms(500), session.drive()).await;
    assert_eq!(outcome, Ok(None));
    assert_eq!(session.message(), Some(EMPTY_INPUT_HINT));
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_cache_hit_resolves_on_submit() {
    let backend = Arc::new(ScriptedBackend::default().answer("hope", 0, vec![placed("x", 1.0, 1.0)]));
    let (mut session, _scene) = session_with(Arc::clone(&backend), settings(10));

    let t0 = Instant::now();
    session.set_input("hope", t0);
    session.submit(t0);
    assert_eq!(
        session.drive().await,
        Some(Reconciled::Applied { added: 1, matched: 1 })
    );

    session.set_input("hope", t0 + ms(100));
    assert_eq!(
        session.submit(t0 + ms(100)),
        Some(Reconciled::Applied { added: 0, matched: 1 })
    );
    let outcome = tokio::time::timeout(ms(500), session.drive()).await;
    assert_eq!(outcome, Ok(None));
    assert_eq!(backend.requests().len(), 1);
}

#[tokio::test]
async fn test_typing_sends_query_without_auto_send() {
    let backend = Arc::new(ScriptedBackend::default().answer("hope", 0, vec![placed("x", 1.0, 1.0)]));
    let (mut session, _scene) = session_with(Arc::clone(&backend), settings(10));
    assert!(!session.coordinator().auto_send());

    session.set_input("hope", Instant::now());
    let outcome = tokio::time::timeout(ms(500), session.drive()).await;

    assert_eq!(outcome, Ok(Some(Reconciled::Applied { added: 1, matched: 1 })));
    assert_eq!(backend.requests().len(), 1);
    assert_eq!(ids(session.results()), vec!["x"]);
}
