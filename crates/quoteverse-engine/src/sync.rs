//! Keeps the rendered scene in step with the point store, the viewport, and
//! the latest similarity result.

use quoteverse_core::models::{Quote, QuoteId};
use quoteverse_store::{PointStore, Subscription};
use quoteverse_view::{Coord, Emphasis, EmphasisStyle, ViewportTransform};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// One drawable point
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub id: QuoteId,
    /// Pixel position
    pub position: Coord<f64>,
    pub emphasis: Emphasis,
    /// Zoom-dependent size multiplier, `1.0` unless point zoom is enabled
    pub zoom_scale: f64,
}

/// Drawing backend driven by [`VisualizationSync`]
pub trait RenderAdapter: Send {
    /// Remove every primitive
    fn clear(&mut self);

    /// Add one primitive
    fn draw(&mut self, primitive: &Primitive);

    /// Move an already drawn primitive after a pan or zoom
    fn reposition(&mut self, id: &QuoteId, position: Coord<f64>, zoom_scale: f64);
}

#[derive(Debug, Default)]
struct Scene {
    primitives: Vec<Primitive>,
    redraws: usize,
}

/// In-memory renderer, used headless by the CLI and by tests.
///
/// Clones share one scene, so a caller can keep a handle for inspection
/// while another is boxed into a [`VisualizationSync`].
#[derive(Debug, Clone, Default)]
pub struct SceneRenderer {
    scene: Arc<Mutex<Scene>>,
}

impl SceneRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn scene(&self) -> std::sync::MutexGuard<'_, Scene> {
        self.scene.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn primitives(&self) -> Vec<Primitive> {
        self.scene().primitives.clone()
    }

    pub fn get(&self, id: &QuoteId) -> Option<Primitive> {
        self.scene().primitives.iter().find(|p| &p.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.scene().primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scene().primitives.is_empty()
    }

    /// Number of full redraws so far
    pub fn redraws(&self) -> usize {
        self.scene().redraws
    }
}

impl RenderAdapter for SceneRenderer {
    fn clear(&mut self) {
        let mut scene = self.scene();
        scene.primitives.clear();
        scene.redraws += 1;
    }

    fn draw(&mut self, primitive: &Primitive) {
        self.scene().primitives.push(primitive.clone());
    }

    fn reposition(&mut self, id: &QuoteId, position: Coord<f64>, zoom_scale: f64) {
        if let Some(p) = self.scene().primitives.iter_mut().find(|p| &p.id == id) {
            p.position = position;
            p.zoom_scale = zoom_scale;
        }
    }
}

/// Snapshot shared with the store listener
struct Shared {
    quotes: Mutex<Vec<Quote>>,
    dirty: AtomicBool,
}

/// Bridges [`PointStore`] changes and similarity results to a [`RenderAdapter`].
///
/// Store notifications only record a snapshot and mark the scene dirty; the
/// owner calls [`refresh`](Self::refresh) from its own task to redraw.
pub struct VisualizationSync {
    renderer: Box<dyn RenderAdapter>,
    style: EmphasisStyle,
    zoom_points: bool,
    shared: Arc<Shared>,
    highlights: HashMap<QuoteId, Emphasis>,
    subscription: Subscription,
}

impl VisualizationSync {
    pub fn attach(
        store: &PointStore,
        renderer: Box<dyn RenderAdapter>,
        style: EmphasisStyle,
        zoom_points: bool,
    ) -> Self {
        let shared = Arc::new(Shared {
            quotes: Mutex::new(store.quotes()),
            dirty: AtomicBool::new(true),
        });

        let listener = Arc::clone(&shared);
        let subscription = store.subscribe(move |quotes| {
            *listener.quotes.lock().unwrap_or_else(PoisonError::into_inner) = quotes.to_vec();
            listener.dirty.store(true, Ordering::Release);
        });

        Self {
            renderer,
            style,
            zoom_points,
            shared,
            highlights: HashMap::new(),
            subscription,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.shared.dirty.load(Ordering::Acquire)
    }

    /// Current emphasis of a point; baseline unless highlighted
    pub fn emphasis_for(&self, id: &QuoteId) -> Emphasis {
        self.highlights.get(id).copied().unwrap_or_else(|| self.style.baseline())
    }

    /// Highlight one matched quote
    pub fn on_similarity_result(&mut self, id: QuoteId, distance: Option<f64>) {
        let strength = distance.map_or(1.0, |d| 1.0 - d);
        self.highlights.insert(id, self.style.for_strength(strength));
        self.shared.dirty.store(true, Ordering::Release);
    }

    /// Replace all highlights with those of `results`
    pub fn apply_results(&mut self, results: &[Quote]) {
        self.highlights.clear();
        for quote in results {
            self.on_similarity_result(quote.id.clone(), quote.distance);
        }
        self.shared.dirty.store(true, Ordering::Release);
    }

    pub fn clear_highlights(&mut self) {
        if !self.highlights.is_empty() {
            self.highlights.clear();
            self.shared.dirty.store(true, Ordering::Release);
        }
    }

    pub fn highlighted(&self) -> usize {
        self.highlights.len()
    }

    /// Redraw if anything changed since the last draw
    pub fn refresh(&mut self, viewport: &ViewportTransform) -> bool {
        if !self.shared.dirty.swap(false, Ordering::AcqRel) {
            return false;
        }
        self.redraw(viewport);
        true
    }

    /// Clear and re-emit one primitive per placed quote
    pub fn redraw(&mut self, viewport: &ViewportTransform) {
        let quotes = self.snapshot();
        let zoom_scale = self.zoom_scale(viewport);

        self.renderer.clear();
        let mut drawn = 0usize;
        for quote in &quotes {
            let Some(coords) = quote.coords else {
                continue;
            };
            self.renderer.draw(&Primitive {
                id: quote.id.clone(),
                position: viewport.project(coords),
                emphasis: self.emphasis_for(&quote.id),
                zoom_scale,
            });
            drawn += 1;
        }
        tracing::trace!(drawn, total = quotes.len(), "scene redrawn");
    }

    /// Recompute positions only, after a pan, zoom, or resize
    pub fn viewport_changed(&mut self, viewport: &ViewportTransform) {
        if self.is_dirty() {
            self.refresh(viewport);
            return;
        }
        let zoom_scale = self.zoom_scale(viewport);
        for quote in self.snapshot() {
            if let Some(coords) = quote.coords {
                self.renderer.reposition(&quote.id, viewport.project(coords), zoom_scale);
            }
        }
    }

    fn snapshot(&self) -> Vec<Quote> {
        self.shared.quotes.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn zoom_scale(&self, viewport: &ViewportTransform) -> f64 {
        if self.zoom_points {
            viewport.point_zoom_scale()
        } else {
            1.0
        }
    }
}

impl Drop for VisualizationSync {
    fn drop(&mut self) {
        self.subscription.unsubscribe();
    }
}
