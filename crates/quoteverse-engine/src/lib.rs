//! Quoteverse Engine - Live search coordination and scene synchronization
//!
//! Ties the point store, query cache, and viewport together behind a
//! [`Session`] that talks to a [`QuoteBackend`](quoteverse_core::ports::QuoteBackend).

pub mod coordinator;
pub mod session;
pub mod sync;

pub use coordinator::{CoordinatorState, Decision, RequestCoordinator, TaggedResponse, Ticket, Trigger};
pub use session::{Reconciled, Session, SessionEvent, SessionStatus};
pub use sync::{Primitive, RenderAdapter, SceneRenderer, VisualizationSync};
