//! Quoteverse Store - Displayed point set and query memoization
//!
//! [`PointStore`] is the canonical, bounded set of quotes currently on the
//! map and notifies subscribers when it changes. [`QueryCache`] remembers
//! backend results per normalized query.

pub mod cache;
pub mod points;

pub use cache::QueryCache;
pub use points::{PointStore, Subscription};
