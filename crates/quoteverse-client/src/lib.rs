//! Quoteverse Client - Search backend adapters
//!
//! Implementations of the [`QuoteBackend`](quoteverse_core::ports::QuoteBackend)
//! port: an HTTP adapter for the hosted service and an in-memory backend for
//! offline use and tests.

pub mod http;
pub mod memory;
mod wire;

pub use http::HttpQuoteBackend;
pub use memory::MemoryQuoteBackend;
