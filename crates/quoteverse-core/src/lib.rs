//! Quoteverse Core - Domain models, configuration, and ports
//!
//! This crate holds the types shared by every other Quoteverse crate: the
//! quote model, query keys, the error type, layered configuration, and the
//! port through which the remote search backend is reached.

pub mod config;
pub mod error;
pub mod models;
pub mod ports;

pub use error::{QuoteverseError, Result};
