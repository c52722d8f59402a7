//! Backend selection for CLI commands

use anyhow::{Context, Result};
use quoteverse_client::{HttpQuoteBackend, MemoryQuoteBackend};
use quoteverse_core::config::EngineSettings;
use quoteverse_core::ports::QuoteBackend;
use std::path::Path;
use std::sync::Arc;

/// The hosted quote service, or a local corpus when `offline` is given
pub fn build_backend(settings: &EngineSettings, offline: Option<&Path>) -> Result<Arc<dyn QuoteBackend>> {
    match offline {
        Some(path) => {
            let backend = MemoryQuoteBackend::from_json_file(path)
                .with_context(|| format!("Failed to load offline corpus: {}", path.display()))?;
            Ok(Arc::new(backend))
        }
        None => Ok(Arc::new(HttpQuoteBackend::new(settings.base_url.clone()))),
    }
}
