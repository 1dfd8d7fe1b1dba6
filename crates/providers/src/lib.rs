//! LLM Provider implementations for memoclaw.
//!
//! All providers implement the `memoclaw_core::Provider` trait. The
//! assistant runs in degraded mode when no provider can be built — that is
//! a normal startup outcome, not an error.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;

use memoclaw_config::AppConfig;
use memoclaw_core::Provider;
use std::sync::Arc;
use tracing::{info, warn};

/// Build the configured provider, or `None` when no API key is available.
///
/// `None` puts the assistant into degraded mode: every request is answered
/// with the fixed "not configured" message until an operator supplies a key.
pub fn from_config(config: &AppConfig) -> Option<Arc<dyn Provider>> {
    let Some(api_key) = config.api_key.clone() else {
        warn!("No API key configured; assistant will run in degraded mode");
        return None;
    };

    let provider = match OpenAiCompatProvider::new(
        "openai_compat",
        &config.api_url,
        api_key,
        &config.default_model,
    ) {
        Ok(p) => p,
        Err(e) => {
            warn!("Failed to build provider: {e}");
            return None;
        }
    };

    let provider = match &config.memory.embedding_model {
        Some(model) => provider.with_embedding_model(model),
        None => provider,
    };

    info!(model = %config.default_model, url = %config.api_url, "Provider initialized");
    Some(Arc::new(provider))
}
