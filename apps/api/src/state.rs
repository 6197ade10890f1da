use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::TextGenerator;
use crate::sop::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Text-generation backend. Default: `LlmClient`. Tests swap in a recorder.
    pub generator: Arc<dyn TextGenerator>,
    /// Per-session last results. Lives only as long as the process.
    pub sessions: SessionStore,
    pub config: Config,
}
