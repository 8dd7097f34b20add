use std::sync::Arc;

use crate::config::Config;
use crate::matching::scorer::MatchScorer;
use crate::rate_limit::RateLimiter;
use crate::registry::snapshot::SnapshotStore;
use crate::registry::BizInfoClient;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable match scorer. Production: `LlmMatchScorer` over the chat-completions client.
    pub scorer: Arc<dyn MatchScorer>,
    pub registry: BizInfoClient,
    pub snapshots: SnapshotStore,
    pub sessions: SessionStore,
    /// `None` when `RATE_LIMIT_RPS` is unset.
    pub rate_limiter: Option<RateLimiter>,
}
