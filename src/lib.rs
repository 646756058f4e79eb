pub mod config;
pub mod enrichment;
pub mod handlers;
pub mod models;
pub mod query;
pub mod routes;
pub mod store;
pub mod utils;

use std::sync::Arc;

use crate::config::Config;
use crate::enrichment::EnrichmentProvider;
use crate::store::EventStore;

/// Shared state accessible from axum handlers. The store is the single
/// owner of the event table; the enrichment provider is injected so tests
/// can substitute a double.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<EventStore>,
    pub enrichment: Arc<dyn EnrichmentProvider>,
    pub config: Arc<Config>,
}
