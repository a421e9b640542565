//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use catalog_core::aggregation::AggregationService;
use catalog_core::ports::{CatalogStore, UserStore};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogStore>,
    pub users: Arc<dyn UserStore>,
    pub search: Arc<AggregationService>,
}

impl AppState {
    /// Label given to books of the internal catalog.
    pub fn home_label(&self) -> &str {
        self.search.home_label()
    }
}
