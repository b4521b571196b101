//! Application state for the HTTP server.

use std::sync::Arc;

use crate::db::repository::ExposureRepository;
use crate::services::{QueryContext, QuerySettings};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The one record store built at startup
    pub repository: Arc<dyn ExposureRepository>,
    pub settings: QuerySettings,
}

impl AppState {
    pub fn new(repository: Arc<dyn ExposureRepository>) -> Self {
        Self::with_settings(repository, QuerySettings::default())
    }

    pub fn with_settings(repository: Arc<dyn ExposureRepository>, settings: QuerySettings) -> Self {
        Self {
            repository,
            settings,
        }
    }

    /// Fresh per-request context; `now` is captured here exactly once.
    pub fn query_context(&self) -> QueryContext {
        QueryContext::starting_now(&self.settings)
    }
}
