//! Application state shared across diagnostics routes

use std::sync::Arc;

use crate::api::ApiClient;
use crate::config::Config;
use crate::game::SessionHandle;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub api: ApiClient,
    pub session: SessionHandle,
}

impl AppState {
    pub fn new(config: Arc<Config>, api: ApiClient, session: SessionHandle) -> Self {
        Self {
            config,
            api,
            session,
        }
    }
}
