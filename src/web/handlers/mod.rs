//! API handlers for the feedsync Web API.

pub mod ajax;
pub mod options;

pub use ajax::*;
pub use options::*;

use std::sync::Arc;

use crate::settings::SettingsService;

/// Shared application state.
pub struct AppState {
    /// Settings and sync triggers.
    pub settings: Arc<SettingsService>,
    /// Bearer token granting administrator access.
    pub admin_token: String,
}

impl AppState {
    /// Create a new application state.
    pub fn new(settings: Arc<SettingsService>, admin_token: impl Into<String>) -> Self {
        Self {
            settings,
            admin_token: admin_token.into(),
        }
    }
}
