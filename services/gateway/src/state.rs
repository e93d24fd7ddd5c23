//! Application state

use std::sync::Arc;

use warden_auth_core::SessionService;

use crate::config::Config;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Session issuance and verification
    pub sessions: Arc<SessionService>,
    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state
    pub fn new(sessions: SessionService, config: Config) -> Self {
        Self {
            sessions: Arc::new(sessions),
            config: Arc::new(config),
        }
    }

    /// Get request timeout from config
    pub fn request_timeout(&self) -> std::time::Duration {
        self.config.request_timeout
    }

    /// Name of the session cookie
    pub fn cookie_name(&self) -> &str {
        self.sessions.cookie_name()
    }
}
