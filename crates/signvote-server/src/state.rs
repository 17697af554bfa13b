//! Application state.

use std::sync::Arc;

use signvote_models::GesturePayload;
use tokio::sync::watch;

use crate::config::ServerConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Latest published payload, written by the frame loop.
    pub latest: watch::Receiver<GesturePayload>,
}

impl AppState {
    pub fn new(config: ServerConfig, latest: watch::Receiver<GesturePayload>) -> Self {
        Self {
            config: Arc::new(config),
            latest,
        }
    }

    /// Snapshot of the most recent payload.
    pub fn latest_payload(&self) -> GesturePayload {
        *self.latest.borrow()
    }
}
