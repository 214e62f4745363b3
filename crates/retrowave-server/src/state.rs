use crate::sessions::SessionStore;
use retrowave::orchestrator::Orchestrator;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new<S: Into<String>>(orchestrator: Orchestrator, model: S) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            sessions: Arc::new(SessionStore::new(model)),
        }
    }
}
