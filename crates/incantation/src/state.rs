//! Shared application state passed to all request handlers.

use axum::extract::FromRef;
use incantation_auth::AuthState;
use tokio::sync::broadcast;

#[derive(Clone)]
pub struct AppState {
    pub auth: AuthState,
    /// Fires once when the server begins shutting down.
    pub shutdown_tx: broadcast::Sender<()>,
}

impl AppState {
    pub fn new(auth: AuthState) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self { auth, shutdown_tx }
    }

    /// Subscribe to shutdown signal.
    pub fn subscribe_shutdown(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Signal background tasks to stop.
    pub fn signal_shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}
