//! Background eviction of expired sessions.

use std::time::Duration;

use incantation_auth::SessionManager;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Purge expired sessions every `period` until shutdown is signalled.
pub fn spawn_session_purge(
    sessions: SessionManager,
    period: Duration,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match sessions.purge_expired().await {
                        Ok(0) => {}
                        Ok(removed) => tracing::info!(removed, "Purged expired sessions"),
                        Err(err) => tracing::warn!(error = %err, "Session purge failed"),
                    }
                }
                _ = shutdown_rx.recv() => {
                    tracing::debug!("Session purge shutting down");
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use chrono::Utc;
    use incantation_auth::MemorySessionStore;
    use incantation_core::auth::{SessionAttributes, SUB_ATTRIBUTE};

    #[tokio::test]
    async fn test_purges_expired_sessions_and_stops_on_shutdown() {
        let sessions = SessionManager::new(
            Arc::new(MemorySessionStore::new()),
            chrono::Duration::hours(8),
            "session_id",
            true,
        );
        let attributes =
            SessionAttributes::from([(SUB_ATTRIBUTE.to_string(), "abc123".to_string())]);

        let stale = sessions
            .create_at(attributes.clone(), Utc::now() - chrono::Duration::hours(9))
            .await
            .unwrap();
        let live = sessions.create(attributes).await.unwrap();

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let handle = spawn_session_purge(sessions.clone(), Duration::from_millis(10), shutdown_rx);

        tokio::time::sleep(Duration::from_millis(50)).await;

        let repository = sessions.repository();
        assert!(repository.get_session(&stale.id).await.unwrap().is_none());
        assert!(repository.get_session(&live.id).await.unwrap().is_some());

        shutdown_tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
