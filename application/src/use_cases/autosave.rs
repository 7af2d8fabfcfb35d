//! Debounced auto-save
//!
//! Every persistent [`StateEvent`] or explicit [`AutoSaver::request`] restarts
//! the quiet period; only when it runs out with no further change does the
//! session get written. A continuous burst of changes therefore produces one
//! save at its end, never periodic saves during it.

use super::session_manager::SessionManager;
use crate::ports::events::EventBus;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub struct AutoSaver {
    requests: mpsc::UnboundedSender<()>,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl AutoSaver {
    /// Start watching `events` and saving through `manager`
    pub fn spawn(manager: Arc<SessionManager>, events: &EventBus, delay: Duration) -> Self {
        let (requests, mut request_rx) = mpsc::unbounded_channel();
        let mut event_rx = events.subscribe();
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut deadline: Option<Instant> = None;
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    event = event_rx.recv() => match event {
                        Ok(event) if event.is_persistent() => {
                            deadline = Some(Instant::now() + delay);
                        }
                        Ok(_) => {}
                        Err(RecvError::Lagged(skipped)) => {
                            debug!("Auto-save lagged {} events", skipped);
                            deadline = Some(Instant::now() + delay);
                        }
                        Err(RecvError::Closed) => break,
                    },
                    Some(()) = request_rx.recv() => {
                        deadline = Some(Instant::now() + delay);
                    }
                    _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                        deadline = None;
                        save(&manager).await;
                    }
                }
            }

            if deadline.is_some() {
                save(&manager).await;
            }
        });

        Self {
            requests,
            cancel,
            handle,
        }
    }

    /// Restart the quiet period without a state event
    pub fn request(&self) {
        let _ = self.requests.send(());
    }

    /// Stop watching. A save still pending is written before this returns.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            warn!("Auto-save task ended abnormally: {}", e);
        }
    }
}

async fn save(manager: &SessionManager) {
    match manager.save().await {
        Ok(()) => debug!("Auto-saved session"),
        Err(e) => warn!("Auto-save failed: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::events::StateEvent;
    use crate::use_cases::test_support::MemoryStore;
    use crate::workspace::Workspace;

    async fn setup() -> (Arc<MemoryStore>, Arc<SessionManager>, EventBus) {
        let store = Arc::new(MemoryStore::new());
        let events = EventBus::default();
        let manager = Arc::new(SessionManager::new(
            Arc::clone(&store) as Arc<dyn crate::ports::session_store::SessionStore>,
            Workspace::new(),
            events.clone(),
        ));
        manager.create().await.unwrap();
        (store, manager, events)
    }

    async fn settle() {
        // let the saver task observe queued messages
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_saves_once_at_trailing_edge() {
        let (store, manager, events) = setup().await;
        let baseline = store.save_count();
        let saver = AutoSaver::spawn(Arc::clone(&manager), &events, Duration::from_millis(1000));

        for _ in 0..5 {
            events.publish(StateEvent::ExpandChanged);
            settle().await;
            tokio::time::advance(Duration::from_millis(400)).await;
            settle().await;
        }
        // 2s into a continuous burst and nothing written yet
        assert_eq!(store.save_count(), baseline);

        tokio::time::advance(Duration::from_millis(700)).await;
        settle().await;
        assert_eq!(store.save_count(), baseline + 1);

        saver.shutdown().await;
        assert_eq!(store.save_count(), baseline + 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_switch_alone_does_not_save() {
        let (store, manager, events) = setup().await;
        let baseline = store.save_count();
        let saver = AutoSaver::spawn(Arc::clone(&manager), &events, Duration::from_millis(1000));

        events.publish(StateEvent::SessionSwitched {
            session_id: "x".to_string(),
        });
        settle().await;
        tokio::time::advance(Duration::from_secs(5)).await;
        settle().await;
        assert_eq!(store.save_count(), baseline);
        saver.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_flushes_pending_save() {
        let (store, manager, events) = setup().await;
        let baseline = store.save_count();
        let saver = AutoSaver::spawn(Arc::clone(&manager), &events, Duration::from_millis(1000));

        saver.request();
        settle().await;
        saver.shutdown().await;
        assert_eq!(store.save_count(), baseline + 1);
    }
}
