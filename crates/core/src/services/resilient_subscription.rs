use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use super::stream_subscription::StreamSubscription;
use super::StreamUpdate;
use crate::models::collection::{Collection, Notification};
use crate::models::dashboard::ConnectionState;
use crate::providers::traits::ChangeSource;

/// A [`StreamSubscription`] that reconnects on failure.
///
/// State machine:
/// - `Connecting` → first snapshot → `Live`
/// - `Connecting`/`Live` → error or lost feed → `Reconnecting { attempt: 1 }`, retry scheduled
/// - `Reconnecting` → reopen succeeds → `Live`; fails → `attempt + 1`, retry rescheduled
/// - any → `close()` → `Closed` (pending retry dropped)
///
/// The retry delay is fixed and attempts are unbounded. A failure to set
/// up the very first subscription is terminal (`Failed`) and reported once.
pub struct ResilientSubscription {
    source: Arc<dyn ChangeSource>,
    collection: Collection,
    user_id: String,
    retry_interval: Duration,
    state: ConnectionState,
    stream: Option<StreamSubscription>,
    retry_at: Option<Instant>,
    setup_failure: Option<String>,
}

impl std::fmt::Debug for ResilientSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilientSubscription")
            .field("collection", &self.collection)
            .field("state", &self.state)
            .field("retry_interval", &self.retry_interval)
            .field("retry_at", &self.retry_at)
            .finish()
    }
}

impl ResilientSubscription {
    /// Subscribe with reconnect support. Never fails: setup errors put the
    /// handle into the terminal `Failed` state instead.
    pub async fn open(
        source: Arc<dyn ChangeSource>,
        collection: Collection,
        user_id: &str,
        retry_interval: Duration,
    ) -> Self {
        let mut this = Self {
            source: Arc::clone(&source),
            collection,
            user_id: user_id.to_string(),
            retry_interval,
            state: ConnectionState::Connecting,
            stream: None,
            retry_at: None,
            setup_failure: None,
        };

        match StreamSubscription::open(source, collection, user_id).await {
            Ok(stream) => this.stream = Some(stream),
            Err(e) => {
                warn!(%collection, error = %e, "Subscription setup failed");
                this.state = ConnectionState::Failed;
                this.setup_failure = Some(e.to_string());
            }
        }
        this
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Whether presentation should flag connectivity trouble.
    pub fn is_degraded(&self) -> bool {
        matches!(
            self.state,
            ConnectionState::Reconnecting { .. } | ConnectionState::Failed
        )
    }

    /// Why setup failed, until the failure has been reported by `next_update`.
    pub fn setup_failure(&self) -> Option<&str> {
        self.setup_failure.as_deref()
    }

    /// When the pending retry fires, if one is scheduled.
    pub fn next_retry_at(&self) -> Option<Instant> {
        self.retry_at
    }

    /// Next update for the owner.
    ///
    /// Snapshots are passed through; each failure (including each failed
    /// reconnect attempt) yields `Degraded`. Retries happen inside this call
    /// once the retry delay has elapsed. Returns `None` after `close()`.
    /// Cancel-safe: the retry deadline is kept on `self`.
    pub async fn next_update(&mut self) -> Option<StreamUpdate> {
        loop {
            match self.state {
                ConnectionState::Closed => return None,
                ConnectionState::Failed => {
                    return self.setup_failure.take().map(StreamUpdate::Failed);
                }
                ConnectionState::Connecting | ConnectionState::Live => {
                    let notification = match self.stream.as_mut() {
                        Some(stream) => stream.next().await,
                        None => None,
                    };
                    return Some(match notification {
                        Some(Notification::Snapshot(snapshot)) => {
                            self.state = ConnectionState::Live;
                            StreamUpdate::Snapshot(snapshot)
                        }
                        Some(Notification::Error(message)) => self.schedule_retry(1, message),
                        None => self.schedule_retry(1, "feed ended unexpectedly".to_string()),
                    });
                }
                ConnectionState::Reconnecting { attempt } => {
                    if let Some(deadline) = self.retry_at {
                        sleep_until(deadline).await;
                    }
                    debug!(collection = %self.collection, attempt, "Reconnecting");
                    match StreamSubscription::open(
                        Arc::clone(&self.source),
                        self.collection,
                        &self.user_id,
                    )
                    .await
                    {
                        Ok(stream) => {
                            info!(collection = %self.collection, attempt, "Reconnected");
                            self.stream = Some(stream);
                            self.retry_at = None;
                            self.state = ConnectionState::Live;
                        }
                        Err(e) => return Some(self.schedule_retry(attempt + 1, e.to_string())),
                    }
                }
            }
        }
    }

    /// Drop the current feed and arm the fixed-interval retry timer.
    fn schedule_retry(&mut self, attempt: u32, message: String) -> StreamUpdate {
        if let Some(mut stream) = self.stream.take() {
            stream.close();
        }
        self.retry_at = Some(Instant::now() + self.retry_interval);
        self.state = ConnectionState::Reconnecting { attempt };
        warn!(
            collection = %self.collection,
            attempt,
            retry_in_ms = self.retry_interval.as_millis() as u64,
            %message,
            "Stream degraded, retry scheduled"
        );
        StreamUpdate::Degraded(message)
    }

    /// Close the feed and cancel any pending retry. Idempotent.
    pub fn close(&mut self) {
        if self.state == ConnectionState::Closed {
            return;
        }
        if let Some(mut stream) = self.stream.take() {
            stream.close();
        }
        self.retry_at = None;
        self.setup_failure = None;
        self.state = ConnectionState::Closed;
        debug!(collection = %self.collection, "Resilient subscription closed");
    }
}

impl Drop for ResilientSubscription {
    fn drop(&mut self) {
        self.close();
    }
}
