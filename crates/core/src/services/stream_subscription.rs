use std::sync::Arc;

use tracing::{debug, warn};

use crate::errors::CoreError;
use crate::models::collection::{Collection, Notification};
use crate::providers::traits::{ChangeSource, SourceFeed};

/// One logical collection, filtered to one user, turned into a sequence of
/// full-collection snapshots.
///
/// Errors from the source are passed through untouched. Retrying is the
/// job of [`ResilientSubscription`](super::resilient_subscription::ResilientSubscription).
pub struct StreamSubscription {
    source: Arc<dyn ChangeSource>,
    collection: Collection,
    user_id: String,
    feed: Option<SourceFeed>,
}

impl std::fmt::Debug for StreamSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamSubscription")
            .field("source", &self.source.name())
            .field("collection", &self.collection)
            .field("open", &self.is_open())
            .finish()
    }
}

impl StreamSubscription {
    /// Subscribe to `collection` for `user_id`.
    pub async fn open(
        source: Arc<dyn ChangeSource>,
        collection: Collection,
        user_id: &str,
    ) -> Result<Self, CoreError> {
        let feed = source
            .subscribe(collection, user_id)
            .await
            .map_err(|e| match e {
                CoreError::Setup { .. } => e,
                other => CoreError::Setup {
                    collection,
                    message: other.to_string(),
                },
            })?;
        debug!(%collection, source = source.name(), "Subscription opened");

        Ok(Self {
            source,
            collection,
            user_id: user_id.to_string(),
            feed: Some(feed),
        })
    }

    /// Open a fresh subscription on the same source, collection and user.
    pub async fn reopen(&self) -> Result<Self, CoreError> {
        Self::open(Arc::clone(&self.source), self.collection, &self.user_id).await
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn is_open(&self) -> bool {
        self.feed.is_some()
    }

    /// Next notification in transport order.
    ///
    /// Returns `None` once closed or once the source has dropped the feed.
    /// Cancel-safe, so it can sit in a `select!`.
    pub async fn next(&mut self) -> Option<Notification> {
        let feed = self.feed.as_mut()?;
        let notification = feed.recv().await;
        match &notification {
            Some(Notification::Snapshot(snapshot)) => {
                debug!(collection = %self.collection, documents = snapshot.len(), "Snapshot received");
            }
            Some(Notification::Error(message)) => {
                warn!(collection = %self.collection, %message, "Transport error");
            }
            None => {
                debug!(collection = %self.collection, "Feed ended by source");
            }
        }
        notification
    }

    /// Stop notifications and release the source side. Idempotent.
    pub fn close(&mut self) {
        if let Some(mut feed) = self.feed.take() {
            self.source.unsubscribe(&feed);
            feed.close();
            debug!(collection = %self.collection, "Subscription closed");
        }
    }
}

impl Drop for StreamSubscription {
    fn drop(&mut self) {
        self.close();
    }
}
