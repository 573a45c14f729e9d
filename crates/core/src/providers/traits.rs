use async_trait::async_trait;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::collection::{Collection, Notification};

/// A live feed of notifications for one (collection, user) query.
///
/// Dropping the feed stops delivery on the receiving side; the source
/// should still be told through [`ChangeSource::unsubscribe`] so it can
/// release its end.
#[derive(Debug)]
pub struct SourceFeed {
    id: Uuid,
    collection: Collection,
    receiver: mpsc::UnboundedReceiver<Notification>,
}

impl SourceFeed {
    pub fn new(collection: Collection, receiver: mpsc::UnboundedReceiver<Notification>) -> Self {
        Self {
            id: Uuid::new_v4(),
            collection,
            receiver,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    /// Next notification, or `None` once the source has released the feed.
    /// Cancel-safe.
    pub async fn recv(&mut self) -> Option<Notification> {
        self.receiver.recv().await
    }

    /// Stop accepting notifications; anything already queued is discarded.
    pub fn close(&mut self) {
        self.receiver.close();
        while self.receiver.try_recv().is_ok() {}
    }
}

/// Trait abstraction for the remote document store's change notifications.
///
/// The store is the source of truth. The dashboard only consumes full
/// snapshots from it and never writes back.
#[async_trait]
pub trait ChangeSource: Send + Sync {
    /// Human-readable name of this source (for logs/errors).
    fn name(&self) -> &str;

    /// Open a feed of snapshots for `collection` filtered to `user_id`.
    async fn subscribe(&self, collection: Collection, user_id: &str)
        -> Result<SourceFeed, CoreError>;

    /// Release the source side of a feed. Must tolerate unknown or
    /// already-released feeds.
    fn unsubscribe(&self, feed: &SourceFeed);
}

/// Supplies the authenticated user, if any.
pub trait IdentityProvider: Send + Sync {
    fn current_user_id(&self) -> Option<String>;
}
