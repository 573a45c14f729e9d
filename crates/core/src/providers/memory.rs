use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use super::traits::{ChangeSource, SourceFeed};
use crate::errors::CoreError;
use crate::models::collection::{Collection, Notification, RawDocument, Snapshot};

#[derive(Debug, Clone)]
struct StoredDocument {
    user_id: String,
    document: RawDocument,
}

#[derive(Debug)]
struct Listener {
    feed_id: Uuid,
    collection: Collection,
    user_id: String,
    sender: mpsc::UnboundedSender<Notification>,
}

#[derive(Debug, Default)]
struct SourceState {
    /// Documents per collection, in insertion order
    documents: HashMap<Collection, Vec<StoredDocument>>,
    listeners: Vec<Listener>,
    pending_failures: HashMap<Collection, usize>,
    subscribe_calls: HashMap<Collection, usize>,
}

impl SourceState {
    fn snapshot_for(&self, collection: Collection, user_id: &str) -> Snapshot {
        let documents = self
            .documents
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| d.user_id == user_id)
                    .map(|d| d.document.clone())
                    .collect()
            })
            .unwrap_or_default();
        Snapshot::new(collection, documents)
    }

    /// Push a fresh snapshot to every listener of `collection` owned by `user_id`.
    fn broadcast(&mut self, collection: Collection, user_id: &str) {
        let snapshot = self.snapshot_for(collection, user_id);
        // Listeners whose receiver is gone are pruned on the way.
        self.listeners.retain(|l| {
            if l.collection != collection || l.user_id != user_id {
                return true;
            }
            l.sender
                .send(Notification::Snapshot(snapshot.clone()))
                .is_ok()
        });
    }
}

/// In-process document store with snapshot listeners.
///
/// Mirrors the behaviour of the hosted store: subscribing delivers the
/// current snapshot at once, and every write re-delivers the full filtered
/// collection to all listeners. Failure hooks let callers simulate an
/// unreliable connection.
#[derive(Debug, Default)]
pub struct InMemoryChangeSource {
    state: Mutex<SourceState>,
}

impl InMemoryChangeSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SourceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or replace a document owned by `user_id`. Replacement keeps position.
    pub fn upsert(&self, collection: Collection, user_id: &str, document: RawDocument) {
        let mut state = self.lock();
        let docs = state.documents.entry(collection).or_default();
        match docs.iter_mut().find(|d| d.document.id == document.id) {
            Some(existing) => {
                existing.user_id = user_id.to_string();
                existing.document = document;
            }
            None => docs.push(StoredDocument {
                user_id: user_id.to_string(),
                document,
            }),
        }
        state.broadcast(collection, user_id);
    }

    /// Remove a document. Returns false when no such document exists.
    pub fn remove(&self, collection: Collection, id: &str) -> bool {
        let mut state = self.lock();
        let Some(docs) = state.documents.get_mut(&collection) else {
            return false;
        };
        let Some(pos) = docs.iter().position(|d| d.document.id == id) else {
            return false;
        };
        let removed = docs.remove(pos);
        state.broadcast(collection, &removed.user_id);
        true
    }

    /// Deliver a transport error to every live feed of `collection`.
    pub fn inject_error(&self, collection: Collection, message: &str) {
        let state = self.lock();
        for listener in state.listeners.iter().filter(|l| l.collection == collection) {
            let _ = listener
                .sender
                .send(Notification::Error(message.to_string()));
        }
    }

    /// Reject the next `count` subscribe calls for `collection`.
    pub fn fail_next_subscribes(&self, collection: Collection, count: usize) {
        let mut state = self.lock();
        *state.pending_failures.entry(collection).or_insert(0) += count;
    }

    /// Drop every listener of `collection`, as a server-side disconnect would.
    pub fn disconnect(&self, collection: Collection) {
        let mut state = self.lock();
        state.listeners.retain(|l| l.collection != collection);
    }

    /// Total subscribe calls seen for `collection`, failed ones included.
    pub fn subscribe_count(&self, collection: Collection) -> usize {
        self.lock()
            .subscribe_calls
            .get(&collection)
            .copied()
            .unwrap_or(0)
    }

    /// Listeners currently registered for `collection`.
    pub fn active_feeds(&self, collection: Collection) -> usize {
        self.lock()
            .listeners
            .iter()
            .filter(|l| l.collection == collection)
            .count()
    }
}

#[async_trait]
impl ChangeSource for InMemoryChangeSource {
    fn name(&self) -> &str {
        "InMemory"
    }

    async fn subscribe(
        &self,
        collection: Collection,
        user_id: &str,
    ) -> Result<SourceFeed, CoreError> {
        let mut state = self.lock();
        *state.subscribe_calls.entry(collection).or_insert(0) += 1;

        if let Some(remaining) = state.pending_failures.get_mut(&collection) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(CoreError::Transport {
                    collection,
                    message: "connection refused".into(),
                });
            }
        }

        let (sender, receiver) = mpsc::unbounded_channel();
        let feed = SourceFeed::new(collection, receiver);
        let initial = state.snapshot_for(collection, user_id);
        // Cannot fail: the receiver is held by `feed`.
        let _ = sender.send(Notification::Snapshot(initial));
        state.listeners.push(Listener {
            feed_id: feed.id(),
            collection,
            user_id: user_id.to_string(),
            sender,
        });
        debug!(%collection, feed = %feed.id(), "Registered listener");
        Ok(feed)
    }

    fn unsubscribe(&self, feed: &SourceFeed) {
        let mut state = self.lock();
        let before = state.listeners.len();
        state.listeners.retain(|l| l.feed_id != feed.id());
        if state.listeners.len() < before {
            debug!(collection = %feed.collection(), feed = %feed.id(), "Released listener");
        }
    }
}
