//! Live document sources and the subscription handle they hand out.

use std::{future::Future, time::Duration};

use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::record::Document;

/// One complete delivery of the documents a subscription matches.
pub type Snapshot = Vec<Document>;

/// Failures reported by a source, either for a subscription or a write.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("invalid collection name: {0}")]
    InvalidCollection(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("storage failure: {0}")]
    Storage(String),
    #[error("write timed out after {0:?}")]
    Timeout(Duration),
}

/// What a subscription yields: a fresh snapshot or a subscription-level failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    Snapshot(Snapshot),
    Failed(SourceError),
}

/// Subscription request: one collection, one sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionQuery {
    pub collection: String,
    pub order_by: String,
    pub descending: bool,
}

impl CollectionQuery {
    /// Newest documents first, the order every view asks for.
    pub fn newest_first(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            order_by: "createdAt".into(),
            descending: true,
        }
    }
}

/// A remote (or in-process) document collection with push subscriptions.
pub trait LiveSource {
    /// Subscribe to full snapshots of one collection. The returned handle
    /// releases the registration when closed or dropped.
    fn subscribe(&self, query: &CollectionQuery) -> Result<Subscription, SourceError>;

    /// Append a document. `fields` carries the producer-assigned `createdAt`.
    fn add(
        &self,
        collection: &str,
        fields: Map<String, Value>,
    ) -> impl Future<Output = Result<Document, SourceError>> + Send;
}

/// Source-side sending half of a [`Subscription`].
#[derive(Debug, Clone)]
pub struct Feed {
    tx: mpsc::UnboundedSender<Delivery>,
}

impl Feed {
    /// Push a delivery. Returns `false` once the subscriber has gone away.
    pub fn deliver(&self, delivery: Delivery) -> bool {
        self.tx.send(delivery).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Resolves once the subscription has been closed or dropped.
    pub async fn closed(&self) {
        self.tx.closed().await
    }
}

/// Disposable subscription handle. Dropping it (or calling [`Subscription::close`])
/// releases the source registration; nothing delivered afterwards is observed.
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<Delivery>,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Create a connected feed/subscription pair. `release` runs exactly once,
    /// when the subscription is closed or dropped.
    pub fn channel(release: impl FnOnce() + Send + 'static) -> (Feed, Subscription) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Feed { tx },
            Subscription {
                rx,
                release: Some(Box::new(release)),
            },
        )
    }

    /// Wait for the next delivery. `None` once the source hung up.
    pub async fn next(&mut self) -> Option<Delivery> {
        self.rx.recv().await
    }

    /// Take an already queued delivery without waiting.
    pub fn try_next(&mut self) -> Option<Delivery> {
        self.rx.try_recv().ok()
    }

    /// Release the subscription.
    pub fn close(self) {
        drop(self)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.rx.close();
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("released", &self.release.is_none())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    #[test]
    fn release_runs_once_on_close() {
        let released = Arc::new(AtomicUsize::new(0));
        let counter = released.clone();
        let (feed, sub) = Subscription::channel(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(!feed.is_closed());
        sub.close();
        assert_eq!(released.load(Ordering::SeqCst), 1);
        assert!(feed.is_closed());
        assert!(!feed.deliver(Delivery::Snapshot(vec![])));
    }

    #[test]
    fn deliveries_keep_order() {
        let (feed, mut sub) = Subscription::channel(|| {});
        assert!(feed.deliver(Delivery::Snapshot(vec![])));
        assert!(feed.deliver(Delivery::Failed(SourceError::Transport("reset".into()))));
        assert_eq!(sub.try_next(), Some(Delivery::Snapshot(vec![])));
        assert_eq!(
            sub.try_next(),
            Some(Delivery::Failed(SourceError::Transport("reset".into())))
        );
        assert_eq!(sub.try_next(), None);
    }

    #[tokio::test]
    async fn next_ends_when_feed_dropped() {
        let (feed, mut sub) = Subscription::channel(|| {});
        feed.deliver(Delivery::Snapshot(vec![]));
        drop(feed);
        assert!(sub.next().await.is_some());
        assert!(sub.next().await.is_none());
    }

    #[test]
    fn newest_first_orders_by_created_at() {
        let q = CollectionQuery::newest_first("events");
        assert_eq!(q.order_by, "createdAt");
        assert!(q.descending);
    }
}
