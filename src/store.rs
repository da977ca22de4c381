//! File-backed document collections with full-snapshot subscriptions.
//!
//! Layout under the store root:
//!
//! ```text
//! collections/<name>/<id>.json   one document per file
//! log/<name>.ndjson              append-only write log
//! ```

use std::{
    collections::HashMap,
    fs,
    io::Write,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard,
    },
};

use chrono::{SecondsFormat, Utc};
use rand::Rng;
use serde_json::{to_writer, Map, Value};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::{
    record::Document,
    source::{CollectionQuery, Delivery, Feed, LiveSource, Snapshot, SourceError, Subscription},
};

/// Length of the hex document id.
const ID_LEN: usize = 20;

/// Attempts at an unlocked initial snapshot before `watch` reads under the lock.
const WATCH_RETRIES: usize = 8;

struct Watcher {
    id: u64,
    collection: String,
    feed: Feed,
}

#[derive(Default)]
struct Watchers {
    list: Vec<Watcher>,
    /// Write generation of the last snapshot pushed per collection.
    delivered: HashMap<String, u64>,
}

/// Persistent document store rooted at `root`.
#[derive(Clone)]
pub struct Store {
    root: PathBuf,
    private: Arc<Vec<String>>,
    watchers: Arc<Mutex<Watchers>>,
    next_watcher: Arc<AtomicU64>,
    /// Bumped after every persisted write.
    generation: Arc<AtomicU64>,
}

impl Store {
    /// Create a new store rooted at `root`.
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            private: Arc::new(Vec::new()),
            watchers: Arc::new(Mutex::new(Watchers::default())),
            next_watcher: Arc::new(AtomicU64::new(0)),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Mark collections that can be written by the server but never read or
    /// written by public clients (raw submissions).
    pub fn with_private(mut self, collections: Vec<String>) -> Self {
        self.private = Arc::new(collections);
        self
    }

    pub fn is_private(&self, collection: &str) -> bool {
        self.private.iter().any(|c| c == collection)
    }

    /// Ensure the on-disk directory structure exists.
    pub fn init(&self) -> anyhow::Result<()> {
        for d in ["collections", "log"] {
            fs::create_dir_all(self.root.join(d))?;
        }
        Ok(())
    }

    /// Append a new document, stamping `createdAt` with the current time when
    /// the producer did not supply one. Every call stores a new document, even
    /// when its content repeats an earlier one. Subscribers receive a fresh
    /// snapshot.
    pub fn append(&self, collection: &str, mut fields: Map<String, Value>) -> Result<Document, SourceError> {
        check_name(collection)?;
        let created_at = match fields.remove("createdAt") {
            Some(Value::String(s)) if !s.trim().is_empty() => s,
            _ => now_iso(),
        };
        fields.remove("id");
        let id = document_id(collection, &created_at, &fields, rand::thread_rng().gen());
        let doc = Document {
            id,
            created_at,
            fields,
        };
        let path = self.document_path(collection, &doc.id);
        if path.exists() {
            return Err(SourceError::Storage(format!("document id collision: {}", doc.id)));
        }
        self.write_document(collection, &path, &doc).map_err(storage)?;
        self.notify(collection);
        Ok(doc)
    }

    /// Store a document under its existing id. Re-ingesting an id is a no-op.
    pub fn ingest(&self, collection: &str, doc: &Document) -> Result<(), SourceError> {
        check_name(collection)?;
        check_name(&doc.id).map_err(|_| SourceError::Storage(format!("invalid document id: {:?}", doc.id)))?;
        let path = self.document_path(collection, &doc.id);
        if path.exists() {
            debug!(collection, id = %doc.id, "document already stored");
            return Ok(());
        }
        self.write_document(collection, &path, doc).map_err(storage)?;
        self.notify(collection);
        Ok(())
    }

    fn write_document(&self, collection: &str, path: &Path, doc: &Document) -> anyhow::Result<()> {
        // Write the document atomically to its canonical path.
        let parent_dir = path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));
        fs::create_dir_all(&parent_dir)?;
        let tmp = tempfile::NamedTempFile::new_in(&parent_dir)?;
        to_writer(&tmp, doc)?;
        tmp.persist(path)?;

        // Append to the per-collection log for easy tailing.
        let log_dir = self.root.join("log");
        fs::create_dir_all(&log_dir)?;
        let mut log_file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_dir.join(format!("{collection}.ndjson")))?;
        serde_json::to_writer(&mut log_file, doc)?;
        log_file.write_all(b"\n")?;
        self.generation.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    /// Every document of `collection`, newest `createdAt` first. Ties are
    /// broken by id so repeated reads are identical.
    pub fn snapshot(&self, collection: &str) -> Result<Snapshot, SourceError> {
        check_name(collection)?;
        let dir = self.root.join("collections").join(collection);
        if !dir.exists() {
            return Ok(vec![]);
        }
        let mut docs = vec![];
        for entry in walkdir::WalkDir::new(&dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(storage)?;
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().map_or(true, |e| e != "json") {
                continue;
            }
            let data = fs::read_to_string(path).map_err(storage)?;
            match serde_json::from_str::<Document>(&data) {
                Ok(doc) => docs.push(doc),
                Err(e) => warn!(path = %path.display(), "skipping unreadable document: {e}"),
            }
        }
        docs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(docs)
    }

    /// Register a watcher and deliver the current snapshot right away.
    pub fn watch(&self, query: &CollectionQuery) -> Result<Subscription, SourceError> {
        check_name(&query.collection)?;
        if self.is_private(&query.collection) {
            return Err(SourceError::PermissionDenied(query.collection.clone()));
        }
        let id = self.next_watcher.fetch_add(1, Ordering::Relaxed);
        let watchers = self.watchers.clone();
        let (feed, sub) = Subscription::channel(move || {
            lock(&watchers).list.retain(|w| w.id != id);
        });
        // The snapshot is read without the lock. It is only used when no write
        // landed between the read and the registration; otherwise read again.
        let mut registered = None;
        for _ in 0..WATCH_RETRIES {
            let seen = self.generation.load(Ordering::SeqCst);
            let delivery = self.delivery(&query.collection);
            let guard = lock(&self.watchers);
            if self.generation.load(Ordering::SeqCst) == seen {
                feed.deliver(delivery);
                registered = Some(guard);
                break;
            }
        }
        let mut registered = match registered {
            Some(guard) => guard,
            None => {
                debug!(collection = %query.collection, "writes kept racing, snapshot under lock");
                let guard = lock(&self.watchers);
                feed.deliver(self.delivery(&query.collection));
                guard
            }
        };
        registered.list.push(Watcher {
            id,
            collection: query.collection.clone(),
            feed,
        });
        debug!(collection = %query.collection, watcher = id, "watch registered");
        Ok(sub)
    }

    /// Number of live watchers on `collection`.
    pub fn watcher_count(&self, collection: &str) -> usize {
        lock(&self.watchers)
            .list
            .iter()
            .filter(|w| w.collection == collection)
            .count()
    }

    fn delivery(&self, collection: &str) -> Delivery {
        match self.snapshot(collection) {
            Ok(docs) => Delivery::Snapshot(docs),
            Err(e) => Delivery::Failed(e),
        }
    }

    /// Push a fresh snapshot to every watcher of `collection`, pruning the
    /// ones whose subscriber went away. The directory is read outside the
    /// lock; a snapshot older than one already pushed is dropped.
    fn notify(&self, collection: &str) {
        if !lock(&self.watchers).list.iter().any(|w| w.collection == collection) {
            return;
        }
        let seen = self.generation.load(Ordering::SeqCst);
        let delivery = self.delivery(collection);
        let mut watchers = lock(&self.watchers);
        let last = watchers.delivered.entry(collection.to_string()).or_default();
        if seen <= *last {
            debug!(collection, generation = seen, "newer snapshot already pushed");
            return;
        }
        *last = seen;
        watchers
            .list
            .retain(|w| w.collection != collection || w.feed.deliver(delivery.clone()));
    }

    /// Compute the canonical path for a document.
    fn document_path(&self, collection: &str, id: &str) -> PathBuf {
        self.root
            .join("collections")
            .join(collection)
            .join(format!("{id}.json"))
    }
}

impl LiveSource for Store {
    fn subscribe(&self, query: &CollectionQuery) -> Result<Subscription, SourceError> {
        self.watch(query)
    }

    fn add(
        &self,
        collection: &str,
        fields: Map<String, Value>,
    ) -> impl std::future::Future<Output = Result<Document, SourceError>> + Send {
        let store = self.clone();
        let collection = collection.to_string();
        async move {
            if store.is_private(&collection) {
                return Err(SourceError::PermissionDenied(collection));
            }
            tokio::task::spawn_blocking(move || store.append(&collection, fields))
                .await
                .map_err(storage)?
        }
    }
}

/// Document id derived from the content and a per-write nonce.
pub(crate) fn document_id(collection: &str, created_at: &str, fields: &Map<String, Value>, nonce: u64) -> String {
    let arr = serde_json::json!([collection, created_at, fields, nonce]);
    let data = serde_json::to_vec(&arr).unwrap_or_default();
    let hash = Sha256::digest(&data);
    let mut id = hex::encode(hash);
    id.truncate(ID_LEN);
    id
}

/// Current time as an ISO-8601 string with millisecond precision.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Collection names and ids double as path components.
fn check_name(name: &str) -> Result<(), SourceError> {
    let ok = !name.is_empty()
        && name.len() <= 128
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(SourceError::InvalidCollection(name.to_string()))
    }
}

fn storage(e: impl std::fmt::Display) -> SourceError {
    SourceError::Storage(e.to_string())
}

fn lock(watchers: &Mutex<Watchers>) -> MutexGuard<'_, Watchers> {
    watchers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn fields(v: Value) -> Map<String, Value> {
        v.as_object().unwrap().clone()
    }

    fn store(dir: &TempDir) -> Store {
        let store = Store::new(dir.path().to_path_buf())
            .with_private(vec!["contactMessages".into()]);
        store.init().unwrap();
        store
    }

    #[test]
    fn init_creates_layout() {
        let dir = TempDir::new().unwrap();
        store(&dir);
        assert!(dir.path().join("collections").exists());
        assert!(dir.path().join("log").exists());
    }

    #[test]
    fn append_assigns_id_and_keeps_producer_timestamp() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let doc = store
            .append(
                "events",
                fields(json!({ "title": "Workshop", "createdAt": "2025-01-01T00:00:00.000Z", "id": "spoofed" })),
            )
            .unwrap();
        assert_eq!(doc.id.len(), ID_LEN);
        assert_ne!(doc.id, "spoofed");
        assert_eq!(doc.created_at, "2025-01-01T00:00:00.000Z");
        assert!(dir
            .path()
            .join(format!("collections/events/{}.json", doc.id))
            .exists());
        let log = fs::read_to_string(dir.path().join("log/events.ndjson")).unwrap();
        assert_eq!(log.lines().count(), 1);
    }

    #[test]
    fn append_stamps_missing_timestamp() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let doc = store.append("news", fields(json!({ "title": "Alert" }))).unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(&doc.created_at).is_ok());
    }

    #[test]
    fn ingest_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let doc = Document {
            id: "abcd".into(),
            created_at: "2025-01-01T00:00:00.000Z".into(),
            fields: fields(json!({ "title": "Once" })),
        };
        store.ingest("events", &doc).unwrap();
        store.ingest("events", &doc).unwrap();
        assert_eq!(store.snapshot("events").unwrap().len(), 1);
        let log = fs::read_to_string(dir.path().join("log/events.ndjson")).unwrap();
        assert_eq!(log.lines().count(), 1);
    }

    #[test]
    fn snapshot_is_newest_first() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        for (title, ts) in [
            ("old", "2025-01-01T00:00:00.000Z"),
            ("new", "2025-03-01T00:00:00.000Z"),
            ("mid", "2025-02-01T00:00:00.000Z"),
        ] {
            store
                .append("events", fields(json!({ "title": title, "createdAt": ts })))
                .unwrap();
        }
        let titles: Vec<_> = store
            .snapshot("events")
            .unwrap()
            .into_iter()
            .map(|d| d.fields["title"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(titles, ["new", "mid", "old"]);
    }

    #[test]
    fn snapshot_of_missing_collection_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        assert!(store.snapshot("nothing").unwrap().is_empty());
    }

    #[test]
    fn rejects_path_like_names() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        assert!(matches!(
            store.snapshot("../etc"),
            Err(SourceError::InvalidCollection(_))
        ));
        assert!(store.append("a/b", Map::new()).is_err());
    }

    #[test]
    fn watch_delivers_initial_and_subsequent_snapshots() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let mut sub = store.watch(&CollectionQuery::newest_first("events")).unwrap();
        assert_eq!(sub.try_next(), Some(Delivery::Snapshot(vec![])));
        store.append("events", fields(json!({ "title": "A" }))).unwrap();
        store.append("news", fields(json!({ "title": "elsewhere" }))).unwrap();
        match sub.try_next() {
            Some(Delivery::Snapshot(docs)) => assert_eq!(docs.len(), 1),
            other => panic!("unexpected delivery: {other:?}"),
        }
        assert_eq!(sub.try_next(), None);
    }

    #[test]
    fn closing_releases_the_watcher() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let sub = store.watch(&CollectionQuery::newest_first("events")).unwrap();
        assert_eq!(store.watcher_count("events"), 1);
        sub.close();
        assert_eq!(store.watcher_count("events"), 0);
        store.append("events", fields(json!({ "title": "A" }))).unwrap();
        assert_eq!(store.watcher_count("events"), 0);
    }

    #[test]
    fn private_collections_refuse_subscriptions() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let err = store
            .watch(&CollectionQuery::newest_first("contactMessages"))
            .unwrap_err();
        assert_eq!(err, SourceError::PermissionDenied("contactMessages".into()));
        // server-side appends still work
        store
            .append("contactMessages", fields(json!({ "name": "A" })))
            .unwrap();
    }

    #[tokio::test]
    async fn public_add_respects_privacy() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        assert!(store.add("events", fields(json!({ "title": "ok" }))).await.is_ok());
        assert!(matches!(
            store.add("contactMessages", Map::new()).await,
            Err(SourceError::PermissionDenied(_))
        ));
    }

    #[test]
    fn document_id_depends_on_content_and_nonce() {
        let a = document_id("events", "t", &fields(json!({ "title": "A" })), 1);
        let b = document_id("events", "t", &fields(json!({ "title": "B" })), 1);
        assert_ne!(a, b);
        assert_eq!(a, document_id("events", "t", &fields(json!({ "title": "A" })), 1));
        assert_ne!(a, document_id("events", "t", &fields(json!({ "title": "A" })), 2));
    }

    #[test]
    fn identical_appends_are_stored_separately() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let mut sub = store.watch(&CollectionQuery::newest_first("events")).unwrap();
        assert_eq!(sub.try_next(), Some(Delivery::Snapshot(vec![])));

        let same = json!({ "title": "Dup", "createdAt": "2025-01-01T00:00:00.000Z" });
        let a = store.append("events", fields(same.clone())).unwrap();
        let b = store.append("events", fields(same)).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(store.snapshot("events").unwrap().len(), 2);
        let log = fs::read_to_string(dir.path().join("log/events.ndjson")).unwrap();
        assert_eq!(log.lines().count(), 2);

        let mut sizes = vec![];
        while let Some(Delivery::Snapshot(docs)) = sub.try_next() {
            sizes.push(docs.len());
        }
        assert_eq!(sizes, [1, 2]);
    }

    #[tokio::test]
    async fn identical_adds_both_land() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let draft = json!({ "title": "Same", "createdAt": "2025-02-01T00:00:00.000Z" });
        let a = store.add("news", fields(draft.clone())).await.unwrap();
        let b = store.add("news", fields(draft)).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(store.snapshot("news").unwrap().len(), 2);
    }

    #[test]
    fn stale_snapshot_is_not_pushed_after_a_newer_one() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let mut sub = store.watch(&CollectionQuery::newest_first("events")).unwrap();
        sub.try_next();
        store.append("events", fields(json!({ "title": "A" }))).unwrap();
        assert!(matches!(sub.try_next(), Some(Delivery::Snapshot(d)) if d.len() == 1));
        // a notify that observed no new write since the last push is dropped
        store.notify("events");
        assert_eq!(sub.try_next(), None);
    }

    #[test]
    fn concurrent_appends_end_on_the_full_snapshot() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let mut sub = store.watch(&CollectionQuery::newest_first("events")).unwrap();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    store.append("events", fields(json!({ "title": format!("t{i}") }))).unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let mut last = None;
        while let Some(Delivery::Snapshot(docs)) = sub.try_next() {
            last = Some(docs.len());
        }
        assert_eq!(last, Some(8));
    }
}
