use std::{
    future::Future,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use ranger::{
    filter::FilterSpec,
    normalize::normalize,
    record::{Document, Item, PartialItem},
    render::{CardTemplate, HtmlReconciler, Reveal, NO_RESULTS},
    source::{CollectionQuery, Delivery, Feed, LiveSource, SourceError, Subscription},
    submit::SubmitError,
    view::{LiveView, ViewConfig, ViewState},
};
use serde_json::{json, Map, Value};

#[derive(Clone, Copy)]
enum WriteMode {
    Fail,
    Hang,
}

/// Scripted source: the test pushes deliveries through the captured feed.
#[derive(Clone)]
struct ScriptedSource {
    feed: Arc<Mutex<Option<Feed>>>,
    released: Arc<AtomicBool>,
    writes: Arc<AtomicUsize>,
    mode: WriteMode,
}

impl ScriptedSource {
    fn new(mode: WriteMode) -> Self {
        Self {
            feed: Arc::new(Mutex::new(None)),
            released: Arc::new(AtomicBool::new(false)),
            writes: Arc::new(AtomicUsize::new(0)),
            mode,
        }
    }

    fn push(&self, docs: Vec<Value>) -> bool {
        let docs = docs.into_iter().filter_map(Document::from_value).collect();
        let feed = self.feed.lock().unwrap();
        feed.as_ref().map(|f| f.deliver(Delivery::Snapshot(docs))).unwrap_or(false)
    }
}

impl LiveSource for ScriptedSource {
    fn subscribe(&self, _query: &CollectionQuery) -> Result<Subscription, SourceError> {
        let released = self.released.clone();
        let (feed, sub) = Subscription::channel(move || released.store(true, Ordering::SeqCst));
        *self.feed.lock().unwrap() = Some(feed);
        Ok(sub)
    }

    fn add(
        &self,
        collection: &str,
        _fields: Map<String, Value>,
    ) -> impl Future<Output = Result<Document, SourceError>> + Send {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mode = self.mode;
        let collection = collection.to_string();
        async move {
            match mode {
                WriteMode::Fail => Err(SourceError::Storage(format!("{collection} is read-only"))),
                WriteMode::Hang => std::future::pending().await,
            }
        }
    }
}

fn seed() -> Vec<Item> {
    vec![normalize(&PartialItem::from(json!({
        "id": "seed-event-1",
        "title": "Seed Workshop",
        "location": "Panjim",
        "status": "upcoming"
    })))]
}

fn mounted(source: &ScriptedSource) -> LiveView<ScriptedSource, HtmlReconciler> {
    let mut view = LiveView::new(
        source.clone(),
        HtmlReconciler::new(CardTemplate::Event),
        ViewConfig::events().with_write_timeout(Duration::from_millis(50)),
        seed(),
    );
    view.mount();
    view
}

fn live_seminar() -> Value {
    json!({
        "id": "a1",
        "createdAt": "2025-03-01T00:00:00.000Z",
        "title": "Live Seminar",
        "location": "Margao",
        "status": "upcoming"
    })
}

#[test]
fn seed_live_filter_and_empty_snapshot() {
    let source = ScriptedSource::new(WriteMode::Fail);
    let mut view = mounted(&source);
    assert_eq!(view.reconciler().titles(), ["Seed Workshop"]);

    assert!(source.push(vec![live_seminar()]));
    view.pump();
    assert_eq!(view.state(), &ViewState::Live);
    assert_eq!(view.reconciler().titles(), ["Seed Workshop", "Live Seminar"]);

    assert!(view.reconciler_mut().reveal(1));
    assert!(!view.reconciler_mut().reveal(1));

    view.set_filter(FilterSpec::from_token("margao"));
    assert_eq!(view.reconciler().titles(), ["Live Seminar"]);
    // a repaint brings fresh, hidden cards
    assert!(view.reconciler().cards().all(|c| c.reveal == Reveal::Hidden));

    assert!(source.push(vec![]));
    view.pump();
    assert!(view.reconciler().titles().is_empty());
    assert!(view.reconciler().has_no_results());
    assert!(view.reconciler().html().contains(NO_RESULTS));
}

#[test]
fn empty_snapshot_under_all_keeps_seed_cards() {
    let source = ScriptedSource::new(WriteMode::Fail);
    let mut view = mounted(&source);
    assert!(source.push(vec![live_seminar()]));
    view.pump();
    view.set_filter(FilterSpec::All);
    assert_eq!(view.reconciler().titles(), ["Seed Workshop", "Live Seminar"]);

    assert!(source.push(vec![]));
    view.pump();
    assert_eq!(view.state(), &ViewState::Live);
    assert_eq!(view.reconciler().titles(), ["Seed Workshop"]);
    assert!(!view.reconciler().has_no_results());
    assert!(!view.reconciler().html().contains(NO_RESULTS));
}

#[test]
fn search_is_case_insensitive_and_overrides_chips() {
    let source = ScriptedSource::new(WriteMode::Fail);
    let mut view = mounted(&source);
    source.push(vec![json!({ "id": "n1", "title": "Phishing Alert", "location": "Vasco" })]);
    view.pump();
    view.set_filter(FilterSpec::from_token("panjim"));
    view.search("PHISH");
    assert_eq!(view.reconciler().titles(), ["Phishing Alert"]);
}

#[test]
fn nothing_renders_after_unmount() {
    let source = ScriptedSource::new(WriteMode::Fail);
    let mut view = mounted(&source);
    source.push(vec![live_seminar()]);
    view.pump();
    let renders = view.reconciler().render_count();

    view.unmount();
    assert!(!view.is_subscribed());
    assert!(source.released.load(Ordering::SeqCst));
    assert!(!source.push(vec![]));
    assert_eq!(view.pump(), 0);
    assert!(!view.handle(Delivery::Snapshot(vec![])));
    assert_eq!(view.reconciler().render_count(), renders);
    assert_eq!(view.reconciler().titles(), ["Seed Workshop", "Live Seminar"]);
}

#[tokio::test]
async fn failed_write_reenables_control_and_adds_nothing() {
    let source = ScriptedSource::new(WriteMode::Fail);
    let mut view = mounted(&source);
    source.push(vec![live_seminar()]);
    view.pump();
    let before = view.reconciler().titles().len();

    let draft = json!({ "title": "Rejected", "date": "2025-06-01" });
    let err = view.submit(draft.as_object().unwrap().clone()).await.unwrap_err();
    assert!(matches!(err, SubmitError::Write(SourceError::Storage(_))));
    assert!(view.control().is_enabled());
    assert_eq!(view.alerts().len(), 1);
    assert_eq!(view.reconciler().titles().len(), before);
    assert_eq!(source.writes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn hanging_write_times_out() {
    let source = ScriptedSource::new(WriteMode::Hang);
    let mut view = mounted(&source);
    let draft = json!({ "title": "Slow", "date": "2025-06-01" });
    let err = view.submit(draft.as_object().unwrap().clone()).await.unwrap_err();
    assert_eq!(
        err,
        SubmitError::Write(SourceError::Timeout(Duration::from_millis(50)))
    );
    assert!(view.control().is_enabled());
}

#[tokio::test]
async fn invalid_draft_never_reaches_source() {
    let source = ScriptedSource::new(WriteMode::Fail);
    let mut view = mounted(&source);
    let draft = json!({ "title": "  ", "date": null });
    let err = view.submit(draft.as_object().unwrap().clone()).await.unwrap_err();
    assert_eq!(
        err,
        SubmitError::Validation(vec!["title".into(), "date".into()])
    );
    assert_eq!(source.writes.load(Ordering::SeqCst), 0);
}

#[test]
fn dashboard_sections_subscribe_independently() {
    use ranger::store::Store;

    let dir = tempfile::TempDir::new().unwrap();
    let store = Store::new(dir.path().to_path_buf());
    store.init().unwrap();
    let section = |collection: &str| {
        let mut cfg = ViewConfig::events();
        cfg.collection = collection.to_string();
        let mut view = LiveView::new(store.clone(), HtmlReconciler::new(CardTemplate::Event), cfg, vec![]);
        view.mount();
        view.pump();
        view
    };
    let mut tasks = section("dashboardTasks");
    let mut notes = section("dashboardNotes");

    let fields = |title: &str| json!({ "title": title }).as_object().unwrap().clone();
    store.append("dashboardTasks", fields("Print flyers")).unwrap();
    store.append("dashboardNotes", fields("Call venue")).unwrap();
    tasks.pump();
    notes.pump();
    assert_eq!(tasks.reconciler().titles(), ["Print flyers"]);
    assert_eq!(notes.reconciler().titles(), ["Call venue"]);

    tasks.unmount();
    assert_eq!(store.watcher_count("dashboardTasks"), 0);
    store.append("dashboardNotes", fields("Book hall")).unwrap();
    notes.pump();
    assert_eq!(notes.reconciler().titles().len(), 2);
}
