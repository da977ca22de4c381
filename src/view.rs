//! Live view controller: one collection subscription feeding
//! normalize → merge → filter → render.

use std::time::Duration;

use serde_json::{Map, Value};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::{
    filter::{self, CategoryField, FilterSpec},
    merge::merge,
    normalize::normalize_all,
    record::{Document, Item},
    render::{CardTemplate, Frame, Reconciler},
    source::{CollectionQuery, Delivery, LiveSource, SourceError, Subscription},
    store::now_iso,
    submit::{validate, SubmitControl, SubmitError},
};

/// Default bound on an unacknowledged write.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_millis(15_000);

/// Notice shown in place of live content after a subscription failure.
pub const LIVE_UNAVAILABLE: &str = "Live updates are unavailable right now. Showing saved content.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Unsubscribed,
    Subscribing,
    Live,
    /// Subscription-level failure, with the reason.
    Error(String),
}

/// Per-page view settings.
#[derive(Debug, Clone)]
pub struct ViewConfig {
    pub collection: String,
    pub category: CategoryField,
    pub template: CardTemplate,
    /// Draft fields that must be non-blank before a write is attempted.
    pub required: Vec<String>,
    pub write_timeout: Duration,
}

impl ViewConfig {
    /// Events page: filtered by town, `title` and `date` required.
    pub fn events() -> Self {
        Self {
            collection: "events".into(),
            category: CategoryField::Location,
            template: CardTemplate::Event,
            required: vec!["title".into(), "date".into()],
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }

    /// News page: filtered by region, `title` required.
    pub fn news() -> Self {
        Self {
            collection: "news".into(),
            category: CategoryField::Region,
            template: CardTemplate::News,
            required: vec!["title".into()],
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }

    /// Action Hub: filtered by directory section, a tool needs a title and a link.
    pub fn tools() -> Self {
        Self {
            collection: "tools".into(),
            category: CategoryField::Category,
            template: CardTemplate::Tool,
            required: vec!["title".into(), "link".into()],
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }

    pub fn courses() -> Self {
        Self {
            collection: "courses".into(),
            category: CategoryField::Type,
            template: CardTemplate::Course,
            required: vec!["title".into()],
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }

    pub fn sanchar() -> Self {
        Self {
            collection: "sancharSaathi".into(),
            category: CategoryField::Type,
            template: CardTemplate::Info,
            required: vec!["title".into()],
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }

    /// Look up a preset by collection name.
    pub fn for_collection(name: &str) -> Option<Self> {
        match name {
            "events" => Some(Self::events()),
            "news" => Some(Self::news()),
            "tools" => Some(Self::tools()),
            "courses" => Some(Self::courses()),
            "sancharSaathi" => Some(Self::sanchar()),
            _ => None,
        }
    }

    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }
}

/// UI events processed by [`LiveView::drive`].
#[derive(Debug)]
pub enum ViewCommand {
    SetFilter(FilterSpec),
    Search(String),
    Submit {
        draft: Map<String, Value>,
        reply: Option<oneshot::Sender<Result<Document, SubmitError>>>,
    },
    Refresh,
    Unmount,
}

/// A mounted page section showing one live collection.
pub struct LiveView<S: LiveSource, R: Reconciler> {
    source: S,
    reconciler: R,
    config: ViewConfig,
    seed: Vec<Item>,
    live: Vec<Item>,
    active: FilterSpec,
    state: ViewState,
    subscription: Option<Subscription>,
    control: SubmitControl,
    alerts: Vec<String>,
    visible: Vec<Item>,
}

impl<S: LiveSource, R: Reconciler> LiveView<S, R> {
    pub fn new(source: S, reconciler: R, config: ViewConfig, seed: Vec<Item>) -> Self {
        Self {
            source,
            reconciler,
            config,
            seed,
            live: vec![],
            active: FilterSpec::All,
            state: ViewState::Unsubscribed,
            subscription: None,
            control: SubmitControl::default(),
            alerts: vec![],
            visible: vec![],
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn reconciler(&self) -> &R {
        &self.reconciler
    }

    pub fn reconciler_mut(&mut self) -> &mut R {
        &mut self.reconciler
    }

    /// Items currently on screen, after merge and filter.
    pub fn items(&self) -> &[Item] {
        &self.visible
    }

    pub fn active_filter(&self) -> &FilterSpec {
        &self.active
    }

    /// Chip tokens for the current merged collection (`all` first, then the
    /// distinct category values).
    pub fn chip_tokens(&self) -> Vec<String> {
        let merged = merge(&self.seed, &self.live);
        std::iter::once("all".to_string())
            .chain(filter::category_tokens(&merged, self.config.category))
            .collect()
    }

    /// Handle to the submit control; clones observe the same busy state.
    pub fn control(&self) -> SubmitControl {
        self.control.clone()
    }

    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Render the seed right away and subscribe to the collection.
    pub fn mount(&mut self) {
        if self.state != ViewState::Unsubscribed {
            return;
        }
        self.repaint();
        self.state = ViewState::Subscribing;
        let query = CollectionQuery::newest_first(self.config.collection.clone());
        match self.source.subscribe(&query) {
            Ok(sub) => {
                debug!(collection = %self.config.collection, "subscribed");
                self.subscription = Some(sub);
            }
            Err(e) => self.fail(e),
        }
    }

    /// Process one delivery to completion. Returns `false` when the view is
    /// not subscribed and the delivery was dropped.
    pub fn handle(&mut self, delivery: Delivery) -> bool {
        if self.subscription.is_none() {
            debug!(collection = %self.config.collection, "dropping delivery for unmounted view");
            return false;
        }
        match delivery {
            Delivery::Snapshot(docs) => {
                self.live = normalize_all(docs);
                if self.state != ViewState::Live {
                    info!(collection = %self.config.collection, "live");
                }
                self.state = ViewState::Live;
                self.repaint();
            }
            Delivery::Failed(e) => self.fail(e),
        }
        true
    }

    /// Drain every delivery already queued on the subscription.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Some(delivery) = self.subscription.as_mut().and_then(|s| s.try_next()) {
            if self.handle(delivery) {
                handled += 1;
            }
        }
        handled
    }

    /// Wait for the next delivery and process it. `false` once the source
    /// hung up or the view is unmounted.
    pub async fn next_event(&mut self) -> bool {
        match next_delivery(&mut self.subscription).await {
            Some(delivery) => self.handle(delivery),
            None => false,
        }
    }

    /// Replace the active filter.
    pub fn set_filter(&mut self, spec: FilterSpec) {
        self.active = spec;
        self.repaint();
    }

    /// Replace the active filter with a search. A blank term shows everything.
    pub fn search(&mut self, term: &str) {
        self.set_filter(FilterSpec::Search(term.to_string()));
    }

    pub fn refresh(&mut self) {
        self.repaint();
    }

    /// Release the subscription. Later deliveries are never rendered.
    pub fn unmount(&mut self) {
        if let Some(sub) = self.subscription.take() {
            sub.close();
            debug!(collection = %self.config.collection, "unsubscribed");
        }
        self.state = ViewState::Unsubscribed;
    }

    /// Validate and write a draft. The written item shows up only through a
    /// later snapshot; on failure an alert is recorded and the draft dropped.
    pub async fn submit(&mut self, mut draft: Map<String, Value>) -> Result<Document, SubmitError> {
        if let Err(e) = validate(&draft, &self.config.required) {
            self.alerts.push(e.to_string());
            return Err(e);
        }
        let _busy = match self.control.acquire() {
            Ok(guard) => guard,
            Err(e) => {
                self.alerts.push(e.to_string());
                return Err(e);
            }
        };
        draft.insert("createdAt".into(), Value::String(now_iso()));
        let timeout = self.config.write_timeout;
        let write = self.source.add(&self.config.collection, draft);
        let result = match tokio::time::timeout(timeout, write).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::Timeout(timeout)),
        };
        match result {
            Ok(doc) => {
                info!(collection = %self.config.collection, id = %doc.id, "draft saved");
                Ok(doc)
            }
            Err(e) => {
                warn!(collection = %self.config.collection, "write failed: {e}");
                let e = SubmitError::Write(e);
                self.alerts.push(e.to_string());
                Err(e)
            }
        }
    }

    /// Apply one UI command. Returns `false` for [`ViewCommand::Unmount`].
    pub async fn apply(&mut self, command: ViewCommand) -> bool {
        match command {
            ViewCommand::SetFilter(spec) => self.set_filter(spec),
            ViewCommand::Search(term) => self.search(&term),
            ViewCommand::Refresh => self.refresh(),
            ViewCommand::Submit { draft, reply } => {
                let result = self.submit(draft).await;
                if let Some(reply) = reply {
                    let _ = reply.send(result);
                }
            }
            ViewCommand::Unmount => return false,
        }
        true
    }

    /// Own the view on one task: mount, then process deliveries and commands
    /// one at a time until unmounted or the command channel closes.
    pub async fn drive(mut self, mut commands: mpsc::UnboundedReceiver<ViewCommand>) -> Self {
        self.mount();
        loop {
            tokio::select! {
                command = commands.recv() => {
                    let Some(command) = command else { break };
                    if !self.apply(command).await {
                        break;
                    }
                }
                Some(delivery) = next_delivery(&mut self.subscription) => {
                    self.handle(delivery);
                }
            }
        }
        self.unmount();
        self
    }

    fn fail(&mut self, e: SourceError) {
        error!(collection = %self.config.collection, "subscription failed: {e}");
        self.state = ViewState::Error(e.to_string());
        self.live.clear();
        self.repaint();
    }

    fn repaint(&mut self) {
        let merged = merge(&self.seed, &self.live);
        self.visible = filter::apply(&merged, &self.active, self.config.category);
        let notice = match self.state {
            ViewState::Error(_) => Some(LIVE_UNAVAILABLE.to_string()),
            _ => None,
        };
        self.reconciler.render(&Frame {
            items: self.visible.clone(),
            notice,
        });
    }
}

async fn next_delivery(sub: &mut Option<Subscription>) -> Option<Delivery> {
    match sub {
        Some(sub) => sub.next().await,
        None => std::future::pending().await,
    }
}
