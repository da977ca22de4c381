//! Client for a remote `ranger serve` instance: WebSocket snapshot
//! subscriptions and HTTP writes.

use std::{future::Future, time::Duration};

use anyhow::{anyhow, bail, Result};
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Map, Value};
use tokio::time::sleep;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, warn};
use url::Url;

use crate::{
    record::Document,
    source::{CollectionQuery, Delivery, Feed, LiveSource, SourceError, Subscription},
};

/// Delay before the transport reconnects after a dropped connection.
const RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// [`LiveSource`] backed by a remote server.
#[derive(Clone, Debug)]
pub struct RemoteSource {
    ws_url: String,
    http_base: Url,
    client: reqwest::Client,
    reconnect: Duration,
}

impl RemoteSource {
    pub fn new(ws_url: &str, http_base: &str) -> Result<Self> {
        check_ws_url(ws_url)?;
        let mut http_base = Url::parse(http_base)?;
        if !http_base.path().ends_with('/') {
            let path = format!("{}/", http_base.path());
            http_base.set_path(&path);
        }
        Ok(Self {
            ws_url: ws_url.to_string(),
            http_base,
            client: reqwest::Client::new(),
            reconnect: RECONNECT_DELAY,
        })
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect = delay;
        self
    }

    fn collection_url(&self, collection: &str) -> Result<Url, SourceError> {
        self.http_base
            .join(&format!("collections/{collection}"))
            .map_err(|e| SourceError::InvalidCollection(format!("{collection}: {e}")))
    }
}

impl LiveSource for RemoteSource {
    fn subscribe(&self, query: &CollectionQuery) -> Result<Subscription, SourceError> {
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|e| SourceError::Transport(e.to_string()))?;
        let (feed, sub) = Subscription::channel(|| {});
        let url = self.ws_url.clone();
        let collection = query.collection.clone();
        let delay = self.reconnect;
        runtime.spawn(async move {
            tokio::select! {
                _ = feed.closed() => debug!(%collection, "remote subscription released"),
                _ = follow(&url, &collection, &feed, delay) => {}
            }
        });
        Ok(sub)
    }

    fn add(
        &self,
        collection: &str,
        fields: Map<String, Value>,
    ) -> impl Future<Output = Result<Document, SourceError>> + Send {
        let client = self.client.clone();
        let target = self.collection_url(collection);
        let collection = collection.to_string();
        async move {
            let resp = client
                .post(target?)
                .json(&fields)
                .send()
                .await
                .map_err(transport)?;
            match resp.status() {
                s if s.is_success() => resp.json::<Document>().await.map_err(transport),
                reqwest::StatusCode::FORBIDDEN => Err(SourceError::PermissionDenied(collection)),
                reqwest::StatusCode::BAD_REQUEST => Err(SourceError::InvalidCollection(collection)),
                s => Err(SourceError::Storage(format!("server answered {s}"))),
            }
        }
    }
}

/// Keep one subscription alive, reconnecting after transport failures until
/// the server refuses the subscription or the subscriber goes away.
async fn follow(url: &str, collection: &str, feed: &Feed, delay: Duration) {
    loop {
        match stream_snapshots(url, collection, feed).await {
            Ok(Done) => return,
            Err(e) => {
                warn!(%collection, "remote subscription error: {e}");
                if !feed.deliver(Delivery::Failed(SourceError::Transport(e.to_string()))) {
                    return;
                }
            }
        }
        sleep(delay).await;
    }
}

/// The server refused the subscription or the subscriber went away.
struct Done;

async fn stream_snapshots(url: &str, collection: &str, feed: &Feed) -> Result<Done> {
    let (mut ws, _) = connect_async(url).await?;
    let sub_id = "live";
    let req = json!(["SUB", sub_id, { "collection": collection }]);
    ws.send(Message::Text(req.to_string())).await?;
    while let Some(msg) = ws.next().await {
        let txt = match msg? {
            Message::Text(txt) => txt,
            Message::Close(_) => break,
            _ => continue,
        };
        let Ok(Value::Array(arr)) = serde_json::from_str::<Value>(&txt) else {
            continue;
        };
        if arr.get(1).and_then(|v| v.as_str()) != Some(sub_id) {
            continue;
        }
        match arr.first().and_then(|v| v.as_str()) {
            Some("SNAPSHOT") => {
                let docs = match arr.get(2) {
                    Some(Value::Array(items)) => items
                        .iter()
                        .cloned()
                        .filter_map(Document::from_value)
                        .collect(),
                    _ => vec![],
                };
                if !feed.deliver(Delivery::Snapshot(docs)) {
                    return Ok(Done);
                }
            }
            Some("ERROR") => {
                let message = arr.get(2).and_then(|v| v.as_str()).unwrap_or("unknown error");
                let err = wire_error(collection, message);
                feed.deliver(Delivery::Failed(err.clone()));
                if matches!(
                    err,
                    SourceError::PermissionDenied(_) | SourceError::InvalidCollection(_)
                ) {
                    return Ok(Done);
                }
            }
            _ => {}
        }
    }
    Err(anyhow!("connection closed"))
}

fn wire_error(collection: &str, message: &str) -> SourceError {
    if message.starts_with("permission denied") {
        SourceError::PermissionDenied(collection.to_string())
    } else if message.starts_with("invalid collection") {
        SourceError::InvalidCollection(collection.to_string())
    } else {
        SourceError::Transport(message.to_string())
    }
}

fn transport(e: reqwest::Error) -> SourceError {
    if e.is_timeout() {
        SourceError::Transport(format!("timeout: {e}"))
    } else {
        SourceError::Transport(e.to_string())
    }
}

/// Validate a `ws://`/`wss://` endpoint.
pub fn check_ws_url(url: &str) -> Result<()> {
    let parsed = Url::parse(url)?;
    match parsed.scheme() {
        "ws" | "wss" => Ok(()),
        other => bail!("unsupported websocket scheme: {other}"),
    }
}
