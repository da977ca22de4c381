//! WebSocket push channel streaming full collection snapshots.
//!
//! Client → server: `["SUB", id, {"collection": name}]`, `["CLOSE", id]`.
//! Server → client: `["SNAPSHOT", id, [docs]]`, `["ERROR", id, message]`,
//! `["CLOSED", id]`.

use std::{collections::HashMap, future::Future, net::SocketAddr, sync::Arc};

use anyhow::Result;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{
    source::{CollectionQuery, Delivery},
    store::Store,
};

/// Start the WebSocket server.
pub async fn serve_ws(
    addr: SocketAddr,
    store: Store,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("ws listening on {}", listener.local_addr()?);
    axum::serve(listener, router(store).into_make_service())
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

pub fn router(store: Store) -> Router {
    Router::new()
        .route("/", get(handler))
        .with_state(Arc::new(store))
}

/// Handle the HTTP upgrade and spawn the connection processor.
async fn handler(ws: WebSocketUpgrade, State(store): State<Arc<Store>>) -> impl IntoResponse {
    ws.on_upgrade(|socket| async move { process(socket, store).await })
}

/// Per-connection subscription bookkeeping.
struct Connection {
    store: Arc<Store>,
    out: mpsc::UnboundedSender<Value>,
    subs: HashMap<String, JoinHandle<()>>,
}

impl Connection {
    /// Handle one client frame, returning an immediate reply if any.
    fn handle(&mut self, txt: &str) -> Option<Value> {
        let Ok(Value::Array(arr)) = serde_json::from_str::<Value>(txt) else {
            return None;
        };
        let sub_id = arr.get(1).and_then(|v| v.as_str())?.to_string();
        match arr.first().and_then(|v| v.as_str()) {
            Some("SUB") => {
                let Some(collection) = arr
                    .get(2)
                    .and_then(|f| f.get("collection"))
                    .and_then(|v| v.as_str())
                else {
                    return Some(json!(["ERROR", sub_id, "missing collection"]));
                };
                self.subscribe(sub_id, collection)
            }
            Some("CLOSE") => {
                if let Some(task) = self.subs.remove(&sub_id) {
                    task.abort();
                    debug!(sub = %sub_id, "subscription closed");
                }
                Some(json!(["CLOSED", sub_id]))
            }
            _ => None,
        }
    }

    fn subscribe(&mut self, sub_id: String, collection: &str) -> Option<Value> {
        // a repeated id replaces the previous subscription
        if let Some(old) = self.subs.remove(&sub_id) {
            old.abort();
        }
        let mut sub = match self.store.watch(&CollectionQuery::newest_first(collection)) {
            Ok(sub) => sub,
            Err(e) => {
                warn!(%collection, "subscription refused: {e}");
                return Some(json!(["ERROR", sub_id, e.to_string()]));
            }
        };
        debug!(sub = %sub_id, %collection, "subscription opened");
        let out = self.out.clone();
        let id = sub_id.clone();
        let task = tokio::spawn(async move {
            while let Some(delivery) = sub.next().await {
                let frame = match delivery {
                    Delivery::Snapshot(docs) => json!(["SNAPSHOT", id, docs]),
                    Delivery::Failed(e) => json!(["ERROR", id, e.to_string()]),
                };
                if out.send(frame).is_err() {
                    break;
                }
            }
        });
        self.subs.insert(sub_id, task);
        None
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        for (_, task) in self.subs.drain() {
            task.abort();
        }
    }
}

/// Process SUB/CLOSE frames and forward snapshots until the client leaves.
async fn process(mut socket: WebSocket, store: Arc<Store>) {
    let (out, mut outgoing) = mpsc::unbounded_channel::<Value>();
    let mut conn = Connection {
        store,
        out,
        subs: HashMap::new(),
    };
    loop {
        tokio::select! {
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Text(txt))) => {
                    if let Some(reply) = conn.handle(&txt) {
                        if socket.send(Message::Text(reply.to_string())).await.is_err() {
                            break;
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
            Some(frame) = outgoing.recv() => {
                if socket.send(Message::Text(frame.to_string())).await.is_err() {
                    break;
                }
            }
        }
    }
    debug!(subs = conn.subs.len(), "connection finished");
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::{SinkExt, StreamExt};
    use serde_json::Map;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio_tungstenite::tungstenite::protocol::Message as TungMessage;

    type Client = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    async fn spawn(store: &Store) -> (Client, JoinHandle<()>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(store.clone());
        let handle = tokio::spawn(async move {
            axum::serve(listener, app.into_make_service()).await.unwrap();
        });
        let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/"))
            .await
            .unwrap();
        (ws, handle)
    }

    async fn send(ws: &mut Client, frame: Value) {
        ws.send(TungMessage::Text(frame.to_string())).await.unwrap();
    }

    async fn recv(ws: &mut Client) -> Value {
        loop {
            match ws.next().await.unwrap().unwrap() {
                TungMessage::Text(t) => return serde_json::from_str(&t).unwrap(),
                _ => continue,
            }
        }
    }

    fn fields(v: Value) -> Map<String, Value> {
        v.as_object().unwrap().clone()
    }

    #[tokio::test]
    async fn sub_streams_snapshots_until_closed() {
        let dir = TempDir::new().unwrap();
        let store = Store::new(dir.path().to_path_buf());
        store.init().unwrap();
        store
            .append("events", fields(json!({ "title": "First", "createdAt": "2025-01-01T00:00:00.000Z" })))
            .unwrap();
        let (mut ws, handle) = spawn(&store).await;

        send(&mut ws, json!(["SUB", "s1", { "collection": "events" }])).await;
        let first = recv(&mut ws).await;
        assert_eq!(first[0], "SNAPSHOT");
        assert_eq!(first[1], "s1");
        assert_eq!(first[2].as_array().unwrap().len(), 1);

        store
            .append("events", fields(json!({ "title": "Second", "createdAt": "2025-02-01T00:00:00.000Z" })))
            .unwrap();
        let second = recv(&mut ws).await;
        assert_eq!(second[0], "SNAPSHOT");
        assert_eq!(second[2][0]["title"], "Second");
        assert_eq!(second[2][1]["title"], "First");

        send(&mut ws, json!(["CLOSE", "s1"])).await;
        assert_eq!(recv(&mut ws).await, json!(["CLOSED", "s1"]));
        let mut released = false;
        for _ in 0..50 {
            if store.watcher_count("events") == 0 {
                released = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(released);
        handle.abort();
    }

    #[tokio::test]
    async fn private_collections_answer_error() {
        let dir = TempDir::new().unwrap();
        let store = Store::new(dir.path().to_path_buf()).with_private(vec!["contactMessages".into()]);
        store.init().unwrap();
        let (mut ws, handle) = spawn(&store).await;
        send(&mut ws, json!(["SUB", "p", { "collection": "contactMessages" }])).await;
        let reply = recv(&mut ws).await;
        assert_eq!(reply[0], "ERROR");
        assert_eq!(reply[1], "p");
        assert!(reply[2].as_str().unwrap().starts_with("permission denied"));

        send(&mut ws, json!(["SUB", "q", {}])).await;
        assert_eq!(recv(&mut ws).await, json!(["ERROR", "q", "missing collection"]));
        handle.abort();
    }
}
