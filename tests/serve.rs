use assert_cmd::prelude::*;
use futures_util::{SinkExt, StreamExt};
use std::{fs, net::TcpListener, process::Command, time::Duration};
use tempfile::TempDir;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::tungstenite::protocol::Message;

fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

async fn next_json<S>(ws: &mut S) -> serde_json::Value
where
    S: StreamExt<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        let msg = timeout(Duration::from_secs(5), ws.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        if let Message::Text(t) = msg {
            return serde_json::from_str(&t).unwrap();
        }
    }
}

#[tokio::test]
async fn serve_cli_runs_http_and_ws() {
    let dir = TempDir::new().unwrap();
    let http_port = free_port();
    let ws_port = free_port();
    let env_path = dir.path().join("env");
    fs::write(
        &env_path,
        format!(
            "STORE_ROOT={}\nBIND_HTTP=127.0.0.1:{}\nBIND_WS=127.0.0.1:{}\n",
            dir.path().display(),
            http_port,
            ws_port
        ),
    )
    .unwrap();

    let mut child = Command::cargo_bin("ranger")
        .unwrap()
        .args(["--env", env_path.to_str().unwrap(), "serve"])
        .spawn()
        .unwrap();

    // allow servers to start
    sleep(Duration::from_millis(300)).await;

    // HTTP health check
    let base = format!("http://127.0.0.1:{}", http_port);
    let body: serde_json::Value = reqwest::get(format!("{base}/healthz"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{base}/submitContact"))
        .json(&serde_json::json!({ "name": "Asha", "email": "asha@example.in", "message": "Hi" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    let resp = client
        .post(format!("{base}/subscribeNewsletter"))
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // WebSocket snapshot push, then a fresh snapshot after an HTTP write
    let ws_url = format!("ws://127.0.0.1:{}/", ws_port);
    let (mut ws_stream, _) = tokio_tungstenite::connect_async(ws_url).await.unwrap();
    let req = serde_json::json!(["SUB", "s", { "collection": "events" }]);
    ws_stream
        .send(Message::Text(req.to_string()))
        .await
        .unwrap();
    let first = next_json(&mut ws_stream).await;
    assert_eq!(first, serde_json::json!(["SNAPSHOT", "s", []]));

    let resp = client
        .post(format!("{base}/collections/events"))
        .json(&serde_json::json!({ "title": "Live Seminar", "location": "Margao" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let second = next_json(&mut ws_stream).await;
    assert_eq!(second[0], "SNAPSHOT");
    assert_eq!(second[2][0]["title"], "Live Seminar");

    // private submissions never stream
    let req = serde_json::json!(["SUB", "p", { "collection": "contactMessages" }]);
    ws_stream
        .send(Message::Text(req.to_string()))
        .await
        .unwrap();
    let refused = next_json(&mut ws_stream).await;
    assert_eq!(refused[0], "ERROR");

    child.kill().unwrap();
    let _ = child.wait();
}
