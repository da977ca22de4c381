//! HTTP endpoints: form submissions, collection reads/writes, and the
//! password and chatbot helpers.

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::{future::Future, net::SocketAddr, sync::Arc};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{debug, error, info};

use crate::{
    chatbot,
    error::ApiError,
    password,
    record::Document,
    source::{LiveSource, SourceError},
    store::{now_iso, Store},
};

pub const CONTACT_COLLECTION: &str = "contactMessages";
pub const NEWSLETTER_COLLECTION: &str = "newsletterSubscribers";

#[derive(Clone)]
struct HttpState {
    store: Store,
}

/// Response body for the `/healthz` endpoint.
#[derive(Serialize, Deserialize)]
struct Health {
    /// Always "ok" when the server is running.
    status: String,
}

/// JSON body of every submission response.
#[derive(Serialize, Deserialize, Debug)]
pub struct Ack {
    pub message: String,
}

/// Build the application router.
pub fn router(store: Store) -> Router {
    let state = Arc::new(HttpState { store });
    Router::new()
        .route("/healthz", get(healthz))
        .route(
            "/submitContact",
            post(submit_contact)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        .route(
            "/subscribeNewsletter",
            post(subscribe_newsletter)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        .route(
            "/collections/:name",
            get(read_collection)
                .post(write_collection)
                .options(preflight),
        )
        .route("/chat", post(chat).options(preflight))
        .route("/password", post(check_password).options(preflight))
        .fallback(not_found)
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .with_state(state)
}

/// Start the HTTP server and run until `shutdown` resolves.
pub async fn serve_http(
    addr: SocketAddr,
    store: Store,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("http listening on {}", listener.local_addr()?);
    axum::serve(listener, router(store).into_make_service())
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Health check endpoint.
async fn healthz() -> Json<Health> {
    debug!("GET /healthz");
    Json(Health {
        status: "ok".to_string(),
    })
}

/// CORS preflight answer.
async fn preflight() -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [
            (header::ACCESS_CONTROL_ALLOW_METHODS, "POST"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
        ],
    )
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

/// Lenient body parse: anything that is not a JSON object counts as empty.
fn body_object(body: &[u8]) -> Map<String, Value> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

/// Non-blank text field, trimmed.
fn text_field(body: &Map<String, Value>, key: &str) -> Option<String> {
    body.get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

async fn store_submission(
    store: &Store,
    collection: &'static str,
    mut fields: Map<String, Value>,
    failure: &'static str,
) -> Result<(), ApiError> {
    fields.insert("timestamp".into(), Value::String(now_iso()));
    let writer = store.clone();
    let written = tokio::task::spawn_blocking(move || writer.append(collection, fields))
        .await
        .unwrap_or_else(|e| Err(SourceError::Storage(e.to_string())));
    match written {
        Ok(doc) => {
            info!(collection, id = %doc.id, "submission stored");
            Ok(())
        }
        Err(source) => {
            error!(collection, "submission failed: {source}");
            Err(ApiError::Storage {
                message: failure,
                source,
            })
        }
    }
}

async fn submit_contact(
    State(state): State<Arc<HttpState>>,
    body: Bytes,
) -> Result<Json<Ack>, ApiError> {
    let body = body_object(&body);
    let (Some(name), Some(email), Some(message)) = (
        text_field(&body, "name"),
        text_field(&body, "email"),
        text_field(&body, "message"),
    ) else {
        return Err(ApiError::MissingFields(
            "Missing required fields: name, email, or message.",
        ));
    };
    let mut fields = Map::new();
    fields.insert("name".into(), name.into());
    fields.insert("email".into(), email.into());
    fields.insert("message".into(), message.into());
    store_submission(&state.store, CONTACT_COLLECTION, fields, "Failed to save message.").await?;
    Ok(Json(Ack {
        message: "Contact message saved successfully!".into(),
    }))
}

async fn subscribe_newsletter(
    State(state): State<Arc<HttpState>>,
    body: Bytes,
) -> Result<Json<Ack>, ApiError> {
    let body = body_object(&body);
    let Some(email) = text_field(&body, "email") else {
        return Err(ApiError::MissingFields("Email is required."));
    };
    let mut fields = Map::new();
    fields.insert("email".into(), email.into());
    store_submission(&state.store, NEWSLETTER_COLLECTION, fields, "Failed to subscribe.").await?;
    Ok(Json(Ack {
        message: "Subscription successful!".into(),
    }))
}

/// Current snapshot of a public collection, newest first.
async fn read_collection(
    State(state): State<Arc<HttpState>>,
    Path(name): Path<String>,
) -> Result<Json<Vec<Document>>, ApiError> {
    if state.store.is_private(&name) {
        return Err(ApiError::Forbidden);
    }
    let docs = state.store.snapshot(&name)?;
    debug!(collection = %name, count = docs.len(), "GET /collections");
    Ok(Json(docs))
}

/// Producer write into a public collection.
async fn write_collection(
    State(state): State<Arc<HttpState>>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<Document>, ApiError> {
    let fields = match serde_json::from_slice::<Value>(&body) {
        Ok(Value::Object(map)) => map,
        _ => return Err(ApiError::MalformedPayload),
    };
    let doc = state.store.add(&name, fields).await?;
    info!(collection = %name, id = %doc.id, "document written");
    Ok(Json(doc))
}

/// FAQ assistant: the visitor message as display HTML plus the canned reply.
async fn chat(body: Bytes) -> Result<Json<Value>, ApiError> {
    let body = body_object(&body);
    let message = text_field(&body, "message").ok_or(ApiError::MissingFields("Message is required."))?;
    let reply = chatbot::respond(&message).ok_or(ApiError::MissingFields("Message is required."))?;
    debug!(topic = ?reply.topic, "POST /chat");
    Ok(Json(json!({
        "message": chatbot::format_message(&message),
        "reply": reply,
    })))
}

async fn check_password(body: Bytes) -> Result<Json<Value>, ApiError> {
    let body = body_object(&body);
    // keep surrounding spaces, they are part of the password
    let Some(pw) = body
        .get("password")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
    else {
        return Err(ApiError::MissingFields("Password is required."));
    };
    let analysis = password::analyze(pw);
    Ok(Json(json!({
        "label": analysis.strength.label(),
        "checks": analysis.checks(),
        "recommendations": analysis.recommendations(),
        "analysis": analysis,
    })))
}
