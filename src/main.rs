//! Command line interface for the live collection store. Supports
//! initialization, ingesting documents, serving the HTTP/WebSocket endpoints,
//! rendering and watching collection views, and the password and FAQ helpers.

use std::{
    fs,
    net::SocketAddr,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{json, Map, Value};
use tracing::info;

use ranger::{
    chatbot,
    config::Settings,
    filter::{CategoryField, FilterSpec},
    markers, password,
    record::Document,
    remote::RemoteSource,
    render::{Frame, HtmlReconciler, Reconciler},
    seed, server,
    source::LiveSource,
    store::Store,
    view::{LiveView, ViewConfig},
    ws,
};

/// Command line interface entry point.
#[derive(Parser)]
#[command(
    name = "ranger",
    author,
    version,
    about = "File-backed live collections for the Cyber Ranger site",
    short_flag = 'v',
    long_flag = "version"
)]
struct Cli {
    /// Path to the `.env` configuration file.
    #[arg(long, default_value = ".env")]
    env: String,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the directory tree at `STORE_ROOT`.
    Init,
    /// Ingest documents from JSON, JSON array or NDJSON files.
    Ingest {
        /// Target collection.
        collection: String,
        /// Files to read.
        #[arg(required = true)]
        files: Vec<String>,
    },
    /// Launch HTTP and WebSocket services.
    Serve,
    /// Render a collection view (seed plus stored documents) once.
    Render {
        collection: String,
        /// Filter chip token (`all`, a status, or a category value).
        #[arg(long)]
        filter: Option<String>,
        /// Search term; takes precedence over `--filter`.
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_enum, default_value_t = Format::Html)]
        format: Format,
    },
    /// Follow a collection and print every render.
    Watch {
        collection: String,
        #[arg(long)]
        filter: Option<String>,
        /// Read the local store instead of the configured server.
        #[arg(long)]
        local: bool,
        /// Stop after this many deliveries.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Validate and write a draft document through a view.
    Submit {
        collection: String,
        /// `key=value` field, repeatable.
        #[arg(long = "field", short = 'f')]
        fields: Vec<String>,
        /// Draft as a JSON object, merged under the `--field` values.
        #[arg(long)]
        json: Option<String>,
        /// Write to the local store instead of the configured server.
        #[arg(long)]
        local: bool,
    },
    /// Score a password.
    Password {
        password: String,
        #[arg(long)]
        json: bool,
    },
    /// Ask the FAQ assistant a question.
    Ask { question: Vec<String> },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Html,
    Json,
    Markers,
}

/// Execute the selected CLI subcommand.
async fn run(cli: Cli) -> anyhow::Result<()> {
    ensure_env_file(&cli.env)?;
    let cfg = Settings::from_env(&cli.env)?;
    let store = cfg.store();
    match cli.command {
        Commands::Init => {
            // Create the on-disk directory structure.
            store.init()?;
        }
        Commands::Ingest { collection, files } => {
            let mut count = 0;
            for f in files {
                let data = fs::read_to_string(&f).with_context(|| format!("reading {f}"))?;
                for val in parse_documents(&data).with_context(|| format!("parsing {f}"))? {
                    ingest_one(&store, &collection, val)?;
                    count += 1;
                }
            }
            info!(%collection, count, "ingested");
            println!("ingested {count} document(s) into {collection}");
        }
        Commands::Serve => {
            // Initialize storage then start HTTP and WS servers.
            store.init()?;
            let http_addr: SocketAddr = cfg.bind_http.as_str().parse()?;
            let ws_addr: SocketAddr = cfg.bind_ws.as_str().parse()?;
            let store_http = store.clone();
            let store_ws = store.clone();
            tokio::try_join!(
                server::serve_http(http_addr, store_http, shutdown_signal()),
                ws::serve_ws(ws_addr, store_ws, shutdown_signal())
            )?;
        }
        Commands::Render {
            collection,
            filter,
            search,
            format,
        } => {
            let output = render_once(&store, &collection, filter.as_deref(), search.as_deref(), format)?;
            print!("{output}");
        }
        Commands::Watch {
            collection,
            filter,
            local,
            limit,
        } => {
            let spec = filter.as_deref().map(FilterSpec::from_token);
            if local {
                watch(store, &collection, spec, limit).await?;
            } else {
                let (ws_url, http_url) = cfg.remote_endpoints();
                watch(RemoteSource::new(&ws_url, &http_url)?, &collection, spec, limit).await?;
            }
        }
        Commands::Submit {
            collection,
            fields,
            json,
            local,
        } => {
            let draft = build_draft(&fields, json.as_deref())?;
            let view_cfg = view_config(&collection).with_write_timeout(cfg.write_timeout);
            let doc = if local {
                submit(store, view_cfg, draft).await?
            } else {
                let (ws_url, http_url) = cfg.remote_endpoints();
                submit(RemoteSource::new(&ws_url, &http_url)?, view_cfg, draft).await?
            };
            println!("{}", serde_json::to_string(&doc)?);
        }
        Commands::Password { password, json } => {
            let analysis = password::analyze(&password);
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "analysis": analysis,
                        "checks": analysis.checks(),
                        "recommendations": analysis.recommendations(),
                    }))?
                );
            } else {
                println!("{} ({}/140)", analysis.strength.label(), analysis.score);
                for check in analysis.checks() {
                    println!("[{}] {}", if check.valid { "x" } else { " " }, check.label);
                }
                for rec in analysis.recommendations() {
                    println!("- {rec}");
                }
            }
        }
        Commands::Ask { question } => {
            let question = question.join(" ");
            match chatbot::respond(&question) {
                Some(reply) => println!("{}", reply.html),
                None => bail!("empty question"),
            }
        }
    }
    Ok(())
}

/// View settings for a collection, falling back to a plain event-style view.
fn view_config(collection: &str) -> ViewConfig {
    ViewConfig::for_collection(collection).unwrap_or_else(|| {
        let mut cfg = ViewConfig::events();
        cfg.collection = collection.to_string();
        cfg.required = vec![];
        cfg
    })
}

/// Accept a single JSON document, a JSON array, or newline-delimited JSON.
fn parse_documents(data: &str) -> anyhow::Result<Vec<Value>> {
    match serde_json::from_str::<Value>(data) {
        Ok(Value::Array(items)) => Ok(items),
        Ok(val) => Ok(vec![val]),
        Err(_) => data
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).map_err(Into::into))
            .collect(),
    }
}

/// Documents carrying an id keep it; anything else is appended as new.
fn ingest_one(store: &Store, collection: &str, val: Value) -> anyhow::Result<()> {
    let Value::Object(fields) = val else {
        bail!("document is not a JSON object");
    };
    let has_id = matches!(fields.get("id"), Some(Value::String(s)) if !s.is_empty());
    if has_id {
        let doc = Document::from_value(Value::Object(fields)).ok_or_else(|| anyhow!("malformed document"))?;
        store.ingest(collection, &doc)?;
    } else {
        store.append(collection, fields)?;
    }
    Ok(())
}

fn build_draft(fields: &[String], json: Option<&str>) -> anyhow::Result<Map<String, Value>> {
    let mut draft = match json {
        Some(raw) => match serde_json::from_str::<Value>(raw)? {
            Value::Object(map) => map,
            _ => bail!("--json must be an object"),
        },
        None => Map::new(),
    };
    for field in fields {
        let (key, value) = field
            .split_once('=')
            .ok_or_else(|| anyhow!("expected key=value, got {field:?}"))?;
        draft.insert(key.trim().to_string(), Value::String(value.to_string()));
    }
    Ok(draft)
}

/// Mount a view over the local store, apply the filter and serialize the
/// resulting frame.
fn render_once(
    store: &Store,
    collection: &str,
    filter: Option<&str>,
    search: Option<&str>,
    format: Format,
) -> anyhow::Result<String> {
    let cfg = view_config(collection);
    let mut view = LiveView::new(
        store.clone(),
        HtmlReconciler::new(cfg.template),
        cfg,
        seed::for_collection(collection),
    );
    view.mount();
    view.pump();
    if let Some(token) = filter {
        view.set_filter(FilterSpec::from_token(token));
    }
    if let Some(term) = search.filter(|t| !t.trim().is_empty()) {
        view.search(term);
    }
    let out = match format {
        Format::Html => view.reconciler().html(),
        Format::Json => serde_json::to_string_pretty(view.reconciler().nodes())? + "\n",
        Format::Markers => {
            let placed = markers::place_markers(view.items());
            let camera = match view.config().category {
                CategoryField::Location => markers::camera_for(view.active_filter()),
                _ => markers::camera_for(&FilterSpec::All),
            };
            let focused = markers::focused(&placed, view.active_filter()).map(|m| m.key.clone());
            serde_json::to_string_pretty(&json!({
                "markers": placed,
                "camera": camera,
                "focused": focused,
            }))? + "\n"
        }
    };
    view.unmount();
    Ok(out)
}

/// Reconciler printing each frame as an HTML fragment.
struct Printer {
    inner: HtmlReconciler,
}

impl Reconciler for Printer {
    fn render(&mut self, frame: &Frame) {
        self.inner.render(frame);
        println!("<!-- render {} -->", self.inner.render_count());
        print!("{}", self.inner.html());
    }
}

async fn watch<S: LiveSource>(
    source: S,
    collection: &str,
    filter: Option<FilterSpec>,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let cfg = view_config(collection);
    let printer = Printer {
        inner: HtmlReconciler::new(cfg.template),
    };
    let mut view = LiveView::new(source, printer, cfg, seed::for_collection(collection));
    if let Some(spec) = filter {
        view.set_filter(spec);
    }
    view.mount();
    let mut seen = 0;
    loop {
        if limit.is_some_and(|l| seen >= l) {
            break;
        }
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            more = view.next_event() => {
                if !more {
                    break;
                }
                seen += 1;
            }
        }
    }
    view.unmount();
    Ok(())
}

async fn submit<S: LiveSource>(
    source: S,
    cfg: ViewConfig,
    draft: Map<String, Value>,
) -> anyhow::Result<Document> {
    let mut view = LiveView::new(source, HtmlReconciler::new(cfg.template), cfg, vec![]);
    Ok(view.submit(draft).await?)
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down");
}

/// Create a default `.env` file if one is not already present at `path`.
fn ensure_env_file(path: &str) -> anyhow::Result<()> {
    let env_path = Path::new(path);
    if env_path.exists() {
        return Ok(());
    }
    if let Some(parent) = env_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let base_dir = match env_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir()?,
    };
    let store_root = base_dir.join("ranger-data");
    let mut content = String::new();
    content.push_str(&format!("STORE_ROOT={}\n", display_path(&store_root)));
    content.push_str("BIND_HTTP=127.0.0.1:7777\n");
    content.push_str("BIND_WS=127.0.0.1:7778\n");
    content.push_str("PRIVATE_COLLECTIONS=contactMessages,newsletterSubscribers\n");
    content.push_str("WRITE_TIMEOUT_MS=15000\n");
    content.push_str("REMOTE_HTTP=\n");
    content.push_str("REMOTE_WS=\n");
    fs::write(env_path, content)?;
    Ok(())
}

fn display_path(path: &PathBuf) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(not(test))]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();
    run(cli).await
}
