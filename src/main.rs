use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use peercache::group::loader::LoaderFn;
use peercache::group::Group;
use peercache::http::protocol::DEFAULT_BASE_PATH;
use peercache::http::HttpPool;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 3 {
        eprintln!(
            "Usage: {} --self <base-url> [--peer <base-url>]... [--api <addr:port>]",
            args[0]
        );
        eprintln!("Example: {} --self http://127.0.0.1:8001", args[0]);
        eprintln!(
            "Example: {} --self http://127.0.0.1:8002 --peer http://127.0.0.1:8001 --peer http://127.0.0.1:8002 --api 127.0.0.1:9999",
            args[0]
        );

        std::process::exit(1);
    }

    let mut self_url: Option<String> = None;
    let mut peers: Vec<String> = vec![];
    let mut api_addr: Option<SocketAddr> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--self" => {
                self_url = Some(args[i + 1].clone());
                i += 2;
            }
            "--peer" => {
                peers.push(args[i + 1].clone());
                i += 2;
            }
            "--api" => {
                api_addr = Some(args[i + 1].parse()?);
                i += 2;
            }
            _ => {
                i += 1;
            }
        }
    }

    let self_url = self_url.expect("--self is required");
    if peers.is_empty() {
        // Standalone node; every key is owned locally.
        peers.push(self_url.clone());
    }

    tracing::info!("Starting cache node at {}", self_url);
    tracing::info!("Peer set: {:?}", peers);

    // 1. The demo group, backed by a small in-process table:
    let db: Arc<HashMap<String, String>> = Arc::new(
        [("Tom", "630"), ("Jack", "589"), ("Sam", "567")]
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect(),
    );
    let loader_db = db.clone();
    let group = Group::new(
        "scores",
        64 * 1024,
        LoaderFn::new(move |key: String| {
            let db = loader_db.clone();
            async move {
                tracing::info!("Loading {} from the backing table", key);
                db.get(&key)
                    .map(|value| value.clone().into_bytes())
                    .ok_or_else(|| anyhow::anyhow!("{key} not exist"))
            }
        }),
    );

    // 2. Peer routing:
    let pool = HttpPool::new(&self_url);
    pool.set_peers(peers);
    group.register_peers(pool);

    // 3. Optional front-facing API server:
    if let Some(api_addr) = api_addr {
        tokio::spawn(async move {
            let api = Router::new()
                .route("/api/:key", get(handle_api))
                .route("/health/stats", get(handle_stats));

            tracing::info!("API server listening on {}", api_addr);
            let listener = tokio::net::TcpListener::bind(api_addr)
                .await
                .expect("failed to bind API address");
            if let Err(error) = axum::serve(listener, api).await {
                tracing::error!("API server failed: {}", error);
            }
        });
    }

    // 4. Peer transport server:
    let peer_addr = peer_listen_addr(&self_url)?;
    let app = peercache::http::handlers::router(DEFAULT_BASE_PATH);

    tracing::info!("Peer server listening on {}", peer_addr);
    tracing::info!("Press Ctrl+C to shutdown");

    let listener = tokio::net::TcpListener::bind(peer_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Extracts the listen address from the advertised base URL.
fn peer_listen_addr(self_url: &str) -> anyhow::Result<SocketAddr> {
    let host_port = self_url
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(self_url)
        .trim_end_matches('/');
    host_port
        .parse()
        .map_err(|error| anyhow::anyhow!("invalid --self address {self_url}: {error}"))
}

/// Public read endpoint: returns the raw cached bytes for a key.
async fn handle_api(Path(key): Path<String>) -> Response {
    let Some(group) = peercache::group::lookup("scores") else {
        return (StatusCode::INTERNAL_SERVER_ERROR, "scores group missing").into_response();
    };

    match group.get(&key).await {
        Ok(view) => (
            [(header::CONTENT_TYPE, "application/octet-stream")],
            view.to_vec(),
        )
            .into_response(),
        Err(error) => (StatusCode::INTERNAL_SERVER_ERROR, format!("{error:#}")).into_response(),
    }
}

#[derive(Serialize)]
struct NodeStatsResponse {
    group: String,
    cached_entries: usize,
    cached_bytes: usize,
}

async fn handle_stats() -> Json<NodeStatsResponse> {
    let (cached_entries, cached_bytes) = peercache::group::lookup("scores")
        .map(|group| (group.cached_entries(), group.cached_bytes()))
        .unwrap_or((0, 0));

    Json(NodeStatsResponse {
        group: "scores".to_string(),
        cached_entries,
        cached_bytes,
    })
}
