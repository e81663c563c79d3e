use crate::config::Config;
use crate::engine::{classify_request, PolicyHandle};
use crate::logger::{DecisionLogEntry, DecisionLogger, LogBuffer};
use crate::pac;
use crate::stats::StatsCollector;
use axum::{
    extract::{ConnectInfo, Query, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Instant, UNIX_EPOCH};
use tokio::net::TcpListener;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::Sender;

pub struct ApiState {
    pub policy: PolicyHandle,
    pub stats: Arc<StatsCollector>,
    pub logger: Arc<DecisionLogger>,
    pub config: Config,
    pub refresh_sender: Sender<()>,
    pub logs_buffer: Option<LogBuffer>,
}

pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/proxy.pac", get(get_pac))
        .route("/pac/", get(get_pac))
        .route("/api/classify", get(classify))
        .route("/api/status", get(get_status))
        .route("/api/hostpatterns", get(get_host_patterns))
        .route("/api/stats", get(get_stats))
        .route("/api/config", get(get_config))
        .route("/api/logs", get(get_logs))
        .route("/api/refresh", post(trigger_refresh))
        .with_state(state)
}

/// Serves the API on `listener` until the server stops.
pub async fn start_api_server(listener: TcpListener, state: Arc<ApiState>) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("PAC server listening on http://{}/proxy.pac", addr);
    }
    axum::serve(
        listener,
        router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
}

async fn get_pac(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    let snapshot = state.policy.load();
    state.stats.inc_pac_downloads();
    (
        [(header::CONTENT_TYPE, pac::CONTENT_TYPE)],
        snapshot.script.clone(),
    )
}

#[derive(Deserialize)]
struct ClassifyQuery {
    host: String,
    url: Option<String>,
}

#[derive(Serialize)]
struct ClassifyResponse {
    host: String,
    method: &'static str,
    transport: String,
    generation: u64,
}

async fn classify(
    State(state): State<Arc<ApiState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Query(query): Query<ClassifyQuery>,
) -> impl IntoResponse {
    let start = Instant::now();
    let snapshot = state.policy.load();
    let method = classify_request(
        query.url.as_deref().unwrap_or(""),
        &query.host,
        &snapshot.policy,
    );
    let transport = snapshot.policy.transport(method).to_string();
    state.stats.inc_lookup(method);

    state.logger.log(DecisionLogEntry {
        client_ip: peer.ip().to_string(),
        host: query.host.clone(),
        url: query.url,
        method,
        transport: transport.clone(),
        generation: snapshot.generation,
        latency_us: start.elapsed().as_micros() as u64,
    });

    Json(ClassifyResponse {
        host: query.host,
        method: method.as_str(),
        transport,
        generation: snapshot.generation,
    })
}

async fn get_status(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    let snapshot = state.policy.load();
    let published_at = snapshot
        .published_at
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    Json(serde_json::json!({
        "generation": snapshot.generation,
        "published_at": published_at,
        "direct_patterns": snapshot.policy.direct().len(),
        "blocked_patterns": snapshot.policy.blocked().len(),
        "top_level_domains": snapshot.policy.top_level().len(),
    }))
}

#[derive(Serialize)]
struct HostPattern {
    pattern: String,
    list: &'static str,
}

async fn get_host_patterns(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    let snapshot = state.policy.load();
    let policy = &snapshot.policy;
    let items: Vec<HostPattern> = policy
        .direct()
        .iter()
        .filter(|p| !p.is_empty())
        .map(|p| HostPattern {
            pattern: p.to_string(),
            list: "direct",
        })
        .chain(policy.blocked().iter().map(|p| HostPattern {
            pattern: p.to_string(),
            list: "blocked",
        }))
        .collect();
    Json(items)
}

async fn get_stats(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    Json(state.stats.get_snapshot())
}

async fn get_config(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    Json(state.config.clone())
}

async fn get_logs(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    let logs: Vec<DecisionLogEntry> = match &state.logs_buffer {
        Some(buffer) => {
            let buffer = buffer.read().unwrap_or_else(|e| e.into_inner());
            // Newest first
            buffer.iter().rev().cloned().collect()
        }
        None => Vec::new(),
    };
    Json(logs)
}

async fn trigger_refresh(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    let status = match state.refresh_sender.try_send(()) {
        Ok(()) => "refresh_triggered",
        Err(TrySendError::Full(())) => "refresh_pending",
        Err(TrySendError::Closed(())) => "refresh_unavailable",
    };
    Json(serde_json::json!({ "status": status }))
}
