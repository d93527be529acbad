use crate::config::HttpServerConfig;
use crate::context::GraphContext;
use crate::error::{ArbgraphError, Result};
use crate::graph::GraphPayload;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// HTTP front end for graph queries
pub struct HttpGraphServer {
    ctx: Arc<GraphContext>,
    config: HttpServerConfig,
}

impl HttpGraphServer {
    pub fn new(ctx: Arc<GraphContext>, config: HttpServerConfig) -> Self {
        Self { ctx, config }
    }

    /// Run the HTTP server until it fails
    pub async fn run(&self) -> Result<()> {
        let app = router(Arc::clone(&self.ctx), &self.config.allowed_origins);

        let addr = format!("127.0.0.1:{}", self.config.port);
        log::info!("Starting graph API on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
            let error_msg = if e.kind() == std::io::ErrorKind::AddrInUse {
                format!(
                    "Port {} is already in use. Set http_server.port in config.toml to use a different port.",
                    self.config.port
                )
            } else {
                format!("Failed to bind to {}: {}", addr, e)
            };
            ArbgraphError::Io(std::io::Error::new(e.kind(), error_msg))
        })?;

        axum::serve(listener, app).await.map_err(|e| {
            ArbgraphError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("HTTP server error: {}", e),
            ))
        })?;

        Ok(())
    }
}

/// Build the axum router over a shared graph context
pub fn router(ctx: Arc<GraphContext>, allowed_origins: &[String]) -> Router {
    // No configured origins means local development: allow any.
    let cors = if allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<axum::http::HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .route("/health", get(handle_health))
        .route("/graph", get(handle_graph))
        .route("/subgraph", get(handle_subgraph))
        .route("/subgraph/union", post(handle_union))
        .route("/subgraph/connect", post(handle_connect))
        .route("/case", get(handle_case))
        .route("/refresh", post(handle_refresh))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(ctx)
}

#[derive(Debug, Deserialize)]
struct NameParams {
    name: String,
    k: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct NamesRequest {
    names: Vec<String>,
    #[serde(default)]
    k: Option<usize>,
}

/// Map a core error onto a JSON error response
fn error_response(err: ArbgraphError) -> Response {
    let status = match err {
        ArbgraphError::NameNotFound(_)
        | ArbgraphError::DecisionNotFound(_)
        | ArbgraphError::CaseNotFound(_) => StatusCode::NOT_FOUND,
        ArbgraphError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        log::error!("Request failed: {}", err);
    }
    (status, Json(serde_json::json!({"error": err.to_string()}))).into_response()
}

/// Extractor rejections (bad query string, malformed body) as JSON, keeping
/// axum's status code
fn rejection_response(status: StatusCode, message: String) -> Response {
    log::debug!("Rejected request ({}): {}", status, message);
    (status, Json(serde_json::json!({"error": message}))).into_response()
}

/// Run synchronous graph work off the async executor
async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        ArbgraphError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("Query task failed: {}", e),
        ))
    })?
}

fn payload_response(result: Result<GraphPayload>) -> Response {
    match result {
        Ok(payload) => (StatusCode::OK, Json(payload)).into_response(),
        Err(e) => error_response(e),
    }
}

async fn handle_health(State(ctx): State<Arc<GraphContext>>) -> Response {
    let current = ctx.current();
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
            "nodes": current.graph.nodes().len(),
            "edges": current.graph.edges().len(),
            "built_at": current.built_at.to_rfc3339(),
        })),
    )
        .into_response()
}

async fn handle_graph(State(ctx): State<Arc<GraphContext>>) -> Response {
    payload_response(run_blocking(move || Ok(ctx.current().graph.to_payload())).await)
}

async fn handle_subgraph(
    State(ctx): State<Arc<GraphContext>>,
    params: std::result::Result<Query<NameParams>, QueryRejection>,
) -> Response {
    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };
    let result = run_blocking(move || {
        ctx.subgraph(&params.name, params.k)
            .map(|sub| sub.to_payload())
    })
    .await;
    payload_response(result)
}

async fn handle_union(
    State(ctx): State<Arc<GraphContext>>,
    request: std::result::Result<Json<NamesRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match request {
        Ok(request) => request,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };
    if request.names.is_empty() {
        return error_response(ArbgraphError::InvalidInput("names must not be empty".to_string()));
    }
    let result = run_blocking(move || {
        ctx.union(&request.names, request.k)
            .map(|sub| sub.to_payload())
    })
    .await;
    payload_response(result)
}

async fn handle_connect(
    State(ctx): State<Arc<GraphContext>>,
    request: std::result::Result<Json<NamesRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match request {
        Ok(request) => request,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };
    let result = run_blocking(move || {
        ctx.connecting(&request.names, request.k)
            .map(|sub| sub.to_payload())
    })
    .await;
    payload_response(result)
}

#[derive(Debug, Deserialize)]
struct CaseParams {
    name: String,
}

async fn handle_case(
    State(ctx): State<Arc<GraphContext>>,
    params: std::result::Result<Query<CaseParams>, QueryRejection>,
) -> Response {
    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };
    match ctx.case_title(&params.name) {
        Ok(title) => (
            StatusCode::OK,
            Json(serde_json::json!({"name": params.name, "title": title})),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

async fn handle_refresh(State(ctx): State<Arc<GraphContext>>) -> Response {
    match run_blocking(move || ctx.refresh()).await {
        Ok(refreshed) => (
            StatusCode::OK,
            Json(serde_json::json!({"refreshed": refreshed})),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}
