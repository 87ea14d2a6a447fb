// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! HTTP interface to a [Router], built with [axum].
//!
//! - `POST /path-finding` accepts
//!   `{"start": {"lat": …, "lng": …}, "end": {"lat": …, "lng": …}, "algorithm": "a-star"}`
//!   and responds with `{"path": [node ids…], "cost": seconds, "time1": ms, "time2": ms}`,
//!   where `time1` is the time spent on snapping positions onto the network and `time2`
//!   is the time spent on the search itself. `cost` is `null` if there is no route.
//!   `algorithm` is optional and defaults to `bidirectional-a-star`.
//! - `GET /health` responds with the size of the loaded network.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::{Algorithm, RouteError, RouteRequest, Router, SearchError};

/// Address on which [serve] listens by default.
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8080";

/// A position, as sent by web map clients.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Body of a `POST /path-finding` request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PathFindingRequest {
    pub start: LatLng,
    pub end: LatLng,

    /// Name of the [Algorithm] to use, see [Algorithm::name].
    #[serde(default)]
    pub algorithm: Option<String>,
}

/// Body of a successful `POST /path-finding` response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathFindingResponse {
    pub path: Vec<i64>,
    pub cost: Option<f64>,
    pub time1: f64,
    pub time2: f64,
}

/// Body of a `GET /health` response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub nodes: usize,
    pub edges: usize,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// An error response: a status code with a human readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl ToString) -> Self {
        Self {
            status,
            message: message.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<RouteError> for ApiError {
    fn from(e: RouteError) -> Self {
        let status = match e {
            RouteError::InvalidCoordinate { .. } => StatusCode::BAD_REQUEST,
            RouteError::EmptyIndex(_) => StatusCode::SERVICE_UNAVAILABLE,
            RouteError::Search(SearchError::StepLimitExceeded) => StatusCode::UNPROCESSABLE_ENTITY,
            RouteError::Search(SearchError::UnknownNode(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/// Creates the [axum::Router] with all endpoints, sharing the provided [Router].
pub fn build_router(router: Arc<Router>) -> axum::Router {
    axum::Router::new()
        .route("/path-finding", post(path_finding))
        .route("/health", get(health))
        .with_state(router)
}

/// Handles `POST /path-finding`.
///
/// The search runs on a blocking worker thread, so that long searches
/// don't stall other requests.
pub async fn path_finding(
    State(router): State<Arc<Router>>,
    body: Result<Json<PathFindingRequest>, JsonRejection>,
) -> Result<Json<PathFindingResponse>, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.body_text()))?;

    let algorithm = match body.algorithm.as_deref() {
        Some(name) => name
            .parse::<Algorithm>()
            .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e))?,
        None => Algorithm::default(),
    };

    let request = RouteRequest {
        start: (body.start.lat, body.start.lng),
        end: (body.end.lat, body.end.lng),
        algorithm,
    };

    let response = tokio::task::spawn_blocking(move || router.route(&request))
        .await
        .map_err(|e| {
            log::error!("route search task failed: {e}");
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "route search failed")
        })?
        .inspect_err(|e| log::info!("rejecting {request:?}: {e}"))?;

    log::info!(
        "{} route with {} nodes found in {:.3} ms",
        algorithm,
        response.path.len(),
        response.search_time.as_secs_f64() * 1000.0,
    );

    Ok(Json(PathFindingResponse {
        cost: if response.cost.is_finite() {
            Some(response.cost)
        } else {
            None
        },
        path: response.path,
        time1: response.resolve_time.as_secs_f64() * 1000.0,
        time2: response.search_time.as_secs_f64() * 1000.0,
    }))
}

/// Handles `GET /health`.
pub async fn health(State(router): State<Arc<Router>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        nodes: router.graph().len(),
        edges: router.graph().edge_count(),
    })
}

/// Serves the HTTP interface on the provided address until Ctrl-C is pressed.
pub async fn serve(router: Router, addr: SocketAddr) -> std::io::Result<()> {
    let app = build_router(Arc::new(router));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    log::info!("shutting down");
}
