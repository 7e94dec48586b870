//! `nsg-api` — the HTTP control plane over a slice orchestrator.
//!
//! Routes (all JSON):
//!
//! | Route                         | Meaning                                   |
//! |-------------------------------|-------------------------------------------|
//! | `GET /network`                | names of the deployed slices              |
//! | `GET /network/{slice}`        | the slice's node list                     |
//! | `GET /network/{slice}/{node}` | one node's location                       |
//! | `POST /network/{slice}/{node}`| move the node; returns the link updates   |
//!
//! Handlers talk to the orchestrator exclusively through the control
//! mailbox, so every mutation observed over HTTP is serialized with the
//! rest.  The mailbox calls block, hence the `spawn_blocking` hop.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::debug;

use nsg_orchestrator::{ControlHandle, OrchestratorError};


/// Build the control-plane router over a mailbox handle.
pub fn router(handle: ControlHandle) -> Router {
    Router::new()
        .route("/network", get(list_networks))
        .route("/network/:slice", get(slice_nodes))
        .route("/network/:slice/:node", get(node_location).post(move_node))
        .with_state(handle)
}

/// Serve the router until ctrl-c.
pub async fn serve(listener: TcpListener, handle: ControlHandle) -> std::io::Result<()> {
    axum::serve(listener, router(handle))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

// ── Handlers ──────────────────────────────────────────────────────────────────

async fn list_networks(State(handle): State<ControlHandle>) -> Response {
    match on_control(handle, |h| h.slice_names()).await {
        Ok(names) => Json(json!({ "networks": names })).into_response(),
        Err(error) => control_failure(error),
    }
}

async fn slice_nodes(
    State(handle): State<ControlHandle>,
    Path(slice): Path<String>,
) -> Response {
    match on_control(handle, move |h| h.slice_nodes(&slice)).await {
        Ok(nodes) => Json(json!({ "nodes": nodes })).into_response(),
        Err(OrchestratorError::UnknownSlice(_)) => {
            error_response(StatusCode::NOT_FOUND, "There is no network with that name")
        }
        Err(error) => control_failure(error),
    }
}

async fn node_location(
    State(handle): State<ControlHandle>,
    Path((slice, node)): Path<(String, String)>,
) -> Response {
    match on_control(handle, move |h| h.node_location(&slice, &node)).await {
        Ok(Some(location)) => Json(location).into_response(),
        Ok(None) => Json(Value::Null).into_response(),
        Err(OrchestratorError::UnknownSlice(_)) => {
            error_response(StatusCode::NOT_FOUND, "network does not exist")
        }
        Err(error) => control_failure(error),
    }
}

#[derive(Debug, Deserialize)]
struct MoveBody {
    lat: f64,
    lon: f64,
    #[serde(default)]
    alt: Option<f64>,
}

async fn move_node(
    State(handle): State<ControlHandle>,
    Path((slice, node)): Path<(String, String)>,
    Json(body): Json<MoveBody>,
) -> Response {
    debug!(slice, node, lat = body.lat, lon = body.lon, "move requested");
    let result =
        on_control(handle, move |h| h.move_node(&slice, &node, body.lat, body.lon, body.alt))
            .await;
    match result {
        Ok(updates) => Json(updates).into_response(),
        Err(error @ OrchestratorError::ControlStopped) => control_failure(error),
        Err(error) => error_response(StatusCode::BAD_REQUEST, &error.to_string()),
    }
}

// ── Plumbing ──────────────────────────────────────────────────────────────────

/// Run a blocking mailbox call off the async runtime.
async fn on_control<T: Send + 'static>(
    handle: ControlHandle,
    call: impl FnOnce(ControlHandle) -> Result<T, OrchestratorError> + Send + 'static,
) -> Result<T, OrchestratorError> {
    tokio::task::spawn_blocking(move || call(handle))
        .await
        .map_err(|_| OrchestratorError::ControlStopped)?
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn control_failure(error: OrchestratorError) -> Response {
    error_response(StatusCode::INTERNAL_SERVER_ERROR, &error.to_string())
}
