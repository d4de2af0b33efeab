use std::collections::HashMap;
use std::error::Error as _;

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use http::StatusCode;
use tracing::{info, warn};

use crate::error::BrokerError;
use crate::observability::metrics::get_metrics;
use crate::server::server::AppState;

static AUTH_ENDPOINT: &str = "auth";
static RESOURCE_ENDPOINT: &str = "resource";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth", post(handle_auth))
        .route("/api/resource", get(handle_resource))
        .route("/health", get(handle_health))
}

/// Body is the raw authorization code.
async fn handle_auth(State(state): State<AppState>, body: String) -> Response {
    let outcome = state.broker.authorize(&body).await.map(Json);
    respond(AUTH_ENDPOINT, outcome).await
}

/// `?resource=<key|all>&token=<encoded token>`
async fn handle_resource(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let outcome = state
        .broker
        .resource(
            query.get("resource").map(String::as_str),
            query.get("token").map(String::as_str),
        )
        .await
        .map(Json);
    respond(RESOURCE_ENDPOINT, outcome).await
}

async fn handle_health() -> &'static str {
    "ok"
}

async fn respond<T: IntoResponse>(endpoint: &'static str, outcome: Result<T, BrokerError>) -> Response {
    let metrics = get_metrics().await;
    let response = match outcome {
        Ok(body) => {
            info!(endpoint, "request succeeded");
            body.into_response()
        }
        Err(e) => e.into_response(),
    };
    metrics
        .broker_responses
        .with_label_values(&[endpoint, response.status().as_str()])
        .inc();
    response
}

impl IntoResponse for BrokerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let cause = self.source().map(|source| source.to_string());
        warn!(%status, error = %self, cause = ?cause, "request rejected");

        if status == StatusCode::UNAUTHORIZED {
            return status.into_response();
        }
        (status, self.to_string()).into_response()
    }
}
