// tests/common/mod.rs
pub use axum::Router;
pub use tokio::task::JoinHandle;

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::Form;
use axum::routing::post;
use axum::Json;
use http::{HeaderMap, StatusCode, Uri};
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::service::{CredentialsConfig, UpstreamConfig};

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

/// Credentials backed by test-only env variables. Callers must be `#[serial]`.
pub fn test_credentials() -> CredentialsConfig {
    std::env::set_var("PARAGON_TEST_ID", "test-client");
    std::env::set_var("PARAGON_TEST_SECRET", "test-secret");
    std::env::set_var("PARAGON_TEST_REDIRECT", "https://app.example/callback");
    CredentialsConfig {
        client_id_env: "PARAGON_TEST_ID".into(),
        client_secret_env: "PARAGON_TEST_SECRET".into(),
        redirect_uri_env: "PARAGON_TEST_REDIRECT".into(),
    }
}

/// An address nothing listens on.
pub async fn unreachable_upstream() -> UpstreamConfig {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    drop(listener);
    UpstreamConfig::new(format!("http://{}", addr))
}

/// Fake student API: `/api/token` answers with a fixed grant response, every
/// other path is a resource echoing its path and the Authorization header.
pub struct MockUpstream {
    pub handle: JoinHandle<()>,
    pub config: UpstreamConfig,
    forms: Arc<Mutex<Vec<HashMap<String, String>>>>,
    resource_hits: Arc<AtomicUsize>,
}

impl MockUpstream {
    /// Form bodies posted to the token endpoint, in arrival order.
    pub fn forms(&self) -> Vec<HashMap<String, String>> {
        self.forms.lock().unwrap().clone()
    }

    pub fn resource_hits(&self) -> usize {
        self.resource_hits.load(Ordering::SeqCst)
    }
}

pub async fn spawn_token_upstream(token_status: u16, token_body: Value) -> MockUpstream {
    spawn_upstream(token_status, token_body, &[]).await
}

/// `failing` lists resource paths (relative to `/api/`) answering 401.
pub async fn spawn_upstream(token_status: u16, token_body: Value, failing: &[&str]) -> MockUpstream {
    let forms = Arc::new(Mutex::new(Vec::new()));
    let resource_hits = Arc::new(AtomicUsize::new(0));
    let failing: Arc<HashSet<String>> = Arc::new(failing.iter().map(|path| format!("/api/{}", path)).collect());
    let token_status = StatusCode::from_u16(token_status).expect("status");

    let forms_clone = forms.clone();
    let token_route = post(move |Form(form): Form<HashMap<String, String>>| {
        let forms = forms_clone.clone();
        let body = token_body.clone();
        async move {
            forms.lock().unwrap().push(form);
            (token_status, Json(body))
        }
    });

    let hits_clone = resource_hits.clone();
    let resource_fallback = move |uri: Uri, headers: HeaderMap| {
        let hits = hits_clone.clone();
        let failing = failing.clone();
        async move {
            hits.fetch_add(1, Ordering::SeqCst);
            if failing.contains(uri.path()) {
                return (StatusCode::UNAUTHORIZED, Json(json!({"error": "unauthorized"})));
            }
            let authorization = headers
                .get("authorization")
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default()
                .to_owned();
            (
                StatusCode::OK,
                Json(json!({"path": uri.path(), "authorization": authorization})),
            )
        }
    };

    let router = Router::new()
        .route("/api/token", token_route)
        .fallback(resource_fallback);
    let (handle, addr) = spawn_axum(router).await;

    MockUpstream {
        handle,
        config: UpstreamConfig::new(format!("http://{}", addr)),
        forms,
        resource_hits,
    }
}
