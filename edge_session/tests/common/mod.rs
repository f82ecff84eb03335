//! Axum-based mock token endpoint for the refresh integration tests.
//!
//! Every test starts its own server on an ephemeral port, so tests never
//! share responses or recorded requests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::Value;
use tokio::net::TcpListener;

pub const TOKEN_PATH: &str = "/auth/v1/token";
pub const TEST_API_KEY: &str = "anon-test-key";

/// What the mock endpoint saw for one refresh call.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub query: HashMap<String, String>,
    pub api_key: Option<String>,
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
pub struct MockTokenServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

#[derive(Clone)]
struct MockState {
    status: StatusCode,
    body: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockTokenServer {
    /// Starts a server answering every refresh with `status` and a raw `body`.
    pub async fn start(status: StatusCode, body: impl Into<String>) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            status,
            body: body.into(),
            requests: requests.clone(),
        };
        let app = Router::new()
            .route(TOKEN_PATH, post(token_handler))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock token server");
        let addr = listener.local_addr().expect("Failed to read local address");
        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Mock token server failed");
        });

        Self {
            base_url: format!("http://{addr}"),
            requests,
        }
    }

    pub async fn success(body: Value) -> Self {
        Self::start(StatusCode::OK, body.to_string()).await
    }

    pub fn token_url(&self) -> String {
        format!("{}{}", self.base_url, TOKEN_PATH)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn token_handler(
    State(state): State<MockState>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    state.requests.lock().unwrap().push(RecordedRequest {
        query,
        api_key: header("apikey"),
        authorization: header("authorization"),
        body,
    });

    (
        state.status,
        [("content-type", "application/json")],
        state.body.clone(),
    )
        .into_response()
}

/// Address on which nothing is listening.
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind probe listener");
    let addr = listener.local_addr().expect("Failed to read local address");
    drop(listener);
    format!("http://{addr}{TOKEN_PATH}")
}
