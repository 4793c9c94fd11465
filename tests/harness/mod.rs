//! Mock generation worker for integration tests
//!
//! Serves a canned reply on `POST /generate` and a tiny PNG on `GET /image.png`

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{routing, Json, Router};
use serde_json::Value;
use tokio::sync::oneshot;

pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake";

#[derive(Clone)]
pub enum Reply {
    Json(Value),
    Status(u16),
    Text(&'static str),
}

pub struct MockWorker {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    state: Arc<MockState>,
}

struct MockState {
    reply: Reply,
    request_count: AtomicU32,
    last_body: Mutex<Option<Value>>,
    last_content_type: Mutex<Option<String>>,
}

impl MockWorker {
    pub async fn start(reply: Reply) -> Self {
        let state = Arc::new(MockState {
            reply,
            request_count: AtomicU32::new(0),
            last_body: Mutex::new(None),
            last_content_type: Mutex::new(None),
        });

        let app = Router::new()
            .route("/generate", routing::post(handle_generate))
            .route("/image.png", routing::get(handle_image))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock worker");
        let addr = listener.local_addr().expect("mock worker address");
        let (tx, rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = rx.await;
                })
                .await
                .ok();
        });

        Self {
            addr,
            shutdown: Some(tx),
            state,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}/generate", self.addr)
    }

    pub fn image_url(&self) -> String {
        format!("http://{}/image.png", self.addr)
    }

    pub fn request_count(&self) -> u32 {
        self.state.request_count.load(Ordering::Relaxed)
    }

    pub fn last_body(&self) -> Option<Value> {
        self.state.last_body.lock().unwrap().clone()
    }

    pub fn last_content_type(&self) -> Option<String> {
        self.state.last_content_type.lock().unwrap().clone()
    }
}

impl Drop for MockWorker {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn handle_generate(
    State(state): State<Arc<MockState>>,
    headers: axum::http::HeaderMap,
    body: String,
) -> Response {
    state.request_count.fetch_add(1, Ordering::Relaxed);
    *state.last_content_type.lock().unwrap() = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    *state.last_body.lock().unwrap() = serde_json::from_str(&body).ok();

    match &state.reply {
        Reply::Json(value) => Json(value.clone()).into_response(),
        Reply::Status(code) => (
            StatusCode::from_u16(*code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            "worker exploded",
        )
            .into_response(),
        Reply::Text(text) => (StatusCode::OK, *text).into_response(),
    }
}

async fn handle_image() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/png")], PNG_BYTES)
}
