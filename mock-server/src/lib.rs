//! Test servers for the HTTP client.
//!
//! `app()` is a small axum router used for end-to-end runs against a real
//! HTTP stack. `scripted` is a raw TCP responder that replays exact bytes,
//! for responses no well-behaved server would produce.

pub mod scripted;

use axum::{
    body::Bytes,
    extract::Path,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use uuid::Uuid;

/// Request id header set on every `/echo` reply.
pub const REQUEST_ID: &str = "x-request-id";

/// Body of `GET /headers`: the request headers in arrival order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SeenHeaders {
    pub headers: Vec<(String, String)>,
}

pub fn app() -> Router {
    Router::new()
        .route("/hello", get(hello))
        .route("/echo", post(echo))
        .route("/headers", get(seen_headers))
        .route("/status/{code}", get(status))
        .route("/bytes/{len}", get(bytes))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn hello() -> &'static str {
    "hello, world"
}

async fn echo(headers: HeaderMap, body: Bytes) -> impl IntoResponse {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("application/octet-stream"));
    let id = Uuid::new_v4().to_string();
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (
                header::HeaderName::from_static(REQUEST_ID),
                HeaderValue::from_str(&id).unwrap_or_else(|_| HeaderValue::from_static("invalid")),
            ),
        ],
        body,
    )
}

async fn seen_headers(headers: HeaderMap) -> Json<SeenHeaders> {
    let headers = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    Json(SeenHeaders { headers })
}

async fn status(Path(code): Path<u16>) -> Result<StatusCode, StatusCode> {
    StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)
}

/// `len` bytes counting up from 0 and wrapping at 256.
async fn bytes(Path(len): Path<usize>) -> Result<Vec<u8>, StatusCode> {
    if len > 1 << 20 {
        return Err(StatusCode::PAYLOAD_TOO_LARGE);
    }
    Ok(pattern(len))
}

pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 256) as u8).collect()
}
