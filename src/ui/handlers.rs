//! HTTP API handlers

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::codec::compress_jpeg;
use crate::constants::VIEWER_JPEG_QUALITY;
use crate::ui::server::AppState;
use crate::video::WindowSnapshot;

/// API response wrapper
#[derive(serde::Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

/// System status
#[derive(serde::Serialize)]
pub struct SystemStatus {
    pub mode: String,
    pub window_count: usize,
    pub uptime_seconds: u64,
}

/// Get system status
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<ApiResponse<SystemStatus>> {
    let status = SystemStatus {
        mode: if state.is_sender { "sender" } else { "receiver" }.to_string(),
        window_count: state.board.window_count(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    };

    Json(ApiResponse::ok(status))
}

/// List windows that have shown at least one frame
pub async fn get_windows(State(state): State<Arc<AppState>>) -> Json<ApiResponse<Vec<WindowSnapshot>>> {
    Json(ApiResponse::ok(state.board.snapshot()))
}

/// Latest frame of one window as JPEG
pub async fn get_frame(State(state): State<Arc<AppState>>, Path(name): Path<String>) -> Response {
    let Some(image) = state.board.latest(&name).and_then(|frame| frame.into_image()) else {
        return (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<()>::error(format!("unknown window '{}'", name))),
        )
            .into_response();
    };

    match compress_jpeg(&image, VIEWER_JPEG_QUALITY) {
        Ok(jpeg) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "image/jpeg"),
                (header::CACHE_CONTROL, "no-store"),
            ],
            jpeg,
        )
            .into_response(),
        Err(e) => {
            tracing::warn!("[{}] Viewer encode failed: {}", name, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error(e.to_string())),
            )
                .into_response()
        }
    }
}

/// Viewer page: one image per window, refreshed continuously
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

const INDEX_HTML: &str = r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<title>LAN Video Streamer</title>
<style>
  body { background: #202028; color: #ddd; font-family: sans-serif; margin: 16px; }
  .window { display: inline-block; margin: 8px; vertical-align: top; }
  .window h2 { font-size: 14px; margin: 4px 0; }
  .window img { display: block; background: #000; }
</style>
</head>
<body>
<div id="windows"></div>
<script>
const root = document.getElementById("windows");
const images = new Map();

async function refreshWindows() {
  try {
    const res = await fetch("/api/windows");
    const body = await res.json();
    for (const w of body.data || []) {
      if (!images.has(w.name)) {
        const div = document.createElement("div");
        div.className = "window";
        const title = document.createElement("h2");
        title.textContent = w.name;
        const img = document.createElement("img");
        div.append(title, img);
        root.append(div);
        images.set(w.name, img);
        refreshImage(w.name, img);
      }
    }
  } catch (e) {}
  setTimeout(refreshWindows, 1000);
}

function refreshImage(name, img) {
  const next = () => setTimeout(() => refreshImage(name, img), 15);
  img.onload = next;
  img.onerror = () => setTimeout(() => refreshImage(name, img), 500);
  img.src = "/windows/" + encodeURIComponent(name) + "/frame.jpg?t=" + Date.now();
}

refreshWindows();
</script>
</body>
</html>
"#;
