//! HTTP endpoints for persisting preview HTML and slide documents.

use std::fs;
use std::path::PathBuf;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::preview;

/// File the preview page is written to, served back statically.
const PREVIEW_FILE: &str = "preview-slide.html";

/// Directory for persisted slide documents.
const LOG_DIR: &str = "logs";

/// File the latest slide document is written to.
const LOG_FILE: &str = "slide.json";

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// Directory holding the preview file, the log directory, and the
    /// statically served files.
    pub root: PathBuf,
}

/// Build the preview server router.
pub fn build_router(state: AppState) -> Router {
    let static_files = ServeDir::new(state.root.clone());

    Router::new()
        .route("/save-html", post(save_html))
        .route("/write-preview-html", post(write_preview_html))
        .route("/save-slide-data", post(save_slide_data))
        .route("/save-log", post(save_log))
        .fallback_service(static_files)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Handler for `POST /save-html`: wrap submitted HTML in the preview shell
/// page and persist it.
async fn save_html(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let html = extract_html(&body);
    if html.is_empty() {
        return bad_request("No HTML content provided");
    }

    let page = preview::render_preview_page(html);
    let target = state.root.join(PREVIEW_FILE);
    match fs::write(&target, page) {
        Ok(()) => {
            log::info!("Preview page written to {}", target.display());
            (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "message": "HTML saved successfully",
                    "preview_url": format!("/{}", PREVIEW_FILE),
                })),
            )
        }
        Err(e) => server_error(&e.to_string()),
    }
}

/// Handler for `POST /write-preview-html`: persist submitted HTML verbatim.
async fn write_preview_html(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let html = body.get("html").and_then(Value::as_str).unwrap_or("");
    if html.is_empty() {
        return bad_request("No HTML content provided");
    }

    let target = state.root.join(PREVIEW_FILE);
    match fs::write(&target, html) {
        Ok(()) => {
            log::info!("HTML content written to {}", target.display());
            (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "message": format!("HTML written to {}", PREVIEW_FILE),
                })),
            )
        }
        Err(e) => server_error(&e.to_string()),
    }
}

/// Handler for `POST /save-slide-data`: persist a converted slide document.
async fn save_slide_data(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !chartdeck_core::validate(&body) {
        log::warn!("Persisted slide data failed structural validation");
    }

    match persist_log(&state, &body) {
        Ok(path) => {
            log::info!("Slide data saved to {}", path.display());
            (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "message": "Slide data saved successfully",
                })),
            )
        }
        Err(e) => server_error(&e.to_string()),
    }
}

/// Handler for `POST /save-log`: persist an arbitrary JSON body to the log
/// file and report where it landed.
async fn save_log(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    match persist_log(&state, &body) {
        Ok(path) => {
            log::info!("API response logged to {}", path.display());
            (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "log_file": path.display().to_string(),
                })),
            )
        }
        Err(e) => server_error(&e.to_string()),
    }
}

/// Write a JSON body to `logs/slide.json` under the server root, creating
/// the directory if needed.
fn persist_log(state: &AppState, body: &Value) -> anyhow::Result<PathBuf> {
    let dir = state.root.join(LOG_DIR);
    fs::create_dir_all(&dir)?;

    let path = dir.join(LOG_FILE);
    fs::write(&path, serde_json::to_string_pretty(body)?)?;
    Ok(path)
}

/// Pull the HTML payload out of a request body, preferring `html_content`.
fn extract_html(body: &Value) -> &str {
    let primary = body
        .get("html_content")
        .and_then(Value::as_str)
        .unwrap_or("");
    if !primary.is_empty() {
        return primary;
    }
    body.get("html").and_then(Value::as_str).unwrap_or("")
}

fn bad_request(error: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"success": false, "error": error})),
    )
}

fn server_error(error: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"success": false, "error": format!("Server error: {}", error)})),
    )
}
