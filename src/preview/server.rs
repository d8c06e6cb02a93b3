//! Local HTTP preview server
//!
//! Serves the latest session snapshot: the preview page, the formatted
//! source, the raw document, and a download of `index.html`. The server
//! only reads; every write goes through the builder flow.

use crate::error::{Result, SitewrightError};
use crate::formatter::display_source;
use crate::preview::page::render_page;
use crate::preview::view::{PreviewState, ViewMode, Viewport};
use crate::session::document::{EXPORT_CONTENT_TYPE, EXPORT_FILE_NAME};
use crate::session::{Phase, SessionSnapshot, Turn};

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::{Arc, RwLock};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const NO_DOCUMENT: &str = "No document has been generated yet";

/// State shared by every preview route
#[derive(Clone)]
pub struct PreviewContext {
    session: watch::Receiver<SessionSnapshot>,
    view: Arc<RwLock<PreviewState>>,
}

impl PreviewContext {
    /// Create a context reading from `session` with `view` as page defaults
    pub fn new(session: watch::Receiver<SessionSnapshot>, view: Arc<RwLock<PreviewState>>) -> Self {
        Self { session, view }
    }

    fn snapshot(&self) -> SessionSnapshot {
        self.session.borrow().clone()
    }

    fn default_view(&self) -> PreviewState {
        self.view
            .read()
            .map(|view| *view)
            .unwrap_or_else(|poisoned| *poisoned.into_inner())
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Session summary served at `/api/session`
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub phase: Phase,
    pub turn_count: usize,
    pub has_document: bool,
    pub document_bytes: usize,
    pub view: PreviewState,
    pub turns: Vec<Turn>,
}

/// Optional overrides of the page defaults
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub mode: Option<String>,
    pub viewport: Option<String>,
}

/// Construct the preview router with all endpoints
pub fn preview_router(context: PreviewContext) -> Router {
    Router::new()
        .route("/", get(page))
        .route("/source", get(source))
        .route("/document", get(document))
        .route("/download", get(download))
        .route("/api/session", get(session))
        .route("/health", get(health_check))
        .with_state(context)
}

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "sitewright-preview".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Preview page
///
/// GET /?mode=rendered|source&viewport=full|tablet|mobile
async fn page(
    State(context): State<PreviewContext>,
    Query(query): Query<PageQuery>,
) -> std::result::Result<Html<String>, (StatusCode, String)> {
    let mut view = context.default_view();

    if let Some(mode) = query.mode.as_deref() {
        view.mode = ViewMode::parse_str(mode).map_err(|e| (StatusCode::BAD_REQUEST, e))?;
    }
    if let Some(viewport) = query.viewport.as_deref() {
        view.viewport = Viewport::parse_str(viewport).map_err(|e| (StatusCode::BAD_REQUEST, e))?;
    }

    tracing::debug!("GET / mode={} viewport={}", view.mode, view.viewport);
    Ok(Html(render_page(&context.snapshot(), view)))
}

/// Formatted source as plain text
async fn source(State(context): State<PreviewContext>) -> Response {
    match context.snapshot().document.as_context() {
        Some(html) => (
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            display_source(html),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, NO_DOCUMENT).into_response(),
    }
}

/// Raw document, displayed inline
async fn document(State(context): State<PreviewContext>) -> Response {
    match context.snapshot().document.as_context() {
        Some(html) => ([(header::CONTENT_TYPE, EXPORT_CONTENT_TYPE)], html.to_string()).into_response(),
        None => (StatusCode::NOT_FOUND, NO_DOCUMENT).into_response(),
    }
}

/// Raw document as an `index.html` attachment
async fn download(State(context): State<PreviewContext>) -> Response {
    let snapshot = context.snapshot();
    let Some(html) = snapshot.document.as_context() else {
        return (StatusCode::NOT_FOUND, NO_DOCUMENT).into_response();
    };

    tracing::info!("Serving {} ({} bytes) for download", EXPORT_FILE_NAME, html.len());
    (
        [
            (header::CONTENT_TYPE, EXPORT_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME),
            ),
        ],
        html.to_string(),
    )
        .into_response()
}

/// Session summary as JSON
async fn session(State(context): State<PreviewContext>) -> Json<SessionResponse> {
    let snapshot = context.snapshot();
    let document_bytes = snapshot.document.as_context().map_or(0, str::len);

    Json(SessionResponse {
        phase: snapshot.phase,
        turn_count: snapshot.conversation.len(),
        has_document: document_bytes > 0,
        document_bytes,
        view: context.default_view(),
        turns: snapshot.conversation.turns().to_vec(),
    })
}

/// A running preview server
pub struct PreviewServer {
    addr: SocketAddr,
    shutdown: CancellationToken,
    handle: JoinHandle<()>,
}

impl PreviewServer {
    /// Bind `host:port` and serve in a background task
    ///
    /// Port 0 picks a free port; [`PreviewServer::url`] reports the one chosen.
    ///
    /// # Errors
    ///
    /// Returns `SitewrightError::Preview` if the address cannot be bound
    pub async fn spawn(host: &str, port: u16, context: PreviewContext) -> Result<Self> {
        let listener = tokio::net::TcpListener::bind((host, port))
            .await
            .map_err(|e| {
                SitewrightError::Preview(format!("Failed to bind {}:{}: {}", host, port, e))
            })?;
        let addr = listener.local_addr()?;

        let shutdown = CancellationToken::new();
        let signal = shutdown.clone();
        let app = preview_router(context);

        let handle = tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move { signal.cancelled().await })
                .await;
            if let Err(e) = result {
                tracing::error!("Preview server stopped: {}", e);
            }
        });

        tracing::info!("Preview server listening on http://{}", addr);
        Ok(Self {
            addr,
            shutdown,
            handle,
        })
    }

    /// Bound address
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL of the preview page
    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Stop accepting connections and wait for the server task to end
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        if let Err(e) = self.handle.await {
            tracing::warn!("Preview server task ended abnormally: {}", e);
        }
    }
}
