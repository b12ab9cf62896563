//! HTTP boundary answering requests straight from the content set.
//!
//! Only `GET` is served. The query string is ignored. Content loads go
//! through a single lane, since a content set renders one page at a time.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use lithograph_core::mime;
use lithograph_generator::{
    ContentSet, GeneratorError, controllers::page::DEFAULT_SERVER_ERROR_BODY,
};
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

/// Server state: the content set and the lane requests queue on.
#[derive(Clone)]
pub struct ServerState {
    site: Arc<ContentSet>,
    lane: Arc<Mutex<()>>,
}

impl ServerState {
    #[must_use]
    pub fn new(site: Arc<ContentSet>) -> Self {
        Self {
            site,
            lane: Arc::new(Mutex::new(())),
        }
    }
}

/// Create the router serving every url path from `site`.
pub fn create_router(site: Arc<ContentSet>) -> Router {
    Router::new()
        .fallback(serve_content)
        .layer(TraceLayer::new_for_http())
        .with_state(ServerState::new(site))
}

async fn serve_content(State(state): State<ServerState>, method: Method, uri: Uri) -> Response {
    if method != Method::GET {
        return (StatusCode::METHOD_NOT_ALLOWED, [(header::ALLOW, "GET")]).into_response();
    }

    let url_path = uri.path();
    let _lane = state.lane.lock().await;

    match respond(&state.site, url_path).await {
        Ok(response) => response,
        Err(e) => {
            error!(url = url_path, error = %e, "failed to serve content");
            server_error(&state.site)
        }
    }
}

async fn respond(site: &ContentSet, url_path: &str) -> Result<Response, GeneratorError> {
    let item = site.describe(url_path)?;
    debug!(url = url_path, response = item.response.name(), "content item described");

    let status = StatusCode::from_u16(item.response.status_code())
        .map_err(|e| GeneratorError::upstream("mapping response status", e))?;
    let content = site.load_content(&item).await?;

    let mut response = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, item.mime);
    if let Some(to) = item.response.redirect_to() {
        response = response.header(header::LOCATION, to);
    }

    response
        .body(Body::from(content))
        .map_err(|e| GeneratorError::upstream("building response", e))
}

fn server_error(site: &ContentSet) -> Response {
    let body = site.server_error_page_content().unwrap_or_else(|e| {
        error!(error = %e, "server error page unavailable");
        DEFAULT_SERVER_ERROR_BODY.to_string()
    });

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, mime::HTML)],
        body,
    )
        .into_response()
}
