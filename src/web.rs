use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{Router, response::Html, routing::get};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AeroSenseError;
use crate::api;
use crate::app::AeroSense;

/// Containers the page must provide for the fragments and the map
pub const REQUIRED_CONTAINERS: [&str; 3] = ["map", "result", "risk-btn"];

const EMBEDDED_PAGE: &str = include_str!("../static/index.html");

/// The page served at `/`
#[derive(Debug, Clone)]
pub struct PageShell {
    html: String,
}

impl PageShell {
    /// Wrap page markup, failing if a required container is missing
    pub fn new(html: impl Into<String>) -> crate::Result<Self> {
        let html = html.into();
        for id in REQUIRED_CONTAINERS {
            if !has_id_attribute(&html, id) {
                return Err(AeroSenseError::presentation(format!("#{id}")));
            }
        }
        Ok(Self { html })
    }

    pub fn embedded() -> crate::Result<Self> {
        Self::new(EMBEDDED_PAGE)
    }

    pub fn from_path(path: &Path) -> crate::Result<Self> {
        Self::new(std::fs::read_to_string(path)?)
    }

    #[must_use]
    pub fn html(&self) -> &str {
        &self.html
    }
}

/// `id="x"` or `id='x'` as a whole attribute, so `data-id="x"` does not count
fn has_id_attribute(html: &str, id: &str) -> bool {
    [format!("id=\"{id}\""), format!("id='{id}'")]
        .iter()
        .any(|attribute| {
            html.match_indices(attribute.as_str()).any(|(at, _)| {
                html[..at]
                    .chars()
                    .next_back()
                    .is_some_and(char::is_whitespace)
            })
        })
}

pub fn app(service: Arc<AeroSense>, page: PageShell) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let page = Arc::new(page);
    Router::new()
        .route(
            "/",
            get(move || {
                let page = Arc::clone(&page);
                async move { Html(page.html().to_string()) }
            }),
        )
        .nest("/api", api::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(service)
}

pub async fn run(service: Arc<AeroSense>, page: PageShell, bind: &str, port: u16) -> Result<()> {
    let addr = format!("{bind}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://localhost:{}", port);
    axum::serve(listener, app(service, page))
        .await
        .with_context(|| "Web server stopped")?;
    Ok(())
}
