use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{Html, Json},
    routing::{get, post},
};
use serde::Serialize;
use tracing::error;

use crate::AeroSenseError;
use crate::app::{AeroSense, MapSnapshot};
use crate::map::TileLayer;
use crate::render;
use crate::state::AssessmentReport;

type AppHandle = Arc<AeroSense>;

#[derive(Serialize)]
pub struct LayerResponse {
    pub layer: TileLayer,
}

/// Assessments sample and record into the shared state, so they are POST
pub fn router() -> Router<AppHandle> {
    Router::new()
        .route("/welcome", get(welcome))
        .route("/loading", get(loading))
        .route("/assessment", post(run_assessment))
        .route("/assessment.json", post(run_assessment_json))
        .route("/locate", post(locate))
        .route("/map", get(get_map))
        .route("/map/layer", post(toggle_layer))
}

fn internal_error(e: AeroSenseError) -> StatusCode {
    error!("Failed to render response: {e}");
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn welcome() -> Result<Html<String>, StatusCode> {
    render::welcome().map(Html).map_err(internal_error)
}

async fn loading() -> Result<Html<String>, StatusCode> {
    render::loading().map(Html).map_err(internal_error)
}

async fn run_assessment(State(app): State<AppHandle>) -> Result<Html<String>, StatusCode> {
    app.assess().await.to_html().map(Html).map_err(internal_error)
}

async fn run_assessment_json(State(app): State<AppHandle>) -> Json<AssessmentReport> {
    Json(app.assess().await)
}

async fn locate(State(app): State<AppHandle>) -> Result<Html<String>, StatusCode> {
    let fix = app.locate().await;
    render::location_notice(&fix.location, fix.notice)
        .map(Html)
        .map_err(internal_error)
}

async fn get_map(State(app): State<AppHandle>) -> Result<Json<MapSnapshot>, StatusCode> {
    app.map_snapshot().await.map(Json).map_err(internal_error)
}

async fn toggle_layer(State(app): State<AppHandle>) -> Json<LayerResponse> {
    Json(LayerResponse {
        layer: app.toggle_layer().await,
    })
}
