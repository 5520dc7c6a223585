//! HTTP API routes and handlers

use crate::app_state::SharedAppState;
use crate::error::HpiError;
use crate::metrics;
use crate::models;
use crate::validated_json::ValidatedJson;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower::Layer;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::trace::TraceLayer;

/// Service that serves the API, with trailing slashes removed from request paths.
pub type Service = NormalizePath<Router>;

/// Returns a [axum::Router] for the API.
///
/// # Arguments
///
/// * `state`: Shared application state handed to every handler
pub fn router(state: SharedAppState) -> Router {
    fn api() -> Router<SharedAppState> {
        Router::new()
            .route("/locations", get(locations))
            .route("/calculate/hpi/:location", get(location_hpi))
            .route("/all-data", get(all_data))
            .route("/add-data", post(add_data))
    }

    Router::new()
        .route("/", get(describe))
        .route("/metrics", get(metrics::metrics_handler))
        .nest("/api", api())
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .on_request(metrics::request_counter)
                        .on_response(metrics::record_response_metrics),
                )
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Returns a [Service] for the API.
///
/// # Arguments
///
/// * `state`: Shared application state handed to every handler
pub fn service(state: SharedAppState) -> Service {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}

/// Describe the service and its endpoints.
async fn describe() -> Json<Value> {
    Json(json!({
        "message": "Welcome to the Heavy Metal Pollution Index API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "/api/locations": "GET - Returns a list of all unique sample locations.",
            "/api/calculate/hpi/:location": "GET - Calculates HPI for the latest sample from a specific location.",
            "/api/all-data": "GET - Returns all samples with their calculated HPI.",
            "/api/add-data": "POST - Adds a sample. Location, Longitude and Latitude are required.",
            "/metrics": "GET - Returns Prometheus metrics.",
        }
    }))
}

/// Handler for the locations endpoint.
async fn locations(State(state): State<SharedAppState>) -> Json<models::Locations> {
    Json(models::Locations {
        locations: state.query.unique_locations(),
    })
}

/// Handler for the location HPI endpoint.
async fn location_hpi(
    State(state): State<SharedAppState>,
    Path(location): Path<String>,
) -> Result<Json<models::LocationHpi>, HpiError> {
    state.query.hpi_for_location(&location).map(Json)
}

/// Handler for the all data endpoint.
async fn all_data(State(state): State<SharedAppState>) -> Json<Vec<models::SampleWithHpi>> {
    Json(state.query.all_samples_with_hpi())
}

/// Handler for the add data endpoint.
///
/// Responds with 201 Created and the stored sample, including its HPI.
async fn add_data(
    State(state): State<SharedAppState>,
    ValidatedJson(new_sample): ValidatedJson<models::NewSample>,
) -> Result<(StatusCode, Json<models::SampleWithHpi>), HpiError> {
    let added = state.query.append_sample(&new_sample).await?;
    Ok((StatusCode::CREATED, Json(added)))
}
