//! Request handlers

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::state::AppState;
use super::{PredictRequest, PredictResponse, WelcomeResponse, WELCOME_MESSAGE};

/// `GET /` welcome banner
pub async fn root(State(state): State<AppState>) -> (StatusCode, Json<WelcomeResponse>) {
    state.metrics().record_request();

    (
        StatusCode::OK,
        Json(WelcomeResponse {
            message: WELCOME_MESSAGE.to_string(),
        }),
    )
}

/// `POST /predict` classifies one iris sample.
///
/// Requests that fail to deserialize are rejected by the extractor before
/// this handler runs, so the model only ever sees complete samples.
pub async fn predict(
    State(state): State<AppState>,
    Json(payload): Json<PredictRequest>,
) -> (StatusCode, Json<PredictResponse>) {
    state.metrics().record_request();

    let predicted = state
        .predictor()
        .predict(&[payload.features()])
        .first()
        .copied()
        .unwrap_or(0);
    state.metrics().record_prediction();

    tracing::info!(
        model = state.predictor().name(),
        predicted_species = predicted,
        "prediction served"
    );

    (
        StatusCode::OK,
        Json(PredictResponse {
            predicted_species: predicted,
        }),
    )
}

/// `GET /metrics` in Prometheus text exposition format
pub async fn metrics(State(state): State<AppState>) -> Response {
    state.metrics().record_request();

    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        state.metrics().render(),
    )
        .into_response()
}

// =============================================================================
// Tests
// =============================================================================
