//! HTTP request handlers for the tariff engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::evaluate;
use crate::models::CalculationRequest;

use super::response::{ApiErrorResponse, CalculationResponse, VersionsResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/calculate", post(calculate_handler))
        .route("/versions", get(versions_handler))
        .with_state(state)
}

/// Handler for POST /calculate endpoint.
///
/// Accepts a calculation request and returns the itemized monthly pay.
async fn calculate_handler(
    State(state): State<AppState>,
    payload: Result<Json<CalculationRequest>, JsonRejection>,
) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing calculation request");

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let error = ApiErrorResponse::from(rejection);
            warn!(
                correlation_id = %correlation_id,
                code = %error.error.code,
                error = %error.error.details.as_deref().unwrap_or(&error.error.message),
                "Rejected calculation request"
            );
            return error.into_response();
        }
    };

    let start_time = Instant::now();
    let result = evaluate(state.index(), &request);
    let duration = start_time.elapsed();

    info!(
        correlation_id = %correlation_id,
        pay_grade = %request.pay_grade,
        year = request.year,
        month = request.month,
        grand_total = %result.grand_total.normalize(),
        warnings = result.audit_trace.warnings.len(),
        duration_us = duration.as_micros(),
        "Calculation completed"
    );

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        Json(CalculationResponse::new(correlation_id, result)),
    )
        .into_response()
}

/// Handler for GET /versions endpoint.
///
/// Lists the tariff versions with their pay grades and step counts.
async fn versions_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        Json(VersionsResponse::from_index(state.index())),
    )
}
