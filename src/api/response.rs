//! Response types for the tariff engine API.
//!
//! This module defines the success payloads and the error response
//! structures returned by the HTTP API.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::TariffIndex;
use crate::models::{CalculationResult, PayGrade, VersionId};

/// The engine version reported with every calculation.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Envelope for a successful calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationResponse {
    /// Identifies this calculation in logs.
    pub calculation_id: Uuid,
    /// When the calculation was performed.
    pub timestamp: DateTime<Utc>,
    /// The engine version that produced the result.
    pub engine_version: String,
    /// The calculation result.
    pub result: CalculationResult,
}

impl CalculationResponse {
    /// Wraps a result, stamping it with the current time.
    pub fn new(calculation_id: Uuid, result: CalculationResult) -> Self {
        Self {
            calculation_id,
            timestamp: Utc::now(),
            engine_version: ENGINE_VERSION.to_string(),
            result,
        }
    }
}

/// Step count of one pay grade at a version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayGradeSummary {
    /// The pay grade.
    pub pay_grade: PayGrade,
    /// Number of seniority steps in its wage row.
    pub steps: usize,
}

/// The pay grades available at one version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSummary {
    /// The version.
    pub version: VersionId,
    /// Grades with a wage row in force at this version.
    pub pay_grades: Vec<PayGradeSummary>,
}

/// Body of `GET /versions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionsResponse {
    /// Contractual weekly hours.
    pub weekly_hours: Decimal,
    /// All versions, ascending.
    pub versions: Vec<VersionSummary>,
}

impl VersionsResponse {
    /// Describes the versions held by an index.
    pub fn from_index(index: &TariffIndex) -> Self {
        let versions = index
            .versions()
            .iter()
            .map(|&version| VersionSummary {
                version,
                pay_grades: index
                    .pay_grades_at(version)
                    .into_iter()
                    .map(|pay_grade| PayGradeSummary {
                        pay_grade,
                        steps: index.steps_at(version, pay_grade),
                    })
                    .collect(),
            })
            .collect();

        Self {
            weekly_hours: index.weekly_hours(),
            versions,
        }
    }
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(details: impl Into<String>) -> Self {
        Self::with_details("VALIDATION_ERROR", "Invalid calculation request", details)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }

    /// Creates a missing content type error response.
    pub fn missing_content_type() -> Self {
        Self::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
    }
}

/// API error with HTTP status code.
#[derive(Debug)]
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            Json(self.error),
        )
            .into_response()
    }
}

impl From<JsonRejection> for ApiErrorResponse {
    fn from(rejection: JsonRejection) -> Self {
        let error = match rejection {
            JsonRejection::JsonDataError(err) => ApiError::validation_error(err.body_text()),
            JsonRejection::JsonSyntaxError(err) => {
                ApiError::malformed_json(format!("Invalid JSON syntax: {}", err.body_text()))
            }
            JsonRejection::MissingJsonContentType(_) => ApiError::missing_content_type(),
            other => ApiError::malformed_json(other.body_text()),
        };
        ApiErrorResponse {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}
