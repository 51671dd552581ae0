//! HTTP API module for the tariff engine.
//!
//! This module provides the REST endpoints that host the engine: one to
//! calculate a month of pay and one to list the available tariff versions.

mod handlers;
mod response;
mod state;

pub use handlers::create_router;
pub use response::{
    ApiError, ApiErrorResponse, CalculationResponse, ENGINE_VERSION, PayGradeSummary,
    VersionSummary, VersionsResponse,
};
pub use state::AppState;
