use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use haulplan::scheduler;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::provider;

/// Everything a request can fail with, already sorted by who is to blame.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    ComplianceUnreachable(String),
    #[error("{0}")]
    Upstream(String),
    #[error("{0}")]
    Timeout(String),
    #[error("{0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::ComplianceUnreachable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<provider::Error> for ApiError {
    fn from(value: provider::Error) -> Self {
        match value {
            provider::Error::NotFound(_) => ApiError::Validation(value.to_string()),
            provider::Error::Timeout(_) => ApiError::Timeout(value.to_string()),
            provider::Error::Upstream { .. } | provider::Error::Decode { .. } => {
                ApiError::Upstream(value.to_string())
            }
        }
    }
}

impl From<scheduler::Error> for ApiError {
    fn from(value: scheduler::Error) -> Self {
        match value {
            scheduler::Error::InvalidCycle { .. } | scheduler::Error::InvalidRoute { .. } => {
                ApiError::Validation(value.to_string())
            }
            scheduler::Error::ComplianceUnreachable { .. } => {
                ApiError::ComplianceUnreachable(value.to_string())
            }
            scheduler::Error::InvalidSettings(_) | scheduler::Error::Invariant(_) => {
                ApiError::Internal(value.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Internal(message) => {
                error!("Failed to plan trip: {message}");
                "Internal error while planning the trip".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[test]
fn provider_errors_map_to_gateway_statuses() {
    let not_found: ApiError = provider::Error::NotFound("Atlantis".into()).into();
    assert_eq!(not_found.status(), StatusCode::BAD_REQUEST);
    let timeout: ApiError = provider::Error::Timeout("osrm").into();
    assert_eq!(timeout.status(), StatusCode::GATEWAY_TIMEOUT);
    let upstream: ApiError = provider::Error::Upstream {
        service: "nominatim",
        message: "503".into(),
    }
    .into();
    assert_eq!(upstream.status(), StatusCode::BAD_GATEWAY);
}

#[test]
fn compliance_is_unprocessable() {
    let err: ApiError = scheduler::Error::ComplianceUnreachable {
        needed: 71.0,
        available: 70.0,
    }
    .into();
    assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(err.to_string().contains("71.0"));
}
