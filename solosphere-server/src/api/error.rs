//! API Error Handling
//!
//! Unified error types and conversion for API responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::auth::AuthError;
use crate::service::bid::BidError;
use crate::service::job::JobError;
use crate::store::StoreError;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    StoreError(StoreError),
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::StoreError(err) => {
                tracing::error!("Store error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::StoreError(err)
    }
}

impl From<JobError> for ApiError {
    fn from(err: JobError) -> Self {
        match err {
            JobError::NotFound(id) => ApiError::NotFound(format!("Job {} not found", id)),
            JobError::Forbidden { owner, caller } => {
                tracing::warn!("{} tried to list jobs owned by {}", caller, owner);
                ApiError::Forbidden("Forbidden Access".to_string())
            }
            JobError::InvalidInput(msg) => ApiError::BadRequest(msg),
            JobError::Store(err) => ApiError::StoreError(err),
        }
    }
}

impl From<BidError> for ApiError {
    fn from(err: BidError) -> Self {
        match err {
            BidError::DuplicateBid { .. } => {
                ApiError::BadRequest("You have already placed a bid on this job".to_string())
            }
            BidError::InvalidInput(msg) => ApiError::BadRequest(msg),
            BidError::Store(err) => ApiError::StoreError(err),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken | AuthError::InvalidToken(_) => {
                tracing::debug!("Rejected session: {}", err);
                ApiError::Unauthorized("Unauthorized Access".to_string())
            }
            AuthError::Signing(err) => ApiError::InternalError(format!("Token signing failed: {}", err)),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::from(JobError::NotFound(Uuid::new_v4())), StatusCode::NOT_FOUND),
            (
                ApiError::from(JobError::Forbidden {
                    owner: "a@x.com".to_string(),
                    caller: "b@x.com".to_string(),
                }),
                StatusCode::FORBIDDEN,
            ),
            (
                ApiError::from(BidError::DuplicateBid {
                    email: "f@x.com".to_string(),
                    job_id: Uuid::new_v4(),
                }),
                StatusCode::BAD_REQUEST,
            ),
            (ApiError::from(AuthError::MissingToken), StatusCode::UNAUTHORIZED),
            (
                ApiError::from(StoreError::Unavailable("down".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }
}
