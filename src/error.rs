use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::constants::{
    MSG_INVALID_ACCOUNT, MSG_INVALID_LOCATION, MSG_METHOD_NOT_ALLOWED, MSG_MISSING_PARAMETERS,
    MSG_OUT_OF_ORDER, MSG_TRANSACTION_FAILED,
};
use crate::models::CheckInResponse;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing required parameter(s)")]
    MissingParameter,

    #[error("Invalid account: {0}")]
    InvalidAccount(String),

    #[error("Invalid location")]
    InvalidLocation,

    #[error("Locations must be visited in order")]
    OutOfOrderVisit,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Blockchain RPC error: {0}")]
    BlockchainRPC(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Validation outcomes the player is expected to see as guidance rather than a failure.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, AppError::InvalidLocation | AppError::OutOfOrderVisit)
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match self {
            AppError::InvalidLocation => MSG_INVALID_LOCATION,
            AppError::OutOfOrderVisit => MSG_OUT_OF_ORDER,
            _ => "",
        };
        if self.is_user_facing() {
            return (StatusCode::OK, Json(CheckInResponse::rejected(message))).into_response();
        }

        let (status, error) = match self {
            AppError::MissingParameter => (StatusCode::BAD_REQUEST, MSG_MISSING_PARAMETERS.to_string()),
            AppError::InvalidAccount(ref value) => {
                tracing::debug!("Rejected account or reference: {}", value);
                (StatusCode::BAD_REQUEST, MSG_INVALID_ACCOUNT.to_string())
            }
            AppError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                MSG_METHOD_NOT_ALLOWED.to_string(),
            ),
            AppError::NotFound(ref msg) => (StatusCode::NOT_FOUND, msg.clone()),
            _ => {
                tracing::error!("{}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    MSG_TRANSACTION_FAILED.to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
