//! Error → HTTP response mapping
//!
//! Bad ids and missing records answer with `{"message": ..}`; body, validation
//! and storage failures answer with `{"error": ..}`. Clients depend on this
//! asymmetry.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::domain::DomainError;
use crate::shared::validations::UserValidationError;

pub const INVALID_USER_ID: &str = "Invalid user ID";
pub const USER_NOT_FOUND: &str = "User not found";

/// `{"error": "..."}`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// `{"message": "..."}`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Every way a user request can fail, resolved at the handler boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Path id is not an unsigned integer
    #[error("{}", INVALID_USER_ID)]
    InvalidId,

    /// Body is not a well-formed user document
    #[error("{0}")]
    InvalidBody(String),

    #[error(transparent)]
    Validation(#[from] UserValidationError),

    #[error("{}", USER_NOT_FOUND)]
    NotFound,

    /// Raw message from the storage collaborator
    #[error("{0}")]
    Storage(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidId | Self::InvalidBody(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound { .. } => Self::NotFound,
            DomainError::Storage(msg) => Self::Storage(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::InvalidId | Self::NotFound => {
                (status, Json(MessageBody::new(self.to_string()))).into_response()
            }
            Self::InvalidBody(_) | Self::Validation(_) | Self::Storage(_) => {
                (status, Json(ErrorBody { error: self.to_string() })).into_response()
            }
        }
    }
}
