//! User resource API handlers
//!
//! Every handler follows the same linear pipeline: parse input, validate
//! (writes only), call storage, map the outcome to a response. Each exit
//! path emits exactly one log entry tagged with the request id, endpoint
//! template and method.

use std::fmt::Display;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::{error, info};

use super::dto::{UserDto, UserRequest};
use crate::domain::{UserPayload, UserRepositoryInterface};
use crate::interfaces::http::error::{ApiError, ErrorBody, MessageBody};
use crate::interfaces::http::modules::request_id::RequestId;
use crate::shared::validations::validate_user;

/// Collection route template.
pub const USERS_ENDPOINT: &str = "/api/v1/users";
/// Item route template.
pub const USER_ENDPOINT: &str = "/api/v1/users/{id}";

/// User handler state.
#[derive(Clone)]
pub struct UserHandlerState {
    pub users: Arc<dyn UserRepositoryInterface>,
}

impl UserHandlerState {
    pub fn new(users: Arc<dyn UserRepositoryInterface>) -> Self {
        Self { users }
    }
}

/// Path id as an unsigned decimal. Signs, whitespace and other non-digit
/// characters are rejected, which `u32::from_str` alone would not do for `+`.
fn parse_user_id(raw: &str) -> Option<u32> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Per-call log fields shared by all entries of one handler invocation.
struct RequestLog<'a> {
    request_id: &'a str,
    endpoint: &'static str,
    method: &'static str,
}

impl<'a> RequestLog<'a> {
    fn new(request_id: &'a RequestId, endpoint: &'static str, method: &'static str) -> Self {
        Self {
            request_id: request_id.as_str(),
            endpoint,
            method,
        }
    }

    fn success(&self, message: impl Display) {
        info!(
            "request-id" = self.request_id,
            endpoint = self.endpoint,
            method = self.method,
            "{}",
            message
        );
    }

    fn failure(&self, error: impl Display, message: impl Display) {
        error!(
            "request-id" = self.request_id,
            endpoint = self.endpoint,
            method = self.method,
            error = %error,
            "{}",
            message
        );
    }

    fn rejected(&self, input: &str, message: impl Display) {
        error!(
            "request-id" = self.request_id,
            endpoint = self.endpoint,
            method = self.method,
            input = input,
            "{}",
            message
        );
    }

    fn parse_id(&self, raw: &str) -> Result<u32, ApiError> {
        parse_user_id(raw).ok_or_else(|| {
            self.rejected(raw, "Invalid user ID");
            ApiError::InvalidId
        })
    }

    fn parse_body(&self, body: Result<Json<UserRequest>, JsonRejection>) -> Result<UserPayload, ApiError> {
        match body {
            Ok(Json(request)) => Ok(request.into()),
            Err(rejection) => {
                let detail = rejection.body_text();
                self.failure(&detail, "Failed to bind user data");
                Err(ApiError::InvalidBody(detail))
            }
        }
    }

    fn validate(&self, payload: &UserPayload) -> Result<(), ApiError> {
        validate_user(payload).map_err(|e| {
            self.failure(&e, "User validation failed");
            ApiError::from(e)
        })
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    responses(
        (status = 200, description = "All users", body = Vec<UserDto>),
        (status = 500, description = "Storage failure", body = ErrorBody)
    )
)]
pub async fn list_users(
    State(state): State<UserHandlerState>,
    Extension(request_id): Extension<RequestId>,
) -> Result<Json<Vec<UserDto>>, ApiError> {
    let log = RequestLog::new(&request_id, USERS_ENDPOINT, "GET");

    match state.users.find_all().await {
        Ok(users) => {
            log.success(format_args!("Fetched {} users", users.len()));
            Ok(Json(users.into_iter().map(UserDto::from).collect()))
        }
        Err(e) => {
            log.failure(&e, "Failed to fetch users");
            Err(e.into())
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(("id" = u32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = UserDto),
        (status = 400, description = "Invalid user ID", body = MessageBody),
        (status = 404, description = "User not found", body = MessageBody),
        (status = 500, description = "Storage failure", body = ErrorBody)
    )
)]
pub async fn get_user(
    State(state): State<UserHandlerState>,
    Extension(request_id): Extension<RequestId>,
    Path(raw_id): Path<String>,
) -> Result<Json<UserDto>, ApiError> {
    let log = RequestLog::new(&request_id, USER_ENDPOINT, "GET");
    let id = log.parse_id(&raw_id)?;

    match state.users.find_by_id(id).await {
        Ok(user) => {
            log.success(format_args!("Fetched user with ID: {}", user.id));
            Ok(Json(UserDto::from(user)))
        }
        Err(e) => {
            log.failure(&e, format_args!("Failed to fetch user with ID: {}", id));
            Err(e.into())
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "Users",
    request_body = UserRequest,
    responses(
        (status = 201, description = "User created", body = UserDto),
        (status = 400, description = "Malformed body or validation error", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody)
    )
)]
pub async fn create_user(
    State(state): State<UserHandlerState>,
    Extension(request_id): Extension<RequestId>,
    body: Result<Json<UserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserDto>), ApiError> {
    let log = RequestLog::new(&request_id, USERS_ENDPOINT, "POST");
    let payload = log.parse_body(body)?;
    log.validate(&payload)?;

    match state.users.create(payload).await {
        Ok(user) => {
            log.success(format_args!("Created new user with ID: {}", user.id));
            Ok((StatusCode::CREATED, Json(UserDto::from(user))))
        }
        Err(e) => {
            log.failure(&e, "Failed to create user");
            Err(e.into())
        }
    }
}

#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(("id" = u32, Path, description = "User ID")),
    request_body = UserRequest,
    responses(
        (status = 200, description = "Submitted user representation", body = UserDto),
        (status = 400, description = "Invalid user ID, malformed body or validation error"),
        (status = 500, description = "Storage failure", body = ErrorBody)
    )
)]
pub async fn update_user(
    State(state): State<UserHandlerState>,
    Extension(request_id): Extension<RequestId>,
    Path(raw_id): Path<String>,
    body: Result<Json<UserRequest>, JsonRejection>,
) -> Result<Json<UserDto>, ApiError> {
    let log = RequestLog::new(&request_id, USER_ENDPOINT, "PUT");
    let id = log.parse_id(&raw_id)?;
    let payload = log.parse_body(body)?;
    log.validate(&payload)?;

    // Zero affected rows is not distinguished from an update
    match state.users.update_by_id(id, payload.clone()).await {
        Ok(()) => {
            log.success(format_args!("Updated user with ID: {}", id));
            Ok(Json(UserDto::submitted(id, payload)))
        }
        Err(e) => {
            log.failure(&e, format_args!("Failed to update user with ID: {}", id));
            Err(e.into())
        }
    }
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(("id" = u32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = MessageBody),
        (status = 400, description = "Invalid user ID", body = MessageBody),
        (status = 500, description = "Storage failure", body = ErrorBody)
    )
)]
pub async fn delete_user(
    State(state): State<UserHandlerState>,
    Extension(request_id): Extension<RequestId>,
    Path(raw_id): Path<String>,
) -> Result<Json<MessageBody>, ApiError> {
    let log = RequestLog::new(&request_id, USER_ENDPOINT, "DELETE");
    let id = log.parse_id(&raw_id)?;

    // Deleting a missing id still reports success
    match state.users.delete_by_id(id).await {
        Ok(()) => {
            log.success(format_args!("Deleted user with ID: {}", id));
            Ok(Json(MessageBody::new("User deleted")))
        }
        Err(e) => {
            log.failure(&e, format_args!("Failed to delete user with ID: {}", id));
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_accepts_plain_decimal() {
        assert_eq!(parse_user_id("0"), Some(0));
        assert_eq!(parse_user_id("42"), Some(42));
        assert_eq!(parse_user_id("007"), Some(7));
        assert_eq!(parse_user_id("4294967295"), Some(u32::MAX));
    }

    #[test]
    fn user_id_rejects_signs_and_junk() {
        for raw in ["", "+1", "-1", " 1", "1 ", "1e3", "0x1", "abc", "4294967296"] {
            assert_eq!(parse_user_id(raw), None, "{:?}", raw);
        }
    }
}
