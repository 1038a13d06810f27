use chrono::{DateTime, Utc};
use validator::Validate;

/// Stored user record.
///
/// `id` is assigned by storage on creation and never changes afterwards.
/// The timestamps are owned by the storage layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: u32,
    pub name: String,
    pub email: String,
    pub number: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Client-supplied user fields for create and update.
///
/// The field rules live here; [`crate::shared::validations::validate_user`]
/// runs them and normalizes the error report.
#[derive(Clone, Debug, Default, PartialEq, Eq, Validate)]
pub struct UserPayload {
    #[validate(length(min = 3, max = 32, message = "must be between 3 and 32 characters"))]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    pub number: u32,
}

impl UserPayload {
    pub fn new(name: impl Into<String>, email: impl Into<String>, number: u32) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            number,
        }
    }
}
