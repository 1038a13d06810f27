//! User DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{User, UserPayload};

/// User API representation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: u32,
    pub name: String,
    pub email: String,
    pub number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            number: u.number,
            created_at: Some(u.created_at),
            updated_at: Some(u.updated_at),
            deleted_at: u.deleted_at,
        }
    }
}

impl UserDto {
    /// Echo of an accepted update: the submitted fields under the path id.
    pub fn submitted(id: u32, payload: UserPayload) -> Self {
        Self {
            id,
            name: payload.name,
            email: payload.email,
            number: payload.number,
            created_at: None,
            updated_at: None,
            deleted_at: None,
        }
    }
}

/// Create/update user request
///
/// Missing fields take their zero value so that an absent name is reported
/// by validation rather than as a malformed body. Any `id` is ignored.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct UserRequest {
    pub name: String,
    pub email: String,
    pub number: u32,
}

impl From<UserRequest> for UserPayload {
    fn from(r: UserRequest) -> Self {
        UserPayload::new(r.name, r.email, r.number)
    }
}
