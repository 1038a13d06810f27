use async_trait::async_trait;

use super::{User, UserPayload};
use crate::domain::DomainResult;

/// Storage port for user records.
///
/// Implementations must be safe for concurrent use by in-flight requests;
/// the HTTP layer performs no locking of its own.
#[async_trait]
pub trait UserRepositoryInterface: Send + Sync {
    /// All live records, ordered by id. An empty store is not an error.
    async fn find_all(&self) -> DomainResult<Vec<User>>;

    /// Returns `DomainError::NotFound` when no live record has this id.
    async fn find_by_id(&self, id: u32) -> DomainResult<User>;

    /// Persists a new record and returns it with the assigned id.
    async fn create(&self, payload: UserPayload) -> DomainResult<User>;

    /// Writes the non-zero fields of `patch` onto the record.
    ///
    /// A missing id is not reported: zero affected rows is still `Ok`.
    async fn update_by_id(&self, id: u32, patch: UserPayload) -> DomainResult<()>;

    /// Soft-deletes the record. A missing id is still `Ok`.
    async fn delete_by_id(&self, id: u32) -> DomainResult<()>;
}
