use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::domain::{DomainError, DomainResult, User, UserPayload, UserRepositoryInterface};
use crate::infrastructure::database::entities::user;

/// SeaORM-backed user store with soft deletes.
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn user_model_to_domain(model: user::Model) -> DomainResult<User> {
    let id = u32::try_from(model.id)
        .map_err(|_| DomainError::Storage(format!("invalid user id in storage: {}", model.id)))?;
    let number = u32::try_from(model.number).map_err(|_| {
        DomainError::Storage(format!("invalid number for user {}: {}", model.id, model.number))
    })?;

    Ok(User {
        id,
        name: model.name,
        email: model.email,
        number,
        created_at: model.created_at,
        updated_at: model.updated_at,
        deleted_at: model.deleted_at,
    })
}

/// Ids above `i32::MAX` cannot exist in the table.
fn storage_key(id: u32) -> Option<i32> {
    i32::try_from(id).ok()
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Storage(e.to_string())
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl UserRepositoryInterface for UserRepository {
    async fn find_all(&self) -> DomainResult<Vec<User>> {
        let models = user::Entity::find()
            .filter(user::Column::DeletedAt.is_null())
            .order_by_asc(user::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        models.into_iter().map(user_model_to_domain).collect()
    }

    async fn find_by_id(&self, id: u32) -> DomainResult<User> {
        let Some(key) = storage_key(id) else {
            return Err(DomainError::user_not_found(id));
        };

        let model = user::Entity::find_by_id(key)
            .filter(user::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(db_err)?;

        match model {
            Some(model) => user_model_to_domain(model),
            None => Err(DomainError::user_not_found(id)),
        }
    }

    async fn create(&self, payload: UserPayload) -> DomainResult<User> {
        let now = Utc::now();

        let new_user = user::ActiveModel {
            id: NotSet,
            name: Set(payload.name),
            email: Set(payload.email),
            number: Set(i64::from(payload.number)),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        };

        let model = new_user.insert(&self.db).await.map_err(db_err)?;
        user_model_to_domain(model)
    }

    async fn update_by_id(&self, id: u32, patch: UserPayload) -> DomainResult<()> {
        let Some(key) = storage_key(id) else {
            return Ok(());
        };

        // Zero values in the patch leave the stored column untouched
        let mut update = user::Entity::update_many()
            .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now()));
        if !patch.name.is_empty() {
            update = update.col_expr(user::Column::Name, Expr::value(patch.name));
        }
        if !patch.email.is_empty() {
            update = update.col_expr(user::Column::Email, Expr::value(patch.email));
        }
        if patch.number != 0 {
            update = update.col_expr(user::Column::Number, Expr::value(i64::from(patch.number)));
        }

        // Zero affected rows is not an error
        update
            .filter(user::Column::Id.eq(key))
            .filter(user::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn delete_by_id(&self, id: u32) -> DomainResult<()> {
        let Some(key) = storage_key(id) else {
            return Ok(());
        };

        user::Entity::update_many()
            .col_expr(user::Column::DeletedAt, Expr::value(Some(Utc::now())))
            .filter(user::Column::Id.eq(key))
            .filter(user::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::migrator::Migrator;
    use sea_orm::{ConnectOptions, Database};
    use sea_orm_migration::MigratorTrait;

    async fn repo() -> UserRepository {
        let mut opts = ConnectOptions::new("sqlite::memory:");
        opts.max_connections(1).sqlx_logging(false);
        let db = Database::connect(opts).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        UserRepository::new(db)
    }

    #[tokio::test]
    async fn create_assigns_id_and_round_trips() {
        let repo = repo().await;

        let created = repo
            .create(UserPayload::new("Alice", "a@example.com", 5))
            .await
            .unwrap();
        assert!(created.id > 0);
        assert!(created.deleted_at.is_none());

        let fetched = repo.find_by_id(created.id).await.unwrap();
        assert_eq!(fetched.name, "Alice");
        assert_eq!(fetched.email, "a@example.com");
        assert_eq!(fetched.number, 5);
    }

    #[tokio::test]
    async fn find_all_on_empty_table_is_empty() {
        let repo = repo().await;
        assert!(repo.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_id_is_not_found() {
        let repo = repo().await;
        let err = repo.find_by_id(999_999).await.unwrap_err();
        assert!(err.is_not_found());

        let err = repo.find_by_id(u32::MAX).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn update_skips_zero_fields() {
        let repo = repo().await;
        let created = repo
            .create(UserPayload::new("Alice", "a@example.com", 5))
            .await
            .unwrap();

        repo.update_by_id(created.id, UserPayload::new("Alicia", "", 0))
            .await
            .unwrap();

        let fetched = repo.find_by_id(created.id).await.unwrap();
        assert_eq!(fetched.name, "Alicia");
        assert_eq!(fetched.email, "a@example.com");
        assert_eq!(fetched.number, 5);
        assert!(fetched.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn update_and_delete_of_missing_id_succeed() {
        let repo = repo().await;
        repo.update_by_id(42, UserPayload::new("Nobody", "n@example.com", 1))
            .await
            .unwrap();
        repo.delete_by_id(42).await.unwrap();
        assert!(repo.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_hides_record_from_reads() {
        let repo = repo().await;
        let keep = repo
            .create(UserPayload::new("Keeper", "k@example.com", 1))
            .await
            .unwrap();
        let gone = repo
            .create(UserPayload::new("Goner", "g@example.com", 2))
            .await
            .unwrap();

        repo.delete_by_id(gone.id).await.unwrap();

        assert!(repo.find_by_id(gone.id).await.unwrap_err().is_not_found());
        let all = repo.find_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, keep.id);

        // Deleted rows are not resurrected by updates
        repo.update_by_id(gone.id, UserPayload::new("Back", "b@example.com", 3))
            .await
            .unwrap();
        assert!(repo.find_by_id(gone.id).await.unwrap_err().is_not_found());
    }
}
