//! # User Repository
//!
//! Account records. Email uniqueness is enforced by the UNIQUE index on
//! `users.email`, so two concurrent registrations cannot both succeed.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use rapidtech_core::{Role, User};

const USER_COLUMNS: &str = "id, email, full_name, password_hash, role, created_at";

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts a new user.
    ///
    /// ## Returns
    /// * `Ok(User)` - The stored user
    /// * `Err(DbError::UniqueViolation)` - Email already registered
    pub async fn insert(&self, user: &User) -> DbResult<User> {
        debug!(user_id = %user.id, role = %user.role, "Inserting user");

        sqlx::query(
            r#"
            INSERT INTO users (id, email, full_name, password_hash, role, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(user.clone())
    }

    /// Looks a user up by exact email.
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// True when at least one administrator exists.
    pub async fn has_role(&self, role: Role) -> DbResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE role = ?1)")
                .bind(role)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    /// Counts users (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;

    async fn repo() -> UserRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().users()
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let repo = repo().await;
        let user = User::new("ana@example.com", "Ana", "hash", Role::Customer, Utc::now());
        repo.insert(&user).await.unwrap();

        let found = repo.get_by_email("ana@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.password_hash, "hash");
        assert_eq!(found.created_at, user.created_at);

        assert!(repo.get_by_email("ANA@example.com").await.unwrap().is_none());
        assert!(repo.get_by_id(&user.id).await.unwrap().is_some());
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_unique_violation() {
        let repo = repo().await;
        let first = User::new("dup@example.com", "A", "h", Role::Customer, Utc::now());
        let second = User::new("dup@example.com", "B", "h", Role::Customer, Utc::now());

        repo.insert(&first).await.unwrap();
        let err = repo.insert(&second).await.unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn test_has_role() {
        let repo = repo().await;
        assert!(!repo.has_role(Role::Admin).await.unwrap());

        let admin = User::new("root@example.com", "Root", "h", Role::Admin, Utc::now());
        repo.insert(&admin).await.unwrap();
        assert!(repo.has_role(Role::Admin).await.unwrap());
        assert!(!repo.has_role(Role::Customer).await.unwrap());
    }
}
