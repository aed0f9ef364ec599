use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::accounts::password::{hash_password, verify_password};
use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: OffsetDateTime,
}

impl User {
    /// Find a user by exact, case-sensitive username.
    pub async fn find_by_username(db: &SqlitePool, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, created_at
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    async fn insert(db: &SqlitePool, username: &str, password_hash: &str) -> Result<User, AppError> {
        let res = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, password_hash, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, username, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(password_hash)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(db)
        .await;

        match res {
            Ok(user) => Ok(user),
            // Two racing registrations: the UNIQUE constraint is the
            // authority, the pre-check above it only advisory.
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(AppError::DuplicateUsername)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Create an account. The raw password is hashed with a per-record salt and
/// never persisted.
pub async fn register(db: &SqlitePool, username: &str, raw_password: &str) -> Result<User, AppError> {
    if User::find_by_username(db, username).await?.is_some() {
        return Err(AppError::DuplicateUsername);
    }
    let hash = hash_password(raw_password)?;
    User::insert(db, username, &hash).await
}

/// Verify credentials. Unknown username and wrong password are deliberately
/// indistinguishable in the result.
pub async fn authenticate(
    db: &SqlitePool,
    username: &str,
    raw_password: &str,
) -> Result<User, AppError> {
    let Some(user) = User::find_by_username(db, username).await? else {
        return Err(AppError::InvalidCredentials);
    };
    if !verify_password(raw_password, &user.password_hash)? {
        return Err(AppError::InvalidCredentials);
    }
    Ok(user)
}
