use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub owner_id: Uuid,
    pub created_at: OffsetDateTime,
}

impl Post {
    /// All and only the owner's posts, in creation order.
    pub async fn list_by_owner(db: &SqlitePool, owner_id: Uuid) -> Result<Vec<Post>, AppError> {
        let rows = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, content, owner_id, created_at
            FROM posts
            WHERE owner_id = ?
            ORDER BY created_at, rowid
            "#,
        )
        .bind(owner_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn create(
        db: &SqlitePool,
        owner_id: Uuid,
        title: &str,
        content: &str,
    ) -> Result<Post, AppError> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (id, title, content, owner_id, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, title, content, owner_id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(title)
        .bind(content)
        .bind(owner_id)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(db)
        .await?;
        Ok(post)
    }

    /// Fetch by id regardless of owner. Ownership is checked by the caller;
    /// see `update`/`delete` for the two-step fetch-then-authorize pattern.
    pub async fn get(db: &SqlitePool, id: Uuid) -> Result<Post, AppError> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, content, owner_id, created_at
            FROM posts
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::NotFound)
    }

    /// Overwrite title and content if `caller_id` owns the post. A mismatch
    /// leaves the row untouched.
    pub async fn update(
        db: &SqlitePool,
        id: Uuid,
        caller_id: Uuid,
        title: &str,
        content: &str,
    ) -> Result<(), AppError> {
        let post = Self::get(db, id).await?;
        if post.owner_id != caller_id {
            return Err(AppError::NotAuthorized);
        }
        sqlx::query("UPDATE posts SET title = ?, content = ? WHERE id = ?")
            .bind(title)
            .bind(content)
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Remove the row permanently. No soft-delete.
    pub async fn delete(db: &SqlitePool, id: Uuid, caller_id: Uuid) -> Result<(), AppError> {
        let post = Self::get(db, id).await?;
        if post.owner_id != caller_id {
            return Err(AppError::NotAuthorized);
        }
        sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }
}
