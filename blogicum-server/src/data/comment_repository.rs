use crate::domain::comment::{Comment, CommentView};
use crate::domain::error::DomainError;
use crate::domain::post::AuthorRef;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, comment: Comment) -> Result<Comment, DomainError>;
    /// Looks a comment up only within the given post.
    async fn find_in_post(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Option<Comment>, DomainError>;
    async fn update(&self, comment: Comment) -> Result<Comment, DomainError>;
    async fn delete(&self, id: Uuid) -> Result<(), DomainError>;
    /// Oldest first.
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentView>, DomainError>;
}

#[derive(Clone)]
pub struct PostgresCommentRepository {
    pool: PgPool,
}

impl PostgresCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    text: String,
    created_at: DateTime<Utc>,
    post_id: Uuid,
    author_id: Uuid,
    author_username: String,
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn create(&self, comment: Comment) -> Result<Comment, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO comments (id, text, created_at, author_id, post_id)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(comment.id)
        .bind(&comment.text)
        .bind(comment.created_at)
        .bind(comment.author_id)
        .bind(comment.post_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to create comment: {}", e);
            DomainError::Internal(format!("database error: {}", e))
        })?;

        info!(comment_id = %comment.id, post_id = %comment.post_id, "comment created");
        Ok(comment)
    }

    async fn find_in_post(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Option<Comment>, DomainError> {
        sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, text, created_at, author_id, post_id
            FROM comments
            WHERE id = $1 AND post_id = $2
            "#,
        )
        .bind(comment_id)
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("db error find comment {}: {}", comment_id, e);
            DomainError::Internal(e.to_string())
        })
    }

    async fn update(&self, comment: Comment) -> Result<Comment, DomainError> {
        let updated = sqlx::query_as::<_, Comment>(
            r#"
            UPDATE comments SET text = $1
            WHERE id = $2
            RETURNING id, text, created_at, author_id, post_id
            "#,
        )
        .bind(&comment.text)
        .bind(comment.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to update comment {}: {}", comment.id, e);
            DomainError::Internal(e.to_string())
        })?
        .ok_or(DomainError::CommentNotFound(comment.id))?;

        info!(comment_id = %updated.id, "comment updated");
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let deleted = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        if deleted.rows_affected() == 0 {
            return Err(DomainError::CommentNotFound(id));
        }

        info!(comment_id = %id, "comment deleted");
        Ok(())
    }

    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentView>, DomainError> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT cm.id, cm.text, cm.created_at, cm.post_id,
                   cm.author_id, u.username AS author_username
            FROM comments cm
            JOIN users u ON u.id = cm.author_id
            WHERE cm.post_id = $1
            ORDER BY cm.created_at ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("db error while fetching comments of {}: {}", post_id, e);
            DomainError::Internal(e.to_string())
        })?;

        Ok(rows
            .into_iter()
            .map(|row| CommentView {
                id: row.id,
                text: row.text,
                created_at: row.created_at,
                post_id: row.post_id,
                author: AuthorRef {
                    id: row.author_id,
                    username: row.author_username,
                },
            })
            .collect())
    }
}
