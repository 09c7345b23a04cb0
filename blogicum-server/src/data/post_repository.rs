use crate::domain::error::DomainError;
use crate::domain::post::{AuthorRef, CategoryRef, LocationRef, Post, PostView};
use crate::domain::visibility::{PostFilter, Visibility};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{error, info};
use uuid::Uuid;

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, post: Post) -> Result<Post, DomainError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError>;
    async fn update(&self, post: Post) -> Result<Post, DomainError>;
    async fn delete(&self, id: Uuid) -> Result<(), DomainError>;
    async fn count(&self, filter: &PostFilter) -> Result<u64, DomainError>;
    /// Posts matching `filter`, newest publish date first.
    async fn list(
        &self,
        filter: &PostFilter,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<PostView>, DomainError>;
}

#[derive(Clone)]
pub struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const POST_COLUMNS: &str = "id, title, text, image, pub_date, is_published, created_at, \
     author_id, location_id, category_id";

const VIEW_SELECT: &str = r#"
    SELECT p.id, p.title, p.text, p.image, p.pub_date, p.is_published, p.created_at,
           p.author_id, u.username AS author_username,
           c.id AS category_id, c.title AS category_title, c.slug AS category_slug,
           l.id AS location_id, l.name AS location_name,
           (SELECT COUNT(*) FROM comments cm WHERE cm.post_id = p.id) AS comment_count
"#;

// unpublished locations are dropped from the join, not the post
const VIEW_FROM: &str = r#"
    FROM posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN categories c ON c.id = p.category_id
    LEFT JOIN locations l ON l.id = p.location_id AND l.is_published
"#;

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &PostFilter) {
    qb.push(" WHERE TRUE");
    if let Visibility::Public { now } = filter.visibility {
        qb.push(" AND p.is_published AND (c.id IS NULL OR c.is_published) AND p.pub_date < ")
            .push_bind(now);
    }
    if let Some(slug) = &filter.category_slug {
        qb.push(" AND c.slug = ").push_bind(slug.clone());
    }
    if let Some(author_id) = filter.author_id {
        qb.push(" AND p.author_id = ").push_bind(author_id);
    }
    if let Some(post_id) = filter.post_id {
        qb.push(" AND p.id = ").push_bind(post_id);
    }
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    title: String,
    text: String,
    image: Option<String>,
    pub_date: DateTime<Utc>,
    is_published: bool,
    created_at: DateTime<Utc>,
    author_id: Uuid,
    author_username: String,
    category_id: Option<Uuid>,
    category_title: Option<String>,
    category_slug: Option<String>,
    location_id: Option<Uuid>,
    location_name: Option<String>,
    comment_count: i64,
}

impl From<PostRow> for PostView {
    fn from(row: PostRow) -> Self {
        let category = match (row.category_id, row.category_title, row.category_slug) {
            (Some(id), Some(title), Some(slug)) => Some(CategoryRef { id, title, slug }),
            _ => None,
        };
        let location = match (row.location_id, row.location_name) {
            (Some(id), Some(name)) => Some(LocationRef { id, name }),
            _ => None,
        };
        Self {
            id: row.id,
            title: row.title,
            text: row.text,
            image: row.image,
            pub_date: row.pub_date,
            is_published: row.is_published,
            created_at: row.created_at,
            author: AuthorRef {
                id: row.author_id,
                username: row.author_username,
            },
            category,
            location,
            comment_count: row.comment_count,
        }
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, post: Post) -> Result<Post, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO posts (id, title, text, image, pub_date, is_published, created_at,
                               author_id, location_id, category_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.text)
        .bind(&post.image)
        .bind(post.pub_date)
        .bind(post.is_published)
        .bind(post.created_at)
        .bind(post.author_id)
        .bind(post.location_id)
        .bind(post.category_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to create post: {}", e);
            DomainError::Internal(format!("database error: {}", e))
        })?;

        info!(post_id = %post.id, author_id = %post.author_id, "post created");
        Ok(post)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError> {
        sqlx::query_as::<_, Post>(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("db error find_by_id {}: {}", id, e);
                DomainError::Internal(e.to_string())
            })
    }

    async fn update(&self, post: Post) -> Result<Post, DomainError> {
        let updated = sqlx::query_as::<_, Post>(&format!(
            r#"
            UPDATE posts
            SET title = $1, text = $2, image = $3, pub_date = $4, is_published = $5,
                location_id = $6, category_id = $7
            WHERE id = $8
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(&post.title)
        .bind(&post.text)
        .bind(&post.image)
        .bind(post.pub_date)
        .bind(post.is_published)
        .bind(post.location_id)
        .bind(post.category_id)
        .bind(post.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to update post {}: {}", post.id, e);
            DomainError::Internal(e.to_string())
        })?
        .ok_or(DomainError::PostNotFound(post.id))?;

        info!(post_id = %updated.id, "post updated");
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let deleted = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        if deleted.rows_affected() == 0 {
            return Err(DomainError::PostNotFound(id));
        }

        info!(post_id = %id, "post deleted");
        Ok(())
    }

    async fn count(&self, filter: &PostFilter) -> Result<u64, DomainError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*)");
        qb.push(VIEW_FROM);
        push_filter(&mut qb, filter);

        let (total,): (i64,) = qb
            .build_query_as()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("db error while counting posts: {}", e);
                DomainError::Internal(e.to_string())
            })?;

        Ok(u64::try_from(total).unwrap_or_default())
    }

    async fn list(
        &self,
        filter: &PostFilter,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<PostView>, DomainError> {
        let mut qb = QueryBuilder::<Postgres>::new(VIEW_SELECT);
        qb.push(VIEW_FROM);
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY p.pub_date DESC LIMIT ")
            .push_bind(i64::from(limit))
            .push(" OFFSET ")
            .push_bind(i64::try_from(offset).unwrap_or(i64::MAX));

        let rows: Vec<PostRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("db error while fetching posts: {}", e);
                DomainError::Internal(e.to_string())
            })?;

        Ok(rows.into_iter().map(PostView::from).collect())
    }
}
