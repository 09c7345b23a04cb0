use crate::domain::catalog::{Category, Location};
use crate::domain::error::DomainError;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

/// Categories and locations. Both are curated by administrators, so the
/// service only reads them.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn find_category(&self, id: Uuid) -> Result<Option<Category>, DomainError>;
    async fn find_published_category(&self, slug: &str) -> Result<Option<Category>, DomainError>;
    async fn find_location(&self, id: Uuid) -> Result<Option<Location>, DomainError>;
}

#[derive(Clone)]
pub struct PostgresCatalogRepository {
    pool: PgPool,
}

impl PostgresCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogRepository for PostgresCatalogRepository {
    async fn find_category(&self, id: Uuid) -> Result<Option<Category>, DomainError> {
        sqlx::query_as::<_, Category>(
            "SELECT id, title, description, slug, is_published, created_at FROM categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("db error find category {}: {}", id, e);
            DomainError::Internal(e.to_string())
        })
    }

    async fn find_published_category(&self, slug: &str) -> Result<Option<Category>, DomainError> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, title, description, slug, is_published, created_at
            FROM categories
            WHERE slug = $1 AND is_published
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("db error find category {}: {}", slug, e);
            DomainError::Internal(e.to_string())
        })
    }

    async fn find_location(&self, id: Uuid) -> Result<Option<Location>, DomainError> {
        sqlx::query_as::<_, Location>(
            "SELECT id, name, is_published, created_at FROM locations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("db error find location {}: {}", id, e);
            DomainError::Internal(e.to_string())
        })
    }
}
