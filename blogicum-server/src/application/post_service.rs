use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::data::catalog_repository::CatalogRepository;
use crate::data::post_repository::PostRepository;
use crate::domain::catalog::Category;
use crate::domain::error::DomainError;
use crate::domain::ownership::{Guarded, guard};
use crate::domain::pagination::{Page, Paginator};
use crate::domain::post::{Post, PostDraft, PostView};
use crate::domain::visibility::PostFilter;

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    catalog: Arc<dyn CatalogRepository>,
    paginator: Paginator,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        catalog: Arc<dyn CatalogRepository>,
        paginator: Paginator,
    ) -> Self {
        Self {
            posts,
            catalog,
            paginator,
        }
    }

    async fn paginate(
        &self,
        filter: &PostFilter,
        page: Option<&str>,
    ) -> Result<Page<PostView>, DomainError> {
        let total = self.posts.count(filter).await?;
        let window = self.paginator.locate(page, total);
        let items = self.posts.list(filter, window.limit, window.offset).await?;
        Ok(Page::new(window, items))
    }

    pub async fn list_published(&self, page: Option<&str>) -> Result<Page<PostView>, DomainError> {
        self.paginate(&PostFilter::published(Utc::now(), None, None), page)
            .await
    }

    /// Unknown and unpublished categories are both "not found".
    pub async fn list_category(
        &self,
        slug: &str,
        page: Option<&str>,
    ) -> Result<(Category, Page<PostView>), DomainError> {
        let category = self
            .catalog
            .find_published_category(slug)
            .await?
            .ok_or_else(|| DomainError::CategoryNotFound(slug.to_string()))?;
        let posts = self
            .paginate(&PostFilter::published(Utc::now(), Some(slug), None), page)
            .await?;
        Ok((category, posts))
    }

    pub async fn list_profile(
        &self,
        owner_id: Uuid,
        viewer_id: Option<Uuid>,
        page: Option<&str>,
    ) -> Result<Page<PostView>, DomainError> {
        self.paginate(&PostFilter::profile(Utc::now(), owner_id, viewer_id), page)
            .await
    }

    /// A post as `viewer_id` may see it: its author always, everyone else
    /// only while it is publicly visible.
    pub async fn get_visible(
        &self,
        post_id: Uuid,
        viewer_id: Option<Uuid>,
    ) -> Result<PostView, DomainError> {
        let post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or(DomainError::PostNotFound(post_id))?;

        let filter = if viewer_id == Some(post.author_id) {
            PostFilter::unrestricted()
        } else {
            PostFilter::published(Utc::now(), None, None)
        };

        self.posts
            .list(&filter.with_id(post_id), 1, 0)
            .await?
            .into_iter()
            .next()
            .ok_or(DomainError::PostNotFound(post_id))
    }

    async fn check_references(&self, draft: &PostDraft) -> Result<(), DomainError> {
        if let Some(id) = draft.category_id {
            if self.catalog.find_category(id).await?.is_none() {
                return Err(DomainError::invalid("category", "unknown category"));
            }
        }
        if let Some(id) = draft.location_id {
            if self.catalog.find_location(id).await?.is_none() {
                return Err(DomainError::invalid("location", "unknown location"));
            }
        }
        Ok(())
    }

    async fn fetch(&self, post_id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(post_id)
            .await?
            .ok_or(DomainError::PostNotFound(post_id))
    }

    #[instrument(skip(self))]
    pub async fn create_post(&self, author_id: Uuid, draft: PostDraft) -> Result<Post, DomainError> {
        self.check_references(&draft).await?;
        self.posts.create(Post::new(author_id, draft)).await
    }

    /// The post as it stands, for its author's edit form.
    pub async fn editable_post(
        &self,
        actor_id: Uuid,
        post_id: Uuid,
    ) -> Result<Guarded<Post>, DomainError> {
        Ok(guard(actor_id, self.fetch(post_id).await?))
    }

    /// `draft` is the outcome of form validation. Its errors reach only the
    /// author; anyone else is redirected before the form is looked at.
    #[instrument(skip(self, draft))]
    pub async fn update_post(
        &self,
        actor_id: Uuid,
        post_id: Uuid,
        draft: Result<PostDraft, DomainError>,
    ) -> Result<Guarded<Post>, DomainError> {
        let mut post = match guard(actor_id, self.fetch(post_id).await?) {
            Guarded::Allowed(post) => post,
            Guarded::Redirect { post_id } => {
                info!(%actor_id, %post_id, "edit by non-author redirected");
                return Ok(Guarded::Redirect { post_id });
            }
        };

        let draft = draft?;
        self.check_references(&draft).await?;
        post.apply(draft);
        Ok(Guarded::Allowed(self.posts.update(post).await?))
    }

    #[instrument(skip(self))]
    pub async fn delete_post(
        &self,
        actor_id: Uuid,
        post_id: Uuid,
    ) -> Result<Guarded<()>, DomainError> {
        let post = match guard(actor_id, self.fetch(post_id).await?) {
            Guarded::Allowed(post) => post,
            Guarded::Redirect { post_id } => {
                info!(%actor_id, %post_id, "delete by non-author redirected");
                return Ok(Guarded::Redirect { post_id });
            }
        };

        self.posts.delete(post.id).await?;
        Ok(Guarded::Allowed(()))
    }
}
