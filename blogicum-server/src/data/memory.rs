//! In-process store implementing every repository trait.
//!
//! Backs the test suites and local runs without a database. Mirrors the
//! relational schema's referential rules: deleting a post drops its
//! comments, usernames are unique.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::data::catalog_repository::CatalogRepository;
use crate::data::comment_repository::CommentRepository;
use crate::data::post_repository::PostRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::catalog::{Category, Location};
use crate::domain::comment::{Comment, CommentView};
use crate::domain::error::DomainError;
use crate::domain::post::{AuthorRef, CategoryRef, LocationRef, Post, PostView};
use crate::domain::user::User;
use crate::domain::visibility::PostFilter;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    posts: HashMap<Uuid, Post>,
    comments: HashMap<Uuid, Comment>,
    categories: HashMap<Uuid, Category>,
    locations: HashMap<Uuid, Location>,
}

impl Tables {
    fn category_of(&self, post: &Post) -> Option<&Category> {
        post.category_id.and_then(|id| self.categories.get(&id))
    }

    fn author_ref(&self, id: Uuid) -> AuthorRef {
        AuthorRef {
            id,
            username: self
                .users
                .get(&id)
                .map(|u| u.username.clone())
                .unwrap_or_default(),
        }
    }

    fn matching<'a>(&'a self, filter: &'a PostFilter) -> impl Iterator<Item = &'a Post> + 'a {
        self.posts
            .values()
            .filter(move |post| filter.matches(post, self.category_of(post)))
    }

    fn view(&self, post: &Post) -> PostView {
        let category = self.category_of(post).map(|c| CategoryRef {
            id: c.id,
            title: c.title.clone(),
            slug: c.slug.clone(),
        });
        let location = post
            .location_id
            .and_then(|id| self.locations.get(&id))
            .filter(|l| l.is_published)
            .map(|l| LocationRef {
                id: l.id,
                name: l.name.clone(),
            });
        let comment_count = self
            .comments
            .values()
            .filter(|c| c.post_id == post.id)
            .count();

        PostView {
            id: post.id,
            title: post.title.clone(),
            text: post.text.clone(),
            image: post.image.clone(),
            pub_date: post.pub_date,
            is_published: post.is_published,
            created_at: post.created_at,
            author: self.author_ref(post.author_id),
            category,
            location,
            comment_count: i64::try_from(comment_count).unwrap_or(i64::MAX),
        }
    }

    fn username_taken(&self, username: &str, except: Uuid) -> bool {
        self.users
            .values()
            .any(|u| u.username == username && u.id != except)
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_category(&self, category: Category) -> Category {
        self.tables
            .write()
            .await
            .categories
            .insert(category.id, category.clone());
        category
    }

    pub async fn add_location(&self, location: Location) -> Location {
        self.tables
            .write()
            .await
            .locations
            .insert(location.id, location.clone());
        location
    }

    pub async fn comment(&self, id: Uuid) -> Option<Comment> {
        self.tables.read().await.comments.get(&id).cloned()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, user: User) -> Result<User, DomainError> {
        let mut tables = self.tables.write().await;
        if tables.username_taken(&user.username, user.id) {
            return Err(DomainError::UserAlreadyExists(user.username));
        }
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn update(&self, user: User) -> Result<User, DomainError> {
        let mut tables = self.tables.write().await;
        if tables.username_taken(&user.username, user.id) {
            return Err(DomainError::UserAlreadyExists(user.username));
        }
        match tables.users.get_mut(&user.id) {
            Some(stored) => {
                *stored = user.clone();
                Ok(user)
            }
            None => Err(DomainError::UserNotFound(user.username)),
        }
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn create(&self, post: Post) -> Result<Post, DomainError> {
        self.tables
            .write()
            .await
            .posts
            .insert(post.id, post.clone());
        Ok(post)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn update(&self, post: Post) -> Result<Post, DomainError> {
        let mut tables = self.tables.write().await;
        match tables.posts.get_mut(&post.id) {
            Some(stored) => {
                *stored = post.clone();
                Ok(post)
            }
            None => Err(DomainError::PostNotFound(post.id)),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        if tables.posts.remove(&id).is_none() {
            return Err(DomainError::PostNotFound(id));
        }
        tables.comments.retain(|_, c| c.post_id != id);
        Ok(())
    }

    async fn count(&self, filter: &PostFilter) -> Result<u64, DomainError> {
        let tables = self.tables.read().await;
        let total = tables.matching(filter).count();
        Ok(u64::try_from(total).unwrap_or(u64::MAX))
    }

    async fn list(
        &self,
        filter: &PostFilter,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<PostView>, DomainError> {
        let tables = self.tables.read().await;
        let mut posts: Vec<&Post> = tables.matching(filter).collect();
        posts.sort_by(|a, b| b.pub_date.cmp(&a.pub_date));

        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(posts
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|post| tables.view(post))
            .collect())
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn create(&self, comment: Comment) -> Result<Comment, DomainError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.contains_key(&comment.post_id) {
            return Err(DomainError::PostNotFound(comment.post_id));
        }
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn find_in_post(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Option<Comment>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .get(&comment_id)
            .filter(|c| c.post_id == post_id)
            .cloned())
    }

    async fn update(&self, comment: Comment) -> Result<Comment, DomainError> {
        let mut tables = self.tables.write().await;
        match tables.comments.get_mut(&comment.id) {
            Some(stored) => {
                stored.text = comment.text.clone();
                Ok(stored.clone())
            }
            None => Err(DomainError::CommentNotFound(comment.id)),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        match self.tables.write().await.comments.remove(&id) {
            Some(_) => Ok(()),
            None => Err(DomainError::CommentNotFound(id)),
        }
    }

    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentView>, DomainError> {
        let tables = self.tables.read().await;
        let mut comments: Vec<&Comment> = tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .collect();
        comments.sort_by_key(|c| c.created_at);

        Ok(comments
            .into_iter()
            .map(|c| CommentView {
                id: c.id,
                text: c.text.clone(),
                created_at: c.created_at,
                post_id: c.post_id,
                author: tables.author_ref(c.author_id),
            })
            .collect())
    }
}

#[async_trait]
impl CatalogRepository for InMemoryStore {
    async fn find_category(&self, id: Uuid) -> Result<Option<Category>, DomainError> {
        Ok(self.tables.read().await.categories.get(&id).cloned())
    }

    async fn find_published_category(&self, slug: &str) -> Result<Option<Category>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .values()
            .find(|c| c.slug == slug && c.is_published)
            .cloned())
    }

    async fn find_location(&self, id: Uuid) -> Result<Option<Location>, DomainError> {
        Ok(self.tables.read().await.locations.get(&id).cloned())
    }
}
