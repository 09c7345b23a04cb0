#![allow(dead_code)]

use std::sync::Arc;

use actix_web::http::header;
use blogicum_server::data::memory::InMemoryStore;
use blogicum_server::data::post_repository::PostRepository;
use blogicum_server::data::user_repository::UserRepository;
use blogicum_server::domain::catalog::Category;
use blogicum_server::domain::pagination::Paginator;
use blogicum_server::domain::post::{Post, PostDraft};
use blogicum_server::domain::user::User;
use blogicum_server::infrastructure::security::JwtKeys;
use blogicum_server::server::Services;
use chrono::{Duration, Utc};
use uuid::Uuid;

/// Builds the production app (routes and middleware stack) over a
/// context's services.
macro_rules! init_app {
    ($ctx:expr) => {
        actix_web::test::init_service(blogicum_server::server::build_app(
            $ctx.services.clone(),
            &[],
        ))
        .await
    };
}

pub struct TestUser {
    pub id: Uuid,
    pub username: String,
    pub token: String,
}

impl TestUser {
    pub fn bearer(&self) -> (header::HeaderName, String) {
        (header::AUTHORIZATION, format!("Bearer {}", self.token))
    }
}

pub struct TestContext {
    pub store: Arc<InMemoryStore>,
    pub services: Services,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_page_size(10)
    }

    pub fn with_page_size(per_page: u32) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let services = Services::in_memory(
            store.clone(),
            JwtKeys::new("integration-secret".into(), 1),
            Paginator::new(per_page),
        );
        Self { store, services }
    }

    /// A stored user with a ready token; skips password hashing.
    pub async fn user(&self, username: &str) -> TestUser {
        let user = User::new(
            username.to_string(),
            format!("{username}@example.com"),
            "not-a-real-hash".into(),
        );
        let user = UserRepository::create(&*self.store, user).await.unwrap();
        let token = self.services.auth.issue_token(user.id).unwrap();
        TestUser {
            id: user.id,
            username: user.username,
            token,
        }
    }

    pub async fn category(&self, slug: &str, is_published: bool) -> Category {
        let mut category = Category::new(slug.to_uppercase(), "about things", slug);
        category.is_published = is_published;
        self.store.add_category(category).await
    }

    pub async fn post(&self, author: Uuid, draft: PostDraft) -> Post {
        PostRepository::create(&*self.store, Post::new(author, draft))
            .await
            .unwrap()
    }

    pub async fn stored_post(&self, id: Uuid) -> Option<Post> {
        PostRepository::find_by_id(&*self.store, id).await.unwrap()
    }
}

pub fn draft(title: &str, pub_offset: Duration) -> PostDraft {
    PostDraft {
        title: title.to_string(),
        text: format!("{title} body"),
        image: None,
        pub_date: Utc::now() + pub_offset,
        is_published: true,
        location_id: None,
        category_id: None,
    }
}

pub fn yesterday() -> Duration {
    -Duration::days(1)
}

pub fn tomorrow() -> Duration {
    Duration::days(1)
}

pub fn titles(page: &serde_json::Value) -> Vec<String> {
    page["items"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|p| p["title"].as_str().map(str::to_owned))
                .collect()
        })
        .unwrap_or_default()
}
