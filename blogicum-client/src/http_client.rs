use crate::error::BlogClientError;
use crate::models::{
    Account, AuthResponse, CategoryPosts, Comment, Health, Page, Post, PostDetail, PostInput,
    PostView, ProfileInput, ProfilePosts,
};
use reqwest::redirect::Policy;
use reqwest::{Client, RequestBuilder, Response, header};
use serde::de::DeserializeOwned;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;
use uuid::Uuid;

pub const TOKEN_FILE: &str = ".blog_token";

#[derive(Clone)]
pub struct BlogClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    token_path: PathBuf,
}

impl BlogClient {
    /// Redirects are not followed: a 302 from the server means the caller
    /// tried to change something they do not own.
    pub fn connect(endpoint: &str) -> Result<Self, BlogClientError> {
        let base_url = endpoint.trim_end_matches('/').to_string();
        Ok(Self {
            client: Client::builder().redirect(Policy::none()).build()?,
            base_url,
            token: None,
            token_path: PathBuf::from(TOKEN_FILE),
        })
    }

    pub fn with_token_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_path = path.into();
        self
    }

    pub fn set_token(&mut self, token: String) -> Result<(), BlogClientError> {
        fs::write(&self.token_path, &token)?;
        self.token = Some(token);
        Ok(())
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn logout(&mut self) -> Result<(), BlogClientError> {
        self.token = None;
        match fs::remove_file(&self.token_path) {
            Err(err) if err.kind() != ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // Falls back to the token file; no token at all means anonymous.
    fn stored_token(&self) -> Result<Option<String>, BlogClientError> {
        if let Some(t) = self.token.as_deref().filter(|t| !t.is_empty()) {
            return Ok(Some(t.to_string()));
        }
        match fs::read_to_string(&self.token_path) {
            Ok(t) if !t.trim().is_empty() => Ok(Some(t.trim().to_string())),
            Ok(_) => Ok(None),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn authorized(&self, req: RequestBuilder) -> Result<RequestBuilder, BlogClientError> {
        Ok(match self.stored_token()? {
            Some(token) => req.header(header::AUTHORIZATION, format!("Bearer {token}")),
            None => req,
        })
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, BlogClientError> {
        let resp = self.authorized(req)?.send().await?;
        debug!(status = %resp.status(), url = %resp.url(), "response received");
        if resp.status().is_success() {
            Ok(resp)
        } else {
            Err(BlogClientError::from_http_response(resp).await)
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, BlogClientError> {
        Ok(self.send(req).await?.json().await?)
    }

    fn paged(&self, path: &str, page: Option<u32>) -> RequestBuilder {
        let req = self.client.get(self.url(path));
        match page {
            Some(page) => req.query(&[("page", page)]),
            None => req,
        }
    }

    // ---- auth ----

    pub async fn register(
        &mut self,
        username: String,
        email: String,
        password: String,
    ) -> Result<(), BlogClientError> {
        let req = self
            .client
            .post(self.url("/auth/registration/"))
            .json(&serde_json::json!({
                "username": username,
                "email": email,
                "password": password,
            }));
        let auth: AuthResponse = self.fetch(req).await?;
        self.set_token(auth.access_token)
    }

    pub async fn login(&mut self, username: String, password: String) -> Result<(), BlogClientError> {
        let req = self
            .client
            .post(self.url("/auth/login/"))
            .json(&serde_json::json!({
                "username": username,
                "password": password,
            }));
        let auth: AuthResponse = self.fetch(req).await?;
        self.set_token(auth.access_token)
    }

    pub async fn health(&self) -> Result<Health, BlogClientError> {
        self.fetch(self.client.get(self.url("/health"))).await
    }

    // ---- posts ----

    pub async fn list_posts(&self, page: Option<u32>) -> Result<Page<PostView>, BlogClientError> {
        self.fetch(self.paged("/", page)).await
    }

    pub async fn category_posts(
        &self,
        slug: &str,
        page: Option<u32>,
    ) -> Result<CategoryPosts, BlogClientError> {
        self.fetch(self.paged(&format!("/category/{slug}/"), page))
            .await
    }

    pub async fn get_post(&self, id: Uuid) -> Result<PostDetail, BlogClientError> {
        self.fetch(self.client.get(self.url(&format!("/posts/{id}/"))))
            .await
    }

    pub async fn create_post(&self, input: &PostInput) -> Result<Post, BlogClientError> {
        let req = self.client.post(self.url("/posts/create/")).json(input);
        self.fetch(req).await
    }

    /// The post as the edit form would be prefilled.
    pub async fn edit_post_form(&self, id: Uuid) -> Result<Post, BlogClientError> {
        self.fetch(self.client.get(self.url(&format!("/posts/{id}/edit/"))))
            .await
    }

    pub async fn update_post(&self, id: Uuid, input: &PostInput) -> Result<Post, BlogClientError> {
        let req = self
            .client
            .post(self.url(&format!("/posts/{id}/edit/")))
            .json(input);
        self.fetch(req).await
    }

    pub async fn delete_post_form(&self, id: Uuid) -> Result<Post, BlogClientError> {
        self.fetch(self.client.get(self.url(&format!("/posts/{id}/delete/"))))
            .await
    }

    pub async fn delete_post(&self, id: Uuid) -> Result<(), BlogClientError> {
        self.send(self.client.post(self.url(&format!("/posts/{id}/delete/"))))
            .await?;
        Ok(())
    }

    // ---- comments ----

    pub async fn add_comment(&self, post_id: Uuid, text: String) -> Result<Comment, BlogClientError> {
        let req = self
            .client
            .post(self.url(&format!("/posts/{post_id}/comment/")))
            .json(&serde_json::json!({ "text": text }));
        self.fetch(req).await
    }

    pub async fn edit_comment_form(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Comment, BlogClientError> {
        let path = format!("/posts/{post_id}/edit_comment/{comment_id}/");
        self.fetch(self.client.get(self.url(&path))).await
    }

    pub async fn update_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        text: String,
    ) -> Result<Comment, BlogClientError> {
        let req = self
            .client
            .post(self.url(&format!("/posts/{post_id}/edit_comment/{comment_id}/")))
            .json(&serde_json::json!({ "text": text }));
        self.fetch(req).await
    }

    pub async fn delete_comment_form(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Comment, BlogClientError> {
        let path = format!("/posts/{post_id}/delete_comment/{comment_id}/");
        self.fetch(self.client.get(self.url(&path))).await
    }

    pub async fn delete_comment(&self, post_id: Uuid, comment_id: Uuid) -> Result<(), BlogClientError> {
        let path = format!("/posts/{post_id}/delete_comment/{comment_id}/");
        self.send(self.client.post(self.url(&path))).await?;
        Ok(())
    }

    // ---- profiles ----

    pub async fn profile(
        &self,
        username: &str,
        page: Option<u32>,
    ) -> Result<ProfilePosts, BlogClientError> {
        self.fetch(self.paged(&format!("/profile/{username}/"), page))
            .await
    }

    pub async fn me(&self) -> Result<Account, BlogClientError> {
        self.fetch(self.client.get(self.url("/profile/edit/")))
            .await
    }

    pub async fn update_profile(&self, input: &ProfileInput) -> Result<Account, BlogClientError> {
        let req = self.client.post(self.url("/profile/edit/")).json(input);
        self.fetch(req).await
    }
}
