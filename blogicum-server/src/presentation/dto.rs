use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::auth_service::ProfileChanges;
use crate::domain::catalog::Category;
use crate::domain::comment::CommentView;
use crate::domain::error::{DomainError, FieldError};
use crate::domain::pagination::Page;
use crate::domain::post::{PostDraft, PostView};
use crate::domain::user::Profile;

pub const MAX_TITLE_LEN: usize = 256;
pub const MAX_USERNAME_LEN: usize = 150;
pub const MIN_PASSWORD_LEN: usize = 8;

// ======================= AUTH =======================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub expires_in: i64,
    #[serde(rename = "token_type")]
    pub token_type: String, // "Bearer"
}

fn check_username(username: &str, errors: &mut Vec<FieldError>) {
    if username.is_empty() {
        errors.push(FieldError::new("username", "this field is required"));
    } else if username.chars().count() > MAX_USERNAME_LEN {
        errors.push(FieldError::new(
            "username",
            format!("at most {MAX_USERNAME_LEN} characters"),
        ));
    } else if !username
        .chars()
        .all(|c| c.is_alphanumeric() || "@.+-_".contains(c))
    {
        errors.push(FieldError::new(
            "username",
            "letters, digits and @/./+/-/_ only",
        ));
    }
}

fn check_email(email: &str, errors: &mut Vec<FieldError>) {
    if !email.contains('@') {
        errors.push(FieldError::new("email", "enter a valid email address"));
    }
}

fn finish<T>(value: T, errors: Vec<FieldError>) -> Result<T, DomainError> {
    if errors.is_empty() {
        Ok(value)
    } else {
        Err(DomainError::Validation(errors))
    }
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut errors = Vec::new();
        check_username(self.username.trim(), &mut errors);
        check_email(&self.email, &mut errors);
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(FieldError::new(
                "password",
                format!("at least {MIN_PASSWORD_LEN} characters"),
            ));
        }
        finish((), errors)
    }
}

// ======================= POSTS =======================

fn published_by_default() -> bool {
    true
}

/// Missing fields deserialize to blanks so that they are reported as field
/// errors, after the ownership check, instead of failing extraction.
#[derive(Debug, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub pub_date: Option<DateTime<Utc>>,
    #[serde(default = "published_by_default")]
    pub is_published: bool,
    #[serde(default)]
    pub location_id: Option<Uuid>,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub image: Option<String>,
}

impl PostForm {
    pub fn into_draft(self) -> Result<PostDraft, DomainError> {
        let mut errors = Vec::new();
        let title = self.title.trim().to_string();
        if title.is_empty() {
            errors.push(FieldError::new("title", "this field is required"));
        } else if title.chars().count() > MAX_TITLE_LEN {
            errors.push(FieldError::new(
                "title",
                format!("at most {MAX_TITLE_LEN} characters"),
            ));
        }
        let text = self.text.trim().to_string();
        if text.is_empty() {
            errors.push(FieldError::new("text", "this field is required"));
        }
        if self.pub_date.is_none() {
            errors.push(FieldError::new("pub_date", "this field is required"));
        }
        let image = self
            .image
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        finish(
            PostDraft {
                title,
                text,
                image,
                pub_date: self.pub_date.unwrap_or_default(),
                is_published: self.is_published,
                location_id: self.location_id,
                category_id: self.category_id,
            },
            errors,
        )
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PostDetailResponse {
    pub post: PostView,
    pub comments: Vec<CommentView>,
}

#[derive(Debug, Serialize)]
pub struct CategoryPostsResponse {
    pub category: Category,
    pub page: Page<PostView>,
}

// ======================= COMMENTS =======================

#[derive(Debug, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub text: String,
}

impl CommentForm {
    pub fn into_text(self) -> Result<String, DomainError> {
        let text = self.text.trim().to_string();
        if text.is_empty() {
            return Err(DomainError::invalid("text", "this field is required"));
        }
        Ok(text)
    }
}

// ======================= PROFILE =======================

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile: Profile,
    pub page: Page<PostView>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl ProfileForm {
    pub fn into_changes(self) -> Result<ProfileChanges, DomainError> {
        let mut errors = Vec::new();
        let username = self.username.trim().to_string();
        check_username(&username, &mut errors);
        check_email(&self.email, &mut errors);
        for (field, value) in [("first_name", &self.first_name), ("last_name", &self.last_name)] {
            if value.chars().count() > MAX_USERNAME_LEN {
                errors.push(FieldError::new(
                    field,
                    format!("at most {MAX_USERNAME_LEN} characters"),
                ));
            }
        }

        finish(
            ProfileChanges {
                username,
                email: self.email.trim().to_string(),
                first_name: self.first_name.trim().to_string(),
                last_name: self.last_name.trim().to_string(),
            },
            errors,
        )
    }
}
