//! Which posts a listing may show.
//!
//! Every post listing in the service is described by one [`PostFilter`]:
//! the public index, a category page, a profile page and the single-post
//! lookup behind the detail page. Stores evaluate the same filter either in
//! SQL or with [`PostFilter::matches`].

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::catalog::Category;
use crate::domain::post::Post;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Published, past its publish date, category published or unset.
    Public { now: DateTime<Utc> },
    /// Owner's view: drafts and scheduled posts included.
    Unrestricted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostFilter {
    pub visibility: Visibility,
    pub category_slug: Option<String>,
    pub author_id: Option<Uuid>,
    pub post_id: Option<Uuid>,
}

/// A post is publicly visible iff it is published, its publish date has
/// passed and its category, when set, is published.
pub fn is_publicly_visible(post: &Post, category: Option<&Category>, now: DateTime<Utc>) -> bool {
    post.is_published && post.pub_date < now && category.is_none_or(|c| c.is_published)
}

impl PostFilter {
    /// Public listing, optionally narrowed by category and author.
    pub fn published(now: DateTime<Utc>, category_slug: Option<&str>, author_id: Option<Uuid>) -> Self {
        Self {
            visibility: Visibility::Public { now },
            category_slug: category_slug.map(str::to_owned),
            author_id,
            post_id: None,
        }
    }

    pub fn unrestricted() -> Self {
        Self {
            visibility: Visibility::Unrestricted,
            category_slug: None,
            author_id: None,
            post_id: None,
        }
    }

    /// Profile listing: the owner sees everything they wrote, anyone else
    /// only what is public.
    pub fn profile(now: DateTime<Utc>, owner_id: Uuid, viewer_id: Option<Uuid>) -> Self {
        if viewer_id == Some(owner_id) {
            Self::unrestricted().by_author(owner_id)
        } else {
            Self::published(now, None, Some(owner_id))
        }
    }

    pub fn by_author(mut self, author_id: Uuid) -> Self {
        self.author_id = Some(author_id);
        self
    }

    pub fn with_id(mut self, post_id: Uuid) -> Self {
        self.post_id = Some(post_id);
        self
    }

    pub fn matches(&self, post: &Post, category: Option<&Category>) -> bool {
        if let Visibility::Public { now } = self.visibility {
            if !is_publicly_visible(post, category, now) {
                return false;
            }
        }
        if let Some(slug) = &self.category_slug {
            if category.map(|c| c.slug.as_str()) != Some(slug.as_str()) {
                return false;
            }
        }
        if self.author_id.is_some_and(|id| id != post.author_id) {
            return false;
        }
        if self.post_id.is_some_and(|id| id != post.id) {
            return false;
        }
        true
    }
}
