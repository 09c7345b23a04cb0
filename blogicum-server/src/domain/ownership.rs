use uuid::Uuid;

/// Anything written by a single user and shown on a post's page.
pub trait Authored {
    fn author_id(&self) -> Uuid;
    /// Post whose detail page the item lives on.
    fn post_id(&self) -> Uuid;
}

/// Result of an author-only operation.
///
/// A non-author is never told "forbidden": they are sent back to the
/// public page of the post instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guarded<T> {
    Allowed(T),
    Redirect { post_id: Uuid },
}

impl<T> Guarded<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Guarded<U> {
        match self {
            Guarded::Allowed(value) => Guarded::Allowed(f(value)),
            Guarded::Redirect { post_id } => Guarded::Redirect { post_id },
        }
    }
}

/// Ownership guard shared by every post and comment mutation.
///
/// Hands the item back on success so callers mutate the instance they
/// already fetched.
pub fn guard<T: Authored>(actor_id: Uuid, item: T) -> Guarded<T> {
    if item.author_id() == actor_id {
        Guarded::Allowed(item)
    } else {
        Guarded::Redirect {
            post_id: item.post_id(),
        }
    }
}
