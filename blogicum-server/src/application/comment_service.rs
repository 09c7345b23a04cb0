use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use crate::application::post_service::PostService;
use crate::data::comment_repository::CommentRepository;
use crate::domain::comment::{Comment, CommentView};
use crate::domain::error::DomainError;
use crate::domain::ownership::{Guarded, guard};

#[derive(Clone)]
pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    posts: PostService,
}

impl CommentService {
    pub fn new(comments: Arc<dyn CommentRepository>, posts: PostService) -> Self {
        Self { comments, posts }
    }

    pub async fn comments_for(&self, post_id: Uuid) -> Result<Vec<CommentView>, DomainError> {
        self.comments.list_for_post(post_id).await
    }

    /// Comments go only on posts the commenter can see.
    #[instrument(skip(self, text))]
    pub async fn add_comment(
        &self,
        actor_id: Uuid,
        post_id: Uuid,
        text: String,
    ) -> Result<Comment, DomainError> {
        let post = self.posts.get_visible(post_id, Some(actor_id)).await?;
        self.comments
            .create(Comment::new(actor_id, post.id, text))
            .await
    }

    async fn fetch(&self, post_id: Uuid, comment_id: Uuid) -> Result<Comment, DomainError> {
        self.comments
            .find_in_post(post_id, comment_id)
            .await?
            .ok_or(DomainError::CommentNotFound(comment_id))
    }

    pub async fn editable_comment(
        &self,
        actor_id: Uuid,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Guarded<Comment>, DomainError> {
        Ok(guard(actor_id, self.fetch(post_id, comment_id).await?))
    }

    /// Lookup, then ownership, then the validated `text`.
    #[instrument(skip(self, text))]
    pub async fn update_comment(
        &self,
        actor_id: Uuid,
        post_id: Uuid,
        comment_id: Uuid,
        text: Result<String, DomainError>,
    ) -> Result<Guarded<Comment>, DomainError> {
        let mut comment = match guard(actor_id, self.fetch(post_id, comment_id).await?) {
            Guarded::Allowed(comment) => comment,
            Guarded::Redirect { post_id } => {
                info!(%actor_id, %comment_id, "comment edit by non-author redirected");
                return Ok(Guarded::Redirect { post_id });
            }
        };

        comment.text = text?;
        Ok(Guarded::Allowed(self.comments.update(comment).await?))
    }

    #[instrument(skip(self))]
    pub async fn delete_comment(
        &self,
        actor_id: Uuid,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Guarded<()>, DomainError> {
        let comment = match guard(actor_id, self.fetch(post_id, comment_id).await?) {
            Guarded::Allowed(comment) => comment,
            Guarded::Redirect { post_id } => {
                info!(%actor_id, %comment_id, "comment delete by non-author redirected");
                return Ok(Guarded::Redirect { post_id });
            }
        };

        self.comments.delete(comment.id).await?;
        info!(%comment_id, %post_id, "comment removed by its author");
        Ok(Guarded::Allowed(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::InMemoryStore;
    use crate::domain::pagination::Paginator;
    use crate::domain::post::PostDraft;
    use chrono::{Duration, Utc};

    async fn setup(pub_offset: Duration) -> (Arc<InMemoryStore>, CommentService, Uuid, Uuid) {
        let store = Arc::new(InMemoryStore::new());
        let posts = PostService::new(store.clone(), store.clone(), Paginator::default());
        let author = Uuid::new_v4();
        let post = posts
            .create_post(
                author,
                PostDraft {
                    title: "t".into(),
                    text: "x".into(),
                    image: None,
                    pub_date: Utc::now() + pub_offset,
                    is_published: true,
                    location_id: None,
                    category_id: None,
                },
            )
            .await
            .unwrap();
        let comments = CommentService::new(store.clone(), posts);
        (store, comments, author, post.id)
    }

    #[tokio::test]
    async fn cannot_comment_on_a_hidden_post() {
        let (_, comments, author, post_id) = setup(Duration::days(1)).await;

        let err = comments
            .add_comment(Uuid::new_v4(), post_id, "hello".into())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::PostNotFound(_)));

        // the author previews their own scheduled post and may comment on it
        assert!(comments.add_comment(author, post_id, "note".into()).await.is_ok());
    }

    #[tokio::test]
    async fn stranger_cannot_delete_a_comment() {
        let (store, comments, _, post_id) = setup(-Duration::days(1)).await;
        let writer = Uuid::new_v4();
        let comment = comments
            .add_comment(writer, post_id, "mine".into())
            .await
            .unwrap();

        let outcome = comments
            .delete_comment(Uuid::new_v4(), post_id, comment.id)
            .await
            .unwrap();
        assert_eq!(outcome, Guarded::Redirect { post_id });
        assert!(store.comment(comment.id).await.is_some());

        let outcome = comments
            .delete_comment(writer, post_id, comment.id)
            .await
            .unwrap();
        assert_eq!(outcome, Guarded::Allowed(()));
        assert!(store.comment(comment.id).await.is_none());
    }

    #[tokio::test]
    async fn comment_must_belong_to_the_post_in_the_path() {
        let (_, comments, _, post_id) = setup(-Duration::days(1)).await;
        let writer = Uuid::new_v4();
        let comment = comments
            .add_comment(writer, post_id, "mine".into())
            .await
            .unwrap();

        let err = comments
            .update_comment(writer, Uuid::new_v4(), comment.id, Ok("moved".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::CommentNotFound(_)));
    }

    #[tokio::test]
    async fn blank_edit_checks_lookup_and_owner_first() {
        let (store, comments, _, post_id) = setup(-Duration::days(1)).await;
        let writer = Uuid::new_v4();
        let comment = comments
            .add_comment(writer, post_id, "mine".into())
            .await
            .unwrap();
        let blank = || Err(DomainError::invalid("text", "this field is required"));

        let err = comments
            .update_comment(writer, post_id, Uuid::new_v4(), blank())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::CommentNotFound(_)));

        let outcome = comments
            .update_comment(Uuid::new_v4(), post_id, comment.id, blank())
            .await
            .unwrap();
        assert_eq!(outcome.map(|_| ()), Guarded::Redirect { post_id });

        let err = comments
            .update_comment(writer, post_id, comment.id, blank())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(store.comment(comment.id).await.unwrap().text, "mine");
    }
}
