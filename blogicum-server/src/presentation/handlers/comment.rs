use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, get, post, web};
use tracing::info;
use uuid::Uuid;

use crate::application::comment_service::CommentService;
use crate::domain::error::DomainError;
use crate::presentation::dto::CommentForm;
use crate::presentation::utils::{
    AuthenticatedUser, guarded_json, guarded_no_content, request_id,
};

#[post("/posts/{id}/comment/")]
async fn add_comment(
    req: HttpRequest,
    user: AuthenticatedUser,
    comments: web::Data<CommentService>,
    payload: web::Json<CommentForm>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let text = payload.into_inner().into_text()?;
    let comment = comments.add_comment(user.id, path.into_inner(), text).await?;

    info!(
        request_id = %request_id(&req),
        username = %user.username,
        comment_id = %comment.id,
        "comment added"
    );

    Ok(HttpResponse::Created().json(comment))
}

#[get("/posts/{id}/edit_comment/{comment_id}/")]
async fn edit_comment_form(
    user: AuthenticatedUser,
    comments: web::Data<CommentService>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, DomainError> {
    let (post_id, comment_id) = path.into_inner();
    let outcome = comments
        .editable_comment(user.id, post_id, comment_id)
        .await?;
    Ok(guarded_json(outcome, StatusCode::OK))
}

#[post("/posts/{id}/edit_comment/{comment_id}/")]
async fn update_comment(
    req: HttpRequest,
    user: AuthenticatedUser,
    comments: web::Data<CommentService>,
    payload: web::Json<CommentForm>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, DomainError> {
    let (post_id, comment_id) = path.into_inner();
    let outcome = comments
        .update_comment(user.id, post_id, comment_id, payload.into_inner().into_text())
        .await?;

    info!(
        request_id = %request_id(&req),
        username = %user.username,
        comment_id = %comment_id,
        "comment edit handled"
    );

    Ok(guarded_json(outcome, StatusCode::OK))
}

#[get("/posts/{id}/delete_comment/{comment_id}/")]
async fn delete_comment_form(
    user: AuthenticatedUser,
    comments: web::Data<CommentService>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, DomainError> {
    let (post_id, comment_id) = path.into_inner();
    let outcome = comments
        .editable_comment(user.id, post_id, comment_id)
        .await?;
    Ok(guarded_json(outcome, StatusCode::OK))
}

#[post("/posts/{id}/delete_comment/{comment_id}/")]
async fn delete_comment(
    req: HttpRequest,
    user: AuthenticatedUser,
    comments: web::Data<CommentService>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, DomainError> {
    let (post_id, comment_id) = path.into_inner();
    let outcome = comments
        .delete_comment(user.id, post_id, comment_id)
        .await?;

    info!(
        request_id = %request_id(&req),
        username = %user.username,
        comment_id = %comment_id,
        "comment delete handled"
    );

    Ok(guarded_no_content(outcome))
}
