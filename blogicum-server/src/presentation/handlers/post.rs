use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, get, post, web};
use tracing::info;
use uuid::Uuid;

use crate::application::comment_service::CommentService;
use crate::application::post_service::PostService;
use crate::domain::error::DomainError;
use crate::presentation::dto::{CategoryPostsResponse, PageQuery, PostDetailResponse, PostForm};
use crate::presentation::utils::{
    AuthenticatedUser, guarded_json, guarded_no_content, request_id,
};

#[get("/")]
async fn index(
    posts: web::Data<PostService>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, DomainError> {
    let page = posts.list_published(query.page.as_deref()).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[get("/category/{slug}/")]
async fn category_posts(
    posts: web::Data<PostService>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, DomainError> {
    let slug = path.into_inner();
    let (category, page) = posts.list_category(&slug, query.page.as_deref()).await?;
    Ok(HttpResponse::Ok().json(CategoryPostsResponse { category, page }))
}

#[get("/posts/{id}/")]
async fn post_detail(
    user: Option<AuthenticatedUser>,
    posts: web::Data<PostService>,
    comments: web::Data<CommentService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();
    let post = posts.get_visible(post_id, user.map(|u| u.id)).await?;
    let comments = comments.comments_for(post.id).await?;
    Ok(HttpResponse::Ok().json(PostDetailResponse { post, comments }))
}

#[post("/posts/create/")]
async fn create_post(
    req: HttpRequest,
    user: AuthenticatedUser,
    posts: web::Data<PostService>,
    payload: web::Json<PostForm>,
) -> Result<HttpResponse, DomainError> {
    let draft = payload.into_inner().into_draft()?;
    let post = posts.create_post(user.id, draft).await?;

    info!(
        request_id = %request_id(&req),
        username = %user.username,
        post_id = %post.id,
        "post created"
    );

    Ok(HttpResponse::Created().json(post))
}

#[get("/posts/{id}/edit/")]
async fn edit_post_form(
    user: AuthenticatedUser,
    posts: web::Data<PostService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let outcome = posts.editable_post(user.id, path.into_inner()).await?;
    Ok(guarded_json(outcome, StatusCode::OK))
}

#[post("/posts/{id}/edit/")]
async fn update_post(
    req: HttpRequest,
    user: AuthenticatedUser,
    posts: web::Data<PostService>,
    payload: web::Json<PostForm>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();
    let outcome = posts
        .update_post(user.id, post_id, payload.into_inner().into_draft())
        .await?;

    info!(
        request_id = %request_id(&req),
        username = %user.username,
        post_id = %post_id,
        "post edit handled"
    );

    Ok(guarded_json(outcome, StatusCode::OK))
}

#[get("/posts/{id}/delete/")]
async fn delete_post_form(
    user: AuthenticatedUser,
    posts: web::Data<PostService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let outcome = posts.editable_post(user.id, path.into_inner()).await?;
    Ok(guarded_json(outcome, StatusCode::OK))
}

#[post("/posts/{id}/delete/")]
async fn delete_post(
    req: HttpRequest,
    user: AuthenticatedUser,
    posts: web::Data<PostService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();
    let outcome = posts.delete_post(user.id, post_id).await?;

    info!(
        request_id = %request_id(&req),
        username = %user.username,
        post_id = %post_id,
        "post delete handled"
    );

    Ok(guarded_no_content(outcome))
}
