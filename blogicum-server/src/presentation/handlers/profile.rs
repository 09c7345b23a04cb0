use actix_web::{HttpRequest, HttpResponse, get, post, web};
use tracing::info;

use crate::application::auth_service::AuthService;
use crate::application::post_service::PostService;
use crate::domain::error::DomainError;
use crate::domain::user::Profile;
use crate::presentation::dto::{PageQuery, ProfileForm, ProfileResponse};
use crate::presentation::utils::{AuthenticatedUser, request_id};

#[get("/profile/edit/")]
async fn edit_profile_form(
    user: AuthenticatedUser,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, DomainError> {
    let me = auth.get_user(user.id).await?;
    Ok(HttpResponse::Ok().json(me))
}

#[post("/profile/edit/")]
async fn edit_profile(
    req: HttpRequest,
    user: AuthenticatedUser,
    auth: web::Data<AuthService>,
    payload: web::Json<ProfileForm>,
) -> Result<HttpResponse, DomainError> {
    let changes = payload.into_inner().into_changes()?;
    let me = auth.update_profile(user.id, changes).await?;

    info!(
        request_id = %request_id(&req),
        username = %me.username,
        "profile edited"
    );

    Ok(HttpResponse::Ok().json(me))
}

#[get("/profile/{username}/")]
async fn profile(
    user: Option<AuthenticatedUser>,
    auth: web::Data<AuthService>,
    posts: web::Data<PostService>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, DomainError> {
    let owner = auth.get_by_username(&path.into_inner()).await?;
    let page = posts
        .list_profile(owner.id, user.map(|u| u.id), query.page.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(ProfileResponse {
        profile: Profile::from(&owner),
        page,
    }))
}
