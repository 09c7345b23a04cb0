use actix_web::dev::Payload;
use actix_web::http::{StatusCode, header};
use actix_web::{FromRequest, HttpMessage, HttpRequest, HttpResponse};
use futures_util::future::{Ready, ready};
use serde::Serialize;
use uuid::Uuid;

use crate::application::auth_service::AuthService;
use crate::domain::error::DomainError;
use crate::domain::ownership::Guarded;
use crate::presentation::middleware::RequestId;

/// Acting user of a request, put in place by the bearer-token middleware.
///
/// Extracting it from an anonymous request fails with 401, which is how
/// login-only routes are protected. Handlers open to everyone take
/// `Option<AuthenticatedUser>` instead.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub username: String,
}

impl FromRequest for AuthenticatedUser {
    type Error = DomainError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>() {
            Some(user) => ready(Ok(user.clone())),
            None => ready(Err(DomainError::Unauthorized)),
        }
    }
}

pub async fn extract_user_from_token(
    token: &str,
    auth_service: &AuthService,
) -> Result<AuthenticatedUser, DomainError> {
    let claims = auth_service
        .keys()
        .verify_token(token)
        .map_err(|_| DomainError::Unauthorized)?;
    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| DomainError::Unauthorized)?;

    // a token for a deleted account is as good as a forged one
    let user = auth_service
        .get_user(user_id)
        .await
        .map_err(|_| DomainError::Unauthorized)?;

    Ok(AuthenticatedUser {
        id: user.id,
        username: user.username,
    })
}

pub fn post_detail_url(post_id: Uuid) -> String {
    format!("/posts/{post_id}/")
}

pub fn redirect_to(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Allowed outcomes become a JSON body with `status`; refusals become a
/// redirect to the post's public page.
pub fn guarded_json<T: Serialize>(outcome: Guarded<T>, status: StatusCode) -> HttpResponse {
    match outcome {
        Guarded::Allowed(body) => HttpResponse::build(status).json(body),
        Guarded::Redirect { post_id } => redirect_to(&post_detail_url(post_id)),
    }
}

pub fn guarded_no_content(outcome: Guarded<()>) -> HttpResponse {
    match outcome {
        Guarded::Allowed(()) => HttpResponse::NoContent().finish(),
        Guarded::Redirect { post_id } => redirect_to(&post_detail_url(post_id)),
    }
}

pub fn request_id(req: &HttpRequest) -> String {
    req.extensions()
        .get::<RequestId>()
        .map(|rid| rid.0.clone())
        .unwrap_or_else(|| "unknown".into())
}
