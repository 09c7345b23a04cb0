use crate::application::auth_service::AuthService;
use crate::domain::error::DomainError;
use crate::presentation::dto::{AuthResponse, LoginRequest, RegisterRequest};
use actix_web::{HttpResponse, Scope, post, web};
use tracing::info;

pub fn scope() -> Scope {
    web::scope("/auth")
        .service(register)
        .service(login)
}

#[post("/registration/")]
async fn register(
    service: web::Data<AuthService>,
    payload: web::Json<RegisterRequest>,
) -> Result<HttpResponse, DomainError> {
    payload.validate()?;
    let RegisterRequest {
        username,
        email,
        password,
    } = payload.into_inner();

    let user = service
        .register(username.trim().to_string(), email.trim().to_string(), password)
        .await?;

    info!(user_id = %user.id, username = %user.username, "user registered");

    let jwt = service.issue_token(user.id)?;

    Ok(HttpResponse::Created().json(AuthResponse {
        access_token: jwt,
        expires_in: service.keys().ttl_seconds(),
        token_type: "Bearer".to_string(),
    }))
}

#[post("/login/")]
async fn login(
    service: web::Data<AuthService>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, DomainError> {
    let jwt = service
        .login(payload.username.trim(), &payload.password)
        .await?;

    info!(username = %payload.username, "user logged in");

    Ok(HttpResponse::Ok().json(AuthResponse {
        access_token: jwt,
        expires_in: service.keys().ttl_seconds(),
        token_type: "Bearer".to_string(),
    }))
}
