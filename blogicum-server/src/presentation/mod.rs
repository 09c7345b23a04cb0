pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod utils;

use actix_web::error::InternalError;
use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;

use crate::domain::error::DomainError;

/// Registers every route of the service.
///
/// `/profile/edit/` goes before `/profile/{username}/`, which would
/// otherwise swallow it.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _| {
        DomainError::invalid("body", err.to_string()).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _| {
        InternalError::from_response(err, not_found_response()).into()
    }))
    .route("/health", web::get().to(health))
        .service(handlers::post::index)
        .service(handlers::post::category_posts)
        .service(handlers::post::create_post)
        .service(handlers::post::post_detail)
        .service(handlers::post::edit_post_form)
        .service(handlers::post::update_post)
        .service(handlers::post::delete_post_form)
        .service(handlers::post::delete_post)
        .service(handlers::comment::add_comment)
        .service(handlers::comment::edit_comment_form)
        .service(handlers::comment::update_comment)
        .service(handlers::comment::delete_comment_form)
        .service(handlers::comment::delete_comment)
        .service(handlers::profile::edit_profile_form)
        .service(handlers::profile::edit_profile)
        .service(handlers::profile::profile)
        .service(handlers::auth::scope())
        .default_service(web::to(not_found));
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
    })
}

fn not_found_response() -> HttpResponse {
    HttpResponse::NotFound().json(json!({ "error": "page not found" }))
}

async fn not_found() -> impl Responder {
    not_found_response()
}
