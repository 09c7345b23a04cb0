use std::sync::Arc;

use actix_cors::Cors;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::header::{self, HeaderName};
use actix_web::middleware::{DefaultHeaders, from_fn};
use actix_web::{App, HttpServer, web};
use sqlx::PgPool;
use tracing::info;

use crate::application::auth_service::AuthService;
use crate::application::comment_service::CommentService;
use crate::application::post_service::PostService;
use crate::data::catalog_repository::{CatalogRepository, PostgresCatalogRepository};
use crate::data::comment_repository::{CommentRepository, PostgresCommentRepository};
use crate::data::memory::InMemoryStore;
use crate::data::post_repository::{PostRepository, PostgresPostRepository};
use crate::data::user_repository::{PostgresUserRepository, UserRepository};
use crate::domain::pagination::Paginator;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::security::JwtKeys;
use crate::presentation;
use crate::presentation::middleware::{JwtAuthMiddleware, trace_requests};

/// The application services every worker shares.
#[derive(Clone)]
pub struct Services {
    pub auth: AuthService,
    pub posts: PostService,
    pub comments: CommentService,
}

impl Services {
    pub fn new(
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        catalog: Arc<dyn CatalogRepository>,
        keys: JwtKeys,
        paginator: Paginator,
    ) -> Self {
        let posts = PostService::new(posts, catalog, paginator);
        Self {
            auth: AuthService::new(users, keys),
            comments: CommentService::new(comments, posts.clone()),
            posts,
        }
    }

    pub fn postgres(pool: PgPool, keys: JwtKeys, paginator: Paginator) -> Self {
        Self::new(
            Arc::new(PostgresUserRepository::new(pool.clone())),
            Arc::new(PostgresPostRepository::new(pool.clone())),
            Arc::new(PostgresCommentRepository::new(pool.clone())),
            Arc::new(PostgresCatalogRepository::new(pool)),
            keys,
            paginator,
        )
    }

    pub fn in_memory(store: Arc<InMemoryStore>, keys: JwtKeys, paginator: Paginator) -> Self {
        Self::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store,
            keys,
            paginator,
        )
    }

    /// Shares the services with handlers and mounts every route.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.auth.clone()))
            .app_data(web::Data::new(self.posts.clone()))
            .app_data(web::Data::new(self.comments.clone()));
        presentation::routes(cfg);
    }
}

/// The full application: routes plus the middleware stack, innermost first
/// (bearer auth, request tracing, security headers, CORS).
pub fn build_app(
    services: Services,
    cors_origins: &[String],
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody + use<>>,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    App::new()
        .wrap(JwtAuthMiddleware::new(services.auth.clone()))
        .wrap(from_fn(trace_requests))
        .wrap(
            DefaultHeaders::new()
                .add(("X-Content-Type-Options", "nosniff"))
                .add(("Referrer-Policy", "no-referrer"))
                .add(("Permissions-Policy", "geolocation=()"))
                .add(("Cross-Origin-Opener-Policy", "same-origin")),
        )
        .wrap(build_cors(cors_origins))
        .configure(move |cfg| services.configure(cfg))
}

pub async fn start_rest_server(config: AppConfig, services: Services) -> anyhow::Result<()> {
    let bind_address = (config.host.clone(), config.port);

    info!(
        host = %bind_address.0,
        port = bind_address.1,
        "HTTP server starting"
    );

    HttpServer::new(move || build_app(services.clone(), &config.cors_origins))
        .bind(bind_address)?
        .run()
        .await
        .map_err(anyhow::Error::new)?;

    Ok(())
}

fn build_cors(origins: &[String]) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers(vec![
            header::LOCATION,
            HeaderName::from_static("x-request-id"),
        ])
        .supports_credentials()
        .max_age(3600);

    for origin in origins {
        cors = cors.allowed_origin(origin);
    }

    cors
}
