use blogicum_server::domain::pagination::Paginator;
use blogicum_server::infrastructure::config::AppConfig;
use blogicum_server::infrastructure::database::{create_pool, run_migrations};
use blogicum_server::infrastructure::logging::init_logging;
use blogicum_server::infrastructure::security::JwtKeys;
use blogicum_server::server::{Services, start_rest_server};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = AppConfig::from_env()?;
    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;

    let services = Services::postgres(
        pool,
        JwtKeys::new(config.jwt_secret.clone(), config.jwt_ttl_hours),
        Paginator::new(config.posts_per_page),
    );

    start_rest_server(config, services).await
}
