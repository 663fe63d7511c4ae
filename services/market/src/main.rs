use std::sync::Arc;

use anyhow::Result;
use aws_config::BehaviorVersion;
use common::database::{DatabaseConfig, health_check, init_pool};
use tracing::info;
use tracing_subscriber::EnvFilter;

use market::{
    AppState, create_router,
    middleware::{JwtConfig, JwtVerifier},
    repositories::{ProductRepository, UserRepository},
    settings::Settings,
    storage::S3PhotoStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting market service");

    let settings = Settings::from_env()?;
    let jwt_verifier = JwtVerifier::new(&JwtConfig::from_env()?)?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    // Initialize AWS S3 client
    let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let s3_client = aws_sdk_s3::Client::new(&aws_config);
    let photo_store = S3PhotoStore::new(
        s3_client,
        settings.photo_bucket.clone(),
        settings.photo_key_prefix.clone(),
        settings.photo_public_base_url.clone(),
    );

    let app_state = AppState {
        user_store: Arc::new(UserRepository::new(pool.clone())),
        product_store: Arc::new(ProductRepository::new(pool)),
        photo_store: Arc::new(photo_store),
        jwt_verifier,
    };

    let app = create_router(app_state, settings.upload_limit_bytes);

    let listener = tokio::net::TcpListener::bind(&settings.bind_address).await?;
    info!("Market service listening on {}", settings.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
