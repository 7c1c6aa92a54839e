use tokio::sync::broadcast;
use tracing::info;

use pickem_pool_backend::{app_router, config::ServiceConfig, db, services::catalog::CatalogClient};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = ServiceConfig::from_env();

    let pool = db::connect(&config.database_url)
        .await
        .expect("Could not connect to SQLite");
    db::init_schema(&pool)
        .await
        .expect("Could not initialize database schema");

    let (tx, _rx) = broadcast::channel::<String>(100);
    let catalog = CatalogClient::new(&config);

    let app = app_router(pool, tx, catalog);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Could not bind listener");
    info!("Started server on {}.", config.bind_addr);
    axum::serve(listener, app).await.expect("Server error");
}
