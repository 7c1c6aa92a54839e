use axum::{
    routing::{get, post},
    Extension, Router,
};
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;

pub mod config;
pub mod db;
pub mod error;

pub mod dto {
    pub mod game_dto;
    pub mod member_dto;
    pub mod pick_dto;
    pub mod pool_dto;
    pub mod standing_dto;
    pub mod week_dto;
}

pub mod services {
    pub mod catalog;
    pub mod grading;
    pub mod lock;
    pub mod standings;
    pub mod visibility;
    pub mod websocket;
}

pub mod routes {
    pub mod leaderboard;
    pub mod picks;
    pub mod pools;
    pub mod weeks;
}

use services::catalog::CatalogClient;

pub fn app_router(
    pool: SqlitePool,
    tx: broadcast::Sender<String>,
    catalog: CatalogClient,
) -> Router {
    Router::new()
        .route("/pools", post(routes::pools::create_pool))
        .route("/pools/join", post(routes::pools::join_pool))
        .route(
            "/pools/{pool_id}",
            get(routes::pools::get_pool).delete(routes::pools::delete_pool),
        )
        .route("/pools/{pool_id}/transfer", post(routes::pools::transfer_ownership))
        .route("/pools/{pool_id}/leaderboard", get(routes::leaderboard::get_leaderboard))
        .route("/weeks", post(routes::weeks::create_week))
        .route("/weeks/{week_id}", get(routes::weeks::get_week_view))
        .route("/weeks/{week_id}/sync", post(routes::weeks::sync_week))
        .route("/picks", post(routes::picks::submit_pick))
        .route("/ws", get(services::websocket::websocket_handler))
        .layer(Extension(pool))
        .layer(Extension(tx))
        .layer(Extension(catalog))
        .layer(CorsLayer::permissive())
}
