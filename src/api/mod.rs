mod extract;
mod handlers;

pub use handlers::ApiError;

use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::Database;

pub fn create_router(db: Database) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        // Scientists
        .route(
            "/scientists",
            get(handlers::list_scientists).post(handlers::create_scientist),
        )
        .route(
            "/scientists/{id}",
            get(handlers::get_scientist)
                .patch(handlers::update_scientist)
                .delete(handlers::delete_scientist),
        )
        // Planets
        .route("/planets", get(handlers::list_planets))
        // Missions
        .route(
            "/missions",
            get(handlers::list_missions).post(handlers::create_mission),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(db)
}
