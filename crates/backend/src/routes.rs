use std::path::Path;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::db::DbPool;
use crate::handlers;

/// Build the application router. Static assets are served from `static_dir`.
pub fn app_router(pool: DbPool, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health_check))
        // Venue routes
        .route("/venues", get(handlers::list_venues))
        .route("/venues/search", post(handlers::search_venues))
        .route(
            "/venues/create",
            get(handlers::create_venue_form).post(handlers::create_venue_submission),
        )
        .route(
            "/venues/:id",
            get(handlers::show_venue).delete(handlers::delete_venue),
        )
        .route(
            "/venues/:id/edit",
            get(handlers::edit_venue).post(handlers::edit_venue_submission),
        )
        // Artist routes
        .route("/artists", get(handlers::list_artists))
        .route("/artists/search", post(handlers::search_artists))
        .route(
            "/artists/create",
            get(handlers::create_artist_form).post(handlers::create_artist_submission),
        )
        .route(
            "/artists/:id",
            get(handlers::show_artist).delete(handlers::delete_artist),
        )
        .route(
            "/artists/:id/edit",
            get(handlers::edit_artist).post(handlers::edit_artist_submission),
        )
        // Show routes
        .route("/shows", get(handlers::list_shows))
        .route(
            "/shows/create",
            get(handlers::create_show_form).post(handlers::create_show_submission),
        )
        .nest_service("/static", ServeDir::new(static_dir.as_ref()))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(pool)
}
