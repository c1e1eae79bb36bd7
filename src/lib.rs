pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod security;
pub mod services;
pub mod state;
pub mod store;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{directories, files, health};
use crate::state::AppState;

/// Build the application router
pub fn app(state: AppState) -> Router {
    let file_routes = get(files::get_file)
        .head(files::get_file_metadata)
        .post(files::create_file)
        .delete(files::delete_file);
    let directory_routes = get(directories::get_directory)
        .post(directories::create_directory)
        .delete(directories::delete_directory);

    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // File operations
        .route("/nfs/file/:root_path", file_routes.clone())
        .route("/nfs/file/:root_path/*path", file_routes)
        .route(
            "/nfs/file/metadata/:root_path",
            put(files::modify_file_metadata),
        )
        .route(
            "/nfs/file/metadata/:root_path/*path",
            put(files::modify_file_metadata),
        )
        .route("/nfs/movefile", post(files::move_file))
        // Directory operations
        .route("/nfs/directory/:root_path", directory_routes.clone())
        .route("/nfs/directory/:root_path/*path", directory_routes)
        // Add middleware
        .layer(DefaultBodyLimit::max(state.config.max_file_size))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
