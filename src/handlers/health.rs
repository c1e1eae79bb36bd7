use axum::{extract::State, http::StatusCode, Json};

use crate::{models::HealthResponse, state::AppState};

static START_TIME: std::sync::OnceLock<std::time::Instant> = std::sync::OnceLock::new();

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let start = START_TIME.get_or_init(std::time::Instant::now);
    let uptime = start.elapsed().as_secs();

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: uptime,
            namespaces: state.store.namespace_count(),
            stored_files: state.store.blob_count(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticTokenValidator;
    use crate::config::Config;

    #[tokio::test]
    async fn test_health_check() {
        let state = AppState::with_validator(Config::default(), StaticTokenValidator::new());
        let (status, response) = health_check(State(state)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response.status, "healthy");
        assert_eq!(response.namespaces, 0);
        assert_eq!(response.stored_files, 0);
    }
}
