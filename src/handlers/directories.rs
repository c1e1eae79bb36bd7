use axum::{
    extract::{
        rejection::{BytesRejection, PathRejection},
        Path, State,
    },
    http::HeaderMap,
    Json,
};
use bytes::Bytes;

use super::{json_body, read_body, TargetParams};
use crate::{
    auth::Authorized,
    error::Result,
    models::*,
    services::DirectoryService,
    state::AppState,
};

pub async fn create_directory(
    State(state): State<AppState>,
    Authorized(identity): Authorized,
    params: std::result::Result<Path<TargetParams>, PathRejection>,
    headers: HeaderMap,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<Json<DirectoryInfo>> {
    let params = TargetParams::from_path(params)?;
    let body = read_body(body, &headers, state.config.max_file_size)?;
    let request: CreateDirectoryRequest = serde_json::from_value(json_body(&body)?)?;

    let record = DirectoryService::create_directory(
        &state,
        &identity,
        params.root(),
        params.path(),
        request.metadata,
    )
    .await?;
    Ok(Json(DirectoryInfo::from(&record)))
}

pub async fn get_directory(
    State(state): State<AppState>,
    Authorized(identity): Authorized,
    params: std::result::Result<Path<TargetParams>, PathRejection>,
) -> Result<Json<DirectoryResponse>> {
    let params = TargetParams::from_path(params)?;
    let listing =
        DirectoryService::list_directory(&state, &identity, params.root(), params.path()).await?;
    Ok(Json(DirectoryResponse::from(&listing)))
}

pub async fn delete_directory(
    State(state): State<AppState>,
    Authorized(identity): Authorized,
    params: std::result::Result<Path<TargetParams>, PathRejection>,
) -> Result<Json<DeleteResponse>> {
    let params = TargetParams::from_path(params)?;
    let removed =
        DirectoryService::delete_directory(&state, &identity, params.root(), params.path())
            .await?;

    Ok(Json(DeleteResponse {
        success: true,
        message: format!(
            "Deleted {} directories and {} files",
            removed.directories, removed.files
        ),
    }))
}
