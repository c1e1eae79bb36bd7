use axum::{
    extract::{
        rejection::{BytesRejection, PathRejection},
        Path, State,
    },
    http::{header, HeaderMap, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;

use super::{header_str, header_value, http_date, json_body, read_body, TargetParams};
use crate::{
    auth::Authorized,
    error::Result,
    models::*,
    services::{CreateFileInput, FileService},
    state::AppState,
    store::{FileContent, FileRecord},
};

pub const METADATA_HEADER: HeaderName = HeaderName::from_static("metadata");
pub const CREATED_ON_HEADER: HeaderName = HeaderName::from_static("created-on");

pub async fn create_file(
    State(state): State<AppState>,
    Authorized(identity): Authorized,
    params: std::result::Result<Path<TargetParams>, PathRejection>,
    headers: HeaderMap,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<Json<FileInfo>> {
    let params = TargetParams::from_path(params)?;
    let content = read_body(body, &headers, state.config.max_file_size)?;

    let input = CreateFileInput {
        content,
        content_type: header_str(&headers, &header::CONTENT_TYPE)?.map(str::to_string),
        metadata: header_str(&headers, &METADATA_HEADER)?.map(str::to_string),
    };
    let record =
        FileService::create_file(&state, &identity, params.root(), params.path(), input).await?;
    Ok(Json(FileInfo::from(&record)))
}

pub async fn get_file(
    State(state): State<AppState>,
    Authorized(identity): Authorized,
    params: std::result::Result<Path<TargetParams>, PathRejection>,
    headers: HeaderMap,
) -> Result<Response> {
    let params = TargetParams::from_path(params)?;
    let range = header_str(&headers, &header::RANGE)?;
    let FileContent { record, slice } =
        FileService::read_file(&state, &identity, params.root(), params.path(), range).await?;

    let status = if range.is_some() {
        StatusCode::PARTIAL_CONTENT
    } else {
        StatusCode::OK
    };

    let mut response_headers = file_headers(&record)?;
    response_headers.insert(header::CONTENT_LENGTH, slice.bytes.len().into());
    response_headers.insert(header::CONTENT_RANGE, header_value(&slice.content_range())?);

    Ok((status, response_headers, slice.bytes).into_response())
}

pub async fn get_file_metadata(
    State(state): State<AppState>,
    Authorized(identity): Authorized,
    params: std::result::Result<Path<TargetParams>, PathRejection>,
) -> Result<Response> {
    let params = TargetParams::from_path(params)?;
    let record = FileService::file_info(&state, &identity, params.root(), params.path()).await?;

    let mut response_headers = file_headers(&record)?;
    response_headers.insert(header::CONTENT_LENGTH, record.size.into());

    Ok((StatusCode::OK, response_headers).into_response())
}

pub async fn delete_file(
    State(state): State<AppState>,
    Authorized(identity): Authorized,
    params: std::result::Result<Path<TargetParams>, PathRejection>,
) -> Result<Json<DeleteResponse>> {
    let params = TargetParams::from_path(params)?;
    let record = FileService::delete_file(&state, &identity, params.root(), params.path()).await?;

    Ok(Json(DeleteResponse {
        success: true,
        message: format!("File {} deleted", record.name),
    }))
}

pub async fn modify_file_metadata(
    State(state): State<AppState>,
    Authorized(identity): Authorized,
    params: std::result::Result<Path<TargetParams>, PathRejection>,
    headers: HeaderMap,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<Json<FileInfo>> {
    let params = TargetParams::from_path(params)?;
    let body = read_body(body, &headers, state.config.max_file_size)?;
    let body = json_body(&body)?;
    let record =
        FileService::update_metadata(&state, &identity, params.root(), params.path(), &body)
            .await?;
    Ok(Json(FileInfo::from(&record)))
}

pub async fn move_file(
    State(state): State<AppState>,
    Authorized(identity): Authorized,
    headers: HeaderMap,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<Json<FileInfo>> {
    let body = read_body(body, &headers, state.config.max_file_size)?;
    let request: MoveFileRequest = serde_json::from_value(json_body(&body)?)?;
    let record = FileService::move_or_copy(&state, &identity, request).await?;
    Ok(Json(FileInfo::from(&record)))
}

/// Headers shared by GET and HEAD responses
fn file_headers(record: &FileRecord) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT_RANGES, header_value("bytes")?);
    headers.insert(CREATED_ON_HEADER, header_value(&http_date(&record.created_on))?);
    headers.insert(header::LAST_MODIFIED, header_value(&http_date(&record.last_modified))?);
    headers.insert(METADATA_HEADER, header_value(&record.metadata)?);
    headers.insert(header::CONTENT_TYPE, header_value(&record.content_type)?);
    Ok(headers)
}
