use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use bytes::Bytes;
use nfs_server_rust::{
    auth::{Identity, StaticTokenValidator},
    config::Config,
    state::AppState,
};
use serde_json::{json, Value};

const TOKEN: &str = "contract-token";

fn server() -> TestServer {
    let tokens = StaticTokenValidator::new()
        .with_token(TOKEN, Identity::new("contract-app").with_drive_access());
    let app = nfs_server_rust::app(AppState::with_validator(Config::default(), tokens));
    TestServer::new(app).unwrap()
}

fn bearer() -> (HeaderName, HeaderValue) {
    (
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", TOKEN)).unwrap(),
    )
}

#[tokio::test]
async fn test_error_payload_shape() {
    let server = server();
    let response = server.get("/nfs/file/app/nothing.txt").await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body, json!({ "errorCode": 400, "description": "Unauthorised" }));
}

#[tokio::test]
async fn test_file_info_fields() {
    let server = server();
    let (name, value) = bearer();

    let response = server
        .post("/nfs/file/drive/notes.md")
        .add_header(name.clone(), value.clone())
        .add_header(
            HeaderName::from_static("metadata"),
            HeaderValue::from_static("v1"),
        )
        .bytes(Bytes::from_static(b"# notes"))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let info: Value = response.json();
    assert_eq!(info["name"], "notes.md");
    assert_eq!(info["size"], 7);
    assert_eq!(info["contentType"], "text/markdown");
    assert_eq!(info["metadata"], "v1");
    assert!(info["createdOn"].is_string());
    assert!(info["modifiedOn"].is_string());
}

#[tokio::test]
async fn test_directory_listing_fields() {
    let server = server();
    let (name, value) = bearer();

    let response = server
        .post("/nfs/directory/app/photos")
        .add_header(name.clone(), value.clone())
        .json(&json!({ "metadata": "album" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = server
        .get("/nfs/directory/app")
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let listing: Value = response.json();
    assert_eq!(listing["info"]["name"], "");
    assert_eq!(listing["subDirectories"][0]["name"], "photos");
    assert_eq!(listing["subDirectories"][0]["metadata"], "album");
    assert_eq!(listing["files"], json!([]));
}

#[tokio::test]
async fn test_get_empty_file_range() {
    let server = server();
    let (name, value) = bearer();

    server
        .post("/nfs/file/app/empty.bin")
        .add_header(name.clone(), value.clone())
        .await;

    let response = server
        .get("/nfs/file/app/empty.bin")
        .add_header(name, value)
        .add_header(header::RANGE, HeaderValue::from_static("bytes=0-"))
        .await;
    assert_eq!(response.status_code(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(response.header(header::CONTENT_RANGE), "bytes 0-0/0");
    assert_eq!(response.header(header::CONTENT_TYPE), "application/octet-stream");
}
