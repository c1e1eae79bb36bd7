pub mod directories;
pub mod files;
pub mod health;

use axum::{
    extract::{
        rejection::{BytesRejection, PathRejection},
        Path,
    },
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{AppError, Result};

/// `:root_path` and `*path` segments of the NFS routes. Both are optional so
/// the short routes reach the handler and fail with a domain error.
#[derive(Debug, Default, Deserialize)]
pub struct TargetParams {
    pub root_path: Option<String>,
    pub path: Option<String>,
}

impl TargetParams {
    pub fn from_path(params: std::result::Result<Path<TargetParams>, PathRejection>) -> Result<Self> {
        let Path(params) = params.map_err(|rejection| AppError::InvalidInput(rejection.body_text()))?;
        Ok(params)
    }

    pub fn root(&self) -> Option<&str> {
        self.root_path.as_deref()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }
}

/// Format a timestamp the way HTTP date headers expect
pub fn http_date(time: &DateTime<Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Value of a request header as UTF-8 text. Other encodings are rejected.
pub fn header_str<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Result<Option<&'a str>> {
    headers
        .get(name)
        .map(|value| {
            std::str::from_utf8(value.as_bytes())
                .map_err(|_| AppError::InvalidInput(format!("{} header is not valid UTF-8", name)))
        })
        .transpose()
}

/// Header value carrying `value` as raw UTF-8 bytes
pub fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_bytes(value.as_bytes())
        .map_err(|err| AppError::InternalError(format!("invalid header value {:?}: {}", value, err)))
}

/// Unwrap a buffered request body. Bodies cut off by the size limit become
/// `FileTooLarge` so they get the usual error payload.
pub fn read_body(
    body: std::result::Result<Bytes, BytesRejection>,
    headers: &HeaderMap,
    max: usize,
) -> Result<Bytes> {
    body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            let declared = header_str(headers, &header::CONTENT_LENGTH)
                .ok()
                .flatten()
                .and_then(|len| len.parse().ok())
                .unwrap_or(max + 1);
            AppError::FileTooLarge(declared, max)
        } else {
            AppError::InvalidInput(rejection.body_text())
        }
    })
}

/// Parse an optional JSON body; an empty body reads as `{}`
pub fn json_body(body: &Bytes) -> Result<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Default::default()));
    }
    Ok(serde_json::from_slice(body)?)
}
