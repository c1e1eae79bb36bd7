use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::store::NfsError;

pub const UNAUTHORISED: &str = "Unauthorised";
pub const REQUIRED_PARAMS_MISSING: &str = "Required parameters missing";

/// Error code carried by every plain request error (and, by convention, by
/// the 401 response as well).
pub const BAD_REQUEST_CODE: i32 = 400;
pub const INTERNAL_ERROR_CODE: i32 = 500;
pub const DIRECTORY_ALREADY_EXISTS_CODE: i32 = -501;
pub const DIRECTORY_NOT_FOUND_CODE: i32 = -502;
pub const FILE_NOT_FOUND_CODE: i32 = -503;
pub const FILE_ALREADY_EXISTS_CODE: i32 = -505;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error_code: i32,
    pub description: String,
}

#[derive(Debug)]
pub enum AppError {
    Unauthorized,
    Nfs(NfsError),
    InvalidFieldType(&'static str),
    InvalidAction(String),
    InvalidInput(String),
    ValidationError(String),
    FileTooLarge(usize, usize), // actual, max
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Unauthorized => write!(f, "{}", UNAUTHORISED),
            AppError::Nfs(err) => write!(f, "{}", err),
            AppError::InvalidFieldType(field) => write!(f, "{} must be a string", field),
            AppError::InvalidAction(action) => {
                write!(f, "Invalid action '{}': action must be MOVE or COPY", action)
            }
            AppError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::FileTooLarge(actual, max) => {
                write!(f, "File too large: {} bytes (max: {} bytes)", actual, max)
            }
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<NfsError> for AppError {
    fn from(err: NfsError) -> Self {
        match err {
            NfsError::MissingContent(_) => AppError::InternalError(err.to_string()),
            err => AppError::Nfs(err),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("malformed JSON body: {}", err))
    }
}

impl AppError {
    /// HTTP status, domain error code and client facing description.
    pub fn parts(&self) -> (StatusCode, i32, String) {
        match self {
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                BAD_REQUEST_CODE,
                UNAUTHORISED.to_string(),
            ),
            AppError::Nfs(err) => match err {
                NfsError::MissingParameter(_) => (
                    StatusCode::BAD_REQUEST,
                    BAD_REQUEST_CODE,
                    REQUIRED_PARAMS_MISSING.to_string(),
                ),
                NfsError::InvalidRootPath { .. }
                | NfsError::InvalidPath { .. }
                | NfsError::InvalidRange(_) => {
                    (StatusCode::BAD_REQUEST, BAD_REQUEST_CODE, err.to_string())
                }
                NfsError::FileAlreadyExists(_) => (
                    StatusCode::BAD_REQUEST,
                    FILE_ALREADY_EXISTS_CODE,
                    "NfsError::FileAlreadyExistsWithSameName".to_string(),
                ),
                NfsError::DirectoryAlreadyExists(_) => (
                    StatusCode::BAD_REQUEST,
                    DIRECTORY_ALREADY_EXISTS_CODE,
                    "NfsError::DirectoryAlreadyExistsWithSameName".to_string(),
                ),
                NfsError::FileNotFound(_) => (
                    StatusCode::NOT_FOUND,
                    FILE_NOT_FOUND_CODE,
                    "NfsError::FileNotFound".to_string(),
                ),
                NfsError::DirectoryNotFound(_) => (
                    StatusCode::NOT_FOUND,
                    DIRECTORY_NOT_FOUND_CODE,
                    "NfsError::DirectoryNotFound".to_string(),
                ),
                NfsError::MissingContent(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_ERROR_CODE,
                    "Internal server error".to_string(),
                ),
            },
            AppError::InvalidFieldType(_)
            | AppError::InvalidAction(_)
            | AppError::InvalidInput(_)
            | AppError::ValidationError(_) => {
                (StatusCode::BAD_REQUEST, BAD_REQUEST_CODE, self.to_string())
            }
            AppError::FileTooLarge(..) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                BAD_REQUEST_CODE,
                self.to_string(),
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                INTERNAL_ERROR_CODE,
                "Internal server error".to_string(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, description) = self.parts();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::debug!(status = status.as_u16(), "request failed: {}", self);
        }

        let error_response = ErrorResponse {
            error_code,
            description,
        };

        (status, Json(error_response)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_uses_400_code_inside_401() {
        let (status, code, description) = AppError::Unauthorized.parts();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(code, 400);
        assert_eq!(description, UNAUTHORISED);
    }

    #[test]
    fn test_file_already_exists_code() {
        let err = AppError::from(NfsError::FileAlreadyExists("a".to_string()));
        let (status, code, description) = err.parts();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, -505);
        assert_eq!(description, "NfsError::FileAlreadyExistsWithSameName");
    }

    #[test]
    fn test_missing_parameter_is_generic() {
        let err = AppError::from(NfsError::MissingParameter("srcPath"));
        let (status, code, description) = err.parts();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, 400);
        assert_eq!(description, REQUIRED_PARAMS_MISSING);
    }

    #[test]
    fn test_field_errors_name_the_field() {
        let (_, _, description) = AppError::InvalidFieldType("metadata").parts();
        assert!(description.contains("metadata"));

        let (_, _, description) = AppError::InvalidAction("test".to_string()).parts();
        assert!(description.contains("action"));

        let err = AppError::from(NfsError::InvalidRootPath {
            field: "destRootPath",
            value: Some("test".to_string()),
        });
        assert!(err.parts().2.contains("destRootPath"));
    }

    #[test]
    fn test_not_found_is_404() {
        let err = AppError::from(NfsError::FileNotFound("a".to_string()));
        assert_eq!(err.parts().0, StatusCode::NOT_FOUND);
        let err = AppError::from(NfsError::DirectoryNotFound("d".to_string()));
        assert_eq!(err.parts().0, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_missing_content_is_internal() {
        let err = AppError::from(NfsError::MissingContent("blob".to_string()));
        assert!(matches!(err, AppError::InternalError(_)));
        assert_eq!(err.parts().0, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_file_too_large_error() {
        let err = AppError::FileTooLarge(1000, 500);
        assert!(err.to_string().contains("1000"));
        assert!(err.to_string().contains("500"));
        assert_eq!(err.parts().0, StatusCode::PAYLOAD_TOO_LARGE);
    }
}
