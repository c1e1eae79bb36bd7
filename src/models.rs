use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::{
    error::AppError,
    store::{DirectoryListing, DirectoryRecord, FileRecord, FileUpdate},
};

/// Body of a move/copy request. Fields keep their raw JSON values so missing
/// fields and mistyped ones can be reported in the documented order.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveFileRequest {
    pub src_root_path: Option<Value>,
    pub dest_root_path: Option<Value>,
    pub src_path: Option<Value>,
    pub dest_path: Option<Value>,
    pub action: Option<Value>,
}

/// Body of a modify-metadata request after type checking.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct UpdateFileMetadataRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,

    pub metadata: Option<String>,
}

impl UpdateFileMetadataRequest {
    /// Build from a raw JSON body, rejecting present fields that are not
    /// strings. `null` counts as absent.
    pub fn from_json(body: &Value) -> Result<Self, AppError> {
        Ok(Self {
            name: string_field(body, "name")?,
            metadata: string_field(body, "metadata")?,
        })
    }

    pub fn into_update(self) -> FileUpdate {
        FileUpdate {
            name: self.name,
            metadata: self.metadata,
        }
    }
}

fn string_field(body: &Value, field: &'static str) -> Result<Option<String>, AppError> {
    match body.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(AppError::InvalidFieldType(field)),
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CreateDirectoryRequest {
    pub metadata: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
    pub content_type: String,
    pub metadata: String,
    pub created_on: DateTime<Utc>,
    pub modified_on: DateTime<Utc>,
}

impl From<&FileRecord> for FileInfo {
    fn from(record: &FileRecord) -> Self {
        Self {
            name: record.name.clone(),
            size: record.size,
            content_type: record.content_type.clone(),
            metadata: record.metadata.clone(),
            created_on: record.created_on,
            modified_on: record.last_modified,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryInfo {
    pub name: String,
    pub metadata: String,
    pub created_on: DateTime<Utc>,
    pub modified_on: DateTime<Utc>,
}

impl From<&DirectoryRecord> for DirectoryInfo {
    fn from(record: &DirectoryRecord) -> Self {
        Self {
            name: record.name.clone(),
            metadata: record.metadata.clone(),
            created_on: record.created_on,
            modified_on: record.last_modified,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryResponse {
    pub info: DirectoryInfo,
    pub files: Vec<FileInfo>,
    pub sub_directories: Vec<DirectoryInfo>,
}

impl From<&DirectoryListing> for DirectoryResponse {
    fn from(listing: &DirectoryListing) -> Self {
        Self {
            info: DirectoryInfo::from(&listing.info),
            files: listing.files.iter().map(FileInfo::from).collect(),
            sub_directories: listing.sub_directories.iter().map(DirectoryInfo::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub namespaces: usize,
    pub stored_files: usize,
}
