use bytes::Bytes;
use serde_json::Value;
use validator::Validate;

use crate::{
    auth::Identity,
    error::{AppError, Result},
    models::{MoveFileRequest, UpdateFileMetadataRequest},
    security,
    state::AppState,
    store::{
        path, ByteRange, FileContent, FileRecord, NamespaceKey, NewFile, NfsError, NfsPath,
        RootPath, TransferAction,
    },
};

/// Raw inputs of a create-file request
#[derive(Debug, Clone, Default)]
pub struct CreateFileInput {
    pub content: Bytes,
    pub content_type: Option<String>,
    pub metadata: Option<String>,
}

pub struct FileService;

impl FileService {
    /// Create a new file
    pub async fn create_file(
        state: &AppState,
        identity: &Identity,
        root: Option<&str>,
        path: Option<&str>,
        input: CreateFileInput,
    ) -> Result<FileRecord> {
        let (ns, path) = locate(identity, root, path)?;
        tracing::debug!(namespace = %ns, path = %path, "creating file");

        let max = state.config.max_file_size;
        if input.content.len() > max {
            return Err(AppError::FileTooLarge(input.content.len(), max));
        }

        let content_type = input
            .content_type
            .filter(|content_type| !content_type.trim().is_empty())
            .unwrap_or_else(|| {
                mime_guess::from_path(path.file_name())
                    .first_or_octet_stream()
                    .to_string()
            });

        let metadata = input.metadata.unwrap_or_default();
        ensure_header_safe(&metadata)?;

        let file = NewFile {
            content: input.content,
            content_type,
            metadata,
        };
        let record = state.store.create_file(&ns, &path, file).await?;

        tracing::info!(namespace = %ns, path = %path, size = record.size, "file created");
        Ok(record)
    }

    /// Read file content, optionally restricted by a `range` header value
    pub async fn read_file(
        state: &AppState,
        identity: &Identity,
        root: Option<&str>,
        path: Option<&str>,
        range: Option<&str>,
    ) -> Result<FileContent> {
        let (ns, path) = locate(identity, root, path)?;
        let range = range.map(ByteRange::parse).transpose()?;
        tracing::debug!(namespace = %ns, path = %path, ?range, "reading file");

        Ok(state.store.read_file(&ns, &path, range).await?)
    }

    /// Fetch the record of a file without its content
    pub async fn file_info(
        state: &AppState,
        identity: &Identity,
        root: Option<&str>,
        path: Option<&str>,
    ) -> Result<FileRecord> {
        let (ns, path) = locate(identity, root, path)?;
        tracing::debug!(namespace = %ns, path = %path, "reading file metadata");

        Ok(state.store.file_info(&ns, &path).await?)
    }

    /// Delete file
    pub async fn delete_file(
        state: &AppState,
        identity: &Identity,
        root: Option<&str>,
        path: Option<&str>,
    ) -> Result<FileRecord> {
        let (ns, path) = locate(identity, root, path)?;
        let record = state.store.delete_file(&ns, &path).await?;

        tracing::info!(namespace = %ns, path = %path, "file deleted");
        Ok(record)
    }

    /// Rename a file and/or replace its metadata string
    pub async fn update_metadata(
        state: &AppState,
        identity: &Identity,
        root: Option<&str>,
        path: Option<&str>,
        body: &Value,
    ) -> Result<FileRecord> {
        let (ns, path) = locate(identity, root, path)?;

        let request = UpdateFileMetadataRequest::from_json(body)?;
        request.validate()?;
        let update = request.into_update();
        if update.is_empty() {
            return Err(NfsError::MissingParameter("name or metadata").into());
        }
        if let Some(metadata) = &update.metadata {
            ensure_header_safe(metadata)?;
        }

        let record = state.store.update_file(&ns, &path, update).await?;

        tracing::info!(namespace = %ns, path = %path, name = %record.name, "file metadata updated");
        Ok(record)
    }

    /// Move or copy a file into another directory, possibly under another root
    pub async fn move_or_copy(
        state: &AppState,
        identity: &Identity,
        request: MoveFileRequest,
    ) -> Result<FileRecord> {
        let src_root = required(request.src_root_path.as_ref(), "srcRootPath")?;
        let dest_root = required(request.dest_root_path.as_ref(), "destRootPath")?;
        let src_path = required(request.src_path.as_ref(), "srcPath")?;
        let dest_path = required(request.dest_path.as_ref(), "destPath")?;

        let src_root = root_field(src_root, "srcRootPath")?;
        let dest_root = root_field(dest_root, "destRootPath")?;

        let action = match request.action {
            None | Some(Value::Null) => TransferAction::default(),
            Some(Value::String(action)) => {
                TransferAction::parse(&action).ok_or(AppError::InvalidAction(action))?
            }
            Some(other) => return Err(AppError::InvalidAction(other.to_string())),
        };

        let src_path = string_field(src_path, "srcPath")?;
        let dest_path = string_field(dest_path, "destPath")?;

        let src_ns = identity.namespace(src_root)?;
        let dest_ns = identity.namespace(dest_root)?;
        let src_path = NfsPath::parse(src_path)?;
        if src_path.is_root() {
            return Err(NfsError::MissingParameter("srcPath").into());
        }
        let dest_dir = NfsPath::parse(dest_path)?;

        tracing::debug!(
            from = %src_ns, src = %src_path, to = %dest_ns, dest = %dest_dir, ?action,
            "transferring file"
        );
        let record = state
            .store
            .transfer(&src_ns, &src_path, &dest_ns, &dest_dir, action)
            .await?;

        tracing::info!(
            from = %src_ns, src = %src_path, to = %dest_ns, dest = %dest_dir, ?action,
            "file transferred"
        );
        Ok(record)
    }
}

/// Resolve a file target and pick the caller's namespace for its root
pub(crate) fn locate(
    identity: &Identity,
    root: Option<&str>,
    path: Option<&str>,
) -> Result<(NamespaceKey, NfsPath)> {
    let location = path::resolve(root, path)?;
    let ns = identity.namespace(location.root)?;
    Ok((ns, location.path))
}

/// Metadata is echoed back in the `metadata` response header
pub(crate) fn ensure_header_safe(metadata: &str) -> Result<()> {
    if security::is_header_safe(metadata) {
        Ok(())
    } else {
        Err(AppError::InvalidInput(
            "metadata must not contain control characters".to_string(),
        ))
    }
}

/// A move field counts as missing when absent, `null` or a blank string.
fn required<'a>(value: Option<&'a Value>, field: &'static str) -> Result<&'a Value> {
    match value {
        None | Some(Value::Null) => Err(NfsError::MissingParameter(field).into()),
        Some(Value::String(text)) if text.trim().is_empty() => {
            Err(NfsError::MissingParameter(field).into())
        }
        Some(value) => Ok(value),
    }
}

fn root_field(value: &Value, field: &'static str) -> Result<RootPath> {
    let root = match value.as_str() {
        Some(root) => path::resolve_root(field, Some(root)),
        None => Err(NfsError::InvalidRootPath {
            field,
            value: Some(value.to_string()),
        }),
    };
    Ok(root?)
}

fn string_field<'a>(value: &'a Value, field: &'static str) -> Result<&'a str> {
    value.as_str().ok_or(AppError::InvalidFieldType(field))
}
