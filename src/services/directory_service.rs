use super::file_service::ensure_header_safe;
use crate::{
    auth::Identity,
    error::Result,
    state::AppState,
    store::{path, DirectoryListing, DirectoryRecord, NamespaceKey, NfsPath, RemovedTree},
};

pub struct DirectoryService;

impl DirectoryService {
    pub async fn create_directory(
        state: &AppState,
        identity: &Identity,
        root: Option<&str>,
        path: Option<&str>,
        metadata: Option<String>,
    ) -> Result<DirectoryRecord> {
        let (ns, path) = locate_dir(identity, root, path)?;
        let metadata = metadata.unwrap_or_default();
        ensure_header_safe(&metadata)?;

        let record = state.store.create_dir(&ns, &path, metadata).await?;
        tracing::info!(namespace = %ns, path = %path, "directory created");
        Ok(record)
    }

    /// List the files and sub-directories directly inside a directory
    pub async fn list_directory(
        state: &AppState,
        identity: &Identity,
        root: Option<&str>,
        path: Option<&str>,
    ) -> Result<DirectoryListing> {
        let (ns, path) = locate_dir(identity, root, path)?;
        tracing::debug!(namespace = %ns, path = %path, "listing directory");

        Ok(state.store.list_dir(&ns, &path).await?)
    }

    /// Delete a directory recursively
    pub async fn delete_directory(
        state: &AppState,
        identity: &Identity,
        root: Option<&str>,
        path: Option<&str>,
    ) -> Result<RemovedTree> {
        let (ns, path) = locate_dir(identity, root, path)?;
        let removed = state.store.delete_dir(&ns, &path).await?;

        tracing::info!(
            namespace = %ns,
            path = %path,
            directories = removed.directories,
            files = removed.files,
            "directory deleted"
        );
        Ok(removed)
    }
}

fn locate_dir(
    identity: &Identity,
    root: Option<&str>,
    path: Option<&str>,
) -> Result<(NamespaceKey, NfsPath)> {
    let location = path::resolve_dir(root, path)?;
    let ns = identity.namespace(location.root)?;
    Ok((ns, location.path))
}
