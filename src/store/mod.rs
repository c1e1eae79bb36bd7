//! In-memory virtual file store.
//!
//! Every namespace (the `app` area of one application, or the shared `drive`)
//! holds a metadata store and a directory index behind its own lock. File
//! bytes live in a content store shared by all namespaces; a record and its
//! blob are added and removed inside the same critical section, so readers
//! never see one without the other.

pub mod content;
pub mod directory;
pub mod error;
pub mod metadata;
pub mod path;
pub mod range;

use bytes::Bytes;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

pub use content::{ContentSlice, ContentStore};
pub use directory::{DirectoryIndex, DirectoryRecord};
pub use error::{NfsError, NfsResult};
pub use metadata::{FileRecord, FileUpdate, MetadataStore};
pub use path::{CanonicalLocation, NamespaceKey, NfsPath, RootPath};
pub use range::ByteRange;

/// What to do with the source of a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferAction {
    #[default]
    Move,
    Copy,
}

impl TransferAction {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "MOVE" => Some(TransferAction::Move),
            "COPY" => Some(TransferAction::Copy),
            _ => None,
        }
    }
}

/// Input of a file creation.
#[derive(Debug, Clone)]
pub struct NewFile {
    pub content: Bytes,
    pub content_type: String,
    pub metadata: String,
}

/// Record and bytes returned by a read.
#[derive(Debug, Clone)]
pub struct FileContent {
    pub record: FileRecord,
    pub slice: ContentSlice,
}

#[derive(Debug, Clone)]
pub struct DirectoryListing {
    pub path: NfsPath,
    pub info: DirectoryRecord,
    pub files: Vec<FileRecord>,
    pub sub_directories: Vec<DirectoryRecord>,
}

/// Counts of what a recursive directory delete removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemovedTree {
    pub directories: usize,
    pub files: usize,
}

#[derive(Debug, Default)]
pub struct Namespace {
    files: MetadataStore,
    dirs: DirectoryIndex,
}

impl Namespace {
    fn ensure_free_for_file(&self, path: &NfsPath) -> NfsResult<()> {
        if self.files.contains(path) || self.dirs.exists(path) {
            return Err(NfsError::FileAlreadyExists(path.to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct NfsStore {
    namespaces: DashMap<NamespaceKey, Arc<RwLock<Namespace>>>,
    content: ContentStore,
}

impl NfsStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn namespace(&self, key: &NamespaceKey) -> Arc<RwLock<Namespace>> {
        Arc::clone(self.namespaces.entry(key.clone()).or_default().value())
    }

    pub fn namespace_count(&self) -> usize {
        self.namespaces.len()
    }

    pub fn blob_count(&self) -> usize {
        self.content.len()
    }

    pub async fn create_file(
        &self,
        ns: &NamespaceKey,
        path: &NfsPath,
        file: NewFile,
    ) -> NfsResult<FileRecord> {
        let lock = self.namespace(ns);
        let mut space = lock.write().await;

        let parent = path.parent();
        space.dirs.require(&parent)?;
        space.ensure_free_for_file(path)?;

        let now = Utc::now();
        let record = FileRecord {
            name: path.file_name().to_string(),
            size: file.content.len() as u64,
            content_type: file.content_type,
            metadata: file.metadata,
            created_on: now,
            last_modified: now,
            blob: self.content.write(file.content),
        };
        if let Err(err) = space.files.create(path.clone(), record.clone()) {
            self.content.remove(record.blob);
            return Err(err);
        }
        space.dirs.touch(&parent, now);
        Ok(record)
    }

    pub async fn file_info(&self, ns: &NamespaceKey, path: &NfsPath) -> NfsResult<FileRecord> {
        let lock = self.namespace(ns);
        let space = lock.read().await;
        space.files.get(path).cloned()
    }

    pub async fn read_file(
        &self,
        ns: &NamespaceKey,
        path: &NfsPath,
        range: Option<ByteRange>,
    ) -> NfsResult<FileContent> {
        let lock = self.namespace(ns);
        let space = lock.read().await;
        let record = space.files.get(path)?.clone();
        let slice = self.content.read_range(record.blob, range)?;
        Ok(FileContent { record, slice })
    }

    pub async fn delete_file(&self, ns: &NamespaceKey, path: &NfsPath) -> NfsResult<FileRecord> {
        let lock = self.namespace(ns);
        let mut space = lock.write().await;
        let record = space.files.remove(path)?;
        self.content.remove(record.blob);
        space.dirs.touch(&path.parent(), Utc::now());
        Ok(record)
    }

    /// Change name and/or metadata. A rename is a single index update: the
    /// old path disappears as the new one appears.
    pub async fn update_file(
        &self,
        ns: &NamespaceKey,
        path: &NfsPath,
        update: FileUpdate,
    ) -> NfsResult<FileRecord> {
        let lock = self.namespace(ns);
        let mut space = lock.write().await;

        let current = space.files.get(path)?;
        let renamed_to = match &update.name {
            Some(name) if *name != current.name => {
                let target = path.with_file_name(name)?;
                space.ensure_free_for_file(&target)?;
                Some(target)
            }
            _ => None,
        };
        space.files.update(path, update, renamed_to, Utc::now())
    }

    /// Move or copy the file at `src_path` into the directory `dest_dir`,
    /// keeping its name.
    pub async fn transfer(
        &self,
        src: &NamespaceKey,
        src_path: &NfsPath,
        dst: &NamespaceKey,
        dest_dir: &NfsPath,
        action: TransferAction,
    ) -> NfsResult<FileRecord> {
        if src == dst {
            let lock = self.namespace(src);
            let mut space = lock.write().await;
            let (record, dest) = prepare_transfer(&space, src_path, &space, dest_dir)?;
            return self.complete_transfer(&mut space, None, src_path, record, dest, action);
        }

        let (src_lock, dst_lock) = (self.namespace(src), self.namespace(dst));
        // Lock in key order so opposite transfers cannot deadlock.
        let (mut src_space, mut dst_space) = if src < dst {
            let s = src_lock.write().await;
            let d = dst_lock.write().await;
            (s, d)
        } else {
            let d = dst_lock.write().await;
            let s = src_lock.write().await;
            (s, d)
        };
        let (record, dest) = prepare_transfer(&src_space, src_path, &dst_space, dest_dir)?;
        self.complete_transfer(
            &mut dst_space,
            Some(&mut *src_space),
            src_path,
            record,
            dest,
            action,
        )
    }

    /// Apply a validated transfer. `source` is `None` when source and
    /// destination share the namespace `target`.
    fn complete_transfer(
        &self,
        target: &mut Namespace,
        source: Option<&mut Namespace>,
        src_path: &NfsPath,
        record: FileRecord,
        dest: NfsPath,
        action: TransferAction,
    ) -> NfsResult<FileRecord> {
        let now = Utc::now();
        let placed = match action {
            TransferAction::Move => FileRecord {
                last_modified: now,
                ..record
            },
            TransferAction::Copy => FileRecord {
                blob: self.content.duplicate(record.blob)?,
                created_on: now,
                last_modified: now,
                ..record
            },
        };

        if action == TransferAction::Move {
            let source = match source {
                Some(source) => source,
                None => &mut *target,
            };
            source.files.remove(src_path)?;
            source.dirs.touch(&src_path.parent(), now);
        }

        target.files.create(dest.clone(), placed.clone())?;
        target.dirs.touch(&dest.parent(), now);
        Ok(placed)
    }

    pub async fn create_dir(
        &self,
        ns: &NamespaceKey,
        path: &NfsPath,
        metadata: String,
    ) -> NfsResult<DirectoryRecord> {
        let lock = self.namespace(ns);
        let mut space = lock.write().await;
        if space.files.contains(path) || path.is_root() {
            return Err(NfsError::DirectoryAlreadyExists(path.to_string()));
        }
        let now = Utc::now();
        let record = space.dirs.create(path.clone(), metadata, now)?;
        space.dirs.touch(&path.parent(), now);
        Ok(record)
    }

    pub async fn list_dir(&self, ns: &NamespaceKey, path: &NfsPath) -> NfsResult<DirectoryListing> {
        let lock = self.namespace(ns);
        let space = lock.read().await;
        let info = space.dirs.get(path)?.clone();
        let files = space.files.children(path).map(|(_, r)| r.clone()).collect();
        let sub_directories = space.dirs.children(path).map(|(_, r)| r.clone()).collect();
        Ok(DirectoryListing {
            path: path.clone(),
            info,
            files,
            sub_directories,
        })
    }

    /// Delete a directory with everything below it.
    pub async fn delete_dir(&self, ns: &NamespaceKey, path: &NfsPath) -> NfsResult<RemovedTree> {
        let lock = self.namespace(ns);
        let mut space = lock.write().await;
        let directories = space.dirs.remove_tree(path)?;
        let removed = space.files.remove_under(path);
        for record in &removed {
            self.content.remove(record.blob);
        }
        space.dirs.touch(&path.parent(), Utc::now());
        Ok(RemovedTree {
            directories,
            files: removed.len(),
        })
    }
}

fn prepare_transfer(
    source: &Namespace,
    src_path: &NfsPath,
    target: &Namespace,
    dest_dir: &NfsPath,
) -> NfsResult<(FileRecord, NfsPath)> {
    let record = source.files.get(src_path)?.clone();
    target.dirs.require(dest_dir)?;
    let dest = dest_dir.join(&record.name);
    target.ensure_free_for_file(&dest)?;
    Ok((record, dest))
}
