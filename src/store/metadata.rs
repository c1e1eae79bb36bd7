//! Metadata store: file records of one namespace keyed by path.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use super::content::BlobId;
use super::error::{NfsError, NfsResult};
use super::path::NfsPath;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub name: String,
    pub size: u64,
    pub content_type: String,
    pub metadata: String,
    pub created_on: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    pub(crate) blob: BlobId,
}

/// Changes accepted by modify-metadata. At least one field is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileUpdate {
    pub name: Option<String>,
    pub metadata: Option<String>,
}

impl FileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.metadata.is_none()
    }
}

#[derive(Debug, Default)]
pub struct MetadataStore {
    files: BTreeMap<NfsPath, FileRecord>,
}

impl MetadataStore {
    pub fn contains(&self, path: &NfsPath) -> bool {
        self.files.contains_key(path)
    }

    pub fn get(&self, path: &NfsPath) -> NfsResult<&FileRecord> {
        self.files
            .get(path)
            .ok_or_else(|| NfsError::FileNotFound(path.to_string()))
    }

    pub fn create(&mut self, path: NfsPath, record: FileRecord) -> NfsResult<()> {
        if self.files.contains_key(&path) {
            return Err(NfsError::FileAlreadyExists(path.to_string()));
        }
        self.files.insert(path, record);
        Ok(())
    }

    pub fn remove(&mut self, path: &NfsPath) -> NfsResult<FileRecord> {
        self.files
            .remove(path)
            .ok_or_else(|| NfsError::FileNotFound(path.to_string()))
    }

    /// Apply `update` to the record at `path`. A changed name moves the
    /// record to `renamed_to`, which the caller has checked is free.
    pub fn update(
        &mut self,
        path: &NfsPath,
        update: FileUpdate,
        renamed_to: Option<NfsPath>,
        now: DateTime<Utc>,
    ) -> NfsResult<FileRecord> {
        let mut record = self.remove(path)?;
        if let Some(metadata) = update.metadata {
            record.metadata = metadata;
        }
        if let Some(name) = update.name {
            record.name = name;
        }
        record.last_modified = now;

        let key = renamed_to.unwrap_or_else(|| path.clone());
        self.files.insert(key, record.clone());
        Ok(record)
    }

    /// Records directly inside `dir`, ordered by path.
    pub fn children<'a>(
        &'a self,
        dir: &'a NfsPath,
    ) -> impl Iterator<Item = (&'a NfsPath, &'a FileRecord)> + 'a {
        self.files.iter().filter(move |(path, _)| path.is_child_of(dir))
    }

    /// Remove every record below `dir`, returning them.
    pub fn remove_under(&mut self, dir: &NfsPath) -> Vec<FileRecord> {
        let doomed: Vec<NfsPath> = self
            .files
            .keys()
            .filter(|path| path.is_descendant_of(dir))
            .cloned()
            .collect();
        doomed
            .iter()
            .filter_map(|path| self.files.remove(path))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::content::ContentStore;
    use bytes::Bytes;

    fn record(name: &str, blobs: &ContentStore) -> FileRecord {
        let now = Utc::now();
        FileRecord {
            name: name.to_string(),
            size: 4,
            content_type: "text/plain".to_string(),
            metadata: String::new(),
            created_on: now,
            last_modified: now,
            blob: blobs.write(Bytes::from_static(b"data")),
        }
    }

    fn path(p: &str) -> NfsPath {
        NfsPath::parse(p).unwrap()
    }

    #[test]
    fn test_create_rejects_duplicates() {
        let blobs = ContentStore::new();
        let mut store = MetadataStore::default();
        store.create(path("d/a.txt"), record("a.txt", &blobs)).unwrap();

        let err = store
            .create(path("d/a.txt"), record("a.txt", &blobs))
            .unwrap_err();
        assert_eq!(err, NfsError::FileAlreadyExists("d/a.txt".to_string()));
    }

    #[test]
    fn test_get_and_remove() {
        let blobs = ContentStore::new();
        let mut store = MetadataStore::default();
        store.create(path("a.txt"), record("a.txt", &blobs)).unwrap();

        assert_eq!(store.get(&path("a.txt")).unwrap().name, "a.txt");
        store.remove(&path("a.txt")).unwrap();
        assert!(matches!(
            store.get(&path("a.txt")),
            Err(NfsError::FileNotFound(_))
        ));
        assert!(store.remove(&path("a.txt")).is_err());
    }

    #[test]
    fn test_update_metadata_and_rename() {
        let blobs = ContentStore::new();
        let mut store = MetadataStore::default();
        let original = record("a.txt", &blobs);
        store.create(path("d/a.txt"), original.clone()).unwrap();

        let later = original.last_modified + chrono::Duration::seconds(5);
        let updated = store
            .update(
                &path("d/a.txt"),
                FileUpdate {
                    name: Some("b.txt".to_string()),
                    metadata: Some("info".to_string()),
                },
                Some(path("d/b.txt")),
                later,
            )
            .unwrap();

        assert_eq!(updated.name, "b.txt");
        assert_eq!(updated.metadata, "info");
        assert_eq!(updated.created_on, original.created_on);
        assert_eq!(updated.last_modified, later);
        assert!(!store.contains(&path("d/a.txt")));
        assert_eq!(store.get(&path("d/b.txt")).unwrap(), &updated);
    }

    #[test]
    fn test_children_and_remove_under() {
        let blobs = ContentStore::new();
        let mut store = MetadataStore::default();
        store.create(path("d/a.txt"), record("a.txt", &blobs)).unwrap();
        store.create(path("d/sub/b.txt"), record("b.txt", &blobs)).unwrap();
        store.create(path("other/c.txt"), record("c.txt", &blobs)).unwrap();

        let dir = path("d");
        let names: Vec<_> = store.children(&dir).map(|(_, r)| r.name.clone()).collect();
        assert_eq!(names, vec!["a.txt"]);

        let removed = store.remove_under(&dir);
        assert_eq!(removed.len(), 2);
        assert!(!store.contains(&path("d/a.txt")));
        assert!(store.contains(&path("other/c.txt")));
    }
}
