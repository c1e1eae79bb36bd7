//! Directory index of one namespace. The root directory always exists.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use super::error::{NfsError, NfsResult};
use super::path::NfsPath;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryRecord {
    pub name: String,
    pub metadata: String,
    pub created_on: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

impl DirectoryRecord {
    fn new(name: &str, metadata: String, now: DateTime<Utc>) -> Self {
        Self {
            name: name.to_string(),
            metadata,
            created_on: now,
            last_modified: now,
        }
    }
}

#[derive(Debug)]
pub struct DirectoryIndex {
    dirs: BTreeMap<NfsPath, DirectoryRecord>,
}

impl Default for DirectoryIndex {
    fn default() -> Self {
        let mut dirs = BTreeMap::new();
        dirs.insert(
            NfsPath::root(),
            DirectoryRecord::new("", String::new(), Utc::now()),
        );
        Self { dirs }
    }
}

impl DirectoryIndex {
    pub fn exists(&self, dir: &NfsPath) -> bool {
        self.dirs.contains_key(dir)
    }

    pub fn get(&self, dir: &NfsPath) -> NfsResult<&DirectoryRecord> {
        self.dirs
            .get(dir)
            .ok_or_else(|| NfsError::DirectoryNotFound(dir.to_string()))
    }

    /// Fail unless `dir` exists.
    pub fn require(&self, dir: &NfsPath) -> NfsResult<()> {
        self.get(dir).map(|_| ())
    }

    /// Register `dir`. The parent must exist and the caller has checked no
    /// file occupies the path.
    pub fn create(
        &mut self,
        dir: NfsPath,
        metadata: String,
        now: DateTime<Utc>,
    ) -> NfsResult<DirectoryRecord> {
        if self.dirs.contains_key(&dir) {
            return Err(NfsError::DirectoryAlreadyExists(dir.to_string()));
        }
        self.require(&dir.parent())?;

        let record = DirectoryRecord::new(dir.file_name(), metadata, now);
        self.dirs.insert(dir, record.clone());
        Ok(record)
    }

    /// Subdirectories directly inside `dir`, ordered by path.
    pub fn children<'a>(
        &'a self,
        dir: &'a NfsPath,
    ) -> impl Iterator<Item = (&'a NfsPath, &'a DirectoryRecord)> + 'a {
        self.dirs.iter().filter(move |(path, _)| path.is_child_of(dir))
    }

    /// Remove `dir` and every directory below it. The root cannot be removed.
    pub fn remove_tree(&mut self, dir: &NfsPath) -> NfsResult<usize> {
        if dir.is_root() {
            return Err(NfsError::InvalidPath {
                path: "/".to_string(),
                reason: "the root directory cannot be deleted".to_string(),
            });
        }
        self.require(dir)?;

        let before = self.dirs.len();
        self.dirs
            .retain(|path, _| path != dir && !path.is_descendant_of(dir));
        Ok(before - self.dirs.len())
    }

    /// Bump the modification time of `dir` after its contents changed.
    pub fn touch(&mut self, dir: &NfsPath, now: DateTime<Utc>) {
        if let Some(record) = self.dirs.get_mut(dir) {
            record.last_modified = now;
        }
    }
}
