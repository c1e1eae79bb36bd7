//! Content store: immutable byte blobs addressed by a random id. File records
//! point at a blob; rename and move only move the pointer.

use bytes::Bytes;
use dashmap::DashMap;
use std::fmt;
use uuid::Uuid;

use super::error::{NfsError, NfsResult};
use super::range::ByteRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlobId(Uuid);

impl BlobId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Result of a (possibly ranged) read.
#[derive(Debug, Clone)]
pub struct ContentSlice {
    pub bytes: Bytes,
    pub start: u64,
    pub end: u64,
    pub total: u64,
}

impl ContentSlice {
    /// `content-range` header value, e.g. `bytes 0-16/17`.
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, self.total)
    }
}

#[derive(Debug, Default)]
pub struct ContentStore {
    blobs: DashMap<BlobId, Bytes>,
}

impl ContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `content` under a fresh id.
    pub fn write(&self, content: Bytes) -> BlobId {
        let id = BlobId::new();
        self.blobs.insert(id, content);
        id
    }

    /// Read a blob, optionally restricted to `range`.
    pub fn read_range(&self, id: BlobId, range: Option<ByteRange>) -> NfsResult<ContentSlice> {
        let bytes = self
            .blobs
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| NfsError::MissingContent(id.to_string()))?;
        let total = bytes.len() as u64;

        let Some(range) = range else {
            return Ok(ContentSlice {
                bytes,
                start: 0,
                end: total.saturating_sub(1),
                total,
            });
        };

        let (start, end) = range.resolve(total)?;
        let bytes = if total == 0 {
            Bytes::new()
        } else {
            bytes.slice(start as usize..=end as usize)
        };
        Ok(ContentSlice {
            bytes,
            start,
            end,
            total,
        })
    }

    /// Store a second, independent copy of a blob under a new id.
    pub fn duplicate(&self, id: BlobId) -> NfsResult<BlobId> {
        let bytes = self
            .blobs
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| NfsError::MissingContent(id.to_string()))?;
        Ok(self.write(bytes))
    }

    pub fn remove(&self, id: BlobId) -> Option<Bytes> {
        self.blobs.remove(&id).map(|(_, bytes)| bytes)
    }

    pub(crate) fn len(&self) -> usize {
        self.blobs.len()
    }
}
