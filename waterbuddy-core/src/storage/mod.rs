//! Whole-document persistence.
//!
//! Each [`DocType`] is one JSON document that is always read and written in
//! full. Backends only move text around; decoding is the store's job.

mod file;
mod memory;

pub use file::FileBackend;
pub use memory::MemoryBackend;

use std::io;
use std::path::PathBuf;

/// Documents the store keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocType {
    Users,
    Logs,
    Badges,
}

impl DocType {
    /// Returns the filename for this document type.
    pub fn filename(&self) -> &'static str {
        match self {
            DocType::Users => "users.json",
            DocType::Logs => "logs.json",
            DocType::Badges => "badges.json",
        }
    }
}

/// Persistence for whole documents.
pub trait DocumentBackend {
    /// Reads a document. Returns `Ok(None)` if it has never been written.
    fn read(&self, doc_type: DocType) -> Result<Option<String>, StorageError>;

    /// Replaces a document with `contents`.
    fn write(&self, doc_type: DocType, contents: &str) -> Result<(), StorageError>;

    /// Moves an unreadable document out of the way so the next write does not
    /// destroy it.
    fn quarantine(&self, doc_type: DocType) -> Result<(), StorageError>;
}

impl<B: DocumentBackend + ?Sized> DocumentBackend for &B {
    fn read(&self, doc_type: DocType) -> Result<Option<String>, StorageError> {
        (**self).read(doc_type)
    }

    fn write(&self, doc_type: DocType, contents: &str) -> Result<(), StorageError> {
        (**self).write(doc_type, contents)
    }

    fn quarantine(&self, doc_type: DocType) -> Result<(), StorageError> {
        (**self).quarantine(doc_type)
    }
}

/// Errors that can occur during document storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error reading or writing a file.
    #[error("I/O error for {}: {}", .0.display(), .1)]
    Io(PathBuf, #[source] io::Error),

    /// A document could not be encoded.
    #[error("Failed to encode {0}: {1}")]
    Encode(&'static str, #[source] serde_json::Error),
}
