//! JSON documents in a data directory.
//!
//! ```text
//! <DATA_DIR>/
//!   users.json
//!   logs.json
//!   badges.json
//! ```

use chrono::Utc;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::{DocType, DocumentBackend, StorageError};

/// Stores each document as a file in one directory.
///
/// Writes go to a temp file that is renamed over the target, so a crash
/// mid-write leaves the previous version intact. There is no locking:
/// two processes writing the same document lose one of the updates.
#[derive(Debug, Clone)]
pub struct FileBackend {
    data_dir: PathBuf,
}

impl FileBackend {
    /// Creates a backend rooted at `data_dir`. The directory is created on
    /// first write.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Returns the full path for a document type.
    pub fn path(&self, doc_type: DocType) -> PathBuf {
        self.data_dir.join(doc_type.filename())
    }
}

impl DocumentBackend for FileBackend {
    fn read(&self, doc_type: DocType) -> Result<Option<String>, StorageError> {
        let path = self.path(doc_type);

        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(path, e)),
        }
    }

    fn write(&self, doc_type: DocType, contents: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.data_dir)
            .map_err(|e| StorageError::Io(self.data_dir.clone(), e))?;

        let path = self.path(doc_type);
        let temp_path = path.with_extension("json.tmp");

        let mut file =
            File::create(&temp_path).map_err(|e| StorageError::Io(temp_path.clone(), e))?;

        file.write_all(contents.as_bytes())
            .map_err(|e| StorageError::Io(temp_path.clone(), e))?;

        file.sync_all()
            .map_err(|e| StorageError::Io(temp_path.clone(), e))?;

        // Rename to final path (atomic on most filesystems)
        fs::rename(&temp_path, &path).map_err(|e| StorageError::Io(path, e))?;

        Ok(())
    }

    fn quarantine(&self, doc_type: DocType) -> Result<(), StorageError> {
        let path = self.path(doc_type);
        let aside = self.data_dir.join(format!(
            "{}.corrupt-{}",
            doc_type.filename(),
            Utc::now().format("%Y%m%dT%H%M%S%.f")
        ));

        match fs::rename(&path, &aside) {
            Ok(()) => {
                tracing::warn!("Moved unreadable {} to {}", path.display(), aside.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(path, e)),
        }
    }
}
