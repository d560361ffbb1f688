use std::collections::HashMap;
use std::sync::RwLock;

use super::{DocType, DocumentBackend, StorageError};

/// Keeps documents in memory. Nothing survives the process.
///
/// Thread-safe via internal RwLock.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    docs: RwLock<HashMap<DocType, String>>,
    quarantined: RwLock<Vec<(DocType, String)>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents moved aside by [`DocumentBackend::quarantine`].
    pub fn quarantined_count(&self) -> usize {
        self.quarantined
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

impl DocumentBackend for MemoryBackend {
    fn read(&self, doc_type: DocType) -> Result<Option<String>, StorageError> {
        let docs = self.docs.read().unwrap_or_else(|e| e.into_inner());
        Ok(docs.get(&doc_type).cloned())
    }

    fn write(&self, doc_type: DocType, contents: &str) -> Result<(), StorageError> {
        let mut docs = self.docs.write().unwrap_or_else(|e| e.into_inner());
        docs.insert(doc_type, contents.to_string());
        Ok(())
    }

    fn quarantine(&self, doc_type: DocType) -> Result<(), StorageError> {
        let removed = self
            .docs
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&doc_type);
        if let Some(contents) = removed {
            self.quarantined
                .write()
                .unwrap_or_else(|e| e.into_inner())
                .push((doc_type, contents));
        }
        Ok(())
    }
}
