//! The signed-in session, kept in `session.json` next to the data files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use waterbuddy_core::Session;

#[derive(Debug)]
pub enum SessionError {
    IoError(PathBuf, io::Error),
    EncodeError(serde_json::Error),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::IoError(path, e) => {
                write!(f, "Session file error for {}: {}", path.display(), e)
            }
            SessionError::EncodeError(e) => write!(f, "Failed to encode session: {}", e),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::IoError(_, e) => Some(e),
            SessionError::EncodeError(e) => Some(e),
        }
    }
}

pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join("session.json"),
        }
    }

    /// Returns the current session, if any. An unreadable session file
    /// counts as signed out.
    pub fn load(&self) -> Result<Option<Session>, SessionError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SessionError::IoError(self.path.clone(), e)),
        };

        match serde_json::from_str(&contents) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                tracing::warn!("Ignoring unreadable session file: {}", e);
                Ok(None)
            }
        }
    }

    pub fn save(&self, session: &Session) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| SessionError::IoError(parent.to_path_buf(), e))?;
        }

        let json = serde_json::to_string_pretty(session).map_err(SessionError::EncodeError)?;
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, json).map_err(|e| SessionError::IoError(temp_path.clone(), e))?;
        fs::rename(&temp_path, &self.path)
            .map_err(|e| SessionError::IoError(self.path.clone(), e))?;

        Ok(())
    }

    /// Removes the session. Returns false if there was none.
    pub fn clear(&self) -> Result<bool, SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(SessionError::IoError(self.path.clone(), e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    #[test]
    fn test_save_load_clear() {
        let temp_dir = TempDir::new().unwrap();
        let file = SessionFile::new(&temp_dir.path().join("nested"));

        assert!(file.load().unwrap().is_none());

        let session = Session::new("ana@example.com", Utc::now());
        file.save(&session).unwrap();
        assert_eq!(file.load().unwrap(), Some(session));

        assert!(file.clear().unwrap());
        assert!(!file.clear().unwrap());
        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_session_is_signed_out() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("session.json"), "nope").unwrap();

        let file = SessionFile::new(temp_dir.path());
        assert!(file.load().unwrap().is_none());
    }
}
