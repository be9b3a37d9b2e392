#![forbid(unsafe_code)]

//! Persisted sign-in session.
//!
//! The root page consults a [`SessionStorage`] during normalization to decide
//! between the auth page and the app tree. The auth page saves the token
//! after a successful sign-in; sign-out clears it.
//!
//! # Backends
//!
//! - [`MemorySession`]: in-memory (testing, ephemeral hosts)
//! - `FileSession`: JSON file (requires `file-session`)
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | `SessionError::Io` | File I/O failure | `save`/`clear` return the error |
//! | `SessionError::Serialization` | JSON encode failure | `save` returns the error |
//! | Corrupt or unreadable file | Partial write, manual edit | `read` returns `None` (signed out), logged |

use std::cell::RefCell;
use std::fmt;

/// Errors from session storage.
#[derive(Debug)]
pub enum SessionError {
    /// I/O error during file operations.
    Io(std::io::Error),
    /// Serialization error.
    Serialization(String),
    /// The token is not acceptable (empty or whitespace).
    InvalidToken,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Io(e) => write!(f, "I/O error: {e}"),
            SessionError::Serialization(msg) => write!(f, "serialization error: {msg}"),
            SessionError::InvalidToken => write!(f, "invalid session token"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Io(e) => Some(e),
            SessionError::Serialization(_) | SessionError::InvalidToken => None,
        }
    }
}

impl From<std::io::Error> for SessionError {
    fn from(e: std::io::Error) -> Self {
        SessionError::Io(e)
    }
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Storage for the sign-in token.
pub trait SessionStorage {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// The stored token, or `None` when signed out.
    fn read(&self) -> Option<String>;

    /// Store `token`, replacing any previous one.
    fn save(&self, token: &str) -> SessionResult<()>;

    /// Forget the stored token.
    fn clear(&self) -> SessionResult<()>;

    /// Whether a token is stored.
    fn is_signed_in(&self) -> bool {
        self.read().is_some()
    }
}

fn validate(token: &str) -> SessionResult<()> {
    if token.trim().is_empty() {
        Err(SessionError::InvalidToken)
    } else {
        Ok(())
    }
}

/// In-memory session storage.
#[derive(Default)]
pub struct MemorySession {
    token: RefCell<Option<String>>,
}

impl MemorySession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start signed in with `token`.
    #[must_use]
    pub fn signed_in(token: impl Into<String>) -> Self {
        Self {
            token: RefCell::new(Some(token.into())),
        }
    }
}

impl SessionStorage for MemorySession {
    fn name(&self) -> &str {
        "MemorySession"
    }

    fn read(&self) -> Option<String> {
        self.token.borrow().clone()
    }

    fn save(&self, token: &str) -> SessionResult<()> {
        validate(token)?;
        *self.token.borrow_mut() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> SessionResult<()> {
        self.token.borrow_mut().take();
        Ok(())
    }
}

impl fmt::Debug for MemorySession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySession")
            .field("signed_in", &self.token.borrow().is_some())
            .finish()
    }
}

#[cfg(feature = "file-session")]
mod file_session {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::fs::{self, File};
    use std::io::{BufWriter, Write};
    use std::path::{Path, PathBuf};

    #[derive(Serialize, Deserialize)]
    struct SessionFile {
        format_version: u32,
        token: String,
    }

    impl SessionFile {
        const FORMAT_VERSION: u32 = 1;
    }

    /// File-backed session storage.
    ///
    /// ```json
    /// { "format_version": 1, "token": "..." }
    /// ```
    ///
    /// Writes go to `{path}.tmp` and are renamed into place.
    pub struct FileSession {
        path: PathBuf,
    }

    impl FileSession {
        /// Create a session file at `path`. The file is created on first save.
        #[must_use]
        pub fn new(path: impl AsRef<Path>) -> Self {
            Self {
                path: path.as_ref().to_path_buf(),
            }
        }

        #[must_use]
        pub fn path(&self) -> &Path {
            &self.path
        }

        fn temp_path(&self) -> PathBuf {
            let mut tmp = self.path.clone();
            tmp.set_extension("json.tmp");
            tmp
        }
    }

    impl SessionStorage for FileSession {
        fn name(&self) -> &str {
            "FileSession"
        }

        fn read(&self) -> Option<String> {
            let raw = match fs::read(&self.path) {
                Ok(raw) => raw,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), error = %e, "failed to read session file");
                    return None;
                }
            };
            match serde_json::from_slice::<SessionFile>(&raw) {
                Ok(file) if file.format_version == SessionFile::FORMAT_VERSION => {
                    Some(file.token).filter(|t| !t.trim().is_empty())
                }
                Ok(file) => {
                    tracing::warn!(
                        version = file.format_version,
                        expected = SessionFile::FORMAT_VERSION,
                        "session file version mismatch, treating as signed out"
                    );
                    None
                }
                Err(e) => {
                    tracing::warn!(error = %e, "corrupt session file, treating as signed out");
                    None
                }
            }
        }

        fn save(&self, token: &str) -> SessionResult<()> {
            validate(token)?;
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = SessionFile {
                format_version: SessionFile::FORMAT_VERSION,
                token: token.to_string(),
            };
            let tmp = self.temp_path();
            {
                let mut writer = BufWriter::new(File::create(&tmp)?);
                serde_json::to_writer(&mut writer, &file)
                    .map_err(|e| SessionError::Serialization(e.to_string()))?;
                writer.flush()?;
                writer.get_ref().sync_all()?;
            }
            fs::rename(&tmp, &self.path)?;
            tracing::debug!(path = %self.path.display(), "session saved");
            Ok(())
        }

        fn clear(&self) -> SessionResult<()> {
            match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            }
        }
    }

    impl fmt::Debug for FileSession {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("FileSession")
                .field("path", &self.path)
                .finish()
        }
    }
}

#[cfg(feature = "file-session")]
pub use file_session::FileSession;


#[cfg(all(test, feature = "file-session"))]
mod file_tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_session_round_trip() {
        let dir = TempDir::new().unwrap();
        let session = FileSession::new(dir.path().join("nested").join("session.json"));

        assert_eq!(session.read(), None);
        session.save("tok").unwrap();
        assert_eq!(session.read().as_deref(), Some("tok"));

        let reopened = FileSession::new(session.path());
        assert_eq!(reopened.read().as_deref(), Some("tok"));

        session.clear().unwrap();
        assert_eq!(reopened.read(), None);
        session.clear().unwrap();
    }

    #[test]
    fn corrupt_file_reads_as_signed_out() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"{not json").unwrap();

        assert_eq!(FileSession::new(&path).read(), None);
    }

    #[test]
    fn version_mismatch_reads_as_signed_out() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, br#"{"format_version":9,"token":"x"}"#).unwrap();

        assert_eq!(FileSession::new(&path).read(), None);
    }
}
