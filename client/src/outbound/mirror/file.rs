//! File-backed session mirror.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use tracing::debug;

use super::atomic_io::write_atomic;
use crate::domain::ports::{SessionMirror, SessionMirrorError};

/// File holding the mirrored record, named after the mirror key.
pub const MIRROR_FILE_NAME: &str = "user.json";

/// Session mirror stored as a single JSON file under a directory capability.
///
/// All access goes through the opened [`Dir`], so the adapter cannot touch
/// anything outside its root.
#[derive(Debug)]
pub struct FileSessionMirror {
    dir: Dir,
    root: Utf8PathBuf,
}

impl FileSessionMirror {
    /// Open (creating if needed) the mirror directory at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionMirrorError::Read`] when the directory cannot be
    /// created or opened.
    pub fn open(root: impl AsRef<Utf8Path>) -> Result<Self, SessionMirrorError> {
        let root = root.as_ref().to_path_buf();
        Dir::create_ambient_dir_all(root.as_std_path(), ambient_authority())
            .map_err(|err| SessionMirrorError::read(format!("create {root}: {err}")))?;
        let dir = Dir::open_ambient_dir(root.as_std_path(), ambient_authority())
            .map_err(|err| SessionMirrorError::read(format!("open {root}: {err}")))?;
        debug!(%root, "opened session mirror");
        Ok(Self { dir, root })
    }

    /// Directory the mirror lives in.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Full path of the mirrored record.
    #[must_use]
    pub fn record_path(&self) -> Utf8PathBuf {
        self.root.join(MIRROR_FILE_NAME)
    }
}

impl SessionMirror for FileSessionMirror {
    fn read(&self) -> Result<Option<String>, SessionMirrorError> {
        match self.dir.read_to_string(MIRROR_FILE_NAME) {
            Ok(record) => Ok(Some(record)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(SessionMirrorError::read(format!(
                "{}: {err}",
                self.record_path()
            ))),
        }
    }

    fn write(&self, record: &str) -> Result<(), SessionMirrorError> {
        write_atomic(&self.dir, Utf8Path::new(MIRROR_FILE_NAME), record)
    }

    fn clear(&self) -> Result<(), SessionMirrorError> {
        match self.dir.remove_file(MIRROR_FILE_NAME) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(SessionMirrorError::clear(format!(
                "{}: {err}",
                self.record_path()
            ))),
        }
    }
}
