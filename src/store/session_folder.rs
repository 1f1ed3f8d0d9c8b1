// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Triton-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::fs;
use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::model::PlotSession;

const SESSION_FILENAME: &str = "triton-session.json";
const VISITED_FILENAME: &str = "visited";

#[derive(Debug)]
pub enum StoreError {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "io error at {}: {source}", path.display()),
            Self::Json { path, source } => {
                write!(f, "invalid session file {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteDurability {
    /// Fast, best-effort persistence.
    ///
    /// - Writes a temp file and renames atomically into place.
    /// - Does not perform per-file fsync/sync.
    #[default]
    BestEffort,

    /// Slower, best-effort durability.
    ///
    /// Attempts to flush written file contents and rename operations to stable
    /// storage where possible. Exact guarantees are platform/filesystem-dependent.
    Durable,
}

/// One session directory on disk: the session file and the tutorial's
/// visited marker.
///
/// The visited marker is presence-based: the file existing means the tutorial
/// was completed or dismissed once on this machine. A crash between marker
/// writes at worst re-shows the intro prompt.
#[derive(Debug, Clone)]
pub struct SessionFolder {
    dir: PathBuf,
    durability: WriteDurability,
}

impl SessionFolder {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), durability: WriteDurability::default() }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn durability(&self) -> WriteDurability {
        self.durability
    }

    pub fn session_path(&self) -> PathBuf {
        self.dir.join(SESSION_FILENAME)
    }

    pub fn visited_path(&self) -> PathBuf {
        self.dir.join(VISITED_FILENAME)
    }

    /// Loads the session file, falling back to a fresh default session when the
    /// file does not exist yet. A present-but-unreadable file is an error; it
    /// must not be silently replaced.
    pub fn load_or_init_session(&self) -> Result<PlotSession, StoreError> {
        let path = self.session_path();
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(PlotSession::new());
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        serde_json::from_str(&raw).map_err(|source| StoreError::Json { path, source })
    }

    pub fn save_session(&self, session: &PlotSession) -> Result<(), StoreError> {
        let path = self.session_path();
        let json = serde_json::to_vec_pretty(session)
            .map_err(|source| StoreError::Json { path: path.clone(), source })?;
        self.write_atomic(&path, &json)
    }

    /// Whether the tutorial was ever completed or dismissed here. Read errors
    /// count as not visited so the tutorial errs on the side of showing itself.
    pub fn visited(&self) -> bool {
        self.visited_path().is_file()
    }

    pub fn set_visited(&self) -> Result<(), StoreError> {
        self.write_atomic(&self.visited_path(), b"1\n")
    }

    pub fn clear_visited(&self) -> Result<(), StoreError> {
        let path = self.visited_path();
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn write_atomic(&self, path: &Path, contents: &[u8]) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)
            .map_err(|source| StoreError::Io { path: self.dir.clone(), source })?;

        let Some(parent) = path.parent() else {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source: io::Error::other("path has no parent"),
            });
        };
        let Some(file_name) = path.file_name() else {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source: io::Error::other("path has no file name"),
            });
        };

        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let tmp_path =
            parent.join(format!(".triton.tmp.{}.{}", file_name.to_string_lossy(), nanos));

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp_path)
            .map_err(|source| StoreError::Io { path: tmp_path.clone(), source })?;

        file.write_all(contents)
            .map_err(|source| StoreError::Io { path: tmp_path.clone(), source })?;

        if self.durability == WriteDurability::Durable {
            file.sync_all()
                .map_err(|source| StoreError::Io { path: tmp_path.clone(), source })?;
        }
        drop(file);

        if let Err(source) = fs::rename(&tmp_path, path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(StoreError::Io { path: path.to_path_buf(), source });
        }

        if self.durability == WriteDurability::Durable {
            #[cfg(unix)]
            {
                let dir = fs::File::open(parent)
                    .map_err(|source| StoreError::Io { path: parent.to_path_buf(), source })?;
                dir.sync_all()
                    .map_err(|source| StoreError::Io { path: parent.to_path_buf(), source })?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{SessionFolder, StoreError, WriteDurability};
    use crate::model::{DetailLevel, PlotSession};

    #[test]
    fn missing_session_file_yields_default_session() {
        let dir = tempfile::tempdir().expect("tempdir");
        let folder = SessionFolder::new(dir.path());
        let session = folder.load_or_init_session().expect("load");
        assert_eq!(session.plots().len(), 1);
        assert!(!dir.path().join("triton-session.json").exists());
    }

    #[test]
    fn session_round_trips_through_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let folder = SessionFolder::new(dir.path());

        let mut session = PlotSession::new();
        session.set_detail_level(DetailLevel::Advanced);
        session.set_time_binning("3600");
        session.plots_mut()[0].set_x_expr("time");
        folder.save_session(&session).expect("save");

        let loaded = folder.load_or_init_session().expect("load");
        assert_eq!(loaded, session);
    }

    #[test]
    fn corrupt_session_file_is_an_error_not_a_reset() {
        let dir = tempfile::tempdir().expect("tempdir");
        let folder = SessionFolder::new(dir.path());
        std::fs::write(folder.session_path(), "{ not json").expect("write corrupt file");

        let err = folder.load_or_init_session().unwrap_err();
        assert!(matches!(err, StoreError::Json { .. }));
        // The corrupt file stays put for the user to inspect.
        assert!(folder.session_path().exists());
    }

    #[test]
    fn visited_marker_set_and_clear() {
        let dir = tempfile::tempdir().expect("tempdir");
        let folder = SessionFolder::new(dir.path());

        assert!(!folder.visited());
        folder.set_visited().expect("set visited");
        assert!(folder.visited());

        folder.clear_visited().expect("clear visited");
        assert!(!folder.visited());
        // Clearing twice is fine.
        folder.clear_visited().expect("clear visited again");
    }

    #[test]
    fn durable_writes_land_identically() {
        let dir = tempfile::tempdir().expect("tempdir");
        let folder = SessionFolder::new(dir.path()).with_durability(WriteDurability::Durable);

        folder.save_session(&PlotSession::new()).expect("save");
        folder.set_visited().expect("set visited");

        let loaded = folder.load_or_init_session().expect("load");
        assert_eq!(loaded, PlotSession::new());
        assert!(folder.visited());
    }

    #[test]
    fn no_temp_files_left_behind() {
        let dir = tempfile::tempdir().expect("tempdir");
        let folder = SessionFolder::new(dir.path());
        folder.save_session(&PlotSession::new()).expect("save");

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .expect("read dir")
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().starts_with(".triton.tmp."))
            .collect();
        assert!(leftovers.is_empty());
    }
}
