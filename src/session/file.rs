// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Web3 University

//! File-backed token store under the client data directory.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{SessionError, StoredSession, TokenStore};

/// Layout of the client data directory.
#[derive(Debug, Clone)]
pub struct SessionPaths {
    root: PathBuf,
}

impl SessionPaths {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to the persisted auth token.
    pub fn auth_token(&self) -> PathBuf {
        self.root.join("auth_token")
    }
}

/// Persists the session as JSON in `<data dir>/auth_token`.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    paths: SessionPaths,
}

impl FileTokenStore {
    pub fn new(paths: SessionPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &SessionPaths {
        &self.paths
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<StoredSession>, SessionError> {
        let path = self.paths.auth_token();
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&raw)?))
    }

    /// Atomic write via rename; the file is owner-only on unix.
    fn save(&self, session: &StoredSession) -> Result<(), SessionError> {
        let path = self.paths.auth_token();
        fs::create_dir_all(self.paths.root())?;

        let temp_path = path.with_extension("tmp");
        {
            let file = File::create(&temp_path)?;
            restrict_permissions(&file)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer(&mut writer, session)?;
            writer.flush()?;
        }

        fs::rename(&temp_path, &path)?;
        debug!(path = %path.display(), "Session token saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        let path = self.paths.auth_token();
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "Session token removed");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(file: &File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_file: &File) -> io::Result<()> {
    Ok(())
}
