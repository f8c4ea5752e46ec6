//! On-disk cache artifact.
//!
//! Writes go to `<path>.tmp` first and are renamed into place, so readers in
//! other processes see either the old artifact or the complete new one.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use frankenstyle_core::constants::REFERENCE_PLUGIN_TYPE;
use frankenstyle_core::errors::{CacheError, CacheResult};
use tracing::debug;

use super::hash::{hash_bytes, render};
use crate::runtime::HostRuntime;
use crate::snapshot::CacheSnapshot;

/// Why a loaded snapshot cannot be used.
#[derive(Debug, Clone, PartialEq)]
pub enum StaleReason {
    /// The site was upgraded since the artifact was written.
    VersionChanged {
        cached: Option<f64>,
        current: Option<f64>,
    },
    /// The site tree moved: the reference plugin type root no longer matches.
    DirrootMoved,
}

/// Staleness check for a loaded snapshot.
pub fn staleness(snapshot: &CacheSnapshot, current_version: Option<f64>, dirroot: &Path) -> Option<StaleReason> {
    if snapshot.version != current_version {
        return Some(StaleReason::VersionChanged {
            cached: snapshot.version,
            current: current_version,
        });
    }
    let expected = dirroot.join(REFERENCE_PLUGIN_TYPE);
    if snapshot.plugintype_root(REFERENCE_PLUGIN_TYPE) != Some(expected.as_path()) {
        return Some(StaleReason::DirrootMoved);
    }
    None
}

pub fn is_stale(snapshot: &CacheSnapshot, current_version: Option<f64>, dirroot: &Path) -> bool {
    staleness(snapshot, current_version, dirroot).is_some()
}

/// A cache artifact at a fixed path.
#[derive(Debug, Clone)]
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }

    /// Load the artifact, `None` when missing or unreadable.
    pub fn load(&self) -> Option<CacheSnapshot> {
        match self.try_load() {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                debug!(error = %e, "component cache artifact not usable");
                None
            }
        }
    }

    /// Load the artifact, reporting why it could not be used.
    pub fn try_load(&self) -> CacheResult<CacheSnapshot> {
        let bytes = fs::read(&self.path).map_err(|e| CacheError::io(&self.path, e))?;
        serde_json::from_slice(&bytes).map_err(|e| CacheError::Corrupt {
            path: self.path.display().to_string(),
            details: e.to_string(),
        })
    }

    /// Digest of the artifact bytes currently on disk.
    pub fn file_hash(&self) -> Option<String> {
        fs::read(&self.path).ok().map(|bytes| hash_bytes(&bytes))
    }

    /// Render and persist `snapshot`.
    pub fn save(&self, snapshot: &CacheSnapshot, runtime: &dyn HostRuntime) -> CacheResult<()> {
        let bytes = render(snapshot)?;
        self.save_bytes(&bytes, runtime)
    }

    /// Persist pre-rendered artifact bytes.
    ///
    /// A leftover `<path>.tmp` is removed and the write retried once. If the
    /// temp file reappears in between, another writer is producing the same
    /// bytes and this call does nothing.
    pub fn save_bytes(&self, bytes: &[u8], runtime: &dyn HostRuntime) -> CacheResult<()> {
        let temp_path = self.temp_path();
        let file = match create_temp(&temp_path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!(path = %temp_path.display(), "removing leftover component cache temp file");
                remove_if_present(&temp_path).map_err(|e| CacheError::io(&temp_path, e))?;
                match create_temp(&temp_path) {
                    Ok(file) => file,
                    Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                        debug!(path = %temp_path.display(), "another writer is regenerating the component cache");
                        return Ok(());
                    }
                    Err(e) => return Err(CacheError::io(&temp_path, e)),
                }
            }
            Err(e) => return Err(CacheError::io(&temp_path, e)),
        };

        let written = write_and_sync(file, bytes).and_then(|()| fs::rename(&temp_path, &self.path));
        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(CacheError::io(&self.path, e));
        }

        runtime.invalidate_compiled_cache(&self.path);
        debug!(path = %self.path.display(), bytes = bytes.len(), "component cache written");
        Ok(())
    }

    /// Delete the artifact. Missing is fine.
    pub fn remove(&self) -> CacheResult<()> {
        remove_if_present(&self.path).map_err(|e| CacheError::io(&self.path, e))
    }

    /// Whether this process can create files in the artifact's directory.
    /// Checked by creating and dropping a scratch file there.
    pub fn is_writable_location(&self) -> bool {
        let Some(dir) = self.path.parent() else {
            return false;
        };
        let dir = if dir.as_os_str().is_empty() { Path::new(".") } else { dir };
        dir.is_dir() && tempfile::NamedTempFile::new_in(dir).is_ok()
    }
}

fn create_temp(path: &Path) -> std::io::Result<fs::File> {
    OpenOptions::new().write(true).create_new(true).open(path)
}

fn remove_if_present(path: &Path) -> std::io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

fn write_and_sync(mut file: fs::File, bytes: &[u8]) -> std::io::Result<()> {
    file.write_all(bytes)?;
    file.sync_all()
}
