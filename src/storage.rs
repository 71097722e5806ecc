//! Storage backends for resized images.
//!
//! The resizer never touches the filesystem directly: it asks a [`Storage`]
//! whether a rendition exists, saves new renditions into it, and turns stored
//! names into URLs. Names are `/`-separated and relative to the storage root,
//! e.g. `photos/resized/500x250/beach.jpg`.
//!
//! [`FileSystemStorage`] is the stock implementation: a directory on disk
//! served under a base URL.

use crate::imaging::ImageRead;
use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("No such file in storage: {0}")]
    NotFound(String),
    #[error("Refusing to access a name outside the storage root: {0}")]
    SuspiciousName(String),
}

/// Narrow capability interface the resizer depends on.
pub trait Storage: Send + Sync {
    fn exists(&self, name: &str) -> bool;

    /// Write `content` under `name` and return the name it was stored as.
    fn save(&self, name: &str, content: &[u8]) -> Result<String, StorageError>;

    /// Public URL for a stored name.
    fn url(&self, name: &str) -> String;

    fn open(&self, name: &str) -> Result<Vec<u8>, StorageError>;

    /// Stream a stored file. Header reads stop early instead of loading
    /// the whole file; the default buffers [`open`](Self::open).
    fn reader(&self, name: &str) -> Result<Box<dyn ImageRead>, StorageError> {
        Ok(Box::new(Cursor::new(self.open(name)?)))
    }

    fn modified_time(&self, name: &str) -> Result<SystemTime, StorageError>;

    fn delete(&self, name: &str) -> Result<(), StorageError>;

    /// Human-readable identity, used to key concurrent writes and in logs.
    fn identity(&self) -> String;
}

/// A directory on local disk, exposed under `base_url`.
#[derive(Debug, Clone)]
pub struct FileSystemStorage {
    location: PathBuf,
    base_url: String,
}

impl FileSystemStorage {
    pub fn new(location: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            base_url: base_url.into(),
        }
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve a storage name to a path under the root.
    ///
    /// Absolute names and `..` components are rejected.
    pub fn path(&self, name: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(name);
        let clean = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if name.is_empty() || !clean {
            return Err(StorageError::SuspiciousName(name.to_string()));
        }
        Ok(self.location.join(relative))
    }

    /// Turn an on-disk path under the root back into a storage name.
    pub fn name_for(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.location).ok()?;
        let parts: Vec<&str> = relative
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<_>>()?;
        Some(parts.join("/"))
    }

    fn not_found(name: &str, err: std::io::Error) -> StorageError {
        if err.kind() == std::io::ErrorKind::NotFound {
            StorageError::NotFound(name.to_string())
        } else {
            StorageError::Io(err)
        }
    }
}

impl Storage for FileSystemStorage {
    fn exists(&self, name: &str) -> bool {
        self.path(name).is_ok_and(|p| p.is_file())
    }

    /// Existing files are overwritten in full; concurrent writers of the same
    /// name leave the last complete write behind.
    fn save(&self, name: &str, content: &[u8]) -> Result<String, StorageError> {
        let path = self.path(name)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content)?;
        Ok(name.to_string())
    }

    fn url(&self, name: &str) -> String {
        let encoded: Vec<String> = name
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        let base = self.base_url.trim_end_matches('/');
        format!("{}/{}", base, encoded.join("/"))
    }

    fn open(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.path(name)?;
        std::fs::read(&path).map_err(|e| Self::not_found(name, e))
    }

    fn reader(&self, name: &str) -> Result<Box<dyn ImageRead>, StorageError> {
        let path = self.path(name)?;
        let file = File::open(&path).map_err(|e| Self::not_found(name, e))?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn modified_time(&self, name: &str) -> Result<SystemTime, StorageError> {
        let path = self.path(name)?;
        std::fs::metadata(&path)
            .and_then(|m| m.modified())
            .map_err(|e| Self::not_found(name, e))
    }

    fn delete(&self, name: &str) -> Result<(), StorageError> {
        let path = self.path(name)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            // Deleting something already gone is not an error
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn identity(&self) -> String {
        self.location.display().to_string()
    }
}
