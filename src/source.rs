//! Source images.
//!
//! A [`SourceImage`] is anything with a storage-style name and bytes: a file
//! on disk ([`FileImage`]) or an entry inside a [`Storage`] ([`StoredImage`],
//! the equivalent of an image field on a model). Bytes are read on demand
//! and owned by the caller, so nothing stays open between calls.
//!
//! Sizing a rendition only needs the source's dimensions. A source either
//! records them up front ([`FileImage::with_spec`], [`StoredImage::with_spec`],
//! like width and height columns stored next to an upload) or they are read
//! from the header through [`SourceImage::reader`]. Full bytes are read only
//! when a rendition has to be rendered.

use crate::imaging::{ImageRead, ImageSpec};
use crate::storage::{Storage, StorageError};
use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub trait SourceImage {
    /// `/`-separated name used to derive rendition names.
    fn name(&self) -> &str;

    /// Read the encoded image.
    fn read_bytes(&self) -> Result<Vec<u8>, StorageError>;

    /// Open the encoded image for streaming, e.g. to read only its header.
    fn reader(&self) -> Result<Box<dyn ImageRead>, StorageError> {
        Ok(Box::new(Cursor::new(self.read_bytes()?)))
    }

    /// Dimensions and orientation known without opening the image.
    fn known_spec(&self) -> Option<ImageSpec> {
        None
    }

    /// The storage this image belongs to, if any. Renditions of stored
    /// images are written next to them in the same storage.
    fn storage(&self) -> Option<&dyn Storage> {
        None
    }
}

/// An image file on local disk, named relative to some root.
#[derive(Debug, Clone)]
pub struct FileImage {
    path: PathBuf,
    name: String,
    spec: Option<ImageSpec>,
}

impl FileImage {
    /// Use the path itself (with `/` separators) as the name.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/")
            .trim_start_matches('/')
            .to_string();
        Self {
            path,
            name,
            spec: None,
        }
    }

    /// Read from `path` but derive renditions from `name`.
    pub fn with_name(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            spec: None,
        }
    }

    /// Record the image's dimensions so lookups skip the header read.
    pub fn with_spec(mut self, spec: ImageSpec) -> Self {
        self.spec = Some(spec);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, err: std::io::Error) -> StorageError {
        if err.kind() == std::io::ErrorKind::NotFound {
            StorageError::NotFound(self.path.display().to_string())
        } else {
            StorageError::Io(err)
        }
    }
}

impl SourceImage for FileImage {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_bytes(&self) -> Result<Vec<u8>, StorageError> {
        std::fs::read(&self.path).map_err(|e| self.io_error(e))
    }

    fn reader(&self) -> Result<Box<dyn ImageRead>, StorageError> {
        let file = File::open(&self.path).map_err(|e| self.io_error(e))?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn known_spec(&self) -> Option<ImageSpec> {
        self.spec
    }
}

/// An image saved inside a storage.
#[derive(Clone)]
pub struct StoredImage {
    name: String,
    storage: Arc<dyn Storage>,
    spec: Option<ImageSpec>,
}

impl StoredImage {
    pub fn new(storage: Arc<dyn Storage>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            storage,
            spec: None,
        }
    }

    /// Record the image's dimensions so lookups skip the header read.
    pub fn with_spec(mut self, spec: ImageSpec) -> Self {
        self.spec = Some(spec);
        self
    }

    pub fn url(&self) -> String {
        self.storage.url(&self.name)
    }
}

impl std::fmt::Debug for StoredImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredImage")
            .field("name", &self.name)
            .field("storage", &self.storage.identity())
            .field("spec", &self.spec)
            .finish()
    }
}

impl SourceImage for StoredImage {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_bytes(&self) -> Result<Vec<u8>, StorageError> {
        self.storage.open(&self.name)
    }

    fn reader(&self) -> Result<Box<dyn ImageRead>, StorageError> {
        self.storage.reader(&self.name)
    }

    fn known_spec(&self) -> Option<ImageSpec> {
        self.spec
    }

    fn storage(&self) -> Option<&dyn Storage> {
        Some(self.storage.as_ref())
    }
}
