//! Eager and lazy resizing against a storage.
//!
//! [`Resizer`] ties a backend to a default [`Storage`]:
//!
//! - [`Resizer::resize`] renders and hands back the encoded image.
//! - [`Resizer::resize_lazy`] returns the storage name (or URL) of a
//!   rendition, rendering it only when the storage does not have it yet.
//!
//! # Lazy resolution
//!
//! ```text
//! source spec ─▶ normalize ─▶ resized_name ─▶ exists? ──yes──▶ name
//!                                                 │
//!                                                 no
//!                                                 ▼
//!                        read source ─▶ render ─▶ storage.save ─▶ name
//! ```
//!
//! The source spec is the one the source records
//! ([`SourceImage::known_spec`]) or else its header, streamed through
//! [`SourceImage::reader`]. The full source is read only on a miss, so a
//! hit on a source with recorded dimensions touches nothing but the
//! rendition's `exists` check.
//!
//! The name comes from [`naming::resized_name`](crate::naming::resized_name)
//! and depends only on parameters. `force` skips the existence check and
//! overwrites.
//!
//! Renditions of a [`StoredImage`](crate::source::StoredImage) go to that
//! image's own storage; otherwise to the storage in [`LazyOptions`], then
//! the resizer's default.
//!
//! # Concurrent misses
//!
//! Two callers missing the same name at once would both render it. Misses
//! are serialized per storage + name: the second caller waits, sees the
//! rendition the first one wrote, and returns it.

use crate::config::ResizerConfig;
use crate::imaging::operations::{self, OperationError, Plan, ResizedImage};
use crate::imaging::{
    BackendError, ImageBackend, ImageSpec, InvalidRequest, Quality, ResizeRequest, RustBackend,
};
use crate::naming::{DEFAULT_NAMESPACE, resized_name};
use crate::source::{SourceImage, StoredImage};
use crate::storage::{FileSystemStorage, Storage, StorageError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResizeError {
    #[error("Invalid resize request: {0}")]
    InvalidRequest(#[from] InvalidRequest),
    #[error("Image processing failed: {0}")]
    Imaging(#[from] BackendError),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<OperationError> for ResizeError {
    fn from(err: OperationError) -> Self {
        match err {
            OperationError::InvalidRequest(e) => Self::InvalidRequest(e),
            OperationError::Backend(e) => Self::Imaging(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, ResizeError>;

/// Options for [`Resizer::resolve`] and [`Resizer::resize_lazy`].
#[derive(Clone, Copy, Default)]
pub struct LazyOptions<'a> {
    /// Render and overwrite even if the rendition exists.
    pub force: bool,
    /// Namespace directory; the resizer's namespace when `None`.
    pub namespace: Option<&'a str>,
    /// Storage for renditions of sources that have none of their own.
    pub storage: Option<&'a dyn Storage>,
    /// Return the URL instead of the storage name.
    pub as_url: bool,
}

/// A rendition that exists in storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImage {
    pub name: String,
    pub url: String,
    pub width: u32,
    pub height: u32,
    /// `true` if the rendition was already stored and nothing was rendered.
    pub cached: bool,
}

/// Per-key mutexes, created on demand and dropped when nobody waits on them.
#[derive(Default)]
struct KeyLocks {
    inner: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyLocks {
    fn acquire(&self, key: String) -> KeyLock<'_> {
        let mutex = self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key.clone())
            .or_default()
            .clone();
        KeyLock {
            locks: self,
            key,
            mutex,
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// One caller's claim on a key. Dropping it, on return or while unwinding,
/// removes the map entry unless another caller holds the same key.
struct KeyLock<'a> {
    locks: &'a KeyLocks,
    key: String,
    mutex: Arc<Mutex<()>>,
}

impl KeyLock<'_> {
    /// Block until no other caller is inside this key.
    fn lock(&self) -> MutexGuard<'_, ()> {
        self.mutex.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for KeyLock<'_> {
    fn drop(&mut self) {
        let mut map = self
            .locks
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // One reference in the map, one here: no other caller is waiting.
        if Arc::strong_count(&self.mutex) == 2 {
            map.remove(&self.key);
        }
    }
}

/// Resizes source images, caching renditions in a storage.
pub struct Resizer<B: ImageBackend = RustBackend> {
    backend: B,
    storage: Arc<dyn Storage>,
    namespace: String,
    quality: Quality,
    locks: KeyLocks,
}

impl Resizer<RustBackend> {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self::with_backend(RustBackend::new(), storage)
    }

    /// Build from configuration: a [`FileSystemStorage`] at the configured
    /// location, plus namespace and quality.
    pub fn from_config(config: &ResizerConfig) -> Self {
        let storage = FileSystemStorage::new(&config.storage.location, &config.storage.base_url);
        Self::new(Arc::new(storage))
            .with_namespace(&config.namespace)
            .with_quality(Quality::new(config.output.quality))
    }
}

impl<B: ImageBackend> Resizer<B> {
    pub fn with_backend(backend: B, storage: Arc<dyn Storage>) -> Self {
        Self {
            backend,
            storage,
            namespace: DEFAULT_NAMESPACE.to_string(),
            quality: Quality::default(),
            locks: KeyLocks::default(),
        }
    }

    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.namespace = namespace.to_string();
        self
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The default storage.
    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// A source saved under `name` in the default storage.
    pub fn stored(&self, name: impl Into<String>) -> StoredImage {
        StoredImage::new(Arc::clone(&self.storage), name)
    }

    /// A source's dimensions and orientation: the recorded ones if it has
    /// them, otherwise read from its header.
    pub fn inspect(&self, source: &(impl SourceImage + ?Sized)) -> Result<ImageSpec> {
        if let Some(spec) = source.known_spec() {
            return Ok(spec);
        }
        let mut reader = source.reader()?;
        Ok(self.backend.identify_reader(&mut *reader)?)
    }

    /// Resolve a request against a source without rendering anything.
    pub fn plan(&self, source: &(impl SourceImage + ?Sized), request: ResizeRequest) -> Result<Plan> {
        let spec = self.inspect(source)?;
        Ok(operations::plan(&spec, request)?)
    }

    /// Resize a source and return the encoded result.
    pub fn resize(
        &self,
        source: &(impl SourceImage + ?Sized),
        request: ResizeRequest,
    ) -> Result<ResizedImage> {
        let bytes = source.read_bytes()?;
        Ok(operations::resize_bytes(
            &self.backend,
            source.name(),
            &bytes,
            request,
            self.quality,
        )?)
    }

    /// Return the storage name of a rendition, or its URL with
    /// `options.as_url`, rendering it first if it is missing.
    pub fn resize_lazy(
        &self,
        source: &(impl SourceImage + ?Sized),
        request: ResizeRequest,
        options: &LazyOptions<'_>,
    ) -> Result<String> {
        let resolved = self.resolve(source, request, options)?;
        Ok(if options.as_url {
            resolved.url
        } else {
            resolved.name
        })
    }

    /// Ensure a rendition exists and describe it.
    pub fn resolve(
        &self,
        source: &(impl SourceImage + ?Sized),
        request: ResizeRequest,
        options: &LazyOptions<'_>,
    ) -> Result<ResolvedImage> {
        let spec = self.inspect(source)?;
        self.resolve_with_spec(source, &spec, request, options)
    }

    /// [`resolve`](Self::resolve) for a caller that already inspected the
    /// source.
    pub fn resolve_with_spec(
        &self,
        source: &(impl SourceImage + ?Sized),
        spec: &ImageSpec,
        request: ResizeRequest,
        options: &LazyOptions<'_>,
    ) -> Result<ResolvedImage> {
        let plan = operations::plan(spec, request)?;

        let namespace = options.namespace.unwrap_or(&self.namespace);
        let name = resized_name(source.name(), plan.width, plan.height, plan.crop, namespace);
        let storage: &dyn Storage = source
            .storage()
            .or(options.storage)
            .unwrap_or(self.storage.as_ref());

        if !options.force && storage.exists(&name) {
            tracing::debug!(%name, "rendition cache hit");
            return Ok(self.describe(storage, name, &plan, true));
        }

        let entry = self.locks.acquire(format!("{}::{}", storage.identity(), name));
        let _held = entry.lock();
        self.render_missing(storage, source, &plan, name, options.force)
    }

    /// Render and save under the per-key lock. Re-checks existence so a
    /// caller that waited on another's render reuses it.
    fn render_missing(
        &self,
        storage: &dyn Storage,
        source: &(impl SourceImage + ?Sized),
        plan: &Plan,
        name: String,
        force: bool,
    ) -> Result<ResolvedImage> {
        if !force && storage.exists(&name) {
            tracing::debug!(%name, "rendition written by a concurrent request");
            return Ok(self.describe(storage, name, plan, true));
        }

        let bytes = source.read_bytes()?;
        let resized =
            operations::render_plan(&self.backend, source.name(), &bytes, plan, self.quality)?;
        let stored = storage.save(&name, resized.as_bytes())?;
        tracing::info!(
            name = %stored,
            width = resized.width(),
            height = resized.height(),
            bytes = resized.size(),
            storage = %storage.identity(),
            "rendition written"
        );
        Ok(self.describe(storage, stored, plan, false))
    }

    fn describe(&self, storage: &dyn Storage, name: String, plan: &Plan, cached: bool) -> ResolvedImage {
        let (width, height) = plan.output_dimensions();
        ResolvedImage {
            url: storage.url(&name),
            name,
            width,
            height,
            cached,
        }
    }
}
