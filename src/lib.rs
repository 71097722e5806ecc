//! # Simple Resizer
//!
//! On-demand image resizing with aspect-ratio preservation, optional
//! center-cropping, and renditions cached in a storage under names derived
//! from the request.
//!
//! ```text
//! photos/beach.jpg ──width 500──────────────▶ photos/resized/500x250/beach.jpg
//! photos/beach.jpg ──500x500, crop──────────▶ photos/resized/500x500_cropped/beach.jpg
//! ```
//!
//! # Quick Start
//!
//! ```no_run
//! use simple_resizer::{FileSystemStorage, LazyOptions, ResizeRequest, Resizer};
//! use std::sync::Arc;
//!
//! let resizer = Resizer::new(Arc::new(FileSystemStorage::new("media", "/media/")));
//! let source = resizer.stored("photos/beach.jpg");
//!
//! let url = resizer.resize_lazy(
//!     &source,
//!     ResizeRequest::fill(300, 300),
//!     &LazyOptions { as_url: true, ..LazyOptions::default() },
//! )?;
//! assert_eq!(url, "/media/photos/resized/300x300_cropped/beach.jpg");
//! # Ok::<(), simple_resizer::ResizeError>(())
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Dimension math, the [`ImageBackend`](imaging::ImageBackend) trait and the pure-Rust backend |
//! | [`resizer`] | Eager and lazy resizing against a storage, per-key locking of concurrent misses |
//! | [`naming`] | Rendition names: `<dir>/<namespace>/<W>x<H>[_cropped]/<file>` |
//! | [`storage`] | The [`Storage`] trait and a local-disk [`FileSystemStorage`] |
//! | [`source`] | Source images: files on disk and entries in a storage |
//! | [`tags`] | Template helpers returning URLs and maud `<img>` markup |
//! | [`config`] | `config.toml` loading, validation and merging onto stock defaults |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Geometry Is Pure
//!
//! Everything that decides output size lives in
//! [`imaging::calculations`] as pure functions over integers. The backend
//! only executes a [`ResizeResult`](imaging::ResizeResult): resize to exact
//! dimensions, then optionally crop. Tests cover the arithmetic without
//! decoding a pixel, and a mock backend records what would be rendered.
//!
//! ## Orientation Before Geometry
//!
//! EXIF orientation is read with the header and applied before any math.
//! A 1600×800 JPEG tagged as rotated 90° is treated as 800×1600 everywhere,
//! including when deriving a missing dimension.
//!
//! ## Names, Not Content
//!
//! A rendition's name depends only on the source name and the normalized
//! request. A lookup needs the source's dimensions (recorded on the source,
//! or streamed from its header) plus one `exists` call; the full source is
//! read only to render a miss. Replacing a source under the same name keeps
//! the old renditions until they are forced or deleted.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, Lanczos3 resampling and encoding all go through the `image`
//! crate. No ImageMagick, no system libraries. Output keeps the source
//! format; encoders write no EXIF or ICC data, so renditions come out
//! stripped.

pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod resizer;
pub mod source;
pub mod storage;
pub mod tags;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use config::ResizerConfig;
pub use imaging::{ResizeRequest, ResizedImage};
pub use resizer::{LazyOptions, ResizeError, ResolvedImage, Resizer};
pub use source::{FileImage, SourceImage, StoredImage};
pub use storage::{FileSystemStorage, Storage, StorageError};
