//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations every backend must
//! support: identify (header only) and render (decode, orient, resize, crop,
//! encode). Identify also has a streaming form over an [`ImageRead`], so a
//! backend that understands headers never pulls the whole file into memory.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), pure Rust and built on the
//! `image` crate. Everything is statically linked into the binary.

use super::params::RenderParams;
use std::io::{BufRead, Read, Seek};
use thiserror::Error;

/// A seekable, buffered reader over an encoded image.
pub trait ImageRead: BufRead + Seek + Send {}

impl<T: BufRead + Seek + Send> ImageRead for T {}

/// Failure while decoding, transforming or encoding pixels.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),
}

/// Result of an identify operation: stored pixel size plus orientation.
///
/// `orientation_flipped` is set for EXIF orientations 5–8, i.e. every
/// orientation that includes a quarter turn. Such images display with width
/// and height swapped relative to how they are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSpec {
    pub width: u32,
    pub height: u32,
    pub orientation_flipped: bool,
}

impl ImageSpec {
    /// Dimensions as displayed, after orientation correction.
    pub fn effective_dimensions(&self) -> (u32, u32) {
        if self.orientation_flipped {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        }
    }

    /// Displayed width / displayed height.
    pub fn aspect(&self) -> f64 {
        let (w, h) = self.effective_dimensions();
        w as f64 / h as f64
    }
}

/// Trait for image processing backends.
///
/// Backends work on encoded bytes in memory. The caller owns the bytes for
/// the duration of one call; nothing is retained between calls.
pub trait ImageBackend: Send + Sync {
    /// Read dimensions and orientation from the image header.
    fn identify(&self, bytes: &[u8]) -> Result<ImageSpec, BackendError>;

    /// Identify from a reader positioned at the start of the image.
    ///
    /// The default buffers everything and defers to [`identify`](Self::identify);
    /// backends that can stop after the header should override it.
    fn identify_reader(&self, reader: &mut dyn ImageRead) -> Result<ImageSpec, BackendError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        self.identify(&bytes)
    }

    /// Produce the encoded output image described by `params`.
    fn render(&self, bytes: &[u8], params: &RenderParams) -> Result<Vec<u8>, BackendError>;
}
