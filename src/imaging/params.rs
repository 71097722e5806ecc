//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which decides the geometry) and the [`backend`](super::backend) (which
//! does the actual pixel work). This separation allows swapping backends
//! (e.g. for testing with a mock) without changing operation logic.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 90). Clamped on construction.
//! - [`ResizeRequest`]: What the caller asked for: optional width/height and a crop flag.
//! - [`RenderParams`]: Full specification for a render: format, resize target, optional crop.

use super::calculations::ResizeResult;
use image::ImageFormat;
use serde::{Deserialize, Serialize};

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// A resize as requested by a caller.
///
/// At least one dimension must be given; cropping needs both. These rules
/// are enforced by [`normalize`](super::calculations::normalize), not here,
/// so a request can be built from untrusted input and validated in one place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeRequest {
    pub width: Option<u32>,
    pub height: Option<u32>,
    #[serde(default)]
    pub crop: bool,
}

impl ResizeRequest {
    /// Fit inside a `width × height` box, preserving aspect ratio.
    pub fn fit(width: u32, height: u32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            crop: false,
        }
    }

    /// Fill a `width × height` box exactly, center-cropping the overflow.
    pub fn fill(width: u32, height: u32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            crop: true,
        }
    }

    /// Fixed width, height follows the source aspect ratio.
    pub fn width(width: u32) -> Self {
        Self {
            width: Some(width),
            ..Self::default()
        }
    }

    /// Fixed height, width follows the source aspect ratio.
    pub fn height(height: u32) -> Self {
        Self {
            height: Some(height),
            ..Self::default()
        }
    }

    pub fn with_crop(self, crop: bool) -> Self {
        Self { crop, ..self }
    }
}

/// Parameters for a single render: decode, orient, resize, crop, encode.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderParams {
    /// Encoding of both the source and the output (pass-through).
    pub format: ImageFormat,
    pub geometry: ResizeResult,
    pub quality: Quality,
}
