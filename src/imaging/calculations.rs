//! Pure calculation functions for resize geometry.
//!
//! All functions here are pure and testable without any I/O or images.
//!
//! ## Driving dimension
//!
//! A resize keeps one requested dimension fixed (the *driving* one) and
//! derives the other from the source aspect ratio:
//!
//! | target vs source aspect | `crop = false` | `crop = true` |
//! |---|---|---|
//! | target wider (`>`)      | height drives  | width drives  |
//! | target narrower or equal (`<=`) | width drives | height drives |
//!
//! Without cropping the image fits inside the box; with cropping it covers
//! the box and the overflow on the derived axis is trimmed equally from both
//! sides.

use super::backend::ImageSpec;
use serde::Serialize;
use thiserror::Error;

/// A request that cannot be turned into a resize.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidRequest {
    #[error("either width or height must be set, otherwise resizing is useless")]
    NoDimensions,
    #[error("cropping needs both width and height, only one dimension was given")]
    CropWithOneDimension,
    #[error("{0} must be greater than zero")]
    ZeroDimension(&'static str),
}

/// Rectangle cut out of the resized image, in resized-image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CropRect {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

/// Outcome of [`compute`]: the size to resample to, and the crop applied after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResizeResult {
    pub target_width: u32,
    pub target_height: u32,
    /// Present only for cropping requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop: Option<CropRect>,
}

impl ResizeResult {
    /// Pixel size of the final image.
    pub fn output_dimensions(&self) -> (u32, u32) {
        match self.crop {
            Some(rect) => (rect.width, rect.height),
            None => (self.target_width, self.target_height),
        }
    }
}

/// Validate a request and fill in a missing dimension.
///
/// # Arguments
/// * `aspect` - Source aspect ratio (width / height) after orientation correction
/// * `width`, `height` - Requested dimensions, at least one required
/// * `crop` - Whether the caller wants the box filled exactly
///
/// # Returns
/// * `(width, height, crop)` with both dimensions set
///
/// # Examples
/// ```
/// # use simple_resizer::imaging::calculations::normalize;
/// // 2:1 source, width only → height follows
/// assert_eq!(normalize(2.0, Some(500), None, false).unwrap(), (500, 250, false));
///
/// // cropping along a single free dimension is rejected
/// assert!(normalize(2.0, Some(500), None, true).is_err());
/// ```
pub fn normalize(
    aspect: f64,
    width: Option<u32>,
    height: Option<u32>,
    crop: bool,
) -> Result<(u32, u32, bool), InvalidRequest> {
    if width == Some(0) {
        return Err(InvalidRequest::ZeroDimension("width"));
    }
    if height == Some(0) {
        return Err(InvalidRequest::ZeroDimension("height"));
    }

    match (width, height) {
        (None, None) => Err(InvalidRequest::NoDimensions),
        (Some(w), Some(h)) => Ok((w, h, crop)),
        _ if crop => Err(InvalidRequest::CropWithOneDimension),
        (Some(w), None) => Ok((w, round_dimension(w as f64 / aspect), false)),
        (None, Some(h)) => Ok((round_dimension(h as f64 * aspect), h, false)),
    }
}

/// Compute resample size and crop rectangle for a normalized request.
///
/// Orientation is accounted for first: a source flagged as rotated by a
/// quarter turn is measured with width and height swapped, the way it will
/// look once the backend has turned it upright.
///
/// The derived dimension is rounded toward the requested one (up when the
/// request is at least as large, down otherwise) so floating-point error
/// never makes a cropped image smaller than the crop box.
pub fn compute(spec: &ImageSpec, width: u32, height: u32, crop: bool) -> ResizeResult {
    let (src_w, src_h) = spec.effective_dimensions();
    let aspect = src_w as f64 / src_h as f64;
    let target_aspect = width as f64 / height as f64;

    if (target_aspect > aspect && !crop) || (target_aspect <= aspect && crop) {
        // Target is wider than the image (or the image overflows a crop box
        // horizontally): height is fixed.
        let raw_width = height as f64 * aspect;
        let rect = crop.then(|| CropRect {
            left: offset((raw_width - width as f64) / 2.0),
            top: 0,
            width,
            height,
        });

        ResizeResult {
            target_width: round_toward(raw_width, width),
            target_height: height,
            crop: rect,
        }
    } else {
        // Image is wider than the target: width is fixed.
        let raw_height = width as f64 / aspect;
        let rect = crop.then(|| CropRect {
            left: 0,
            top: offset((raw_height - height as f64) / 2.0),
            width,
            height,
        });

        ResizeResult {
            target_width: width,
            target_height: round_toward(raw_height, height),
            crop: rect,
        }
    }
}

/// Round a derived dimension in the direction of the requested size.
fn round_toward(raw: f64, requested: u32) -> u32 {
    let rounded = if requested as f64 >= raw {
        raw.ceil()
    } else {
        raw.floor()
    };
    (rounded as u32).max(1)
}

fn round_dimension(raw: f64) -> u32 {
    (raw.round() as u32).max(1)
}

fn offset(raw: f64) -> u32 {
    raw.round().max(0.0) as u32
}
