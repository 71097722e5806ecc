//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take a request, compute the geometry, and call the backend.

use super::backend::{BackendError, ImageBackend, ImageSpec};
use super::calculations::{InvalidRequest, ResizeResult, compute, normalize};
use super::params::{Quality, RenderParams, ResizeRequest};
use super::rust_backend::detect_format;
use image::ImageFormat;
use serde::Serialize;
use thiserror::Error;

/// Failure of a combined identify, plan and render.
#[derive(Error, Debug)]
pub enum OperationError {
    #[error("Invalid resize request: {0}")]
    InvalidRequest(#[from] InvalidRequest),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// A request resolved against a concrete source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Plan {
    /// Normalized requested width (names the cache directory).
    pub width: u32,
    /// Normalized requested height.
    pub height: u32,
    pub crop: bool,
    pub geometry: ResizeResult,
}

impl Plan {
    pub fn output_dimensions(&self) -> (u32, u32) {
        self.geometry.output_dimensions()
    }
}

/// Normalize a request against a source spec and compute its geometry.
pub fn plan(spec: &ImageSpec, request: ResizeRequest) -> Result<Plan, InvalidRequest> {
    let (width, height, crop) = normalize(spec.aspect(), request.width, request.height, request.crop)?;
    Ok(Plan {
        width,
        height,
        crop,
        geometry: compute(spec, width, height, crop),
    })
}

/// An encoded, resized image held in memory.
///
/// Dropping the value releases the buffer; there is nothing to close.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizedImage {
    bytes: Vec<u8>,
    width: u32,
    height: u32,
    format: ImageFormat,
}

impl ResizedImage {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Encoded size in bytes.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Render an already planned resize. The output keeps the source format.
pub fn render_plan(
    backend: &impl ImageBackend,
    name: &str,
    bytes: &[u8],
    plan: &Plan,
    quality: Quality,
) -> Result<ResizedImage, BackendError> {
    let format = detect_format(name, bytes)?;
    let encoded = backend.render(
        bytes,
        &RenderParams {
            format,
            geometry: plan.geometry,
            quality,
        },
    )?;

    let (width, height) = plan.output_dimensions();
    Ok(ResizedImage {
        bytes: encoded,
        width,
        height,
        format,
    })
}

/// Identify, plan and render in one go.
pub fn resize_bytes(
    backend: &impl ImageBackend,
    name: &str,
    bytes: &[u8],
    request: ResizeRequest,
    quality: Quality,
) -> Result<ResizedImage, OperationError> {
    let spec = backend.identify(bytes)?;
    let plan = plan(&spec, request)?;
    Ok(render_plan(backend, name, bytes, &plan, quality)?)
}
