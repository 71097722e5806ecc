//! Shared test utilities for the simple-resizer test suite.
//!
//! Provides synthetic image fixtures (built in memory, no files checked in)
//! and the size assertions every resize test needs.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let bytes = create_test_jpeg(1600, 800);
//! let resized = resizer.resize(&FileImage::new(path), ResizeRequest::fit(500, 500))?;
//!
//! assert_resize(resized.dimensions(), (500, 500));
//! assert_aspect_ratio(resized.dimensions(), (1600, 800), 2);
//! ```

use image::{ImageEncoder, Rgb, RgbImage, Rgba, RgbaImage};
use std::path::{Path, PathBuf};

// =========================================================================
// Fixture builders
// =========================================================================

/// Encode a gradient JPEG with the given dimensions.
pub fn create_test_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut buf = Vec::new();
    image::codecs::jpeg::JpegEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

/// Encode a gradient PNG with an alpha channel.
pub fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, 64, (y % 256) as u8, 200])
    });
    let mut buf = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgba8)
        .unwrap();
    buf
}

/// Insert an EXIF APP1 segment carrying `orientation` right after the JPEG SOI.
///
/// The segment holds a big-endian TIFF header with a single IFD0 entry
/// (tag 0x0112, SHORT, count 1).
pub fn with_exif_orientation(jpeg: &[u8], orientation: u16) -> Vec<u8> {
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8], "not a JPEG");

    let mut payload = Vec::new();
    payload.extend_from_slice(b"Exif\0\0");
    payload.extend_from_slice(b"MM\0\x2A\0\0\0\x08");
    payload.extend_from_slice(&1u16.to_be_bytes());
    payload.extend_from_slice(&0x0112u16.to_be_bytes());
    payload.extend_from_slice(&3u16.to_be_bytes());
    payload.extend_from_slice(&1u32.to_be_bytes());
    payload.extend_from_slice(&orientation.to_be_bytes());
    payload.extend_from_slice(&[0, 0]);
    payload.extend_from_slice(&0u32.to_be_bytes());

    let length = (payload.len() + 2) as u16;
    let mut out = Vec::with_capacity(jpeg.len() + payload.len() + 4);
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&length.to_be_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// Write fixture bytes under `dir`, creating parent directories.
pub fn write_fixture(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, bytes).unwrap();
    path
}

/// Decode encoded bytes and return their pixel size.
pub fn decoded_dimensions(bytes: &[u8]) -> (u32, u32) {
    let img = image::load_from_memory(bytes).unwrap();
    (img.width(), img.height())
}

// =========================================================================
// Size assertions
// =========================================================================

/// Assert a fit-inside resize: one axis equals the request, the other is
/// no larger than requested.
pub fn assert_resize(actual: (u32, u32), requested: (u32, u32)) {
    let (w, h) = actual;
    let (req_w, req_h) = requested;
    let target_aspect = req_w as f64 / req_h as f64;
    let image_aspect = w as f64 / h as f64;

    if target_aspect > image_aspect {
        assert_eq!(h, req_h, "height should be exactly {req_h}px, got {h}px");
        assert!(w <= req_w, "width should be at most {req_w}px, got {w}px");
    } else {
        assert_eq!(w, req_w, "width should be exactly {req_w}px, got {w}px");
        assert!(h <= req_h, "height should be at most {req_h}px, got {h}px");
    }
}

/// Assert a cropped resize produced exactly the requested box.
pub fn assert_resize_crop(actual: (u32, u32), requested: (u32, u32)) {
    assert_eq!(
        actual, requested,
        "cropped image is {}x{} instead of the requested {}x{}",
        actual.0, actual.1, requested.0, requested.1
    );
}

/// Assert two sizes share an aspect ratio, compared at `decimals` places.
pub fn assert_aspect_ratio(a: (u32, u32), b: (u32, u32), decimals: i32) {
    let scale = 10f64.powi(decimals);
    let ratio_a = (a.0 as f64 / a.1 as f64 * scale).round() / scale;
    let ratio_b = (b.0 as f64 / b.1 as f64 * scale).round() / scale;
    assert_eq!(
        ratio_a, ratio_b,
        "aspect ratios differ: {}x{} vs {}x{}",
        a.0, a.1, b.0, b.1
    );
}
