//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `ImageDecoder::dimensions` + `ImageDecoder::orientation` (header only) |
//! | Decode (JPEG, PNG, TIFF, WebP) | `image` crate (pure Rust decoders) |
//! | Orientation | `DynamicImage::apply_orientation` |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Crop | `DynamicImage::crop_imm` |
//! | Encode | same format as the source; JPEG through `JpegEncoder` with quality |
//!
//! Encoders here never write ICC profiles or EXIF blocks, so every output
//! comes out stripped of color profiles and orientation tags. The pixels are
//! already upright at that point.

use super::backend::{BackendError, ImageBackend, ImageRead, ImageSpec};
use super::params::{Quality, RenderParams};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{ColorType, DynamicImage, ImageDecoder, ImageFormat, ImageReader};
use std::io::{BufRead, Cursor, Seek};
use std::path::Path;
use std::sync::LazyLock;

/// Extensions whose decoders and encoders are compiled in.
const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled() && fmt.writing_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that can be resized in place.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Whether a file name carries a supported image extension.
pub fn is_supported_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| {
            let e = e.to_ascii_lowercase();
            SUPPORTED_EXTENSIONS.iter().any(|s| *s == e)
        })
}

/// Pick the pass-through format for a source.
///
/// The extension of the source name wins; names without a known extension
/// fall back to sniffing the magic bytes.
pub fn detect_format(name: &str, bytes: &[u8]) -> Result<ImageFormat, BackendError> {
    let from_name = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .and_then(|ext| {
            let ext = ext.to_ascii_lowercase();
            PHOTO_CANDIDATES
                .iter()
                .find(|(candidate, _)| *candidate == ext)
                .map(|(_, fmt)| *fmt)
        });

    let format = match from_name {
        Some(fmt) => fmt,
        None => image::guess_format(bytes).map_err(|_| {
            BackendError::UnsupportedFormat(format!("cannot determine format of {name}"))
        })?,
    };

    if PHOTO_CANDIDATES.iter().any(|(_, fmt)| *fmt == format) {
        Ok(format)
    } else {
        Err(BackendError::UnsupportedFormat(format!(
            "{format:?} ({name})"
        )))
    }
}

/// Read dimensions and orientation without decoding pixel data.
pub fn read_image_spec<R: BufRead + Seek>(reader: R) -> Result<ImageSpec, BackendError> {
    let mut decoder = ImageReader::new(reader)
        .with_guessed_format()?
        .into_decoder()
        .map_err(|e| BackendError::ProcessingFailed(format!("Failed to read header: {e}")))?;

    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    let (width, height) = decoder.dimensions();
    if width == 0 || height == 0 {
        return Err(BackendError::ProcessingFailed(format!(
            "Image has empty dimensions {width}x{height}"
        )));
    }

    Ok(ImageSpec {
        width,
        height,
        orientation_flipped: is_quarter_turn(orientation),
    })
}

/// EXIF orientations 5–8: the stored axes are swapped relative to display.
fn is_quarter_turn(orientation: Orientation) -> bool {
    matches!(
        orientation,
        Orientation::Rotate90
            | Orientation::Rotate270
            | Orientation::Rotate90FlipH
            | Orientation::Rotate270FlipH
    )
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode an image and turn it upright according to its EXIF orientation.
fn load_image(bytes: &[u8]) -> Result<DynamicImage, BackendError> {
    let mut decoder = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_decoder()
        .map_err(|e| BackendError::ProcessingFailed(format!("Failed to decode: {e}")))?;

    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    let mut img = DynamicImage::from_decoder(decoder)
        .map_err(|e| BackendError::ProcessingFailed(format!("Failed to decode: {e}")))?;

    if orientation != Orientation::NoTransforms {
        tracing::debug!(?orientation, "applying EXIF orientation");
        img.apply_orientation(orientation);
    }
    Ok(img)
}

/// Encode `img` as `format`. Only JPEG honours `quality`; the other
/// compiled-in encoders are lossless.
fn encode(img: &DynamicImage, format: ImageFormat, quality: Quality) -> Result<Vec<u8>, BackendError> {
    let mut buf = Vec::new();

    match format {
        ImageFormat::Jpeg => {
            // JPEG has no alpha channel and no 16-bit mode.
            let img = match img.color() {
                ColorType::L8 | ColorType::Rgb8 => img.clone(),
                ColorType::La8 | ColorType::L16 | ColorType::La16 => {
                    DynamicImage::ImageLuma8(img.to_luma8())
                }
                _ => DynamicImage::ImageRgb8(img.to_rgb8()),
            };
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality.value() as u8);
            img.write_with_encoder(encoder)
                .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {e}")))?;
        }
        ImageFormat::WebP => {
            // The WebP encoder only takes 8-bit RGB(A).
            let img = if img.color().has_alpha() {
                DynamicImage::ImageRgba8(img.to_rgba8())
            } else {
                DynamicImage::ImageRgb8(img.to_rgb8())
            };
            img.write_to(&mut Cursor::new(&mut buf), format)
                .map_err(|e| BackendError::ProcessingFailed(format!("WebP encode failed: {e}")))?;
        }
        other => {
            img.write_to(&mut Cursor::new(&mut buf), other).map_err(|e| {
                BackendError::ProcessingFailed(format!("{other:?} encode failed: {e}"))
            })?;
        }
    }

    Ok(buf)
}

impl ImageBackend for RustBackend {
    fn identify(&self, bytes: &[u8]) -> Result<ImageSpec, BackendError> {
        read_image_spec(Cursor::new(bytes))
    }

    fn identify_reader(&self, reader: &mut dyn ImageRead) -> Result<ImageSpec, BackendError> {
        read_image_spec(reader)
    }

    fn render(&self, bytes: &[u8], params: &RenderParams) -> Result<Vec<u8>, BackendError> {
        let img = load_image(bytes)?;
        let geometry = &params.geometry;

        let resized = img.resize_exact(
            geometry.target_width,
            geometry.target_height,
            FilterType::Lanczos3,
        );
        let output = match geometry.crop {
            Some(rect) => resized.crop_imm(rect.left, rect.top, rect.width, rect.height),
            None => resized,
        };

        tracing::debug!(
            width = output.width(),
            height = output.height(),
            format = ?params.format,
            "rendered image"
        );
        encode(&output, params.format, params.quality)
    }
}
