//! End-to-end resizing through the public API with the pure-Rust backend.
//!
//! Fixtures are encoded in memory and written to a temporary storage root,
//! so the tests decode and encode real JPEG and PNG data.

use image::{ImageEncoder, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use simple_resizer::config::load_config;
use simple_resizer::imaging::InvalidRequest;
use simple_resizer::{
    FileImage, FileSystemStorage, LazyOptions, ResizeError, ResizeRequest, Resizer, tags,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 90])
    });
    let mut buf = Vec::new();
    image::codecs::jpeg::JpegEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, _| Rgba([(x % 256) as u8, 0, 0, 128]));
    let mut buf = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgba8)
        .unwrap();
    buf
}

/// Tag a JPEG with an EXIF orientation (APP1 right after SOI, big-endian IFD0).
fn with_orientation(jpeg: &[u8], orientation: u16) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend_from_slice(b"Exif\0\0MM\0\x2A\0\0\0\x08");
    payload.extend_from_slice(&1u16.to_be_bytes());
    payload.extend_from_slice(&0x0112u16.to_be_bytes());
    payload.extend_from_slice(&3u16.to_be_bytes());
    payload.extend_from_slice(&1u32.to_be_bytes());
    payload.extend_from_slice(&orientation.to_be_bytes());
    payload.extend_from_slice(&[0, 0, 0, 0, 0, 0]);

    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&jpeg[2..]);
    out
}

fn write(root: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = root.join(name);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, bytes).unwrap();
    path
}

fn setup() -> (TempDir, Resizer) {
    let tmp = TempDir::new().unwrap();
    let storage = FileSystemStorage::new(tmp.path(), "/media/");
    (tmp, Resizer::new(Arc::new(storage)))
}

fn decoded(bytes: &[u8]) -> (u32, u32) {
    let img = image::load_from_memory(bytes).unwrap();
    (img.width(), img.height())
}

#[test]
fn eager_fit_crop_and_single_dimension() {
    let (tmp, resizer) = setup();
    let path = write(tmp.path(), "photos/a.jpg", &jpeg(1600, 800));
    let source = FileImage::with_name(path, "photos/a.jpg");

    let fit = resizer.resize(&source, ResizeRequest::fit(1000, 500)).unwrap();
    assert_eq!(decoded(fit.as_bytes()), (1000, 500));

    let fill = resizer.resize(&source, ResizeRequest::fill(500, 500)).unwrap();
    assert_eq!(decoded(fill.as_bytes()), (500, 500));

    let width_only = resizer.resize(&source, ResizeRequest::width(500)).unwrap();
    assert_eq!(decoded(width_only.as_bytes()), (500, 250));
    assert_eq!(width_only.format(), ImageFormat::Jpeg);
}

#[test]
fn exif_rotated_source_resizes_upright() {
    let (tmp, resizer) = setup();
    // Stored 1600x800, displayed 800x1600
    let path = write(tmp.path(), "r.jpg", &with_orientation(&jpeg(1600, 800), 6));
    let source = FileImage::with_name(path, "r.jpg");

    let width_only = resizer.resize(&source, ResizeRequest::width(500)).unwrap();
    assert_eq!(width_only.dimensions(), (500, 1000));
    assert_eq!(decoded(width_only.as_bytes()), (500, 1000));

    let fill = resizer.resize(&source, ResizeRequest::fill(300, 300)).unwrap();
    assert_eq!(decoded(fill.as_bytes()), (300, 300));

    let tiny = resizer.resize(&source, ResizeRequest::fit(1, 1)).unwrap();
    assert_eq!(decoded(tiny.as_bytes()), (1, 1));

    let name = resizer
        .resize_lazy(
            &resizer.stored("r.jpg"),
            ResizeRequest::width(500),
            &LazyOptions::default(),
        )
        .unwrap();
    assert_eq!(name, "resized/500x1000/r.jpg");
    assert_eq!(decoded(&fs::read(tmp.path().join(&name)).unwrap()), (500, 1000));
}

#[test]
fn lazy_writes_once_into_namespace_directory() {
    let (tmp, resizer) = setup();
    write(tmp.path(), "photos/a.jpg", &jpeg(1600, 800));
    let source = resizer.stored("photos/a.jpg");
    let options = LazyOptions::default();

    let name = resizer
        .resize_lazy(&source, ResizeRequest::fill(500, 250), &options)
        .unwrap();
    assert_eq!(name, "photos/resized/500x250_cropped/a.jpg");

    let on_disk = tmp.path().join(&name);
    let stored = fs::read(&on_disk).unwrap();
    assert_eq!(decoded(&stored), (500, 250));
    let before = fs::metadata(&on_disk).unwrap().modified().unwrap();

    let again = resizer
        .resize_lazy(&source, ResizeRequest::fill(500, 250), &options)
        .unwrap();
    let after = fs::metadata(&on_disk).unwrap().modified().unwrap();

    assert_eq!(again, name);
    assert_eq!(before, after);
}

#[test]
fn lazy_url_uses_storage_base_url() {
    let (tmp, resizer) = setup();
    write(tmp.path(), "my photo.jpg", &jpeg(64, 32));

    let url = resizer
        .resize_lazy(
            &resizer.stored("my photo.jpg"),
            ResizeRequest::height(16),
            &LazyOptions {
                as_url: true,
                ..LazyOptions::default()
            },
        )
        .unwrap();

    assert_eq!(url, "/media/resized/32x16/my%20photo.jpg");
}

#[test]
fn png_stays_png_with_alpha() {
    let (tmp, resizer) = setup();
    write(tmp.path(), "icons/logo.png", &png(200, 100));

    let name = resizer
        .resize_lazy(
            &resizer.stored("icons/logo.png"),
            ResizeRequest::width(50),
            &LazyOptions::default(),
        )
        .unwrap();

    let bytes = resizer.storage().open(&name).unwrap();
    assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Png);
    let img = image::load_from_memory(&bytes).unwrap();
    assert_eq!((img.width(), img.height()), (50, 25));
    assert!(img.color().has_alpha());
}

#[test]
fn invalid_requests_fail_without_writing() {
    let (tmp, resizer) = setup();
    write(tmp.path(), "a.jpg", &jpeg(32, 32));
    let source = resizer.stored("a.jpg");

    let none = resizer.resize_lazy(&source, ResizeRequest::default(), &LazyOptions::default());
    assert!(matches!(
        none,
        Err(ResizeError::InvalidRequest(InvalidRequest::NoDimensions))
    ));

    let one = resizer.resize_lazy(
        &source,
        ResizeRequest::width(10).with_crop(true),
        &LazyOptions::default(),
    );
    assert!(matches!(
        one,
        Err(ResizeError::InvalidRequest(
            InvalidRequest::CropWithOneDimension
        ))
    ));

    assert!(!tmp.path().join("resized").exists());
}

#[test]
fn corrupt_source_is_an_imaging_error() {
    let (tmp, resizer) = setup();
    write(tmp.path(), "broken.jpg", b"\xFF\xD8not really a jpeg");

    let result = resizer.resize(&resizer.stored("broken.jpg"), ResizeRequest::fit(10, 10));
    assert!(matches!(result, Err(ResizeError::Imaging(_))));
}

#[test]
fn conditional_resize_tag() {
    let (tmp, resizer) = setup();
    write(tmp.path(), "wide.jpg", &jpeg(200, 100));
    write(tmp.path(), "tall.jpg", &jpeg(100, 200));

    let wide = tags::conditional_resize(
        &resizer,
        &resizer.stored("wide.jpg"),
        1.3,
        Some(40),
        Some(40),
        true,
        None,
    )
    .unwrap();
    let tall = tags::conditional_resize(
        &resizer,
        &resizer.stored("tall.jpg"),
        1.3,
        Some(40),
        Some(40),
        true,
        None,
    )
    .unwrap();

    assert_eq!(wide, "/media/resized/40x40_cropped/wide.jpg");
    assert_eq!(tall, "/media/resized/40x40/tall.jpg");
    let cropped = fs::read(tmp.path().join("resized/40x40_cropped/wide.jpg")).unwrap();
    assert_eq!(decoded(&cropped), (40, 40));
    let fitted = fs::read(tmp.path().join("resized/40x40/tall.jpg")).unwrap();
    assert_eq!(decoded(&fitted), (20, 40));
}

#[test]
fn resizer_from_config_file() {
    let tmp = TempDir::new().unwrap();
    let media = tmp.path().join("media");
    let config_path = tmp.path().join("config.toml");
    fs::write(
        &config_path,
        format!(
            "namespace = \"thumbs\"\n\n[storage]\nlocation = {:?}\nbase_url = \"https://cdn.example.com/\"\n",
            media.display().to_string()
        ),
    )
    .unwrap();
    write(&media, "a.jpg", &jpeg(80, 40));

    let config = load_config(&config_path).unwrap();
    let resizer = Resizer::from_config(&config);
    let url = resizer
        .resize_lazy(
            &resizer.stored("a.jpg"),
            ResizeRequest::width(40),
            &LazyOptions {
                as_url: true,
                ..LazyOptions::default()
            },
        )
        .unwrap();

    assert_eq!(url, "https://cdn.example.com/thumbs/40x20/a.jpg");
    assert!(media.join("thumbs/40x20/a.jpg").exists());
}
