//! Template helpers.
//!
//! Thin wrappers over [`Resizer::resize_lazy`] that always return URLs,
//! for use while rendering pages. [`resized_img`] goes one step further and
//! renders the `<img>` element with maud.

use crate::imaging::{ImageBackend, ResizeRequest};
use crate::resizer::{LazyOptions, Resizer, Result};
use crate::source::SourceImage;
use maud::{Markup, html};

fn url_options(namespace: Option<&str>) -> LazyOptions<'_> {
    LazyOptions {
        namespace,
        as_url: true,
        ..LazyOptions::default()
    }
}

/// URL of the rendition of `image` at the requested size.
pub fn resize<B: ImageBackend>(
    resizer: &Resizer<B>,
    image: &(impl SourceImage + ?Sized),
    width: Option<u32>,
    height: Option<u32>,
    crop: bool,
    namespace: Option<&str>,
) -> Result<String> {
    let request = ResizeRequest {
        width,
        height,
        crop,
    };
    resizer.resize_lazy(image, request, &url_options(namespace))
}

/// Crop only when the source's aspect ratio is on one side of `ratio`.
///
/// With `upcrop` images wider than `ratio` are cropped and the rest are
/// fitted; without it the other way round.
pub fn conditional_resize<B: ImageBackend>(
    resizer: &Resizer<B>,
    image: &(impl SourceImage + ?Sized),
    ratio: f64,
    width: Option<u32>,
    height: Option<u32>,
    upcrop: bool,
    namespace: Option<&str>,
) -> Result<String> {
    let spec = resizer.inspect(image)?;
    let aspect = spec.aspect();
    let crop = (aspect > ratio) == upcrop;
    tracing::debug!(name = image.name(), aspect, ratio, crop, "conditional resize");
    let request = ResizeRequest {
        width,
        height,
        crop,
    };
    let resolved = resizer.resolve_with_spec(image, &spec, request, &url_options(namespace))?;
    Ok(resolved.url)
}

/// An `<img>` element for the rendition, sized to the rendered output.
pub fn resized_img<B: ImageBackend>(
    resizer: &Resizer<B>,
    image: &(impl SourceImage + ?Sized),
    request: ResizeRequest,
    alt: &str,
    namespace: Option<&str>,
) -> Result<Markup> {
    let resolved = resizer.resolve(image, request, &url_options(namespace))?;
    Ok(html! {
        img src=(resolved.url) width=(resolved.width) height=(resolved.height) alt=(alt);
    })
}
