//! Cache names for resized renditions.
//!
//! A rendition lives next to its source, in a namespace directory, under a
//! directory named after the normalized size:
//!
//! ```text
//! photos/beach.jpg  ──500x250──────────▶  photos/resized/500x250/beach.jpg
//! photos/beach.jpg  ──500x500, crop────▶  photos/resized/500x500_cropped/beach.jpg
//! beach.jpg         ──300x200──────────▶  resized/300x200/beach.jpg
//! ```
//!
//! Names depend only on the source name and the parameters, never on the
//! source content. Replacing a source under the same name therefore keeps
//! serving the old renditions until they are forced or deleted.

/// Default namespace directory for renditions.
pub const DEFAULT_NAMESPACE: &str = "resized";

/// Storage name of the rendition of `source_name` at a normalized size.
pub fn resized_name(
    source_name: &str,
    width: u32,
    height: u32,
    crop: bool,
    namespace: &str,
) -> String {
    let (dir, file) = match source_name.rfind('/') {
        Some(pos) => (&source_name[..pos], &source_name[pos + 1..]),
        None => ("", source_name),
    };

    let suffix = if crop { "_cropped" } else { "" };
    let size_dir = format!("{namespace}/{width}x{height}{suffix}");

    if dir.is_empty() {
        format!("{size_dir}/{file}")
    } else {
        format!("{dir}/{size_dir}/{file}")
    }
}

/// Whether a storage name sits inside a rendition directory of `namespace`.
///
/// Used when walking a storage so renditions are not resized again.
pub fn is_rendition(name: &str, namespace: &str) -> bool {
    let parts: Vec<&str> = name.split('/').collect();
    parts
        .windows(2)
        .any(|pair| pair[0] == namespace && is_size_dir(pair[1]))
}

fn is_size_dir(segment: &str) -> bool {
    let size = segment.strip_suffix("_cropped").unwrap_or(segment);
    match size.split_once('x') {
        Some((w, h)) => w.parse::<u32>().is_ok() && h.parse::<u32>().is_ok(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_source() {
        assert_eq!(
            resized_name("photos/beach.jpg", 500, 250, false, "resized"),
            "photos/resized/500x250/beach.jpg"
        );
    }

    #[test]
    fn cropped_suffix() {
        assert_eq!(
            resized_name("photos/a.jpg", 500, 250, true, "resized"),
            "photos/resized/500x250_cropped/a.jpg"
        );
    }

    #[test]
    fn top_level_source() {
        assert_eq!(
            resized_name("beach.jpg", 300, 200, false, "resized"),
            "resized/300x200/beach.jpg"
        );
    }

    #[test]
    fn custom_namespace() {
        assert_eq!(
            resized_name("a/b/c.png", 10, 20, false, "thumbs"),
            "a/b/thumbs/10x20/c.png"
        );
    }

    #[test]
    fn same_parameters_same_name() {
        let first = resized_name("x/y.jpg", 500, 500, false, DEFAULT_NAMESPACE);
        let second = resized_name("x/y.jpg", 500, 500, false, DEFAULT_NAMESPACE);
        assert_eq!(first, second);
        assert_ne!(
            first,
            resized_name("x/y.jpg", 500, 500, true, DEFAULT_NAMESPACE)
        );
    }

    #[test]
    fn detects_renditions() {
        assert!(is_rendition("photos/resized/500x250/a.jpg", "resized"));
        assert!(is_rendition("resized/500x250_cropped/a.jpg", "resized"));
        assert!(!is_rendition("photos/a.jpg", "resized"));
        assert!(!is_rendition("resized/notes/a.jpg", "resized"));
        assert!(!is_rendition("thumbs/10x10/a.jpg", "resized"));
    }
}
