//! CLI output formatting.
//!
//! Every command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects. Diagnostics go through
//! `tracing` to stderr, so stdout only carries results.
//!
//! # Output Format
//!
//! ## Resize
//!
//! ```text
//! photos/a.jpg → out.jpg
//!     1000x500 jpg, 48213 bytes
//! ```
//!
//! ## Lazy / Warm
//!
//! ```text
//! photos/a.jpg
//!     cached: photos/resized/500x250/a.jpg (500x250)
//! docs/b.png
//!     rendered: docs/resized/500x250/b.png (500x125)
//! broken.jpg
//!     failed: Image processing failed: ...
//!
//! Warmed 3 images: 1 rendered, 1 cached, 1 failed
//! ```

use crate::imaging::{Plan, ResizedImage};
use crate::resizer::ResolvedImage;
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn format_dimensions((width, height): (u32, u32)) -> String {
    format!("{}x{}", width, height)
}

// ============================================================================
// Resize
// ============================================================================

/// Format the result of an eager resize written to `output`.
pub fn format_resize_output(source: &str, output: &Path, image: &ResizedImage) -> Vec<String> {
    vec![
        format!("{} \u{2192} {}", source, output.display()),
        format!(
            "{}{} {}, {} bytes",
            indent(1),
            format_dimensions(image.dimensions()),
            image.format().extensions_str().first().copied().unwrap_or("image"),
            image.size()
        ),
    ]
}

pub fn print_resize_output(source: &str, output: &Path, image: &ResizedImage) {
    for line in format_resize_output(source, output, image) {
        println!("{}", line);
    }
}

// ============================================================================
// Plan
// ============================================================================

/// Format a plan as pretty JSON.
pub fn format_plan(plan: &Plan) -> serde_json::Result<String> {
    serde_json::to_string_pretty(plan)
}

pub fn print_plan(plan: &Plan) -> serde_json::Result<()> {
    println!("{}", format_plan(plan)?);
    Ok(())
}

// ============================================================================
// Lazy / Warm
// ============================================================================

/// Format one resolved rendition. With `as_url` the URL is shown in place
/// of the storage name.
pub fn format_resolved(source: &str, resolved: &ResolvedImage, as_url: bool) -> Vec<String> {
    let status = if resolved.cached { "cached" } else { "rendered" };
    let target = if as_url { &resolved.url } else { &resolved.name };
    vec![
        source.to_string(),
        format!(
            "{}{}: {} ({})",
            indent(1),
            status,
            target,
            format_dimensions((resolved.width, resolved.height))
        ),
    ]
}

pub fn print_resolved(source: &str, resolved: &ResolvedImage, as_url: bool) {
    for line in format_resolved(source, resolved, as_url) {
        println!("{}", line);
    }
}

/// Format a source the warm pass could not resize.
pub fn format_failure(source: &str, error: &dyn std::error::Error) -> Vec<String> {
    vec![source.to_string(), format!("{}failed: {}", indent(1), error)]
}

pub fn print_failure(source: &str, error: &dyn std::error::Error) {
    for line in format_failure(source, error) {
        println!("{}", line);
    }
}

/// Tally of a warm pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WarmStats {
    pub rendered: usize,
    pub cached: usize,
    pub failed: usize,
}

impl WarmStats {
    pub fn record(&mut self, resolved: &ResolvedImage) {
        if resolved.cached {
            self.cached += 1;
        } else {
            self.rendered += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.rendered + self.cached + self.failed
    }
}

pub fn format_warm_summary(stats: &WarmStats) -> Vec<String> {
    let noun = if stats.total() == 1 { "image" } else { "images" };
    vec![
        String::new(),
        format!(
            "Warmed {} {}: {} rendered, {} cached, {} failed",
            stats.total(),
            noun,
            stats.rendered,
            stats.cached,
            stats.failed
        ),
    ]
}

pub fn print_warm_summary(stats: &WarmStats) {
    for line in format_warm_summary(stats) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
