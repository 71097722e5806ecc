//! Image processing in pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `ImageDecoder::dimensions` + EXIF orientation |
//! | **Normalize / compute** | pure functions in [`calculations`] |
//! | **Resize** | `resize_exact` with Lanczos3 |
//! | **Crop** | `crop_imm` after resizing |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
pub mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend, ImageRead, ImageSpec};
pub use calculations::{CropRect, InvalidRequest, ResizeResult, compute, normalize};
pub use operations::{OperationError, Plan, ResizedImage, plan, resize_bytes};
pub use params::{Quality, RenderParams, ResizeRequest};
pub use rust_backend::{RustBackend, supported_input_extensions};
