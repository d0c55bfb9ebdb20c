#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Canvas and letterbox geometry.
///
/// Pure integer math describing where a uniformly scaled image lands on a fixed canvas.
pub mod canvas;

/// Error types for the normalization module.
pub mod error;

/// Decode, letterbox and encode training images.
///
/// See [`normalize::normalize_image`] for the file-to-file entry point.
pub mod normalize;

pub use canvas::{letterbox, CanvasSize, Letterbox};
pub use error::NormalizeError;
pub use normalize::{normalize_image, pad_to_canvas, read_image_rgb8};
