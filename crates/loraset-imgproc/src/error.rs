use std::path::PathBuf;

/// An error type for the normalization module.
#[derive(thiserror::Error, Debug)]
pub enum NormalizeError {
    /// The canvas has a zero dimension.
    #[error("Invalid canvas size: {0}x{1}")]
    InvalidCanvasSize(u32, u32),

    /// The source image has a zero dimension.
    #[error("Invalid image size: {0}x{1}")]
    InvalidImageSize(u32, u32),

    /// Error to open or read the file.
    #[error("Failed to manipulate the file {path}. {source}")]
    FileError {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying io error.
        source: std::io::Error,
    },

    /// Error to decode the source image.
    #[error("Failed to decode the image {path}. {source}")]
    ImageDecodeError {
        /// The image being decoded.
        path: PathBuf,
        /// The underlying codec error.
        source: image::ImageError,
    },

    /// Error to encode the destination png.
    #[error("Failed to encode the png image {path}. {source}")]
    PngEncodingError {
        /// The image being written.
        path: PathBuf,
        /// The underlying codec error.
        source: image::ImageError,
    },
}
