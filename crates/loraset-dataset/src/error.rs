use std::path::PathBuf;

use loraset_imgproc::NormalizeError;
use loraset_vlm::CaptionError;

/// An error type for the dataset module.
#[derive(thiserror::Error, Debug)]
pub enum DatasetError {
    /// The source directory does not exist or is not a directory.
    #[error("Source directory does not exist: {0}")]
    SourceDirNotFound(PathBuf),

    /// The trigger word is empty after trimming.
    #[error("Trigger word cannot be empty")]
    EmptyTriggerWord,

    /// No supported image was found in the source directory.
    #[error("No image files found in {0}")]
    NoImagesFound(PathBuf),

    /// The captioner returned nothing usable for an image.
    #[error("Empty caption generated for {0}")]
    EmptyCaption(PathBuf),

    /// Error to normalize an image.
    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    /// Error to caption an image.
    #[error(transparent)]
    Caption(#[from] CaptionError),

    /// Error to list the source directory.
    #[error("Failed to list the source directory. {0}")]
    WalkDirError(#[from] walkdir::Error),

    /// Error to open, write or read a file.
    #[error("Failed to manipulate the file {path}. {source}")]
    FileError {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying io error.
        source: std::io::Error,
    },

    /// Error to serialize a record.
    #[error("Failed to serialize the record. {0}")]
    SerializeError(#[from] serde_json::Error),

    /// A manifest line is not a valid record.
    #[error("Invalid record at {path}:{line}. {source}")]
    ManifestParseError {
        /// The manifest file.
        path: PathBuf,
        /// The 1-based line number.
        line: usize,
        /// The underlying parse error.
        source: serde_json::Error,
    },
}
