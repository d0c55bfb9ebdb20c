#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for the dataset module.
pub mod error;

/// Reading and writing the JSONL manifest.
pub mod manifest;

/// The per-image processing pipeline.
///
/// See [`pipeline::DatasetPipeline`] for the entry point.
pub mod pipeline;

/// A single manifest entry.
pub mod record;

/// Discovery of source images.
pub mod source;

pub use error::DatasetError;
pub use manifest::{read_manifest, write_manifest, MANIFEST_FILE_NAME};
pub use pipeline::{
    DatasetConfig, DatasetPipeline, ItemOutcome, ItemReport, ItemStage, PipelineContext,
    RunSummary,
};
pub use record::DatasetRecord;
pub use source::{is_supported_image, list_source_images, SUPPORTED_EXTENSIONS};
