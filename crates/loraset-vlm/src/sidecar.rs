use std::path::{Path, PathBuf};

use crate::{
    captioner::{CaptionInput, Captioner, GenerationOptions},
    error::CaptionError,
};

/// Reads captions written ahead of time next to each image.
///
/// The caption for `photos/a.jpg` is read from `photos/a.txt`. The prompt and generation
/// options are ignored, which makes this backend useful for re-running the dataset build on
/// hand-edited captions.
#[derive(Debug, Clone, Default)]
pub struct SidecarCaptioner {
    extension: Option<String>,
}

impl SidecarCaptioner {
    /// Create a captioner reading `.txt` files.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read caption files with another extension, e.g. `caption`.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    /// The caption file for a given image.
    pub fn caption_path(&self, image_path: &Path) -> PathBuf {
        image_path.with_extension(self.extension.as_deref().unwrap_or("txt"))
    }
}

impl Captioner for SidecarCaptioner {
    fn generate(
        &mut self,
        input: &CaptionInput<'_>,
        _prompt: &str,
        _options: &GenerationOptions,
    ) -> Result<String, CaptionError> {
        let path = self.caption_path(input.path);
        log::debug!("reading caption from {}", path.display());
        std::fs::read_to_string(&path).map_err(|source| CaptionError::FileError { path, source })
    }
}
