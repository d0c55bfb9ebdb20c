use std::path::Path;

use image::RgbImage;

use crate::{error::CaptionError, task::CaptionTask};

/// Configuration of a caption generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOptions {
    /// The captioning task.
    pub task: CaptionTask,
    /// Free-text qualifier appended to the task token.
    pub text_input: Option<String>,
    /// Upper bound on the number of generated tokens.
    pub max_new_tokens: usize,
    /// Beam-search width.
    pub num_beams: usize,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            task: CaptionTask::default(),
            text_input: None,
            max_new_tokens: 256,
            num_beams: 3,
        }
    }
}

/// An image handed to a captioner.
#[derive(Debug, Clone, Copy)]
pub struct CaptionInput<'a> {
    /// The path the image was decoded from.
    pub path: &'a Path,
    /// The rgb8 image.
    pub image: &'a RgbImage,
}

/// A backend that turns an image and a prompt into text.
///
/// Implementations return the raw generated text. Echoed prompts and end-of-text markers are
/// removed by the caller with [`crate::clean_generated_text`].
pub trait Captioner {
    /// Generate a caption for an image.
    ///
    /// # Arguments
    ///
    /// * `input` - The decoded image and its source path.
    /// * `prompt` - The full prompt, see [`crate::build_prompt`].
    /// * `options` - Generation bounds and the task the prompt was built for.
    ///
    /// # Returns
    ///
    /// The generated text.
    fn generate(
        &mut self,
        input: &CaptionInput<'_>,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, CaptionError>;
}

impl<C: Captioner + ?Sized> Captioner for Box<C> {
    fn generate(
        &mut self,
        input: &CaptionInput<'_>,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, CaptionError> {
        (**self).generate(input, prompt, options)
    }
}

impl<C: Captioner + ?Sized> Captioner for &mut C {
    fn generate(
        &mut self,
        input: &CaptionInput<'_>,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, CaptionError> {
        (**self).generate(input, prompt, options)
    }
}
