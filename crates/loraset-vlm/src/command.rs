use std::{
    path::{Path, PathBuf},
    process::Command,
};

use crate::{
    captioner::{CaptionInput, Captioner, GenerationOptions},
    error::CaptionError,
};

/// Captions images by running an external program once per image.
///
/// The program is called as
///
/// ```text
/// <program> [args...] --image <path> --prompt <prompt> --max-new-tokens <n> --num-beams <n>
/// ```
///
/// and must print the generated text to stdout. A non-zero exit status is reported as
/// [`CaptionError::CommandFailed`] with the captured stderr.
#[derive(Debug, Clone)]
pub struct CommandCaptioner {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandCaptioner {
    /// Create a new command captioner.
    ///
    /// A program given as a path must exist. A bare program name must resolve through `PATH`.
    ///
    /// # Arguments
    ///
    /// * `program` - The program name or path.
    pub fn new(program: impl Into<PathBuf>) -> Result<Self, CaptionError> {
        let program = program.into();

        let found = if program.components().count() > 1 {
            program.exists()
        } else {
            which::which(&program).is_ok()
        };

        if !found {
            return Err(CaptionError::CommandNotFound(program));
        }

        Ok(Self {
            program,
            args: Vec::new(),
        })
    }

    /// Arguments passed to the program before the per-image arguments.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// The program being run.
    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Captioner for CommandCaptioner {
    fn generate(
        &mut self,
        input: &CaptionInput<'_>,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, CaptionError> {
        log::debug!(
            "running {} on {} ({}x{})",
            self.program.display(),
            input.path.display(),
            input.image.width(),
            input.image.height()
        );

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg("--image")
            .arg(input.path)
            .arg("--prompt")
            .arg(prompt)
            .arg("--max-new-tokens")
            .arg(options.max_new_tokens.to_string())
            .arg("--num-beams")
            .arg(options.num_beams.to_string())
            .output()
            .map_err(|source| CaptionError::CommandSpawnError {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(CaptionError::CommandFailed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8(output.stdout)?)
    }
}
