use std::path::PathBuf;

use crate::task::CaptionTask;

/// An error type for the captioning backends.
#[derive(thiserror::Error, Debug)]
pub enum CaptionError {
    /// The task name is not one of the supported tasks.
    #[error("Unknown task: {0}. Available tasks: {tasks}", tasks = CaptionTask::names().join(", "))]
    UnknownTask(String),

    /// A free-text qualifier was given for a task that does not take one.
    #[error("Text input is not supported for the '{0}' task. Only 'referring_expression_segmentation', 'caption_to_phrase_grounding' and 'docvqa' accept it")]
    TextInputNotSupported(CaptionTask),

    /// Error to read a caption file.
    #[error("Failed to read the caption file {path}. {source}")]
    FileError {
        /// The caption file.
        path: PathBuf,
        /// The underlying io error.
        source: std::io::Error,
    },

    /// The captioner program does not exist.
    #[error("Captioner program does not exist: {0}")]
    CommandNotFound(PathBuf),

    /// Error to spawn the captioner program.
    #[error("Failed to run the captioner program {program}. {source}")]
    CommandSpawnError {
        /// The program that failed to start.
        program: PathBuf,
        /// The underlying io error.
        source: std::io::Error,
    },

    /// The captioner program exited with an error.
    #[error("Captioner program {program} failed ({status}): {stderr}")]
    CommandFailed {
        /// The program that failed.
        program: PathBuf,
        /// The exit status.
        status: std::process::ExitStatus,
        /// What the program wrote to stderr.
        stderr: String,
    },

    /// The captioner produced text that is not valid utf-8.
    #[error("Captioner output is not valid utf-8. {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}
