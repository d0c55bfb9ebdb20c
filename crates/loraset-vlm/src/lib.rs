//! # Captioning backends
//!
//! Interfaces for turning an image and a task prompt into a caption.
//!
//! The dataset pipeline never talks to a model directly: it builds a prompt from a
//! [`CaptionTask`], hands the decoded image to a [`Captioner`] and cleans the returned text.
//!
//! Shipped backends:
//!
//! - **SidecarCaptioner**: reads captions from `<stem>.txt` files next to the images
//! - **CommandCaptioner**: runs an external program (e.g. a model server script) per image

/// The captioner trait and its inputs.
pub mod captioner;

/// Runs an external program to caption each image.
pub mod command;

/// Error types for the captioning backends.
pub mod error;

/// Reads pre-written caption files next to the images.
pub mod sidecar;

/// Captioning tasks, prompts and generated-text clean-up.
pub mod task;

pub use captioner::{CaptionInput, Captioner, GenerationOptions};
pub use command::CommandCaptioner;
pub use error::CaptionError;
pub use sidecar::SidecarCaptioner;
pub use task::{build_prompt, clean_generated_text, CaptionTask, END_OF_TEXT};
