#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Caption sanitization with an ordered substitution cascade.
///
/// See [`sanitize::CaptionSanitizer`] for the rule set.
pub mod sanitize;

pub use sanitize::{sanitize_caption, CaptionSanitizer};
