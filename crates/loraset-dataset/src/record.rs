use serde::{Deserialize, Serialize};

/// One entry of the dataset manifest.
///
/// Records compare equal when all three fields are equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetRecord {
    /// Path of the canonical training image.
    pub image_path: String,
    /// Path of the control image, the canonical image itself in this pipeline.
    pub control_path: String,
    /// The sanitized caption.
    pub caption: String,
}

impl DatasetRecord {
    /// Create a record whose control image is the training image.
    pub fn new(image_path: impl Into<String>, caption: impl Into<String>) -> Self {
        let image_path = image_path.into();
        Self {
            control_path: image_path.clone(),
            image_path,
            caption: caption.into(),
        }
    }
}
