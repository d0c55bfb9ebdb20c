use std::fmt;

use crate::error::NormalizeError;

/// Default width and height of the canonical training image.
pub const DEFAULT_CANVAS_SIDE: u32 = 1024;

/// Size of the fixed canvas every training image is padded to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasSize {
    /// Width of the canvas in pixels.
    pub width: u32,
    /// Height of the canvas in pixels.
    pub height: u32,
}

impl CanvasSize {
    /// Create a new canvas size.
    ///
    /// # Arguments
    ///
    /// * `width` - The canvas width in pixels, must be positive.
    /// * `height` - The canvas height in pixels, must be positive.
    pub fn new(width: u32, height: u32) -> Result<Self, NormalizeError> {
        if width == 0 || height == 0 {
            return Err(NormalizeError::InvalidCanvasSize(width, height));
        }
        Ok(Self { width, height })
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_CANVAS_SIDE,
            height: DEFAULT_CANVAS_SIDE,
        }
    }
}

impl fmt::Display for CanvasSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Placement of the scaled content inside the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Letterbox {
    /// Width of the scaled content.
    pub width: u32,
    /// Height of the scaled content.
    pub height: u32,
    /// Horizontal offset of the content from the left edge of the canvas.
    pub x_offset: u32,
    /// Vertical offset of the content from the top edge of the canvas.
    pub y_offset: u32,
}

/// Compute where an image of the given size lands on the canvas.
///
/// The scale factor is `min(canvas.width / src_width, canvas.height / src_height)`, so the
/// limiting side maps exactly onto the canvas and the other side is truncated. The content is
/// centered with floor division offsets. Small images are scaled up.
///
/// # Arguments
///
/// * `src_width` - The width of the source image.
/// * `src_height` - The height of the source image.
/// * `canvas` - The target canvas size.
///
/// # Returns
///
/// The size and offset of the scaled content.
///
/// # Example
///
/// ```
/// use loraset_imgproc::{letterbox, CanvasSize};
///
/// let placement = letterbox(2000, 1000, CanvasSize::default()).unwrap();
///
/// assert_eq!((placement.width, placement.height), (1024, 512));
/// assert_eq!((placement.x_offset, placement.y_offset), (0, 256));
/// ```
pub fn letterbox(
    src_width: u32,
    src_height: u32,
    canvas: CanvasSize,
) -> Result<Letterbox, NormalizeError> {
    if src_width == 0 || src_height == 0 {
        return Err(NormalizeError::InvalidImageSize(src_width, src_height));
    }

    let (sw, sh) = (src_width as u64, src_height as u64);
    let (cw, ch) = (canvas.width as u64, canvas.height as u64);

    // compare cw / sw against ch / sh without going through floats
    let (width, height) = if cw * sh <= ch * sw {
        (cw, sh * cw / sw)
    } else {
        (sw * ch / sh, ch)
    };

    // extremely elongated sources would otherwise collapse to zero pixels
    let width = width.max(1) as u32;
    let height = height.max(1) as u32;

    Ok(Letterbox {
        width,
        height,
        x_offset: (canvas.width - width) / 2,
        y_offset: (canvas.height - height) / 2,
    })
}
