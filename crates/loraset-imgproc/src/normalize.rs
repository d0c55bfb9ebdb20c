use std::path::{Path, PathBuf};

use image::{imageops, imageops::FilterType, DynamicImage, ImageFormat, ImageReader, Rgb, RgbImage};

use crate::{
    canvas::{letterbox, CanvasSize},
    error::NormalizeError,
};

/// Background color of the padded area.
pub const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// Reads an image from the given file path and converts it to rgb8.
///
/// The format is guessed from the file content, so a mislabelled extension still decodes.
/// Alpha channels are dropped and palette or grayscale images are expanded to three channels.
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
///
/// # Returns
///
/// A RGB image with three channels (rgb8).
pub fn read_image_rgb8(file_path: impl AsRef<Path>) -> Result<RgbImage, NormalizeError> {
    Ok(read_image_any(file_path.as_ref())?.into_rgb8())
}

fn read_image_any(file_path: &Path) -> Result<DynamicImage, NormalizeError> {
    let reader = ImageReader::open(file_path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|source| NormalizeError::FileError {
            path: file_path.to_path_buf(),
            source,
        })?;

    reader
        .decode()
        .map_err(|source| NormalizeError::ImageDecodeError {
            path: file_path.to_path_buf(),
            source,
        })
}

/// Scale an image uniformly and pad it onto a white canvas.
///
/// The image is converted to rgb8 before scaling, resized with a Lanczos3 filter and pasted
/// centered on the canvas. See [`letterbox`] for the geometry.
///
/// # Arguments
///
/// * `image` - The decoded source image in any color mode.
/// * `canvas` - The size of the output image.
///
/// # Returns
///
/// A rgb8 image of exactly `canvas.width` x `canvas.height` pixels.
///
/// # Example
///
/// ```
/// use image::{DynamicImage, RgbImage};
/// use loraset_imgproc::{pad_to_canvas, CanvasSize};
///
/// let image = DynamicImage::ImageRgb8(RgbImage::new(40, 20));
/// let padded = pad_to_canvas(&image, CanvasSize::new(64, 64).unwrap()).unwrap();
///
/// assert_eq!(padded.dimensions(), (64, 64));
/// ```
pub fn pad_to_canvas(image: &DynamicImage, canvas: CanvasSize) -> Result<RgbImage, NormalizeError> {
    let rgb = image.to_rgb8();
    let placement = letterbox(rgb.width(), rgb.height(), canvas)?;

    let resized = if rgb.dimensions() == (placement.width, placement.height) {
        rgb
    } else {
        imageops::resize(&rgb, placement.width, placement.height, FilterType::Lanczos3)
    };

    let mut padded = RgbImage::from_pixel(canvas.width, canvas.height, BACKGROUND);
    imageops::replace(
        &mut padded,
        &resized,
        placement.x_offset as i64,
        placement.y_offset as i64,
    );

    Ok(padded)
}

/// Normalize a source image into a canonical png on disk.
///
/// If `destination` already exists nothing is decoded or written and the existing path is
/// returned as is, even when it was produced with a different canvas size.
///
/// # Arguments
///
/// * `source` - The path to the source image.
/// * `destination` - The path of the png to write.
/// * `canvas` - The size of the output image.
///
/// # Returns
///
/// The destination path.
pub fn normalize_image(
    source: impl AsRef<Path>,
    destination: impl AsRef<Path>,
    canvas: CanvasSize,
) -> Result<PathBuf, NormalizeError> {
    let (source, destination) = (source.as_ref(), destination.as_ref());

    if destination.exists() {
        log::warn!(
            "{} already exists, skipping normalization",
            destination.display()
        );
        return Ok(destination.to_path_buf());
    }

    let image = read_image_any(source)?;
    let padded = pad_to_canvas(&image, canvas)?;

    padded
        .save_with_format(destination, ImageFormat::Png)
        .map_err(|source| NormalizeError::PngEncodingError {
            path: destination.to_path_buf(),
            source,
        })?;

    log::debug!(
        "normalized {} ({}x{}) -> {} ({canvas})",
        source.display(),
        image.width(),
        image.height(),
        destination.display(),
    );

    Ok(destination.to_path_buf())
}
