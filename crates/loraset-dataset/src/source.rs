use std::path::{Path, PathBuf};

use crate::error::DatasetError;

/// Image extensions picked up from the source directory, compared case-insensitively.
pub const SUPPORTED_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

/// Whether the path has one of the [`SUPPORTED_EXTENSIONS`].
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
        .unwrap_or(false)
}

/// List the images directly inside a directory.
///
/// Subdirectories are not visited. The result is sorted by path, which fixes the sequence
/// number every image gets in the dataset.
///
/// # Arguments
///
/// * `source_dir` - The directory to scan.
///
/// # Returns
///
/// The sorted image paths.
pub fn list_source_images(source_dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, DatasetError> {
    let mut images = Vec::new();

    for entry in walkdir::WalkDir::new(source_dir.as_ref())
        .min_depth(1)
        .max_depth(1)
    {
        let entry = entry?;
        // follows symlinks, unlike entry.file_type()
        if entry.path().is_file() && is_supported_image(entry.path()) {
            images.push(entry.into_path());
        }
    }

    images.sort();

    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_case_insensitive() {
        assert!(is_supported_image(Path::new("a.JPG")));
        assert!(is_supported_image(Path::new("a.Tif")));
        assert!(is_supported_image(Path::new("dir/a.webp")));
        assert!(!is_supported_image(Path::new("a.gif")));
        assert!(!is_supported_image(Path::new("a.txt")));
        assert!(!is_supported_image(Path::new("jpg")));
    }

    #[test]
    fn lists_sorted_flat_images() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;
        let root = tmp_dir.path();
        for name in ["b.png", "a.JPG", "c.txt", "10.bmp", "2.webp"] {
            std::fs::write(root.join(name), b"")?;
        }
        std::fs::create_dir(root.join("nested.png"))?;
        std::fs::create_dir(root.join("sub"))?;
        std::fs::write(root.join("sub").join("d.png"), b"")?;

        let images = list_source_images(root)?;
        let names: Vec<_> = images
            .iter()
            .filter_map(|p| p.file_name()?.to_str())
            .collect();
        assert_eq!(names, vec!["10.bmp", "2.webp", "a.JPG", "b.png"]);
        Ok(())
    }

    #[test]
    fn empty_directory() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;
        assert!(list_source_images(tmp_dir.path())?.is_empty());
        Ok(())
    }
}
