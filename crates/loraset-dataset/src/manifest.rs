use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use crate::{error::DatasetError, record::DatasetRecord};

/// File name of the manifest inside the target directory.
pub const MANIFEST_FILE_NAME: &str = "0_dataset.jsonl";

/// Write the full manifest, replacing any previous content.
///
/// Every record is serialized as one compact JSON object, lines are joined by `\n` and the
/// file has no trailing newline. Non-ASCII text is written as is.
///
/// # Arguments
///
/// * `file_path` - The path to the manifest file.
/// * `records` - The records in manifest order.
pub fn write_manifest(
    file_path: impl AsRef<Path>,
    records: &[DatasetRecord],
) -> Result<(), DatasetError> {
    let file_path = file_path.as_ref();
    let file_error = |source| DatasetError::FileError {
        path: file_path.to_path_buf(),
        source,
    };

    let file = File::create(file_path).map_err(file_error)?;
    let mut writer = BufWriter::new(file);

    for (i, record) in records.iter().enumerate() {
        if i > 0 {
            writer.write_all(b"\n").map_err(file_error)?;
        }
        serde_json::to_writer(&mut writer, record)?;
    }

    writer.flush().map_err(file_error)?;

    Ok(())
}

/// Read a manifest back into records.
///
/// Blank lines are skipped.
///
/// # Arguments
///
/// * `file_path` - The path to the manifest file.
///
/// # Returns
///
/// The records in file order.
pub fn read_manifest(file_path: impl AsRef<Path>) -> Result<Vec<DatasetRecord>, DatasetError> {
    let file_path = file_path.as_ref();
    let content = std::fs::read_to_string(file_path).map_err(|source| DatasetError::FileError {
        path: file_path.to_path_buf(),
        source,
    })?;

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|source| DatasetError::ManifestParseError {
                path: file_path.to_path_buf(),
                line: i + 1,
                source,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_joins_lines_without_trailing_newline() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;
        let path = tmp_dir.path().join(MANIFEST_FILE_NAME);

        let records = vec![
            DatasetRecord::new("out/1.png", "a sks"),
            DatasetRecord::new("out/2.png", "the sks"),
        ];
        write_manifest(&path, &records)?;

        let content = std::fs::read_to_string(&path)?;
        assert_eq!(
            content,
            "{\"image_path\":\"out/1.png\",\"control_path\":\"out/1.png\",\"caption\":\"a sks\"}\n\
             {\"image_path\":\"out/2.png\",\"control_path\":\"out/2.png\",\"caption\":\"the sks\"}"
        );
        assert_eq!(read_manifest(&path)?, records);
        Ok(())
    }

    #[test]
    fn write_overwrites() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;
        let path = tmp_dir.path().join(MANIFEST_FILE_NAME);

        write_manifest(&path, &[DatasetRecord::new("1.png", "long caption here")])?;
        write_manifest(&path, &[])?;
        assert_eq!(std::fs::read_to_string(&path)?, "");
        assert!(read_manifest(&path)?.is_empty());
        Ok(())
    }

    #[test]
    fn non_ascii_is_not_escaped() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;
        let path = tmp_dir.path().join(MANIFEST_FILE_NAME);

        write_manifest(&path, &[DatasetRecord::new("1.png", "café \"ü\"")])?;
        let content = std::fs::read_to_string(&path)?;
        assert!(content.contains("café \\\"ü\\\""), "{content}");
        Ok(())
    }

    #[test]
    fn read_reports_line_number() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;
        let path = tmp_dir.path().join(MANIFEST_FILE_NAME);
        std::fs::write(
            &path,
            "{\"image_path\":\"1.png\",\"control_path\":\"1.png\",\"caption\":\"a\"}\n\n{oops",
        )?;

        match read_manifest(&path) {
            Err(DatasetError::ManifestParseError { line, .. }) => assert_eq!(line, 3),
            other => panic!("unexpected result: {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn write_into_missing_directory_fails() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;
        let path = tmp_dir.path().join("missing").join(MANIFEST_FILE_NAME);
        assert!(matches!(
            write_manifest(&path, &[]),
            Err(DatasetError::FileError { .. })
        ));
        Ok(())
    }
}
