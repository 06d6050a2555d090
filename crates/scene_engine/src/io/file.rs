//! File-backed streams
//!
//! A save or load holds exactly one [`FileStream`] handle for its whole
//! duration. The handle is owned by the operation and released when it goes
//! out of scope, so two operations never interleave on the same stream.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use super::stream::{BinaryReader, BinaryWriter, StreamError};

/// Buffered binary writer over a file
pub type FileWriter = BinaryWriter<BufWriter<File>>;

/// Buffered binary reader over a file
pub type FileReader = BinaryReader<BufReader<File>>;

/// Entry point for opening file-backed streams
pub struct FileStream;

impl FileStream {
    /// Create (or truncate) a file for writing
    pub fn create(path: impl AsRef<Path>) -> Result<FileWriter, StreamError> {
        let file = File::create(path.as_ref())?;
        log::debug!("Opened {} for writing", path.as_ref().display());
        Ok(BinaryWriter::new(BufWriter::new(file)))
    }

    /// Open an existing file for reading
    pub fn open(path: impl AsRef<Path>) -> Result<FileReader, StreamError> {
        let file = File::open(path.as_ref())?;
        log::debug!("Opened {} for reading", path.as_ref().display());
        Ok(BinaryReader::new(BufReader::new(file)))
    }
}

/// Whether `path` ends with `extension` (given with its leading dot, e.g. `".prefab"`)
pub fn has_extension(path: &Path, extension: &str) -> bool {
    let wanted = extension.trim_start_matches('.');
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted))
}

/// Append `extension` to `path` unless it already carries it
pub fn with_extension(path: &Path, extension: &str) -> PathBuf {
    if has_extension(path, extension) {
        path.to_path_buf()
    } else {
        let mut raw = path.as_os_str().to_os_string();
        raw.push(extension);
        PathBuf::from(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{StreamReader, StreamWriter};

    #[test]
    fn test_extension_helpers() {
        assert!(has_extension(Path::new("crate.prefab"), ".prefab"));
        assert!(has_extension(Path::new("dir/Crate.PREFAB"), ".prefab"));
        assert!(!has_extension(Path::new("crate.scene"), ".prefab"));
        assert!(!has_extension(Path::new("prefab"), ".prefab"));

        assert_eq!(with_extension(Path::new("a/crate"), ".prefab"), PathBuf::from("a/crate.prefab"));
        assert_eq!(with_extension(Path::new("crate.prefab"), ".prefab"), PathBuf::from("crate.prefab"));
        assert_eq!(with_extension(Path::new("crate.v2"), ".prefab"), PathBuf::from("crate.v2.prefab"));
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("values.bin");

        let mut writer = FileStream::create(&path).unwrap();
        writer.write_str("root").unwrap();
        writer.write_u32(7).unwrap();
        writer.finish().unwrap();

        let mut reader = FileStream::open(&path).unwrap();
        assert_eq!(reader.read_string().unwrap(), "root");
        assert_eq!(reader.read_u32().unwrap(), 7);
    }

    #[test]
    fn test_open_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(FileStream::open(dir.path().join("missing.bin")), Err(StreamError::Io(_))));
    }
}
