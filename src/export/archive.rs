use std::fs::File;
use std::io::{self, Cursor};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::ArchiveError;

/// In-memory ZIP bundle. Entries keep the order they are added in.
pub struct ZipBundle {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    entries: usize,
}

impl ZipBundle {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            entries: 0,
        }
    }

    /// Stream the file at `source` into a new entry called `entry_name`.
    pub fn add_file(&mut self, entry_name: &str, source: &Path) -> Result<(), ArchiveError> {
        let mut input = File::open(source).map_err(|source_err| ArchiveError::Read {
            path: source.to_path_buf(),
            source: source_err,
        })?;

        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);
        self.writer.start_file(entry_name, options)?;

        io::copy(&mut input, &mut self.writer).map_err(|source_err| ArchiveError::Read {
            path: source.to_path_buf(),
            source: source_err,
        })?;
        self.entries += 1;
        Ok(())
    }

    pub(crate) fn len(&self) -> usize {
        self.entries
    }

    /// Write the central directory and hand back the archive bytes.
    pub fn finish(self) -> Result<Vec<u8>, ArchiveError> {
        Ok(self.writer.finish()?.into_inner())
    }
}

impl Default for ZipBundle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::Read;

    use tempfile::tempdir;
    use zip::ZipArchive;

    use super::*;

    #[test]
    fn entries_keep_names_order_and_content() {
        let dir = tempdir().expect("failed to create temp dir");
        let first = dir.path().join("a.png");
        let second = dir.path().join("b.jpg");
        fs::write(&first, b"first image bytes").unwrap();
        fs::write(&second, vec![7u8; 4096]).unwrap();

        let mut bundle = ZipBundle::new();
        bundle.add_file("Vic1.png", &first).unwrap();
        bundle.add_file("Vic2.jpg", &second).unwrap();
        assert_eq!(bundle.len(), 2);
        let bytes = bundle.finish().expect("archive should finish");

        let mut archive = ZipArchive::new(Cursor::new(bytes)).expect("valid zip");
        assert_eq!(archive.len(), 2);

        let mut entry = archive.by_index(0).unwrap();
        assert_eq!(entry.name(), "Vic1.png");
        let mut content = Vec::new();
        entry.read_to_end(&mut content).unwrap();
        assert_eq!(content, b"first image bytes");
        drop(entry);

        let mut entry = archive.by_index(1).unwrap();
        assert_eq!(entry.name(), "Vic2.jpg");
        let mut content = Vec::new();
        entry.read_to_end(&mut content).unwrap();
        assert_eq!(content, vec![7u8; 4096]);
    }

    #[test]
    fn missing_source_reports_read_error() {
        let dir = tempdir().expect("failed to create temp dir");
        let mut bundle = ZipBundle::new();
        let err = bundle
            .add_file("x.png", &dir.path().join("gone.png"))
            .unwrap_err();
        assert!(matches!(err, ArchiveError::Read { .. }));
        assert_eq!(bundle.len(), 0);
    }
}
