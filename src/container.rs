//! Destinations for emitted assets.
//!
//! The exporter writes every binary asset through an [`AssetSink`] and the
//! manifest last. Paths are container-relative and use `/` separators.

use std::{
    collections::{BTreeMap, HashSet},
    fs,
    io::{Cursor, Write},
    path::Path,
};

use zip::{CompressionMethod, DateTime, ZipWriter, write::SimpleFileOptions};

use crate::error::ExportError;

pub trait AssetSink {
    /// Stores `bytes` under `path`. Writing one path twice is an error.
    fn write(&mut self, path: &str, bytes: &[u8]) -> Result<(), ExportError>;

    fn contains(&self, path: &str) -> bool;
}

/// Keeps assets in a sorted map.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(Vec::as_slice)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn into_files(self) -> BTreeMap<String, Vec<u8>> {
        self.files
    }
}

impl AssetSink for MemorySink {
    fn write(&mut self, path: &str, bytes: &[u8]) -> Result<(), ExportError> {
        if self.files.contains_key(path) {
            return Err(ExportError::DuplicateAssetPath {
                path: path.to_string(),
            });
        }
        self.files.insert(path.to_string(), bytes.to_vec());
        Ok(())
    }

    fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }
}

/// Builds a deflated ZIP archive in memory.
///
/// Entries carry a fixed timestamp so identical input yields identical
/// archive bytes. Nothing touches the filesystem until [`ArchiveSink::persist`].
pub struct ArchiveSink {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    written: HashSet<String>,
    options: SimpleFileOptions,
}

impl ArchiveSink {
    pub fn new() -> Self {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default())
            .unix_permissions(0o644);
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            written: HashSet::new(),
            options,
        }
    }

    /// Finishes the central directory and returns the archive bytes.
    pub fn finish(self) -> Result<Vec<u8>, ExportError> {
        let cursor = self.writer.finish()?;
        Ok(cursor.into_inner())
    }

    /// Finishes the archive and writes it to `path` in one step.
    pub fn persist(self, path: &Path) -> Result<(), ExportError> {
        let bytes = self.finish()?;
        fs::write(path, bytes)?;
        Ok(())
    }
}

impl Default for ArchiveSink {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetSink for ArchiveSink {
    fn write(&mut self, path: &str, bytes: &[u8]) -> Result<(), ExportError> {
        if !self.written.insert(path.to_string()) {
            return Err(ExportError::DuplicateAssetPath {
                path: path.to_string(),
            });
        }
        self.writer.start_file(path, self.options)?;
        self.writer.write_all(bytes)?;
        log::debug!("archived {} ({} bytes)", path, bytes.len());
        Ok(())
    }

    fn contains(&self, path: &str) -> bool {
        self.written.contains(path)
    }
}
