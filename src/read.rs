//! Decoding zip archives into ordered entry records.
//!
//! [`read_archive`] decodes the central directory of an in-memory zip archive
//! and returns one [`ArchiveRecord`] per entry, in the archive's native order.
//! Entry contents are not decompressed up front: each record carries a lazy
//! [`ContentHandle`] that is materialized on demand.
//!
//! # Example
//!
//! ```rust,no_run
//! use ziprename::read_archive;
//!
//! let bytes = std::fs::read("photos.zip")?;
//! for record in read_archive(&bytes)?.iter().filter(|r| !r.is_directory) {
//!     let data = record.content.read()?;
//!     println!("{}: {} bytes", record.path, data.len());
//! }
//! # Ok::<(), ziprename::Error>(())
//! ```

use std::fmt;
use std::io::{Cursor, Read};
use std::sync::Arc;

use zip::ZipArchive;

use crate::identifier::{Identifier, extract_identifier};
use crate::{Error, Result};

type SharedZip = ZipArchive<Cursor<Arc<[u8]>>>;

/// Upper bound on the buffer reserved before an entry is decompressed.
const MAX_PREALLOC: u64 = 1 << 20;

/// Deflate cannot expand data by more than about 1032:1.
const MAX_EXPANSION_RATIO: u64 = 1032;

#[derive(Clone)]
enum ContentSource {
    Zip {
        archive: SharedZip,
        index: usize,
        name: Arc<str>,
    },
    Memory(Arc<[u8]>),
}

/// Handle to the content of an archive entry.
///
/// Cloning is cheap: handles decoded from an archive share the archive bytes
/// and the parsed central directory.
#[derive(Clone)]
pub struct ContentHandle {
    source: ContentSource,
}

impl ContentHandle {
    /// Creates a handle over bytes that are already in memory.
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self {
            source: ContentSource::Memory(Arc::from(data.into())),
        }
    }

    /// Materializes the content.
    ///
    /// For entries of a decoded archive this decompresses the entry and
    /// verifies its CRC-32.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ContentRead`] if the entry cannot be located,
    /// decompressed or verified.
    pub fn read(&self) -> Result<Vec<u8>> {
        match &self.source {
            ContentSource::Memory(data) => Ok(data.to_vec()),
            ContentSource::Zip {
                archive,
                index,
                name,
            } => {
                // ZipArchive::by_index needs &mut; the clone only copies the reader position
                let mut archive = archive.clone();
                let mut file = archive
                    .by_index(*index)
                    .map_err(|e| Error::content_read(name, e))?;
                // Declared sizes are untrusted; they only bound the initial hint
                let hint = file
                    .size()
                    .min(file.compressed_size().saturating_mul(MAX_EXPANSION_RATIO))
                    .min(MAX_PREALLOC);
                let mut data = Vec::with_capacity(hint as usize);
                file.read_to_end(&mut data)
                    .map_err(|e| Error::content_read(name, e))?;
                data.shrink_to_fit();
                Ok(data)
            }
        }
    }
}

impl fmt::Debug for ContentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            ContentSource::Zip { index, name, .. } => f
                .debug_struct("ContentHandle")
                .field("entry", index)
                .field("name", name)
                .finish(),
            ContentSource::Memory(data) => f
                .debug_struct("ContentHandle")
                .field("bytes", &data.len())
                .finish(),
        }
    }
}

/// A single entry of a decoded archive.
#[derive(Debug, Clone)]
pub struct ArchiveRecord {
    /// Full slash-separated path of the entry inside the archive.
    pub path: String,
    /// Whether the entry is a directory marker.
    pub is_directory: bool,
    /// Handle to the entry content. Only meaningful for files.
    pub content: ContentHandle,
}

impl ArchiveRecord {
    /// Creates a file record with in-memory content.
    pub fn file(path: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            is_directory: false,
            content: ContentHandle::from_bytes(data),
        }
    }

    /// Creates a directory record.
    pub fn directory(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_directory: true,
            content: ContentHandle::from_bytes(Vec::new()),
        }
    }

    /// Returns the leading-digit identifier of this record's base name.
    pub fn identifier(&self) -> Option<Identifier> {
        extract_identifier(&self.path)
    }
}

/// Decodes zip archive bytes into records in native entry order.
///
/// Directory entries are included and flagged; callers decide whether to skip
/// them. Content is decoded lazily through [`ContentHandle::read`].
///
/// # Errors
///
/// Returns [`Error::InvalidArchive`] if the bytes are not a readable zip
/// archive.
pub fn read_archive(bytes: &[u8]) -> Result<Vec<ArchiveRecord>> {
    read_shared(Arc::from(bytes))
}

/// Like [`read_archive`], but takes ownership of already shared bytes
/// without copying them.
pub fn read_shared(bytes: Arc<[u8]>) -> Result<Vec<ArchiveRecord>> {
    let archive = ZipArchive::new(Cursor::new(bytes)).map_err(Error::invalid_archive)?;
    let mut records = Vec::with_capacity(archive.len());

    let mut scan = archive.clone();
    for index in 0..scan.len() {
        // Raw access reads only the local header, not the compressed stream
        let entry = scan.by_index_raw(index).map_err(Error::invalid_archive)?;
        let path = entry.name().to_string();
        let is_directory = entry.is_dir();
        drop(entry);

        records.push(ArchiveRecord {
            content: ContentHandle {
                source: ContentSource::Zip {
                    archive: archive.clone(),
                    index,
                    name: Arc::from(path.as_str()),
                },
            },
            path,
            is_directory,
        });
    }

    log::debug!(
        "Decoded archive with {} entries ({} files)",
        records.len(),
        records.iter().filter(|r| !r.is_directory).count()
    );
    Ok(records)
}

/// Sorted listing of the file paths in an archive.
///
/// Directory entries are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveListing {
    files: Vec<String>,
}

impl ArchiveListing {
    /// Builds a listing from decoded records.
    pub fn from_records(records: &[ArchiveRecord]) -> Self {
        let mut files: Vec<String> = records
            .iter()
            .filter(|r| !r.is_directory)
            .map(|r| r.path.clone())
            .collect();
        files.sort();
        Self { files }
    }

    /// Returns the sorted file paths.
    pub fn files(&self) -> &[String] {
        &self.files
    }

    /// Returns the number of files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if the archive holds no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn make_zip(entries: &[(&str, Option<&[u8]>)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        for (name, data) in entries {
            match data {
                Some(data) => {
                    writer.start_file(*name, options).unwrap();
                    writer.write_all(data).unwrap();
                }
                None => writer.add_directory(*name, options).unwrap(),
            }
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_read_preserves_native_order() {
        let bytes = make_zip(&[
            ("b.txt", Some(b"b".as_slice())),
            ("dir/", None),
            ("dir/a.txt", Some(b"a".as_slice())),
            ("c.txt", Some(b"c".as_slice())),
        ]);
        let records = read_archive(&bytes).unwrap();
        let paths: Vec<&str> = records.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, ["b.txt", "dir/", "dir/a.txt", "c.txt"]);
        assert!(records[1].is_directory);
        assert!(!records[2].is_directory);
    }

    #[test]
    fn test_content_is_lazy_and_exact() {
        let bytes = make_zip(&[("01.bin", Some([0u8, 1, 2, 255].as_slice()))]);
        let records = read_archive(&bytes).unwrap();
        assert_eq!(records[0].content.read().unwrap(), vec![0u8, 1, 2, 255]);
        // Reading twice yields the same bytes
        assert_eq!(records[0].content.read().unwrap(), vec![0u8, 1, 2, 255]);
    }

    #[test]
    fn test_invalid_bytes() {
        let err = read_archive(b"this is not a zip archive").unwrap_err();
        assert!(matches!(err, Error::InvalidArchive { .. }));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(
            read_archive(&[]),
            Err(Error::InvalidArchive { .. })
        ));
    }

    #[test]
    fn test_empty_archive() {
        let bytes = make_zip(&[]);
        assert!(read_archive(&bytes).unwrap().is_empty());
    }

    #[test]
    fn test_listing_sorted_without_directories() {
        let bytes = make_zip(&[
            ("z.txt", Some(b"z".as_slice())),
            ("a/", None),
            ("a/01.txt", Some(b"1".as_slice())),
        ]);
        let listing = ArchiveListing::from_records(&read_archive(&bytes).unwrap());
        assert_eq!(listing.files(), ["a/01.txt", "z.txt"]);
        assert_eq!(listing.len(), 2);
    }

    #[test]
    fn test_declared_size_does_not_drive_allocation() {
        let mut bytes = make_zip(&[
            ("01.txt", Some(b"abc".as_slice())),
            ("02.txt", Some(b"def".as_slice())),
        ]);
        // Inflate the uncompressed size of every central directory header
        let mut pos = 0;
        while let Some(offset) = bytes[pos..].windows(4).position(|w| w == b"PK\x01\x02") {
            let header = pos + offset;
            bytes[header + 24..header + 28].copy_from_slice(&0xFFFF_FFF0u32.to_le_bytes());
            pos = header + 4;
        }

        let records = read_archive(&bytes).unwrap();
        for (record, expected) in records.iter().zip([b"abc", b"def"]) {
            let data = record.content.read().unwrap();
            assert_eq!(data, expected);
            assert!(data.capacity() < 1024, "capacity {}", data.capacity());
        }
    }

    #[test]
    fn test_memory_records() {
        let record = ArchiveRecord::file("x/02_old.txt", b"data".to_vec());
        assert_eq!(record.identifier().unwrap().as_str(), "02");
        assert_eq!(record.content.read().unwrap(), b"data");
        assert!(ArchiveRecord::directory("x/").is_directory);
    }
}
