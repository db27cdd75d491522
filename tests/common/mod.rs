//! Shared test utilities for integration tests.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;

/// Creates an in-memory zip archive with stored (uncompressed) entries.
///
/// Entries are written in the given order. A name ending in `/` creates a
/// directory entry and its data is ignored.
pub fn create_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    create_zip_with_method(entries, zip::CompressionMethod::Stored)
}

/// Creates an in-memory zip archive with deflated entries.
#[cfg(feature = "deflate")]
pub fn create_deflated_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    create_zip_with_method(entries, zip::CompressionMethod::Deflated)
}

fn create_zip_with_method(entries: &[(&str, &[u8])], method: zip::CompressionMethod) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(method);
    for (name, data) in entries {
        if name.ends_with('/') {
            writer
                .add_directory(*name, options)
                .expect("Failed to add directory");
        } else {
            writer.start_file(*name, options).expect("Failed to start file");
            writer.write_all(data).expect("Failed to write data");
        }
    }
    writer
        .finish()
        .expect("Failed to finish archive")
        .into_inner()
}

/// Flips the first byte of `needle` inside the archive bytes.
///
/// With stored entries the needle is the raw entry content, so the archive
/// stays structurally valid but the entry fails CRC verification on read.
pub fn corrupt_content(archive: &mut [u8], needle: &[u8]) {
    let pos = archive
        .windows(needle.len())
        .position(|w| w == needle)
        .expect("needle not found in archive");
    archive[pos] ^= 0xFF;
}

/// Decodes an archive into `(path, content)` pairs in archive order.
pub fn contents(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
    ziprename::read_archive(bytes)
        .expect("Failed to read archive")
        .into_iter()
        .map(|r| {
            let data = r.content.read().expect("Failed to read entry");
            (r.path, data)
        })
        .collect()
}

/// Builds owned `(path, content)` pairs for comparisons.
pub fn pairs(entries: &[(&str, &[u8])]) -> Vec<(String, Vec<u8>)> {
    entries
        .iter()
        .map(|(p, d)| (p.to_string(), d.to_vec()))
        .collect()
}
