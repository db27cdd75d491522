//! Fuzz target for decoding arbitrary bytes as a zip archive.
//!
//! Run with: cargo +nightly fuzz run read_archive
//!
//! Decoding must either fail with an error or yield records whose content
//! reads fail cleanly. Neither path may panic.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(records) = ziprename::read_archive(data) else {
        return;
    };

    for record in &records {
        if record.is_directory {
            continue;
        }
        let _ = record.content.read();
    }

    // Whatever decoded must also survive indexing and planning
    let index = ziprename::SourceIndex::build(&records);
    assert!(index.len() <= records.len());
    let _ = ziprename::resolve(&records, &index);
});
