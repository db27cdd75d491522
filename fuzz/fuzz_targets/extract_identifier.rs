//! Fuzz target for identifier extraction on arbitrary paths.
//!
//! Run with: cargo +nightly fuzz run extract_identifier

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(path) = std::str::from_utf8(data) else {
        return;
    };

    if let Some(id) = ziprename::extract_identifier(path) {
        let base = ziprename::identifier::basename(path);
        assert!(!id.as_str().is_empty());
        assert!(id.as_str().bytes().all(|b| b.is_ascii_digit()));
        assert!(base.starts_with(id.as_str()));
        assert!(
            !base[id.as_str().len()..].starts_with(|c: char| c.is_ascii_digit()),
            "identifier is not the maximal digit run: {:?}",
            path
        );
    }
});
