//! Property-based tests using proptest.
//!
//! These tests verify invariants of identifier extraction, source indexing
//! and archive writing using randomly generated inputs.

mod common;

use std::collections::HashMap;

use proptest::prelude::*;
use ziprename::{
    ArchiveRecord, Resolution, ResolvedEntry, SourceIndex, WriteOptions, extract_identifier,
    write_archive,
};

/// Strategy for generating archive paths, some with leading digits.
fn path_strategy() -> impl Strategy<Value = String> {
    (
        proptest::collection::vec("[a-z]{1,5}", 0..3),
        "[0-9]{0,4}",
        "[a-z_.]{0,6}",
    )
        .prop_map(|(dirs, digits, rest)| {
            let mut name = format!("{}{}", digits, rest);
            if name.is_empty() {
                name.push('f');
            }
            let mut path = dirs.join("/");
            if !path.is_empty() {
                path.push('/');
            }
            path.push_str(&name);
            path
        })
}

proptest! {
    /// The identifier is exactly the maximal leading digit run of the base name.
    #[test]
    fn identifier_is_maximal_leading_digit_run(
        dirs in "([a-z0-9]{1,4}/){0,3}",
        digits in "[0-9]{0,6}",
        rest in "([a-zA-Z_.-][a-zA-Z0-9_.-]{0,8})?",
    ) {
        let path = format!("{}{}{}", dirs, digits, rest);
        match extract_identifier(&path) {
            Some(id) => prop_assert_eq!(id.as_str(), digits.as_str()),
            None => prop_assert!(digits.is_empty()),
        }
    }

    /// Identifier extraction never panics, whatever the input.
    #[test]
    fn identifier_never_panics(path in "\\PC*") {
        let _ = extract_identifier(&path);
    }

    /// The index maps each identifier to the last path that carried it.
    #[test]
    fn index_is_last_write_wins(paths in proptest::collection::vec(path_strategy(), 0..30)) {
        let records: Vec<ArchiveRecord> = paths
            .iter()
            .map(|p| ArchiveRecord::file(p.clone(), Vec::new()))
            .collect();
        let index = SourceIndex::build(&records);

        let mut expected: HashMap<String, String> = HashMap::new();
        for path in &paths {
            if let Some(id) = extract_identifier(path) {
                expected.insert(id.as_str().to_string(), path.clone());
            }
        }

        prop_assert_eq!(index.len(), expected.len());
        for (id, path) in &expected {
            prop_assert_eq!(index.get(id), Some(path.as_str()));
        }
    }

    /// Decoding the written archive yields the last content supplied for each
    /// path, at the position where the path first appeared.
    #[test]
    fn writer_keeps_last_content_per_path(
        items in proptest::collection::vec(
            ("[a-c]{1,2}", proptest::collection::vec(any::<u8>(), 0..64)),
            0..20,
        )
    ) {
        let entries: Vec<ResolvedEntry> = items
            .iter()
            .map(|(path, content)| ResolvedEntry {
                original_path: path.clone(),
                output_path: format!("{}.bin", path),
                resolution: Resolution::NoIdentifier,
                content: content.clone(),
            })
            .collect();

        let mut order: Vec<String> = Vec::new();
        let mut last: HashMap<String, Vec<u8>> = HashMap::new();
        for entry in &entries {
            if !last.contains_key(&entry.output_path) {
                order.push(entry.output_path.clone());
            }
            last.insert(entry.output_path.clone(), entry.content.clone());
        }
        let expected: Vec<(String, Vec<u8>)> = order
            .into_iter()
            .map(|p| {
                let content = last[&p].clone();
                (p, content)
            })
            .collect();

        let result = write_archive(&entries, &WriteOptions::default()).unwrap();
        prop_assert_eq!(common::contents(&result.bytes), expected);
        prop_assert_eq!(result.entries_overwritten, entries.len() - result.entries_written);
    }
}
