//! Identifier to source path lookup table.

use std::collections::HashMap;

use crate::identifier::Identifier;
use crate::read::ArchiveRecord;

/// Mapping from [`Identifier`] to the full path of a source archive file.
///
/// Built from the source archive's records in native order. When several
/// files share an identifier, the last one encountered wins. Iteration
/// follows first-insertion order of each identifier.
#[derive(Debug, Clone, Default)]
pub struct SourceIndex {
    entries: Vec<(Identifier, String)>,
    positions: HashMap<Identifier, usize>,
    replaced: usize,
}

impl SourceIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index from source archive records.
    ///
    /// Directory records and files without an identifier are skipped.
    pub fn build(records: &[ArchiveRecord]) -> Self {
        let mut index = Self::new();
        for record in records.iter().filter(|r| !r.is_directory) {
            if let Some(id) = record.identifier() {
                index.insert(id, record.path.clone());
            }
        }
        log::debug!(
            "Built source index with {} identifiers from {} records",
            index.len(),
            records.len()
        );
        index
    }

    /// Sets the path for an identifier, replacing any previous path.
    ///
    /// Returns the replaced path, if any.
    pub fn insert(&mut self, id: Identifier, path: String) -> Option<String> {
        if let Some(&pos) = self.positions.get(&id) {
            let previous = std::mem::replace(&mut self.entries[pos].1, path);
            log::warn!(
                "Duplicate source identifier {}: '{}' replaces '{}'",
                id,
                self.entries[pos].1,
                previous
            );
            self.replaced += 1;
            return Some(previous);
        }
        self.positions.insert(id.clone(), self.entries.len());
        self.entries.push((id, path));
        None
    }

    /// Looks up the source path for an identifier.
    pub fn get(&self, id: &str) -> Option<&str> {
        self.positions
            .get(id)
            .map(|&pos| self.entries[pos].1.as_str())
    }

    /// Returns `true` if the identifier is present.
    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    /// Returns the number of distinct identifiers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the index holds no identifiers.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of insertions that replaced an earlier path.
    pub fn replaced(&self) -> usize {
        self.replaced
    }

    /// Iterates over `(identifier, path)` pairs in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Identifier, &str)> {
        self.entries.iter().map(|(id, path)| (id, path.as_str()))
    }
}
