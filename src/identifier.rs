//! Numeric identifiers embedded at the start of file names.
//!
//! An identifier is the run of ASCII decimal digits at the very start of an
//! entry's base name (the segment after the last `/`). It is the join key
//! between the source and target archives:
//!
//! | Path | Identifier |
//! |------|------------|
//! | `03_report.txt` | `03` |
//! | `docs/0012x.pdf` | `0012` |
//! | `12` | `12` |
//! | `report.txt` | none |
//! | `2024/notes.txt` | none (digits are only looked for in the base name) |
//!
//! Leading zeros are significant: `"01"` and `"1"` are different identifiers.

use std::borrow::Borrow;
use std::fmt;

/// A non-empty string of ASCII decimal digits taken from a file's base name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identifier(String);

impl Identifier {
    /// Returns the identifier as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Identifier {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Returns the base name of an archive path: everything after the last `/`.
///
/// A path without any `/` is its own base name. A path ending in `/` has an
/// empty base name.
pub fn basename(path: &str) -> &str {
    match path.rfind('/') {
        Some(pos) => &path[pos + 1..],
        None => path,
    }
}

/// Extracts the leading-digit identifier from an archive path.
///
/// Returns `None` when the base name does not start with a digit. This never
/// fails; a missing identifier is an ordinary outcome.
///
/// # Examples
///
/// ```
/// use ziprename::extract_identifier;
///
/// assert_eq!(extract_identifier("03_report.txt").unwrap().as_str(), "03");
/// assert_eq!(extract_identifier("a/b/0012x.pdf").unwrap().as_str(), "0012");
/// assert!(extract_identifier("report.txt").is_none());
/// ```
pub fn extract_identifier(path: &str) -> Option<Identifier> {
    let name = basename(path);
    // ASCII digits are single bytes, so the count is also a byte offset
    let len = name.bytes().take_while(u8::is_ascii_digit).count();
    if len == 0 {
        None
    } else {
        Some(Identifier(name[..len].to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(path: &str) -> Option<String> {
        extract_identifier(path).map(|i| i.as_str().to_string())
    }

    #[test]
    fn test_leading_digits() {
        assert_eq!(id("03_report.txt").as_deref(), Some("03"));
        assert_eq!(id("12").as_deref(), Some("12"));
        assert_eq!(id("0012x.pdf").as_deref(), Some("0012"));
        assert_eq!(id("7"), Some("7".to_string()));
    }

    #[test]
    fn test_no_leading_digits() {
        assert_eq!(id("report.txt"), None);
        assert_eq!(id("_01.txt"), None);
        assert_eq!(id(""), None);
        assert_eq!(id(" 01.txt"), None);
    }

    #[test]
    fn test_only_basename_is_considered() {
        assert_eq!(id("2024/notes.txt"), None);
        assert_eq!(id("a/b/05-final.doc").as_deref(), Some("05"));
        assert_eq!(id("dir/"), None);
        assert_eq!(id("99/"), None);
    }

    #[test]
    fn test_non_ascii_digits_are_not_identifiers() {
        // Arabic-Indic digit one
        assert_eq!(id("\u{0661}.txt"), None);
        assert_eq!(id("1\u{0662}.txt").as_deref(), Some("1"));
    }

    #[test]
    fn test_basename() {
        assert_eq!(basename("a/b/c.txt"), "c.txt");
        assert_eq!(basename("c.txt"), "c.txt");
        assert_eq!(basename("a/"), "");
    }

    #[test]
    fn test_borrow_as_str_for_map_lookups() {
        let mut map = std::collections::HashMap::new();
        map.insert(extract_identifier("01_a.txt").unwrap(), "x");
        assert_eq!(map.get("01"), Some(&"x"));
    }
}
