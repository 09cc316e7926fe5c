//! Identifier management using string interning for efficient string storage and comparison
//!
//! This module provides the [`Id`] type used for element ids, column ids, node
//! names, node types and port names. Interning keeps these values `Copy` and
//! makes equality checks during reference resolution a symbol comparison.

use std::{
    fmt,
    sync::{Mutex, MutexGuard, OnceLock},
};

use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner for efficient identifier storage.
///
/// # Thread Safety
///
/// This uses `Mutex` for thread-safe access to the string interner.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn interner() -> MutexGuard<'static, DefaultStringInterner> {
    INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Efficient identifier type using string interning
///
/// # Examples
///
/// ```
/// use xstage_core::identifier::Id;
///
/// let drawing = Id::new("Drawing");
/// let peg = Id::new("Drawing-P");
///
/// assert_ne!(drawing, peg);
/// assert_eq!(drawing, "Drawing");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from &str, interning it if needed.
    ///
    /// # Arguments
    ///
    /// * `name` - The string representation of the identifier
    pub fn new(name: &str) -> Self {
        Self(interner().get_or_intern(name))
    }

    /// Returns the `Id` of an already interned string without interning it.
    ///
    /// Lookups with names that were never seen return `None`, which lets
    /// resolution code probe tables without growing the interner.
    ///
    /// # Examples
    ///
    /// ```
    /// use xstage_core::identifier::Id;
    ///
    /// let composite = Id::new("Composite");
    /// assert_eq!(Id::lookup("Composite"), Some(composite));
    /// assert_eq!(Id::lookup("never-interned-name"), None);
    /// ```
    pub fn lookup(name: &str) -> Option<Self> {
        interner().get(name).map(Self)
    }

    /// Runs `f` with the string value of this identifier.
    ///
    /// Avoids allocating when only a borrowed view is needed.
    pub fn with_str<R>(&self, f: impl FnOnce(&str) -> R) -> R {
        let interner = interner();
        let value = interner
            .resolve(self.0)
            .expect("Symbol should exist in interner");
        f(value)
    }

    /// Returns `true` if the identifier equals `other`, ignoring ASCII case.
    pub fn eq_ignore_ascii_case(&self, other: &str) -> bool {
        self.with_str(|value| value.eq_ignore_ascii_case(other))
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_str(|value| f.write_str(value))
    }
}

impl std::str::FromStr for Id {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Id {
    /// Creates an `Id` from a string slice
    ///
    /// This is a convenience implementation that calls `Id::new`.
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    /// Allows direct comparison with string slices: `id == "string"`
    fn eq(&self, other: &str) -> bool {
        self.with_str(|value| value == other)
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let id1 = Id::new("Peg");
        let id2 = Id::new("Peg");
        let id3 = Id::new("Composite");

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
        assert_eq!(id1, "Peg");
    }

    #[test]
    fn test_lookup_does_not_intern() {
        assert_eq!(Id::lookup("identifier-test-unseen-name"), None);

        let id = Id::new("identifier-test-seen-name");
        assert_eq!(Id::lookup("identifier-test-seen-name"), Some(id));
    }

    #[test]
    fn test_display_trait() {
        let id = Id::new("display_test");
        assert_eq!(format!("{}", id), "display_test");
        assert_eq!(id.to_string(), "display_test");
    }

    #[test]
    fn test_with_str() {
        let id = Id::new("Group-1");
        assert_eq!(id.with_str(str::len), 7);
    }

    #[test]
    fn test_eq_ignore_ascii_case() {
        let id = Id::new("GROUP");
        assert!(id.eq_ignore_ascii_case("group"));
        assert!(id.eq_ignore_ascii_case("Group"));
        assert!(!id.eq_ignore_ascii_case("PEG"));
    }

    #[test]
    fn test_hash_and_eq() {
        use std::collections::HashMap;

        let id1 = Id::new("key1");
        let id2 = Id::new("key1");
        let id3 = Id::new("key2");

        let mut map = HashMap::new();
        map.insert(id1, "value1");
        map.insert(id3, "value2");

        assert_eq!(map.get(&id2), Some(&"value1"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_partial_eq_str() {
        let id = Id::new("Drawing");

        assert!(id == "Drawing");
        assert!(id != "drawing");

        let empty = Id::new("");
        assert!(empty == "");
        assert!(empty != "non-empty");

        let name = String::from("Drawing");
        assert!(id == name.as_str());
    }
}
