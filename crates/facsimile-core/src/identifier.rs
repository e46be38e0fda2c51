//! Identifier management using string interning for efficient string storage and comparison
//!
//! Every element of a diagram is addressed by an [`Id`]. Relations between
//! elements (parent, host, source, target, label target) are stored as ids, so
//! ids need to be cheap to copy, hash and compare.

use std::{
    fmt,
    sync::{Mutex, MutexGuard, OnceLock},
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner for element identifiers.
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

/// Interned element identifier.
///
/// # Examples
///
/// ```
/// use facsimile_core::identifier::Id;
///
/// let shape = Id::new("shape_a");
/// let same = Id::new("shape_a");
/// assert_eq!(shape, same);
///
/// let fresh = Id::sequential("shape", 3);
/// assert_eq!(fresh, "shape_3");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from &str.
    pub fn new(name: &str) -> Self {
        Self(interner().get_or_intern(name))
    }

    /// Creates an id of the form `{prefix}_{index}`.
    ///
    /// Used by element factories to hand out fresh ids for pasted elements.
    ///
    /// # Arguments
    ///
    /// * `prefix` - Kind prefix such as `shape` or `connection`.
    /// * `index` - Sequence number appended to the prefix.
    pub fn sequential(prefix: &str, index: usize) -> Self {
        Self::new(&format!("{prefix}_{index}"))
    }

    /// Returns an owned copy of the identifier string.
    pub fn to_name(self) -> String {
        interner()
            .resolve(self.0)
            .map(str::to_owned)
            .unwrap_or_default()
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_name())
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({:?})", self.to_name())
    }
}

impl std::str::FromStr for Id {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    /// Allows direct comparison with string slices: `id == "string"`
    fn eq(&self, other: &str) -> bool {
        interner().resolve(self.0) == Some(other)
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_name())
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::new(&name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let id1 = Id::new("shape");
        let id2 = Id::new("shape");
        let id3 = Id::new("connection");

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
        assert_eq!(id1, "shape");
    }

    #[test]
    fn test_sequential() {
        let id1 = Id::sequential("label", 0);
        let id2 = Id::sequential("label", 1);

        assert_ne!(id1, id2);
        assert_eq!(id1, "label_0");
        assert_eq!(Id::sequential("label", 0), id1);
    }

    #[test]
    fn test_display_and_debug() {
        let id = Id::new("display_test");
        assert_eq!(format!("{id}"), "display_test");
        assert_eq!(format!("{id:?}"), "Id(\"display_test\")");
    }

    #[test]
    fn test_from_and_from_str() {
        let id1: Id = "host".into();
        let id2: Id = "host".parse().unwrap();

        assert_eq!(id1, id2);
        assert!(id1 == "host");
        assert!(id1 != "attacher");
    }

    #[test]
    fn test_hash_and_eq() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        map.insert(Id::new("key1"), "value1");
        map.insert(Id::new("key2"), "value2");

        assert_eq!(map.get(&Id::new("key1")), Some(&"value1"));
        assert_eq!(map.len(), 2);
    }
}
