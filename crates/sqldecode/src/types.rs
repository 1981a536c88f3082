//! # Common Types

cfg_if::cfg_if! {
    if #[cfg(feature = "ahash")] {
        /// Type Alias for hash maps in this crate.
        pub type SDHashMap<K, V> = ahash::AHashMap<K, V>;

        /// Create a new empty hash map.
        pub fn hash_map_new<K, V>() -> SDHashMap<K, V> {
            SDHashMap::new()
        }

        /// Type Alias for hash sets in this crate.
        pub type SDHashSet<V> = ahash::AHashSet<V>;

        /// Create a new empty hash set.
        pub fn hash_set_new<V>() -> SDHashSet<V> {
            SDHashSet::new()
        }
    } else {
        /// Type Alias for hash maps in this crate.
        pub type SDHashMap<K, V> = std::collections::HashMap<K, V>;

        /// Create a new empty hash map.
        pub fn hash_map_new<K, V>() -> SDHashMap<K, V> {
            SDHashMap::new()
        }

        /// Type Alias for hash sets in this crate.
        pub type SDHashSet<V> = std::collections::HashSet<V>;

        /// Create a new empty hash set.
        pub fn hash_set_new<V>() -> SDHashSet<V> {
            SDHashSet::new()
        }
    }
}

/// An inclusive `[start, end]` token span.
///
/// ## Style Hints
/// Instance names should prefer `span`, or `value_span`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(into = "[usize; 2]", from = "[usize; 2]")]
pub struct TokenSpan {
    /// First token index.
    pub start: usize,

    /// Last token index (inclusive).
    pub end: usize,
}

impl TokenSpan {
    /// Construct a new span.
    pub fn new(
        start: usize,
        end: usize,
    ) -> Self {
        Self { start, end }
    }

    /// Number of tokens covered; zero for an inverted span.
    pub fn len(&self) -> usize {
        if self.end < self.start {
            0
        } else {
            self.end - self.start + 1
        }
    }

    /// Is the span inverted?
    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

impl From<[usize; 2]> for TokenSpan {
    fn from([start, end]: [usize; 2]) -> Self {
        Self { start, end }
    }
}

impl From<TokenSpan> for [usize; 2] {
    fn from(span: TokenSpan) -> Self {
        [span.start, span.end]
    }
}

impl From<(usize, usize)> for TokenSpan {
    fn from((start, end): (usize, usize)) -> Self {
        Self { start, end }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_span() {
        let span = TokenSpan::new(2, 4);
        assert_eq!(span.len(), 3);
        assert!(!span.is_empty());

        let span = TokenSpan::new(4, 2);
        assert_eq!(span.len(), 0);
        assert!(span.is_empty());
    }

    #[test]
    fn test_token_span_json() {
        let span = TokenSpan::new(1, 3);
        let json = serde_json::to_string(&span).unwrap();
        assert_eq!(json, "[1,3]");

        let back: TokenSpan = serde_json::from_str(&json).unwrap();
        assert_eq!(back, span);
    }

    #[test]
    fn test_hash_aliases() {
        let mut m: SDHashMap<&str, usize> = hash_map_new();
        m.insert("a", 1);
        assert_eq!(m["a"], 1);

        let mut s: SDHashSet<String> = hash_set_new();
        assert!(s.insert("x".to_string()));
        assert!(!s.insert("x".to_string()));
    }
}
