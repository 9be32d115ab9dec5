//! String interning for identifiers and string literals.
//!
//! Interned strings are compared and hashed by a stable `u32` index; the
//! content hash is computed once at interning time and memoized. The pool
//! is scoped to one pipeline: identifiers from different pipelines must
//! never be compared by index.

use std::hash::{Hash, Hasher};

use rustc_hash::{FxHashMap, FxHasher};

/// An interned string, identified by its index into the [`Interner`].
///
/// Two identifiers from the same pool are equal iff their indices are
/// equal. Resolving the text or the memoized hash goes through the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(u32);

impl Identifier {
    pub fn index(self) -> u32 {
        self.0
    }
}

/// The string pool.
///
/// Lookup is hash-first: the map is keyed by the content hash, and hash
/// collisions fall back to a content comparison against each candidate.
#[derive(Debug, Default)]
pub struct Interner {
    strings: Vec<(String, u64)>,
    by_hash: FxHashMap<u64, Vec<u32>>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string, returning the existing identifier when the content
    /// was seen before.
    pub fn intern(&mut self, text: &str) -> Identifier {
        let hash = content_hash(text);
        if let Some(candidates) = self.by_hash.get(&hash) {
            for &index in candidates {
                if self.strings[index as usize].0 == text {
                    return Identifier(index);
                }
            }
        }
        self.insert(text.to_owned(), hash)
    }

    /// Intern a string known to be absent from the pool.
    ///
    /// Skips the lookup step. Reserved for compiler-generated names that
    /// are guaranteed fresh; using it for a symbol that might already be
    /// present breaks identifier equality.
    pub fn fresh(&mut self, text: String) -> Identifier {
        let hash = content_hash(&text);
        self.insert(text, hash)
    }

    fn insert(&mut self, text: String, hash: u64) -> Identifier {
        let index = self.strings.len() as u32;
        self.strings.push((text, hash));
        self.by_hash.entry(hash).or_default().push(index);
        Identifier(index)
    }

    /// The text of an interned identifier.
    pub fn view(&self, id: Identifier) -> &str {
        &self.strings[id.0 as usize].0
    }

    /// The memoized content hash of an interned identifier.
    pub fn hash(&self, id: Identifier) -> u64 {
        self.strings[id.0 as usize].1
    }

    /// Number of distinct strings in the pool.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

fn content_hash(text: &str) -> u64 {
    let mut hasher = FxHasher::default();
    text.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_content_equal_identifier() {
        let mut pool = Interner::new();
        let a = pool.intern("loop");
        let b = pool.intern("loop");
        assert_eq!(a, b);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn distinct_content_distinct_identifier() {
        let mut pool = Interner::new();
        let a = pool.intern("x");
        let b = pool.intern("y");
        assert_ne!(a, b);
    }

    #[test]
    fn view_round_trips() {
        let mut pool = Interner::new();
        let id = pool.intern("vector");
        assert_eq!(pool.view(id), "vector");
        assert_eq!(pool.intern("vector"), id);
    }

    #[test]
    fn hash_is_content_hash() {
        let mut pool = Interner::new();
        let a = pool.intern("same");
        let h = pool.hash(a);
        let mut other = Interner::new();
        let b = other.intern("same");
        assert_eq!(h, other.hash(b));
    }

    #[test]
    fn fresh_skips_lookup() {
        let mut pool = Interner::new();
        let a = pool.fresh("$tmp0".to_owned());
        let b = pool.fresh("$tmp1".to_owned());
        assert_ne!(a, b);
        assert_eq!(pool.view(a), "$tmp0");
    }
}
