//! A compact, immutable-by-convention set over `{0, 1, ..., N-1}`.
//!
//! Backed by a growable bitset rather than `Vec<bool>` or a `HashSet` — the
//! sets this engine builds (one per reachable schedule state) are numerous
//! and short-lived, so a tight, easily-cloned representation matters more
//! than O(1) iteration order.

use std::fmt;
use std::hash::{Hash, Hasher};

const BITS: usize = u64::BITS as usize;

#[derive(Clone, Debug, Default)]
pub struct IndexSet {
    words: Vec<u64>,
}

impl IndexSet {
    pub fn new() -> Self {
        IndexSet { words: Vec::new() }
    }

    pub fn singleton(index: usize) -> Self {
        let mut set = Self::new();
        set.insert(index);
        set
    }

    pub fn from_indices(indices: impl IntoIterator<Item = usize>) -> Self {
        let mut set = Self::new();
        for i in indices {
            set.insert(i);
        }
        set
    }

    pub fn insert(&mut self, index: usize) {
        let (word, bit) = (index / BITS, index % BITS);
        if self.words.len() <= word {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1u64 << bit;
    }

    /// Returns a copy of `self` with `index` added, leaving `self` untouched.
    pub fn inserted(&self, index: usize) -> Self {
        let mut copy = self.clone();
        copy.insert(index);
        copy
    }

    pub fn contains(&self, index: usize) -> bool {
        let (word, bit) = (index / BITS, index % BITS);
        self.words
            .get(word)
            .is_some_and(|w| w & (1u64 << bit) != 0)
    }

    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    pub fn union(&self, other: &IndexSet) -> IndexSet {
        let len = self.words.len().max(other.words.len());
        let mut words = Vec::with_capacity(len);
        for i in 0..len {
            let a = self.words.get(i).copied().unwrap_or(0);
            let b = other.words.get(i).copied().unwrap_or(0);
            words.push(a | b);
        }
        IndexSet { words }
    }

    /// `true` iff every member of `other` is also a member of `self`.
    pub fn includes(&self, other: &IndexSet) -> bool {
        other
            .words
            .iter()
            .enumerate()
            .all(|(i, &w)| w & !self.words.get(i).copied().unwrap_or(0) == 0)
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(word_idx, &word)| {
            (0..BITS).filter_map(move |bit| {
                if word & (1u64 << bit) != 0 {
                    Some(word_idx * BITS + bit)
                } else {
                    None
                }
            })
        })
    }
}

impl PartialEq for IndexSet {
    fn eq(&self, other: &Self) -> bool {
        let len = self.words.len().max(other.words.len());
        (0..len).all(|i| {
            self.words.get(i).copied().unwrap_or(0) == other.words.get(i).copied().unwrap_or(0)
        })
    }
}

impl Eq for IndexSet {}

impl Hash for IndexSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Hash by set membership, not by raw word length, so that two sets
        // differing only by trailing all-zero words hash identically.
        for idx in self.iter() {
            idx.hash(state);
        }
    }
}

impl FromIterator<usize> for IndexSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self::from_indices(iter)
    }
}

impl fmt::Display for IndexSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        let mut first = true;
        for idx in self.iter() {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{idx}")?;
            first = false;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_contains() {
        let mut s = IndexSet::new();
        s.insert(0);
        s.insert(63);
        s.insert(64);
        assert!(s.contains(0));
        assert!(s.contains(63));
        assert!(s.contains(64));
        assert!(!s.contains(1));
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn union_and_includes() {
        let a = IndexSet::from_indices([0, 2, 4]);
        let b = IndexSet::from_indices([4, 6]);
        let u = a.union(&b);
        assert!(u.includes(&a));
        assert!(u.includes(&b));
        assert!(!a.includes(&b));
    }

    #[test]
    fn equality_ignores_trailing_zero_words() {
        let mut a = IndexSet::new();
        a.insert(10);
        let mut b = a.clone();
        b.words.push(0); // pad with an extra all-zero word
        b.words.push(0);
        assert_eq!(a, b);
        assert_eq!(a.len(), b.len());
    }

    #[test]
    fn empty_set_is_empty() {
        let s = IndexSet::new();
        assert!(s.is_empty());
        assert_eq!(s.len(), 0);
    }
}
