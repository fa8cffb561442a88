use std::collections::BTreeMap;

/// Maps line-indices to the offset of the lines first byte. Unlike a full index of a file, it
/// only holds the lines that were selected, ordered by their line-index.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineIndex {
    inner: BTreeMap<usize, u64>,
}

impl LineIndex {
    /// Create a new, empty LineIndex
    #[inline]
    pub fn new() -> LineIndex {
        Self::default()
    }

    /// Adds `line` starting at `offset` to the index
    #[inline]
    pub fn insert(&mut self, line: usize, offset: u64) {
        self.inner.insert(line, offset);
    }

    /// Get the offset of `line` if it's part of the index
    #[inline]
    pub fn get(&self, line: usize) -> Option<u64> {
        self.inner.get(&line).copied()
    }

    /// Returns `true` if `line` is part of the index
    #[inline]
    pub fn contains(&self, line: usize) -> bool {
        self.inner.contains_key(&line)
    }

    /// Iterates over all `(line, offset)` pairs in ascending line order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (usize, u64)> + '_ {
        self.inner.iter().map(|(line, offset)| (*line, *offset))
    }

    /// Returns the lowest line in the index
    #[inline]
    pub fn first_line(&self) -> Option<usize> {
        self.inner.keys().next().copied()
    }

    /// Returns the highest line in the index
    #[inline]
    pub fn last_line(&self) -> Option<usize> {
        self.inner.keys().next_back().copied()
    }

    /// Returns the amount of lines in the index
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if the index is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Extend<(usize, u64)> for LineIndex {
    #[inline]
    fn extend<T: IntoIterator<Item = (usize, u64)>>(&mut self, iter: T) {
        self.inner.extend(iter);
    }
}

impl std::iter::FromIterator<(usize, u64)> for LineIndex {
    fn from_iter<T: IntoIterator<Item = (usize, u64)>>(iter: T) -> Self {
        let mut index = LineIndex::new();
        index.extend(iter);
        index
    }
}
