//! Visiting nodes one at a time.

use std::iter::FusedIterator;

use crate::Selection;

impl Selection {
    /// Call `f(index, node)` for every node in order. Each node is passed as
    /// a single-node selection without history.
    pub fn each(&self, mut f: impl FnMut(usize, &Self)) {
        for (index, &id) in self.nodes().iter().enumerate() {
            f(index, &self.single(id));
        }
    }

    /// Collect `f(index, node)` for every node in order.
    #[must_use]
    pub fn map<T>(&self, mut f: impl FnMut(usize, &Self) -> T) -> Vec<T> {
        self.nodes()
            .iter()
            .enumerate()
            .map(|(index, &id)| f(index, &self.single(id)))
            .collect()
    }

    /// Single-node selections, one per node.
    #[must_use]
    pub fn iter(&self) -> SelectionIter<'_> {
        SelectionIter {
            selection: self,
            index: 0,
        }
    }

    /// Single-node selections, one per node, collected.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Self> {
        self.iter().collect()
    }
}

/// Iterator over the nodes of a [`Selection`] as single-node selections.
#[derive(Debug, Clone)]
pub struct SelectionIter<'a> {
    selection: &'a Selection,
    index: usize,
}

impl Iterator for SelectionIter<'_> {
    type Item = Selection;

    fn next(&mut self) -> Option<Self::Item> {
        let id = *self.selection.nodes().get(self.index)?;
        self.index += 1;
        Some(self.selection.single(id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.selection.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SelectionIter<'_> {}

impl FusedIterator for SelectionIter<'_> {}

impl<'a> IntoIterator for &'a Selection {
    type Item = Selection;
    type IntoIter = SelectionIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
