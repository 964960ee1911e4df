//! Node addressing.
//!
//! A [`Path`] is the list of child indices leading from the document root to a
//! node. The empty path addresses the root itself. Paths order the way nodes
//! appear in the document (pre-order), so an ancestor sorts before its
//! descendants and earlier siblings sort before later ones.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<usize>);

impl Path {
    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Index of this node within its parent
    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    pub fn parent(&self) -> Option<Path> {
        let (_, parent) = self.0.split_last()?;
        Some(Path(parent.to_vec()))
    }

    pub fn child(&self, index: usize) -> Path {
        let mut indices = self.0.clone();
        indices.push(index);
        Path(indices)
    }

    /// Path of the following sibling
    pub fn next(&self) -> Option<Path> {
        let mut indices = self.0.clone();
        let last = indices.last_mut()?;
        *last += 1;
        Some(Path(indices))
    }

    /// Path of the preceding sibling
    pub fn previous(&self) -> Option<Path> {
        let mut indices = self.0.clone();
        let last = indices.last_mut()?;
        *last = last.checked_sub(1)?;
        Some(Path(indices))
    }

    /// True when `self` is a strict ancestor of `other`
    pub fn is_ancestor_of(&self, other: &Path) -> bool {
        self.0.len() < other.0.len() && other.0.starts_with(&self.0)
    }

    /// True when `other` is `self` or one of its ancestors
    pub fn is_within(&self, other: &Path) -> bool {
        self.0.starts_with(&other.0)
    }

    /// Where this path points after the node at `removed` is taken out of the
    /// tree. Returns `None` when this path was inside the removed subtree.
    pub fn transform_removal(&self, removed: &Path) -> Option<Path> {
        if self.is_within(removed) {
            return None;
        }

        let Some((&removed_index, removed_parent)) = removed.0.split_last() else {
            return Some(self.clone());
        };
        let depth = removed_parent.len();

        let mut indices = self.0.clone();
        if indices.len() > depth && indices[..depth] == *removed_parent && indices[depth] > removed_index {
            indices[depth] -= 1;
        }
        Some(Path(indices))
    }
}

impl Deref for Path {
    type Target = [usize];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<usize>> for Path {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl From<&[usize]> for Path {
    fn from(indices: &[usize]) -> Self {
        Self(indices.to_vec())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|i| i.to_string()).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}
