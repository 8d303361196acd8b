//! Stack-based in-order cursors.

use std::iter::FusedIterator;

use smallvec::SmallVec;

use super::node::{Link, Node};

/// Inline capacity of the ancestor stack; trees up to this height never
/// allocate while iterating.
const INLINE_DEPTH: usize = 24;

/// An in-order iterator over the entries of a
/// [`PersistentAvlTree`](super::PersistentAvlTree).
///
/// The iterator keeps the path of ancestors that still need an in-order
/// visit of themselves or of their right subtree. Advancing is amortized
/// O(1) and a full traversal is O(N).
pub struct Iter<'a, K, V> {
    parents: SmallVec<[&'a Node<K, V>; INLINE_DEPTH]>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(root: Option<&'a Link<K, V>>, length: usize) -> Self {
        let mut iterator = Self {
            parents: SmallVec::new(),
            remaining: length,
        };
        if let Some(root) = root {
            iterator.push_leftmost(root);
        }
        iterator
    }

    fn push_leftmost(&mut self, mut node: &'a Node<K, V>) {
        loop {
            self.parents.push(node);
            match node.left.as_deref() {
                Some(left) => node = left,
                None => break,
            }
        }
    }

    /// Returns `true` once every entry has been produced.
    #[inline]
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.parents.is_empty()
    }

    /// Advances the cursor and returns the node it was on.
    pub(crate) fn next_node(&mut self) -> Option<&'a Node<K, V>> {
        let current = *self.parents.last()?;
        if let Some(right) = current.right.as_deref() {
            // current stays on the stack until its right subtree is done
            self.push_leftmost(right);
        } else {
            self.parents.pop();
            let mut finished = current;
            while let Some(&parent) = self.parents.last() {
                let came_from_right = parent
                    .right
                    .as_deref()
                    .is_some_and(|right| std::ptr::eq(right, finished));
                if !came_from_right {
                    break;
                }
                finished = parent;
                self.parents.pop();
            }
        }
        self.remaining = self.remaining.saturating_sub(1);
        Some(current)
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.next_node().map(Node::entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            parents: self.parents.clone(),
            remaining: self.remaining,
        }
    }
}

/// An iterator over the keys of a tree in ascending order.
pub struct Keys<'a, K, V> {
    pub(crate) inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

/// An iterator over the values of a tree in key order.
pub struct Values<'a, K, V> {
    pub(crate) inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

impl<K, V> FusedIterator for Values<'_, K, V> {}

/// An owning iterator over the entries of a tree.
///
/// Entries still shared with other versions are cloned; the iterator walks
/// the tree by repeatedly detaching its minimum.
pub struct IntoIter<K, V> {
    pub(crate) tree: super::PersistentAvlTree<K, V>,
}

impl<K: Clone + Ord, V: Clone> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.tree.remove_min()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.tree.len(), Some(self.tree.len()))
    }
}

impl<K: Clone + Ord, V: Clone> ExactSizeIterator for IntoIter<K, V> {}

impl<K: Clone + Ord, V: Clone> FusedIterator for IntoIter<K, V> {}
