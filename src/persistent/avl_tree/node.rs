//! Node definition and read-only queries.
//!
//! Nodes are shared between tree versions through [`ReferenceCounter`]
//! links. A node that is reachable from a published tree is never mutated;
//! the rebalance engine only changes nodes it owns exclusively.

use std::borrow::Borrow;
use std::cmp::Ordering;

use crate::persistent::ReferenceCounter;

/// Height of an absent subtree.
pub(crate) const ZERO_HEIGHT: i8 = 0;

/// Height of a node without children.
pub(crate) const LEAF_HEIGHT: i8 = 1;

/// Upper bound on the height of any AVL tree addressable in memory.
///
/// An AVL tree of height `h` holds at least `fib(h + 2) - 1` nodes, so even
/// `usize::MAX` entries stay well below this.
pub(crate) const MAX_HEIGHT: usize = 96;

/// Shared link to a subtree.
pub(crate) type Link<K, V> = ReferenceCounter<Node<K, V>>;

/// Internal node structure for the AVL tree.
#[derive(Clone)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) height: i8,
    pub(crate) left: Option<Link<K, V>>,
    pub(crate) right: Option<Link<K, V>>,
}

/// Height of an optional subtree.
#[inline]
pub(crate) fn height<K, V>(link: Option<&Link<K, V>>) -> i8 {
    link.map_or(ZERO_HEIGHT, |node| node.height)
}

impl<K, V> Node<K, V> {
    /// Creates a new leaf.
    pub(crate) const fn leaf(key: K, value: V) -> Self {
        Self {
            key,
            value,
            height: LEAF_HEIGHT,
            left: None,
            right: None,
        }
    }

    /// Returns `true` if this node has no children.
    pub(crate) const fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none() && self.height == LEAF_HEIGHT
    }

    pub(crate) fn left_height(&self) -> i8 {
        height(self.left.as_ref())
    }

    pub(crate) fn right_height(&self) -> i8 {
        height(self.right.as_ref())
    }

    /// Recomputes the height from the children.
    pub(crate) fn update_height(&mut self) {
        self.height = 1 + self.left_height().max(self.right_height());
    }

    pub(crate) const fn entry(&self) -> (&K, &V) {
        (&self.key, &self.value)
    }

    /// Iterative descent to the node holding `key`.
    pub(crate) fn find<Q>(&self, key: &Q) -> Option<&Self>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self;
        loop {
            let next = match key.cmp(current.key.borrow()) {
                Ordering::Less => current.left.as_deref(),
                Ordering::Greater => current.right.as_deref(),
                Ordering::Equal => return Some(current),
            };
            current = next?;
        }
    }

    /// Leftmost node of this subtree.
    pub(crate) fn minimum(&self) -> &Self {
        let mut current = self;
        while let Some(left) = current.left.as_deref() {
            current = left;
        }
        current
    }

    /// Rightmost node of this subtree.
    pub(crate) fn maximum(&self) -> &Self {
        let mut current = self;
        while let Some(right) = current.right.as_deref() {
            current = right;
        }
        current
    }

    /// Greatest node whose key is below `key`, or equal to it when
    /// `allow_equal` is set.
    pub(crate) fn glb<Q>(&self, key: &Q, allow_equal: bool) -> Option<&Self>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut best = None;
        let mut current = Some(self);
        while let Some(node) = current {
            match key.cmp(node.key.borrow()) {
                Ordering::Equal if allow_equal => return Some(node),
                // node is too big, the bound is to the left
                Ordering::Less | Ordering::Equal => current = node.left.as_deref(),
                Ordering::Greater => {
                    best = Some(node);
                    current = node.right.as_deref();
                }
            }
        }
        best
    }

    /// Least node whose key is above `key`, or equal to it when
    /// `allow_equal` is set.
    pub(crate) fn lub<Q>(&self, key: &Q, allow_equal: bool) -> Option<&Self>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut best = None;
        let mut current = Some(self);
        while let Some(node) = current {
            match key.cmp(node.key.borrow()) {
                Ordering::Equal if allow_equal => return Some(node),
                // node is too small, the bound is to the right
                Ordering::Greater | Ordering::Equal => current = node.right.as_deref(),
                Ordering::Less => {
                    best = Some(node);
                    current = node.left.as_deref();
                }
            }
        }
        best
    }

    /// Recursive in-order visit, not interruptible.
    pub(crate) fn visit_in_order<'a, F>(&'a self, function: &mut F)
    where
        F: FnMut(&'a K, &'a V),
    {
        if let Some(left) = &self.left {
            left.visit_in_order(function);
        }
        function(&self.key, &self.value);
        if let Some(right) = &self.right {
            right.visit_in_order(function);
        }
    }
}
