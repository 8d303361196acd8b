//! Persistent (immutable) ordered map based on an AVL tree.
//!
//! This module provides [`PersistentAvlTree`], an ordered map whose versions
//! share structure. Updating a tree copies only the nodes on the path from
//! the root to the change; every other subtree is shared with the previous
//! version, which stays valid and unchanged.
//!
//! - O(log N) get, insert, remove
//! - O(log N) min/max and bound queries (`glb`, `lub`, ...)
//! - O(1) `len`, `is_empty` and `copy`
//!
//! # Examples
//!
//! ```rust
//! use persistent_avl::persistent::PersistentAvlTree;
//!
//! let mut tree = PersistentAvlTree::new();
//! for key in 1..=14 {
//!     tree.insert(key, key * 10);
//! }
//!
//! let mut copy = tree.copy();
//! copy.insert(15, 150);
//!
//! assert_eq!(tree.len(), 14);
//! assert_eq!(tree.get(&15), None);
//! assert_eq!(copy.len(), 15);
//! assert_eq!(copy.get(&15), Some(&150));
//! ```
//!
//! # Balance
//!
//! For every node the heights of its two subtrees differ by at most one,
//! and a node's height is one more than its taller child (an absent
//! subtree has height 0). The tree height is therefore O(log N).

mod iter;
mod node;
mod rebalance;
mod sequence;
mod set_algebra;

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::persistent::ReferenceCounter;
use node::{Link, Node};

pub use iter::{IntoIter, Iter, Keys, Values};
pub use sequence::{
    FilteredEntries, FlatEntries, RecursiveEntries, RecursiveKeys, RecursiveValues, Sequence,
};
pub use set_algebra::{
    difference, difference_with, equals, equiv, intersection, intersection_with, union,
    union_with,
};

use sequence::Guarded;

// =============================================================================
// InvariantViolation
// =============================================================================

/// The first broken structural invariant found by
/// [`PersistentAvlTree::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantViolation {
    /// The subtree heights of a node differ by more than one.
    Unbalanced {
        /// Height of the left subtree.
        left_height: i8,
        /// Height of the right subtree.
        right_height: i8,
    },
    /// A node's stored height does not match its children.
    WrongHeight {
        /// Height stored in the node.
        stored: i8,
        /// Height computed from the children.
        computed: i8,
    },
    /// In-order traversal met a key that is not above its predecessor.
    OutOfOrder {
        /// Zero-based in-order position of the offending key.
        position: usize,
    },
    /// The stored length differs from the number of reachable entries.
    LengthMismatch {
        /// Length stored in the handle.
        stored: usize,
        /// Entries found by traversal.
        counted: usize,
    },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbalanced {
                left_height,
                right_height,
            } => write!(
                formatter,
                "unbalanced node: left height {left_height}, right height {right_height}"
            ),
            Self::WrongHeight { stored, computed } => write!(
                formatter,
                "wrong node height: stored {stored}, computed {computed}"
            ),
            Self::OutOfOrder { position } => {
                write!(formatter, "key at in-order position {position} is out of order")
            }
            Self::LengthMismatch { stored, counted } => write!(
                formatter,
                "length mismatch: stored {stored}, counted {counted}"
            ),
        }
    }
}

impl std::error::Error for InvariantViolation {}

// =============================================================================
// PersistentAvlTree Definition
// =============================================================================

/// A persistent ordered map based on an AVL tree.
///
/// The handle holds a shared root and the number of entries. Mutating
/// methods take `&mut self` and install a new root built by path copying;
/// any other handle obtained through [`copy`](Self::copy) or `clone` keeps
/// seeing its own version.
///
/// # Time Complexity
///
/// | Operation             | Complexity |
/// |-----------------------|------------|
/// | `new`, `copy`         | O(1)       |
/// | `get`, `contains_key` | O(log N)   |
/// | `insert`, `remove`    | O(log N)   |
/// | `min`/`max`           | O(log N)   |
/// | `glb`/`lub` (+ `_eq`) | O(log N)   |
/// | `len`, `is_empty`     | O(1)       |
///
/// # Examples
///
/// ```rust
/// use persistent_avl::persistent::PersistentAvlTree;
///
/// let mut tree = PersistentAvlTree::new();
/// assert_eq!(tree.insert(2, "two"), None);
/// assert_eq!(tree.insert(2, "TWO"), Some("two"));
/// tree.insert(1, "one");
///
/// let keys: Vec<&i32> = tree.keys().collect();
/// assert_eq!(keys, vec![&1, &2]);
/// ```
pub struct PersistentAvlTree<K, V> {
    root: Option<Link<K, V>>,
    length: usize,
}

impl<K, V> Clone for PersistentAvlTree<K, V> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            length: self.length,
        }
    }
}

impl<K, V> PersistentAvlTree<K, V> {
    /// Creates a new empty tree.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_avl::persistent::PersistentAvlTree;
    ///
    /// let tree: PersistentAvlTree<i32, String> = PersistentAvlTree::new();
    /// assert!(tree.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            root: None,
            length: 0,
        }
    }

    /// Returns the number of entries in the tree.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the tree contains no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns `true` if the tree contains exactly one entry.
    #[must_use]
    pub fn is_single(&self) -> bool {
        self.root.as_deref().is_some_and(Node::is_leaf)
    }

    /// Returns the height of the tree; 0 when empty, 1 for a single entry.
    #[must_use]
    pub fn height(&self) -> usize {
        node::height(self.root.as_ref()).unsigned_abs().into()
    }

    /// Returns a second handle to the same version of the tree.
    ///
    /// This is O(1): nothing but the root link is duplicated. The two
    /// handles diverge on their next mutation without affecting each other.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_avl::persistent::PersistentAvlTree;
    ///
    /// let mut original: PersistentAvlTree<i32, &str> = PersistentAvlTree::singleton(1, "a");
    /// let copy = original.copy();
    /// original.remove(&1);
    ///
    /// assert!(original.is_empty());
    /// assert_eq!(copy.get(&1), Some(&"a"));
    /// ```
    #[inline]
    #[must_use]
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Returns the entry with the smallest key.
    #[must_use]
    pub fn min(&self) -> Option<(&K, &V)> {
        self.root.as_deref().map(|root| root.minimum().entry())
    }

    /// Returns the entry with the largest key.
    #[must_use]
    pub fn max(&self) -> Option<(&K, &V)> {
        self.root.as_deref().map(|root| root.maximum().entry())
    }

    /// Returns an iterator over entries in ascending key order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_avl::persistent::PersistentAvlTree;
    ///
    /// let tree: PersistentAvlTree<i32, char> =
    ///     [(3, 'c'), (1, 'a'), (2, 'b')].into_iter().collect();
    /// let entries: Vec<(&i32, &char)> = tree.iter().collect();
    /// assert_eq!(entries, vec![(&1, &'a'), (&2, &'b'), (&3, &'c')]);
    /// ```
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self.root.as_ref(), self.length)
    }

    /// Returns an iterator over keys in ascending order.
    #[must_use]
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over values in key order.
    #[must_use]
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Calls `function` on every entry in ascending key order.
    ///
    /// The traversal cannot be interrupted; use one of the `do_all` methods
    /// to stop early. The references handed to `function` live as long as
    /// the borrow of the tree.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_avl::persistent::PersistentAvlTree;
    ///
    /// let tree: PersistentAvlTree<i32, &str> = [(2, "b"), (1, "a")].into_iter().collect();
    /// let mut entries = Vec::new();
    /// tree.visit_in_order(|key, value| entries.push((key, value)));
    /// assert_eq!(entries, vec![(&1, &"a"), (&2, &"b")]);
    /// ```
    pub fn visit_in_order<'a, F>(&'a self, mut function: F)
    where
        F: FnMut(&'a K, &'a V),
    {
        if let Some(root) = &self.root {
            root.visit_in_order(&mut function);
        }
    }

    // -------------------------------------------------------------------------
    // Lazy sequences
    // -------------------------------------------------------------------------

    /// Returns the entries as a restartable sequence produced by a recursive
    /// walk.
    #[must_use]
    pub fn entries_seq(&self) -> RecursiveEntries<'_, K, V> {
        RecursiveEntries {
            root: self.root.as_ref(),
        }
    }

    /// Returns the keys as a restartable sequence produced by a recursive
    /// walk.
    #[must_use]
    pub fn keys_seq(&self) -> RecursiveKeys<'_, K, V> {
        RecursiveKeys {
            root: self.root.as_ref(),
        }
    }

    /// Returns the entries as a restartable sequence produced by an
    /// iterative walk with an explicit, bounded stack.
    #[must_use]
    pub fn flat_entries_seq(&self) -> FlatEntries<'_, K, V> {
        FlatEntries {
            root: self.root.as_ref(),
        }
    }

    /// Returns the entries accepted by `filter` as a restartable sequence.
    ///
    /// Rejected entries are skipped; they do not stop the sequence.
    #[must_use]
    pub fn filtered_entries_seq<P>(&self, filter: P) -> FilteredEntries<'_, K, V, P>
    where
        P: Fn(&K, &V) -> bool,
    {
        FilteredEntries {
            root: self.root.as_ref(),
            filter,
        }
    }

    /// Feeds keys in ascending order to `consumer` until it returns `false`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_avl::persistent::PersistentAvlTree;
    ///
    /// let tree: PersistentAvlTree<i32, ()> = (1..=10).map(|key| (key, ())).collect();
    /// let mut sum = 0;
    /// tree.do_all(|key| {
    ///     sum += key;
    ///     *key < 4
    /// });
    /// assert_eq!(sum, 1 + 2 + 3 + 4);
    /// ```
    pub fn do_all<F>(&self, consumer: F)
    where
        F: FnMut(&K) -> bool,
    {
        self.keys_seq().run(consumer);
    }

    /// Feeds entries in ascending key order to `consumer` until it returns
    /// `false`, using a recursive walk.
    pub fn do_all2<F>(&self, mut consumer: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        self.entries_seq().run(|(key, value)| consumer(key, value));
    }

    /// Same as [`do_all2`](Self::do_all2) with an explicit stack instead of
    /// recursion.
    pub fn do_all2_flat<F>(&self, mut consumer: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        self.flat_entries_seq()
            .run(|(key, value)| consumer(key, value));
    }

    /// Feeds the entries accepted by `filter` to `consumer` until it returns
    /// `false`.
    pub fn do_all2_flat_filter<F, P>(&self, mut consumer: F, filter: P)
    where
        F: FnMut(&K, &V) -> bool,
        P: Fn(&K, &V) -> bool,
    {
        self.filtered_entries_seq(filter)
            .run(|(key, value)| consumer(key, value));
    }

    /// Feeds values in key order to `consumer` until it returns `false`.
    pub fn do_all_values<F>(&self, consumer: F)
    where
        F: FnMut(&V) -> bool,
    {
        RecursiveValues {
            root: self.root.as_ref(),
        }
        .run(consumer);
    }

    /// A misbehaving producer: walks the keys twice with the same consumer,
    /// even after it asked to stop. The consumer guard turns that into a
    /// panic; this exists to exercise it.
    ///
    /// # Panics
    ///
    /// Panics whenever `consumer` returns `false` during the first pass.
    #[doc(hidden)]
    pub fn do_all_twice<F>(&self, consumer: F)
    where
        F: FnMut(&K) -> bool,
    {
        let keys = self.keys_seq();
        let mut guard = Guarded::new(consumer);
        keys.drive(&mut guard);
        keys.drive(&mut guard);
    }
}

impl<K: Ord, V> PersistentAvlTree<K, V> {
    /// Returns a reference to the value stored for `key`.
    ///
    /// The key may be any borrowed form of the tree's key type, but the
    /// ordering on the borrowed form must match the ordering on the key type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_avl::persistent::PersistentAvlTree;
    ///
    /// let tree = PersistentAvlTree::singleton("hello".to_string(), 42);
    /// assert_eq!(tree.get("hello"), Some(&42));
    /// assert_eq!(tree.get("world"), None);
    /// ```
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.root
            .as_deref()
            .and_then(|root| root.find(key))
            .map(|node| &node.value)
    }

    /// Returns `true` if the tree contains `key`.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Returns the entry with the greatest key strictly less than `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_avl::persistent::PersistentAvlTree;
    ///
    /// let tree: PersistentAvlTree<i32, &str> =
    ///     [(10, "ten"), (20, "twenty"), (30, "thirty")].into_iter().collect();
    /// assert_eq!(tree.glb(&20), Some((&10, &"ten")));
    /// assert_eq!(tree.glb_eq(&20), Some((&20, &"twenty")));
    /// assert_eq!(tree.lub(&20), Some((&30, &"thirty")));
    /// assert_eq!(tree.lub(&30), None);
    /// ```
    #[must_use]
    pub fn glb<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.root
            .as_deref()
            .and_then(|root| root.glb(key, false))
            .map(Node::entry)
    }

    /// Returns the entry with the greatest key less than or equal to `key`.
    #[must_use]
    pub fn glb_eq<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.root
            .as_deref()
            .and_then(|root| root.glb(key, true))
            .map(Node::entry)
    }

    /// Returns the entry with the least key strictly greater than `key`.
    #[must_use]
    pub fn lub<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.root
            .as_deref()
            .and_then(|root| root.lub(key, false))
            .map(Node::entry)
    }

    /// Returns the entry with the least key greater than or equal to `key`.
    #[must_use]
    pub fn lub_eq<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.root
            .as_deref()
            .and_then(|root| root.lub(key, true))
            .map(Node::entry)
    }

    /// Checks the balance, height, ordering and length invariants.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] found by an in-order walk.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let mut previous = None;
        let mut counted = 0;
        validate_node(self.root.as_ref(), &mut previous, &mut counted)?;
        if counted == self.length {
            Ok(())
        } else {
            Err(InvariantViolation::LengthMismatch {
                stored: self.length,
                counted,
            })
        }
    }
}

fn validate_node<'a, K: Ord, V>(
    link: Option<&'a Link<K, V>>,
    previous: &mut Option<&'a K>,
    counted: &mut usize,
) -> Result<i8, InvariantViolation> {
    let Some(node) = link else {
        return Ok(node::ZERO_HEIGHT);
    };
    let left_height = validate_node(node.left.as_ref(), previous, counted)?;
    if previous.is_some_and(|previous| previous.cmp(&node.key) != Ordering::Less) {
        return Err(InvariantViolation::OutOfOrder { position: *counted });
    }
    *previous = Some(&node.key);
    *counted += 1;
    let right_height = validate_node(node.right.as_ref(), previous, counted)?;

    if (left_height - right_height).abs() > 1 {
        return Err(InvariantViolation::Unbalanced {
            left_height,
            right_height,
        });
    }
    let computed = 1 + left_height.max(right_height);
    if node.height != computed {
        return Err(InvariantViolation::WrongHeight {
            stored: node.height,
            computed,
        });
    }
    Ok(computed)
}

impl<K: Clone + Ord, V: Clone> PersistentAvlTree<K, V> {
    /// Creates a tree containing a single entry.
    #[inline]
    #[must_use]
    pub fn singleton(key: K, value: V) -> Self {
        Self {
            root: Some(ReferenceCounter::new(Node::leaf(key, value))),
            length: 1,
        }
    }

    /// Inserts `value` under `key`, returning the value previously stored
    /// there.
    ///
    /// Only the nodes on the path to `key` are copied; other handles to the
    /// previous version are unaffected. An existing key keeps its stored key
    /// object.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_avl::persistent::PersistentAvlTree;
    ///
    /// let mut tree = PersistentAvlTree::new();
    /// let before = tree.copy();
    /// assert_eq!(tree.insert(1, "one"), None);
    /// assert_eq!(tree.insert(1, "uno"), Some("one"));
    ///
    /// assert_eq!(tree.len(), 1);
    /// assert!(before.is_empty());
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let (new_root, replaced) = rebalance::insert(self.root.as_ref(), key, value);
        self.root = Some(new_root);
        match replaced {
            Some(old) => Some(ReferenceCounter::unwrap_or_clone(old).value),
            None => {
                self.length += 1;
                None
            }
        }
    }

    /// Removes `key`, returning the value that was stored for it.
    ///
    /// Removing an absent key changes nothing and returns `None`.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_avl::persistent::PersistentAvlTree;
    ///
    /// let mut tree: PersistentAvlTree<i32, &str> =
    ///     [(1, "one"), (2, "two")].into_iter().collect();
    /// assert_eq!(tree.remove(&1), Some("one"));
    /// assert_eq!(tree.remove(&1), None);
    /// assert_eq!(tree.len(), 1);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let (deleted, new_root) = rebalance::delete(self.root.as_ref()?, key)?;
        self.root = new_root;
        self.length -= 1;
        Some(ReferenceCounter::unwrap_or_clone(deleted).value)
    }

    /// Removes and returns the entry with the smallest key.
    pub fn remove_min(&mut self) -> Option<(K, V)> {
        let (deleted, new_root) = rebalance::delete_min(self.root.as_ref()?);
        self.root = new_root;
        self.length -= 1;
        let Node { key, value, .. } = ReferenceCounter::unwrap_or_clone(deleted);
        Some((key, value))
    }

    /// Removes and returns the entry with the largest key.
    pub fn remove_max(&mut self) -> Option<(K, V)> {
        let (deleted, new_root) = rebalance::delete_max(self.root.as_ref()?);
        self.root = new_root;
        self.length -= 1;
        let Node { key, value, .. } = ReferenceCounter::unwrap_or_clone(deleted);
        Some((key, value))
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V> Default for PersistentAvlTree<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + Ord, V: Clone> FromIterator<(K, V)> for PersistentAvlTree<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Clone + Ord, V: Clone> Extend<(K, V)> for PersistentAvlTree<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Clone + Ord, V: Clone> IntoIterator for PersistentAvlTree<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { tree: self }
    }
}

impl<'a, K, V> IntoIterator for &'a PersistentAvlTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Ord, V: PartialEq> PartialEq for PersistentAvlTree<K, V> {
    fn eq(&self, other: &Self) -> bool {
        equals(self, other)
    }
}

impl<K: Ord, V: Eq> Eq for PersistentAvlTree<K, V> {}

impl<K: Hash, V: Hash> Hash for PersistentAvlTree<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.length.hash(state);
        for (key, value) in self {
            key.hash(state);
            value.hash(state);
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for PersistentAvlTree<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

/// Formats entries as `key:value` pairs separated by `"; "`.
impl<K: fmt::Display, V: fmt::Display> fmt::Display for PersistentAvlTree<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, value) in self {
            if first {
                first = false;
            } else {
                write!(formatter, "; ")?;
            }
            write!(formatter, "{key}:{value}")?;
        }
        Ok(())
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<K, V> serde::Serialize for PersistentAvlTree<K, V>
where
    K: serde::Serialize,
    V: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
struct PersistentAvlTreeVisitor<K, V> {
    marker: std::marker::PhantomData<fn() -> (K, V)>,
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::de::Visitor<'de> for PersistentAvlTreeVisitor<K, V>
where
    K: serde::Deserialize<'de> + Clone + Ord,
    V: serde::Deserialize<'de> + Clone,
{
    type Value = PersistentAvlTree<K, V>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        let mut tree = PersistentAvlTree::new();
        while let Some((key, value)) = access.next_entry()? {
            tree.insert(key, value);
        }
        Ok(tree)
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::Deserialize<'de> for PersistentAvlTree<K, V>
where
    K: serde::Deserialize<'de> + Clone + Ord,
    V: serde::Deserialize<'de> + Clone,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(PersistentAvlTreeVisitor {
            marker: std::marker::PhantomData,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
