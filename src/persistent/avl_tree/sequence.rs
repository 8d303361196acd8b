//! Push-style lazy sequences over a tree.
//!
//! A [`Sequence`] hands its items, in ascending key order, to a consumer
//! closure that returns `false` to stop. Two walks are provided: a recursive
//! one whose depth is the tree height, and a flat one that keeps an explicit
//! stack bounded by the maximal AVL height.
//!
//! # Stop contract
//!
//! Once a consumer has returned `false` it must never be called again.
//! Every producer in this module hands items over through a guard that
//! enforces this and panics on a violation.
//!
//! # Examples
//!
//! ```rust
//! use persistent_avl::persistent::{PersistentAvlTree, Sequence};
//!
//! let tree: PersistentAvlTree<i32, &str> =
//!     [(3, "c"), (1, "a"), (2, "b")].into_iter().collect();
//!
//! let mut seen = Vec::new();
//! tree.flat_entries_seq().run(|(key, _)| {
//!     seen.push(*key);
//!     *key < 2
//! });
//! assert_eq!(seen, vec![1, 2]);
//!
//! // Sequences are restartable.
//! assert_eq!(tree.keys_seq().to_vec(), vec![&1, &2, &3]);
//! ```

use arrayvec::ArrayVec;

use super::node::{Link, MAX_HEIGHT, Node};

mod sealed {
    /// Restricts [`Sequence`](super::Sequence) to producers that hand items
    /// over through the stop-contract guard.
    pub trait Sealed {}
}

/// A restartable, lazy, ascending sequence of items.
///
/// This trait is sealed: every implementation lives in this crate and
/// enforces the stop contract.
///
/// ```compile_fail
/// use persistent_avl::persistent::Sequence;
///
/// struct Unguarded;
///
/// impl Sequence for Unguarded {
///     type Item = i32;
///
///     fn run<F: FnMut(i32) -> bool>(&self, mut consumer: F) {
///         consumer(1);
///         consumer(2);
///     }
/// }
/// ```
pub trait Sequence: sealed::Sealed {
    /// The item handed to the consumer.
    type Item;

    /// Feeds items to `consumer` until it returns `false` or the sequence
    /// ends. Each call starts from the first item.
    ///
    /// # Panics
    ///
    /// Panics if the producer calls the consumer again after it returned
    /// `false`.
    fn run<F>(&self, consumer: F)
    where
        F: FnMut(Self::Item) -> bool;

    /// Collects every item into a vector.
    fn to_vec(&self) -> Vec<Self::Item> {
        let mut items = Vec::new();
        self.run(|item| {
            items.push(item);
            true
        });
        items
    }

    /// Counts the items of the sequence.
    fn count_items(&self) -> usize {
        let mut count = 0;
        self.run(|_| {
            count += 1;
            true
        });
        count
    }
}

// =============================================================================
// Consumer Guard
// =============================================================================

/// Wraps a consumer and enforces the stop contract.
pub(crate) struct Guarded<F> {
    consumer: F,
    stopped: bool,
}

impl<F> Guarded<F> {
    pub(crate) const fn new(consumer: F) -> Self {
        Self {
            consumer,
            stopped: false,
        }
    }

    /// Passes `item` to the consumer and reports whether to continue.
    pub(crate) fn offer<T>(&mut self, item: T) -> bool
    where
        F: FnMut(T) -> bool,
    {
        if self.stopped {
            tracing::error!("sequence resumed after its consumer returned false");
            panic!("sequence consumer called again after it returned false");
        }
        let more = (self.consumer)(item);
        self.stopped = !more;
        more
    }
}

// =============================================================================
// Recursive Walk
// =============================================================================

fn walk_recursive<'a, K, V, T, F>(
    link: Option<&'a Link<K, V>>,
    project: fn(&'a Node<K, V>) -> T,
    guard: &mut Guarded<F>,
) -> bool
where
    F: FnMut(T) -> bool,
{
    let Some(node) = link else {
        return true;
    };
    walk_recursive(node.left.as_ref(), project, guard)
        && guard.offer(project(node))
        && walk_recursive(node.right.as_ref(), project, guard)
}

/// Key-value pairs produced by a recursive in-order walk.
pub struct RecursiveEntries<'a, K, V> {
    pub(crate) root: Option<&'a Link<K, V>>,
}

impl<K, V> sealed::Sealed for RecursiveEntries<'_, K, V> {}

impl<'a, K, V> Sequence for RecursiveEntries<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn run<F>(&self, consumer: F)
    where
        F: FnMut(Self::Item) -> bool,
    {
        walk_recursive(self.root, Node::entry, &mut Guarded::new(consumer));
    }
}

/// Keys produced by a recursive in-order walk.
pub struct RecursiveKeys<'a, K, V> {
    pub(crate) root: Option<&'a Link<K, V>>,
}

impl<'a, K, V> RecursiveKeys<'a, K, V> {
    pub(crate) fn drive<F>(&self, guard: &mut Guarded<F>) -> bool
    where
        F: FnMut(&'a K) -> bool,
    {
        walk_recursive(self.root, |node| &node.key, guard)
    }
}

impl<K, V> sealed::Sealed for RecursiveKeys<'_, K, V> {}

impl<'a, K, V> Sequence for RecursiveKeys<'a, K, V> {
    type Item = &'a K;

    fn run<F>(&self, consumer: F)
    where
        F: FnMut(Self::Item) -> bool,
    {
        self.drive(&mut Guarded::new(consumer));
    }
}

/// Values, in key order, produced by a recursive in-order walk.
pub struct RecursiveValues<'a, K, V> {
    pub(crate) root: Option<&'a Link<K, V>>,
}

impl<K, V> sealed::Sealed for RecursiveValues<'_, K, V> {}

impl<'a, K, V> Sequence for RecursiveValues<'a, K, V> {
    type Item = &'a V;

    fn run<F>(&self, consumer: F)
    where
        F: FnMut(Self::Item) -> bool,
    {
        walk_recursive(self.root, |node| &node.value, &mut Guarded::new(consumer));
    }
}

// =============================================================================
// Flat Walk
// =============================================================================

fn walk_flat<'a, K, V, P, F>(link: Option<&'a Link<K, V>>, filter: P, guard: &mut Guarded<F>)
where
    P: Fn(&K, &V) -> bool,
    F: FnMut((&'a K, &'a V)) -> bool,
{
    let Some(mut node) = link.map(|link| &**link) else {
        return;
    };
    let mut stack: ArrayVec<&'a Node<K, V>, MAX_HEIGHT> = ArrayVec::new();

    while let Some(left) = node.left.as_deref() {
        stack.push(node);
        node = left;
    }

    loop {
        // node has no unvisited left subtree; the top of the stack is its
        // closest ancestor still waiting for a visit
        if filter(&node.key, &node.value) && !guard.offer(node.entry()) {
            return;
        }
        if let Some(right) = node.right.as_deref() {
            node = right;
            while let Some(left) = node.left.as_deref() {
                stack.push(node);
                node = left;
            }
        } else if let Some(parent) = stack.pop() {
            node = parent;
        } else {
            return;
        }
    }
}

/// Key-value pairs produced by an iterative walk with an explicit stack.
pub struct FlatEntries<'a, K, V> {
    pub(crate) root: Option<&'a Link<K, V>>,
}

impl<K, V> sealed::Sealed for FlatEntries<'_, K, V> {}

impl<'a, K, V> Sequence for FlatEntries<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn run<F>(&self, consumer: F)
    where
        F: FnMut(Self::Item) -> bool,
    {
        walk_flat(self.root, |_, _| true, &mut Guarded::new(consumer));
    }
}

/// Key-value pairs accepted by a filter, produced by the flat walk.
pub struct FilteredEntries<'a, K, V, P> {
    pub(crate) root: Option<&'a Link<K, V>>,
    pub(crate) filter: P,
}

impl<K, V, P> sealed::Sealed for FilteredEntries<'_, K, V, P> {}

impl<'a, K, V, P> Sequence for FilteredEntries<'a, K, V, P>
where
    P: Fn(&K, &V) -> bool,
{
    type Item = (&'a K, &'a V);

    fn run<F>(&self, consumer: F)
    where
        F: FnMut(Self::Item) -> bool,
    {
        walk_flat(self.root, &self.filter, &mut Guarded::new(consumer));
    }
}
