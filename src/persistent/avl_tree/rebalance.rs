//! Path-copying insert and delete with AVL rebalancing.
//!
//! Every function here takes shared links to the old version and returns
//! freshly allocated nodes for the new one. Nodes owned by the operation in
//! progress are unwrapped with [`ReferenceCounter::unwrap_or_clone`], which
//! only copies when the node is still shared with another version.
//!
//! ```text
//!     node                    right
//!   left  right     =>     node    rr
//!        rl   rr         left  rl
//! ```

use std::borrow::Borrow;
use std::cmp::Ordering;

use super::node::{Link, Node, height};
use crate::persistent::ReferenceCounter;

/// Takes ownership of a link, copying the node only if it is shared.
#[inline]
fn unshare<K: Clone, V: Clone>(link: Link<K, V>) -> Node<K, V> {
    ReferenceCounter::unwrap_or_clone(link)
}

/// Copy of `node` that the caller may modify.
#[inline]
fn copy_of<K: Clone, V: Clone>(node: &Link<K, V>) -> Node<K, V> {
    Node::clone(node)
}

/// Inserts `key` below `link`.
///
/// Returns the new subtree root and the node that previously held `key`,
/// if any. An existing key keeps its stored key object and takes the new
/// value in a fresh copy.
pub(crate) fn insert<K, V>(
    link: Option<&Link<K, V>>,
    key: K,
    value: V,
) -> (Link<K, V>, Option<Link<K, V>>)
where
    K: Clone + Ord,
    V: Clone,
{
    let Some(node) = link else {
        return (ReferenceCounter::new(Node::leaf(key, value)), None);
    };

    match key.cmp(&node.key) {
        Ordering::Equal => {
            let updated = Node {
                key: node.key.clone(),
                value,
                height: node.height,
                left: node.left.clone(),
                right: node.right.clone(),
            };
            (ReferenceCounter::new(updated), Some(ReferenceCounter::clone(node)))
        }
        Ordering::Less => {
            let (new_left, replaced) = insert(node.left.as_ref(), key, value);
            let mut copy = copy_of(node);
            copy.left = Some(new_left);
            (ReferenceCounter::new(rebalance(copy)), replaced)
        }
        Ordering::Greater => {
            let (new_right, replaced) = insert(node.right.as_ref(), key, value);
            let mut copy = copy_of(node);
            copy.right = Some(new_right);
            (ReferenceCounter::new(rebalance(copy)), replaced)
        }
    }
}

/// Removes `key` from the subtree at `node`.
///
/// Returns `None` when the key is absent, in which case nothing was copied.
/// Otherwise returns the node that held the key and the new subtree.
pub(crate) fn delete<K, V, Q>(
    node: &Link<K, V>,
    key: &Q,
) -> Option<(Link<K, V>, Option<Link<K, V>>)>
where
    K: Clone + Borrow<Q>,
    V: Clone,
    Q: Ord + ?Sized,
{
    match key.cmp(node.key.borrow()) {
        Ordering::Less => {
            let left = node.left.as_ref()?;
            let old_height = left.height;
            let (deleted, new_left) = delete(left, key)?;
            let rebuilt = rebalance_after_left_deletion(copy_of(node), old_height, new_left);
            Some((deleted, Some(ReferenceCounter::new(rebuilt))))
        }
        Ordering::Greater => {
            let right = node.right.as_ref()?;
            let old_height = right.height;
            let (deleted, new_right) = delete(right, key)?;
            let rebuilt = rebalance_after_right_deletion(copy_of(node), old_height, new_right);
            Some((deleted, Some(ReferenceCounter::new(rebuilt))))
        }
        Ordering::Equal => Some(delete_here(node)),
    }
}

/// Removes `node` itself. The structural removal happens at the predecessor
/// or successor, whose contents move into a copy of `node`.
fn delete_here<K, V>(node: &Link<K, V>) -> (Link<K, V>, Option<Link<K, V>>)
where
    K: Clone,
    V: Clone,
{
    let left_height = node.left_height();
    let right_height = node.right_height();

    if let Some(left) = node.left.as_ref().filter(|_| left_height > right_height) {
        let (predecessor, new_left) = delete_max(left);
        let mut copy = copy_of(node);
        copy.key = predecessor.key.clone();
        copy.value = predecessor.value.clone();
        let rebuilt = rebalance_after_left_deletion(copy, left_height, new_left);
        (ReferenceCounter::clone(node), Some(ReferenceCounter::new(rebuilt)))
    } else if let Some(right) = node.right.as_ref() {
        let (successor, new_right) = delete_min(right);
        let mut copy = copy_of(node);
        copy.key = successor.key.clone();
        copy.value = successor.value.clone();
        let rebuilt = rebalance_after_right_deletion(copy, right_height, new_right);
        (ReferenceCounter::clone(node), Some(ReferenceCounter::new(rebuilt)))
    } else {
        // a leaf: both heights are zero
        (ReferenceCounter::clone(node), None)
    }
}

/// Removes the leftmost node below `node`.
pub(crate) fn delete_min<K, V>(node: &Link<K, V>) -> (Link<K, V>, Option<Link<K, V>>)
where
    K: Clone,
    V: Clone,
{
    match &node.left {
        None => (ReferenceCounter::clone(node), node.right.clone()),
        Some(left) => {
            let old_height = left.height;
            let (deleted, new_left) = delete_min(left);
            let rebuilt = rebalance_after_left_deletion(copy_of(node), old_height, new_left);
            (deleted, Some(ReferenceCounter::new(rebuilt)))
        }
    }
}

/// Removes the rightmost node below `node`.
pub(crate) fn delete_max<K, V>(node: &Link<K, V>) -> (Link<K, V>, Option<Link<K, V>>)
where
    K: Clone,
    V: Clone,
{
    match &node.right {
        None => (ReferenceCounter::clone(node), node.left.clone()),
        Some(right) => {
            let old_height = right.height;
            let (deleted, new_right) = delete_max(right);
            let rebuilt = rebalance_after_right_deletion(copy_of(node), old_height, new_right);
            (deleted, Some(ReferenceCounter::new(rebuilt)))
        }
    }
}

/// Restores balance after one child was replaced during insertion.
fn rebalance<K: Clone, V: Clone>(mut node: Node<K, V>) -> Node<K, V> {
    let left_height = node.left_height();
    let right_height = node.right_height();
    if left_height > right_height + 1 {
        left_is_high(node)
    } else if right_height > left_height + 1 {
        right_is_high(node)
    } else {
        node.update_height();
        node
    }
}

fn rebalance_after_left_deletion<K: Clone, V: Clone>(
    mut node: Node<K, V>,
    old_left_height: i8,
    new_left: Option<Link<K, V>>,
) -> Node<K, V> {
    node.left = new_left;
    let right_height = node.right_height();

    if old_left_height == node.left_height() || old_left_height == right_height {
        // still balanced, height unchanged
        return node;
    }
    if old_left_height > right_height {
        node.height -= 1;
        return node;
    }
    // left fell by one and was already the shorter side
    right_is_high(node)
}

fn rebalance_after_right_deletion<K: Clone, V: Clone>(
    mut node: Node<K, V>,
    old_right_height: i8,
    new_right: Option<Link<K, V>>,
) -> Node<K, V> {
    node.right = new_right;
    let left_height = node.left_height();

    if old_right_height == node.right_height() || old_right_height == left_height {
        return node;
    }
    if old_right_height > left_height {
        node.height -= 1;
        return node;
    }
    left_is_high(node)
}

/// Fixes a right child that is two levels taller than the left one.
fn right_is_high<K: Clone, V: Clone>(mut node: Node<K, V>) -> Node<K, V> {
    if let Some(right) = node.right.take() {
        let mut right = unshare(right);
        let double = height(right.right.as_ref()) < height(right.left.as_ref());
        tracing::trace!(double, "rotating right-heavy node");
        if double {
            right = promote_left(right);
        }
        node.right = Some(ReferenceCounter::new(right));
    }
    promote_right(node)
}

/// Fixes a left child that is two levels taller than the right one.
fn left_is_high<K: Clone, V: Clone>(mut node: Node<K, V>) -> Node<K, V> {
    if let Some(left) = node.left.take() {
        let mut left = unshare(left);
        let double = height(left.left.as_ref()) < height(left.right.as_ref());
        tracing::trace!(double, "rotating left-heavy node");
        if double {
            left = promote_right(left);
        }
        node.left = Some(ReferenceCounter::new(left));
    }
    promote_left(node)
}

/// Rotates the right child up to the root of this subtree.
fn promote_right<K: Clone, V: Clone>(mut node: Node<K, V>) -> Node<K, V> {
    let Some(right) = node.right.take() else {
        return node;
    };
    let mut right = unshare(right);
    node.right = right.left.take();
    node.update_height();
    right.left = Some(ReferenceCounter::new(node));
    right.update_height();
    right
}

/// Rotates the left child up to the root of this subtree.
fn promote_left<K: Clone, V: Clone>(mut node: Node<K, V>) -> Node<K, V> {
    let Some(left) = node.left.take() else {
        return node;
    };
    let mut left = unshare(left);
    node.left = left.right.take();
    node.update_height();
    left.right = Some(ReferenceCounter::new(node));
    left.update_height();
    left
}
