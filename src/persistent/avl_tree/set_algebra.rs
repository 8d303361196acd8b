//! Set algebra over two trees.
//!
//! Each operation starts from an O(1) copy of one operand and edits it
//! while iterating the other, so the work is
//! O(min(|t|, |u|) × log(max(|t|, |u|))) and the result shares as much
//! structure as possible with the copied operand.
//!
//! The `_with` variants take a combining function for keys present in both
//! trees. It is called as `combine(t's value, u's value)` and need not be
//! symmetric. Returning `None` drops the key from the result; returning a
//! value equal to the one already in the result leaves that entry (and its
//! sharing) untouched.

use std::cmp::Ordering;

use super::PersistentAvlTree;
use crate::persistent::ReferenceCounter;

type NoCombine<V> = fn(&V, &V) -> Option<V>;

/// Returns the entries of `t` whose keys are also in `u`.
///
/// The smaller tree is iterated (`t` when sizes are equal) and its data is
/// kept.
///
/// # Examples
///
/// ```rust
/// use persistent_avl::persistent::{PersistentAvlTree, intersection};
///
/// let t: PersistentAvlTree<i32, &str> = [(1, "a"), (2, "b"), (3, "c")].into_iter().collect();
/// let u: PersistentAvlTree<i32, &str> = [(2, "b"), (3, "x"), (4, "d")].into_iter().collect();
///
/// let both = intersection(&t, &u);
/// assert_eq!(both.iter().collect::<Vec<_>>(), vec![(&2, &"b"), (&3, &"c")]);
/// ```
#[must_use]
pub fn intersection<K, V>(
    t: &PersistentAvlTree<K, V>,
    u: &PersistentAvlTree<K, V>,
) -> PersistentAvlTree<K, V>
where
    K: Clone + Ord,
    V: Clone + PartialEq,
{
    intersect(t, u, None::<NoCombine<V>>)
}

/// Returns the keys present in both trees with values decided by
/// `combine(t's value, u's value)`.
#[must_use]
pub fn intersection_with<K, V, F>(
    t: &PersistentAvlTree<K, V>,
    u: &PersistentAvlTree<K, V>,
    combine: F,
) -> PersistentAvlTree<K, V>
where
    K: Clone + Ord,
    V: Clone + PartialEq,
    F: FnMut(&V, &V) -> Option<V>,
{
    intersect(t, u, Some(combine))
}

fn intersect<K, V, F>(
    t: &PersistentAvlTree<K, V>,
    u: &PersistentAvlTree<K, V>,
    mut combine: Option<F>,
) -> PersistentAvlTree<K, V>
where
    K: Clone + Ord,
    V: Clone + PartialEq,
    F: FnMut(&V, &V) -> Option<V>,
{
    if t.is_empty() || u.is_empty() {
        return PersistentAvlTree::new();
    }

    let t_is_smaller = t.len() <= u.len();
    let (smaller, larger) = if t_is_smaller { (t, u) } else { (u, t) };
    tracing::debug!(
        smaller = smaller.len(),
        larger = larger.len(),
        iterating_t = t_is_smaller,
        "intersection"
    );

    let mut result = smaller.copy();
    for (key, small_value) in smaller {
        let Some(large_value) = larger.get(key) else {
            result.remove(key);
            continue;
        };
        let Some(combine) = combine.as_mut() else {
            continue;
        };
        let combined = if t_is_smaller {
            combine(small_value, large_value)
        } else {
            combine(large_value, small_value)
        };
        match combined {
            None => {
                result.remove(key);
            }
            Some(value) if value != *small_value => {
                result.insert(key.clone(), value);
            }
            Some(_) => {}
        }
    }
    result
}

/// Returns the entries of both trees.
///
/// The result is built from the larger tree (`t` when sizes are equal),
/// whose value wins for keys present in both.
///
/// # Examples
///
/// ```rust
/// use persistent_avl::persistent::{PersistentAvlTree, union};
///
/// let t: PersistentAvlTree<i32, &str> = [(1, "a"), (2, "b"), (3, "c")].into_iter().collect();
/// let u: PersistentAvlTree<i32, &str> = [(2, "b"), (3, "x"), (4, "d")].into_iter().collect();
///
/// let either = union(&t, &u);
/// assert_eq!(either.len(), 4);
/// assert_eq!(either.get(&3), Some(&"c"));
/// ```
#[must_use]
pub fn union<K, V>(t: &PersistentAvlTree<K, V>, u: &PersistentAvlTree<K, V>) -> PersistentAvlTree<K, V>
where
    K: Clone + Ord,
    V: Clone + PartialEq,
{
    unite(t, u, None::<NoCombine<V>>)
}

/// Returns the entries of both trees, with `combine(t's value, u's value)`
/// deciding the value of keys present in both.
///
/// # Examples
///
/// ```rust
/// use persistent_avl::persistent::{PersistentAvlTree, union_with};
///
/// let t: PersistentAvlTree<&str, i32> = [("apples", 3), ("pears", 1)].into_iter().collect();
/// let u: PersistentAvlTree<&str, i32> = [("apples", 2), ("plums", 7)].into_iter().collect();
///
/// let total = union_with(&t, &u, |x, y| Some(x + y));
/// assert_eq!(total.get("apples"), Some(&5));
/// assert_eq!(total.get("plums"), Some(&7));
/// ```
#[must_use]
pub fn union_with<K, V, F>(
    t: &PersistentAvlTree<K, V>,
    u: &PersistentAvlTree<K, V>,
    combine: F,
) -> PersistentAvlTree<K, V>
where
    K: Clone + Ord,
    V: Clone + PartialEq,
    F: FnMut(&V, &V) -> Option<V>,
{
    unite(t, u, Some(combine))
}

fn unite<K, V, F>(
    t: &PersistentAvlTree<K, V>,
    u: &PersistentAvlTree<K, V>,
    mut combine: Option<F>,
) -> PersistentAvlTree<K, V>
where
    K: Clone + Ord,
    V: Clone + PartialEq,
    F: FnMut(&V, &V) -> Option<V>,
{
    if t.is_empty() {
        return u.copy();
    }
    if u.is_empty() {
        return t.copy();
    }

    let t_is_larger = t.len() >= u.len();
    let (larger, smaller) = if t_is_larger { (t, u) } else { (u, t) };
    tracing::debug!(
        smaller = smaller.len(),
        larger = larger.len(),
        iterating_t = !t_is_larger,
        "union"
    );

    let mut result = larger.copy();
    for (key, small_value) in smaller {
        let Some(large_value) = larger.get(key) else {
            result.insert(key.clone(), small_value.clone());
            continue;
        };
        let Some(combine) = combine.as_mut() else {
            continue;
        };
        let combined = if t_is_larger {
            combine(large_value, small_value)
        } else {
            combine(small_value, large_value)
        };
        match combined {
            None => {
                result.remove(key);
            }
            Some(value) if value != *large_value => {
                result.insert(key.clone(), value);
            }
            Some(_) => {}
        }
    }
    result
}

/// Returns the entries of `t` whose keys are not in `u`.
///
/// # Examples
///
/// ```rust
/// use persistent_avl::persistent::{PersistentAvlTree, difference};
///
/// let t: PersistentAvlTree<i32, &str> = [(1, "a"), (2, "b"), (3, "c")].into_iter().collect();
/// let u: PersistentAvlTree<i32, &str> = [(2, "b"), (3, "x"), (4, "d")].into_iter().collect();
///
/// assert_eq!(difference(&t, &u).iter().collect::<Vec<_>>(), vec![(&1, &"a")]);
/// ```
#[must_use]
pub fn difference<K, V>(
    t: &PersistentAvlTree<K, V>,
    u: &PersistentAvlTree<K, V>,
) -> PersistentAvlTree<K, V>
where
    K: Clone + Ord,
    V: Clone + PartialEq,
{
    subtract(t, u, None::<NoCombine<V>>)
}

/// Returns the entries of `t` whose keys are not in `u`, except that a key
/// present in both stays when `combine(t's value, u's value)` returns
/// `Some`, with that value.
#[must_use]
pub fn difference_with<K, V, F>(
    t: &PersistentAvlTree<K, V>,
    u: &PersistentAvlTree<K, V>,
    combine: F,
) -> PersistentAvlTree<K, V>
where
    K: Clone + Ord,
    V: Clone + PartialEq,
    F: FnMut(&V, &V) -> Option<V>,
{
    subtract(t, u, Some(combine))
}

fn subtract<K, V, F>(
    t: &PersistentAvlTree<K, V>,
    u: &PersistentAvlTree<K, V>,
    mut combine: Option<F>,
) -> PersistentAvlTree<K, V>
where
    K: Clone + Ord,
    V: Clone + PartialEq,
    F: FnMut(&V, &V) -> Option<V>,
{
    if t.is_empty() {
        return PersistentAvlTree::new();
    }
    if u.is_empty() {
        return t.copy();
    }
    tracing::debug!(t = t.len(), u = u.len(), "difference");

    let mut result = t.copy();
    for (key, t_value) in t {
        let Some(u_value) = u.get(key) else {
            continue;
        };
        match combine
            .as_mut()
            .and_then(|combine| combine(t_value, u_value))
        {
            None => {
                result.remove(key);
            }
            Some(value) if value != *t_value => {
                result.insert(key.clone(), value);
            }
            Some(_) => {}
        }
    }
    result
}

/// Returns `true` if both trees hold the same keys with equal values.
///
/// # Examples
///
/// ```rust
/// use persistent_avl::persistent::{PersistentAvlTree, equals};
///
/// let t: PersistentAvlTree<i32, &str> = [(1, "a"), (2, "b")].into_iter().collect();
/// let mut u = t.copy();
/// assert!(equals(&t, &u));
///
/// u.insert(99, "z");
/// assert!(!equals(&t, &u));
/// ```
#[must_use]
pub fn equals<K: Ord, V: PartialEq>(t: &PersistentAvlTree<K, V>, u: &PersistentAvlTree<K, V>) -> bool {
    equiv(t, u, |x, y| x == y)
}

/// Returns `true` if both trees hold the same keys and `equivalent` accepts
/// every pair of values stored under the same key.
///
/// Trees are walked in lockstep and the walk stops at the first mismatch.
/// Nodes shared by both trees are not compared.
#[must_use]
pub fn equiv<K, V, F>(t: &PersistentAvlTree<K, V>, u: &PersistentAvlTree<K, V>, mut equivalent: F) -> bool
where
    K: Ord,
    F: FnMut(&V, &V) -> bool,
{
    if std::ptr::eq(t, u) {
        return true;
    }
    if t.len() != u.len() {
        return false;
    }
    if let (Some(t_root), Some(u_root)) = (&t.root, &u.root)
        && ReferenceCounter::ptr_eq(t_root, u_root)
    {
        return true;
    }

    let mut left = t.iter();
    let mut right = u.iter();
    while let (Some(t_node), Some(u_node)) = (left.next_node(), right.next_node()) {
        if std::ptr::eq(t_node, u_node) {
            continue;
        }
        if t_node.key.cmp(&u_node.key) != Ordering::Equal
            || !equivalent(&t_node.value, &u_node.value)
        {
            return false;
        }
    }
    left.is_exhausted() == right.is_exhausted()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    type Tree = PersistentAvlTree<i32, &'static str>;

    #[fixture]
    fn t() -> Tree {
        [(1, "a"), (2, "b"), (3, "c")].into_iter().collect()
    }

    #[fixture]
    fn u() -> Tree {
        [(2, "b"), (3, "x"), (4, "d")].into_iter().collect()
    }

    fn entries(tree: &Tree) -> Vec<(i32, &'static str)> {
        tree.iter().map(|(key, value)| (*key, *value)).collect()
    }

    #[rstest]
    fn test_intersection_keeps_smaller_side_data(t: Tree, u: Tree) {
        assert_eq!(entries(&intersection(&t, &u)), vec![(2, "b"), (3, "c")]);
        assert_eq!(entries(&intersection(&u, &t)), vec![(2, "b"), (3, "x")]);
    }

    #[rstest]
    fn test_intersection_prefers_strictly_smaller_operand(t: Tree, mut u: Tree) {
        u.insert(5, "e");
        // t is now strictly smaller in both argument orders
        assert_eq!(entries(&intersection(&u, &t)), vec![(2, "b"), (3, "c")]);
    }

    #[rstest]
    fn test_intersection_with_combines_in_argument_order(t: Tree, mut u: Tree) {
        u.insert(5, "e");
        let first = intersection_with(&t, &u, |x, _| Some(*x));
        let second = intersection_with(&u, &t, |x, _| Some(*x));
        assert_eq!(entries(&first), vec![(2, "b"), (3, "c")]);
        assert_eq!(entries(&second), vec![(2, "b"), (3, "x")]);
    }

    #[rstest]
    fn test_intersection_with_none_drops_key(t: Tree, u: Tree) {
        let result = intersection_with(&t, &u, |x, y| (x == y).then_some(*x));
        assert_eq!(entries(&result), vec![(2, "b")]);
    }

    #[rstest]
    fn test_union_prefers_larger_operand(t: Tree, u: Tree) {
        assert_eq!(entries(&union(&t, &u)), vec![(1, "a"), (2, "b"), (3, "c"), (4, "d")]);
        assert_eq!(entries(&union(&u, &t)), vec![(1, "a"), (2, "b"), (3, "x"), (4, "d")]);
    }

    #[rstest]
    fn test_union_with_sees_t_value_first(t: Tree, mut u: Tree) {
        u.insert(5, "e");
        let result = union_with(&t, &u, |x, _| Some(*x));
        assert_eq!(
            entries(&result),
            vec![(1, "a"), (2, "b"), (3, "c"), (4, "d"), (5, "e")]
        );
        let dropped = union_with(&t, &u, |_, _| None);
        assert_eq!(entries(&dropped), vec![(1, "a"), (4, "d"), (5, "e")]);
    }

    #[rstest]
    fn test_difference(t: Tree, u: Tree) {
        assert_eq!(entries(&difference(&t, &u)), vec![(1, "a")]);
        assert_eq!(entries(&difference(&u, &t)), vec![(4, "d")]);
    }

    #[rstest]
    fn test_difference_with_keeps_selected_keys(t: Tree, u: Tree) {
        let result = difference_with(&t, &u, |x, y| (x != y).then_some(*y));
        assert_eq!(entries(&result), vec![(1, "a"), (3, "x")]);
    }

    #[rstest]
    fn test_empty_operands(t: Tree) {
        let empty = Tree::new();
        assert!(intersection(&t, &empty).is_empty());
        assert!(intersection(&empty, &t).is_empty());
        assert_eq!(entries(&union(&empty, &t)), entries(&t));
        assert_eq!(entries(&union(&t, &empty)), entries(&t));
        assert!(difference(&empty, &t).is_empty());
        assert_eq!(entries(&difference(&t, &empty)), entries(&t));
    }

    #[rstest]
    fn test_results_share_the_copied_root_when_nothing_changes(t: Tree) {
        let same = intersection(&t, &t.copy());
        let (Some(original), Some(result)) = (&t.root, &same.root) else {
            panic!("roots should exist");
        };
        assert!(ReferenceCounter::ptr_eq(original, result));
    }

    #[rstest]
    fn test_equals(t: Tree, u: Tree) {
        assert!(equals(&t, &t));
        assert!(equals(&t, &t.copy()));
        assert!(!equals(&t, &u));

        let mut bigger = t.copy();
        bigger.insert(99, "z");
        assert!(!equals(&t, &bigger));

        let rebuilt: Tree = [(3, "c"), (1, "a"), (2, "b")].into_iter().collect();
        assert!(equals(&t, &rebuilt));
    }

    #[rstest]
    fn test_equiv_uses_predicate(t: Tree) {
        let shouted: Tree = [(1, "A"), (2, "B"), (3, "C")].into_iter().collect();
        assert!(!equals(&t, &shouted));
        assert!(equiv(&t, &shouted, |x, y| x.eq_ignore_ascii_case(y)));
    }
}
