//! Unit tests for PersistentAvlTree.
//!
//! Covers construction, lookups, bound queries, updates and the
//! persistence of earlier versions through the public API.

use persistent_avl::persistent::{InvariantViolation, PersistentAvlTree};
use rstest::{fixture, rstest};

// =============================================================================
// Fixtures
// =============================================================================

#[fixture]
fn tens() -> PersistentAvlTree<i32, String> {
    [10, 20, 30, 40, 50]
        .into_iter()
        .map(|key| (key, format!("v{key}")))
        .collect()
}

fn keys_of<V>(tree: &PersistentAvlTree<i32, V>) -> Vec<i32> {
    tree.keys().copied().collect()
}

// =============================================================================
// Construction Tests
// =============================================================================

#[rstest]
fn test_new_creates_empty_tree() {
    let tree: PersistentAvlTree<i32, String> = PersistentAvlTree::new();
    assert!(tree.is_empty());
    assert_eq!(tree.len(), 0);
    assert_eq!(tree.height(), 0);
    assert_eq!(tree.min(), None);
    assert_eq!(tree.max(), None);
    assert_eq!(tree.validate(), Ok(()));
}

#[rstest]
fn test_default_creates_empty_tree() {
    let tree: PersistentAvlTree<i32, String> = PersistentAvlTree::default();
    assert!(tree.is_empty());
}

#[rstest]
fn test_singleton_creates_tree_with_one_entry() {
    let tree = PersistentAvlTree::singleton(42, "answer".to_string());
    assert_eq!(tree.len(), 1);
    assert!(tree.is_single());
    assert_eq!(tree.get(&42), Some(&"answer".to_string()));
}

#[rstest]
fn test_from_iterator_keeps_last_value_for_duplicates() {
    let tree: PersistentAvlTree<&str, i32> =
        [("a", 1), ("b", 2), ("a", 3)].into_iter().collect();
    assert_eq!(tree.len(), 2);
    assert_eq!(tree.get("a"), Some(&3));
}

#[rstest]
fn test_extend_adds_entries() {
    let mut tree: PersistentAvlTree<i32, i32> = (0..5).map(|key| (key, key)).collect();
    tree.extend((5..10).map(|key| (key, key)));
    assert_eq!(keys_of(&tree), (0..10).collect::<Vec<_>>());
}

// =============================================================================
// Lookup Tests
// =============================================================================

#[rstest]
fn test_get_and_contains_key(tens: PersistentAvlTree<i32, String>) {
    assert_eq!(tens.get(&30), Some(&"v30".to_string()));
    assert_eq!(tens.get(&35), None);
    assert!(tens.contains_key(&50));
    assert!(!tens.contains_key(&0));
}

#[rstest]
fn test_get_with_borrowed_key() {
    let tree: PersistentAvlTree<String, i32> = [("one".to_string(), 1), ("two".to_string(), 2)]
        .into_iter()
        .collect();
    assert_eq!(tree.get("two"), Some(&2));
    assert!(!tree.contains_key("three"));
}

#[rstest]
fn test_min_and_max(tens: PersistentAvlTree<i32, String>) {
    assert_eq!(tens.min(), Some((&10, &"v10".to_string())));
    assert_eq!(tens.max(), Some((&50, &"v50".to_string())));
}

#[rstest]
#[case(5, None, None)]
#[case(10, None, Some(10))]
#[case(25, Some(20), Some(20))]
#[case(30, Some(20), Some(30))]
#[case(99, Some(50), Some(50))]
fn test_glb_and_glb_eq(
    tens: PersistentAvlTree<i32, String>,
    #[case] probe: i32,
    #[case] strictly_below: Option<i32>,
    #[case] at_most: Option<i32>,
) {
    assert_eq!(tens.glb(&probe).map(|(key, _)| *key), strictly_below);
    assert_eq!(tens.glb_eq(&probe).map(|(key, _)| *key), at_most);
}

#[rstest]
#[case(5, Some(10), Some(10))]
#[case(30, Some(40), Some(30))]
#[case(45, Some(50), Some(50))]
#[case(50, None, Some(50))]
#[case(99, None, None)]
fn test_lub_and_lub_eq(
    tens: PersistentAvlTree<i32, String>,
    #[case] probe: i32,
    #[case] strictly_above: Option<i32>,
    #[case] at_least: Option<i32>,
) {
    assert_eq!(tens.lub(&probe).map(|(key, _)| *key), strictly_above);
    assert_eq!(tens.lub_eq(&probe).map(|(key, _)| *key), at_least);
}

#[rstest]
fn test_bounds_on_empty_tree() {
    let tree: PersistentAvlTree<i32, ()> = PersistentAvlTree::new();
    assert_eq!(tree.glb(&0), None);
    assert_eq!(tree.glb_eq(&0), None);
    assert_eq!(tree.lub(&0), None);
    assert_eq!(tree.lub_eq(&0), None);
}

// =============================================================================
// Update Tests
// =============================================================================

#[rstest]
fn test_insert_returns_previous_value(mut tens: PersistentAvlTree<i32, String>) {
    assert_eq!(tens.insert(25, "v25".to_string()), None);
    assert_eq!(
        tens.insert(25, "twenty-five".to_string()),
        Some("v25".to_string())
    );
    assert_eq!(tens.len(), 6);
    assert_eq!(tens.validate(), Ok(()));
}

#[rstest]
fn test_remove_returns_value(mut tens: PersistentAvlTree<i32, String>) {
    assert_eq!(tens.remove(&30), Some("v30".to_string()));
    assert_eq!(tens.remove(&30), None);
    assert_eq!(keys_of(&tens), vec![10, 20, 40, 50]);
    assert_eq!(tens.validate(), Ok(()));
}

#[rstest]
fn test_remove_from_empty_tree() {
    let mut tree: PersistentAvlTree<i32, i32> = PersistentAvlTree::new();
    assert_eq!(tree.remove(&1), None);
    assert!(tree.is_empty());
}

#[rstest]
fn test_remove_every_key_empties_tree(mut tens: PersistentAvlTree<i32, String>) {
    for key in [30, 10, 50, 20, 40] {
        assert!(tens.remove(&key).is_some());
        assert_eq!(tens.validate(), Ok(()));
    }
    assert!(tens.is_empty());
    assert_eq!(tens.height(), 0);
}

#[rstest]
fn test_remove_min_and_max(mut tens: PersistentAvlTree<i32, String>) {
    assert_eq!(tens.remove_min(), Some((10, "v10".to_string())));
    assert_eq!(tens.remove_max(), Some((50, "v50".to_string())));
    assert_eq!(keys_of(&tens), vec![20, 30, 40]);
}

#[rstest]
fn test_into_iter_drains_in_order(tens: PersistentAvlTree<i32, String>) {
    let drained: Vec<i32> = tens.into_iter().map(|(key, _)| key).collect();
    assert_eq!(drained, vec![10, 20, 30, 40, 50]);
}

// =============================================================================
// Persistence Tests
// =============================================================================

#[rstest]
fn test_copy_is_independent_of_later_inserts() {
    let mut tree: PersistentAvlTree<i32, i32> = PersistentAvlTree::new();
    for key in 1..=14 {
        tree.insert(key, key * 10);
    }
    let before = tree.copy();
    tree.insert(15, 150);

    assert_eq!(before.len(), 14);
    assert_eq!(before.get(&15), None);
    assert_eq!(tree.len(), 15);
    assert_eq!(tree.get(&15), Some(&150));
    assert_eq!(before.validate(), Ok(()));
    assert_eq!(tree.validate(), Ok(()));
}

#[rstest]
fn test_copy_is_independent_of_later_removes(tens: PersistentAvlTree<i32, String>) {
    let mut shrinking = tens.copy();
    shrinking.remove(&10);
    shrinking.remove(&40);
    assert_eq!(keys_of(&tens), vec![10, 20, 30, 40, 50]);
    assert_eq!(keys_of(&shrinking), vec![20, 30, 50]);
}

#[rstest]
fn test_every_version_survives() {
    let mut versions = vec![PersistentAvlTree::new()];
    for key in 0..50 {
        let mut next = versions[versions.len() - 1].copy();
        next.insert(key, key);
        versions.push(next);
    }
    for (size, version) in versions.iter().enumerate() {
        assert_eq!(version.len(), size);
        assert_eq!(version.validate(), Ok(()));
    }
}

#[rstest]
fn test_update_value_is_not_visible_in_copy(tens: PersistentAvlTree<i32, String>) {
    let mut updated = tens.copy();
    updated.insert(20, "changed".to_string());
    assert_eq!(tens.get(&20), Some(&"v20".to_string()));
    assert_eq!(updated.get(&20), Some(&"changed".to_string()));
}

// =============================================================================
// Height Tests
// =============================================================================

#[rstest]
#[case(1, 1)]
#[case(3, 2)]
#[case(7, 3)]
#[case(15, 4)]
#[case(1023, 10)]
fn test_ascending_inserts_build_perfect_trees(#[case] size: i32, #[case] height: usize) {
    let tree: PersistentAvlTree<i32, ()> = (0..size).map(|key| (key, ())).collect();
    assert_eq!(tree.height(), height);
}

#[rstest]
fn test_height_stays_logarithmic() {
    let tree: PersistentAvlTree<u32, ()> = (0..100_000).map(|key| (key, ())).collect();
    // 1.44 * log2(100_000) is about 24
    assert!(tree.height() <= 24);
    assert_eq!(tree.validate(), Ok(()));
}

// =============================================================================
// Formatting and Equality Tests
// =============================================================================

#[rstest]
fn test_display_and_debug() {
    let tree: PersistentAvlTree<i32, &str> = [(2, "b"), (1, "a")].into_iter().collect();
    assert_eq!(tree.to_string(), "1:a; 2:b");
    assert_eq!(format!("{tree:?}"), r#"{1: "a", 2: "b"}"#);
}

#[rstest]
fn test_equality_ignores_insertion_order() {
    let ascending: PersistentAvlTree<i32, i32> = (0..20).map(|key| (key, key)).collect();
    let descending: PersistentAvlTree<i32, i32> = (0..20).rev().map(|key| (key, key)).collect();
    assert_eq!(ascending, descending);

    let mut different = descending.copy();
    different.insert(7, -7);
    assert_ne!(ascending, different);
}

#[rstest]
fn test_equal_trees_hash_equally() {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of(tree: &PersistentAvlTree<i32, i32>) -> u64 {
        let mut hasher = DefaultHasher::new();
        tree.hash(&mut hasher);
        hasher.finish()
    }

    let first: PersistentAvlTree<i32, i32> = (0..20).map(|key| (key, key)).collect();
    let second: PersistentAvlTree<i32, i32> = (0..20).rev().map(|key| (key, key)).collect();
    assert_eq!(hash_of(&first), hash_of(&second));
}

#[rstest]
fn test_invariant_violation_is_an_error() {
    let violation = InvariantViolation::OutOfOrder { position: 3 };
    let error: &dyn std::error::Error = &violation;
    assert_eq!(error.to_string(), "key at in-order position 3 is out of order");
}
