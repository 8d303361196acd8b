//! Persistent (immutable) ordered maps.
//!
//! - [`PersistentAvlTree`]: Persistent ordered map (AVL tree)
//!
//! # Structural Sharing
//!
//! Every update path-copies from the root to the changed node and shares
//! all other subtrees with the previous version, so old versions remain
//! valid and cheap to keep around.
//!
//! # Examples
//!
//! ```rust
//! use persistent_avl::persistent::{PersistentAvlTree, union_with};
//!
//! let mut stock = PersistentAvlTree::new();
//! stock.insert("apples", 3);
//! stock.insert("pears", 1);
//!
//! let snapshot = stock.copy();
//! stock.insert("pears", 5);
//!
//! assert_eq!(snapshot.get("pears"), Some(&1)); // Original unchanged
//! assert_eq!(stock.get("pears"), Some(&5));
//!
//! let merged = union_with(&snapshot, &stock, |old, new| Some(old.max(new)).copied());
//! assert_eq!(merged.get("pears"), Some(&5));
//! ```

// =============================================================================
// Reference Counter Type Alias
// =============================================================================

/// Reference-counted smart pointer type.
///
/// When the `arc` feature is enabled, this is `std::sync::Arc`, and trees
/// can be shared across threads.
///
/// When the `arc` feature is disabled (default), this is `std::rc::Rc`,
/// which is faster but not thread-safe.
#[cfg(feature = "arc")]
pub(crate) type ReferenceCounter<T> = std::sync::Arc<T>;

#[cfg(not(feature = "arc"))]
pub(crate) type ReferenceCounter<T> = std::rc::Rc<T>;

mod avl_tree;

pub use avl_tree::FilteredEntries;
pub use avl_tree::FlatEntries;
pub use avl_tree::IntoIter;
pub use avl_tree::InvariantViolation;
pub use avl_tree::Iter;
pub use avl_tree::Keys;
pub use avl_tree::PersistentAvlTree;
pub use avl_tree::RecursiveEntries;
pub use avl_tree::RecursiveKeys;
pub use avl_tree::RecursiveValues;
pub use avl_tree::Sequence;
pub use avl_tree::Values;
pub use avl_tree::{
    difference, difference_with, equals, equiv, intersection, intersection_with, union,
    union_with,
};

// =============================================================================
// Tests
// =============================================================================
