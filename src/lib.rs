//! # persistent-avl
//!
//! A persistent ordered map built on an AVL tree.
//!
//! ## Overview
//!
//! Every update produces a new version of the map that shares all untouched
//! subtrees with the previous one. Old versions stay valid, and taking a
//! copy is O(1). On top of the map the crate provides:
//!
//! - **Lookups**: exact, minimum/maximum and bound queries (`glb`, `lub`)
//! - **Traversal**: cursor iterators and restartable push-style sequences
//! - **Set algebra**: intersection, union and difference, with optional
//!   value combining
//!
//! ## Feature Flags
//!
//! - `arc`: Share nodes through `Arc` so trees are `Send + Sync`
//! - `serde`: Serialize and deserialize trees as maps
//! - `full`: Enable all features
//!
//! ## Example
//!
//! ```rust
//! use persistent_avl::prelude::*;
//!
//! let mut tree = PersistentAvlTree::new();
//! tree.insert(2, "two");
//! tree.insert(1, "one");
//!
//! let previous = tree.copy();
//! tree.remove(&1);
//!
//! assert_eq!(previous.len(), 2);
//! assert_eq!(tree.keys_seq().to_vec(), vec![&2]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types and traits.
///
/// # Usage
///
/// ```rust
/// use persistent_avl::prelude::*;
/// ```
pub mod prelude {
    pub use crate::persistent::*;
}

pub mod persistent;
