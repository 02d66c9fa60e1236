//! Persistent (immutable) ordered collections.
//!
//! This module provides [`OrderedSet`], a persistent collection that keeps
//! three synchronized views of the same logical contents:
//!
//! - a **sequence view** (ordered, index-addressable, the source of truth
//!   for iteration order),
//! - a **membership view** (a hash set answering presence queries in O(1)
//!   expected time),
//! - a **position index** (element hash to sequence position, answering
//!   index queries in O(1) expected time).
//!
//! Every producing operation returns a brand-new value; the receiver is
//! never mutated. Because no instance aliases another instance's storage,
//! values are freely shareable across threads for concurrent reads.
//!
//! # Examples
//!
//! ```rust
//! use ordset::persistent::OrderedSet;
//!
//! let set: OrderedSet<&str> = ["one", "two", "three"].into();
//!
//! assert_eq!(set.index_of(&"two"), Some(1));
//! assert_eq!(set[2], "three");
//!
//! let shorter = set.remove(&"one");
//! assert_eq!(set.len(), 3);     // Original unchanged
//! assert_eq!(shorter.len(), 2); // New set
//! ```

mod ordered_set;

pub use ordered_set::NonUniqueElementsError;
pub use ordered_set::OrderedSet;
pub use ordered_set::OrderedSetIntoIterator;
pub use ordered_set::OrderedSetIterator;
