//! # ordset
//!
//! A persistent ordered set for Rust: a value-semantic collection that
//! preserves insertion order, guarantees element uniqueness, and answers
//! membership and index queries in O(1) expected time.
//!
//! ## Overview
//!
//! A plain sequence preserves order but pays O(n) for membership checks;
//! an unordered set answers membership in O(1) but forgets insertion order.
//! [`OrderedSet`](persistent::OrderedSet) is the hybrid: it keeps three
//! synchronized views of the same logical collection (an ordered sequence,
//! a hash set, and a hash-to-position index) so that iteration order,
//! positional access, and membership queries are all cheap at once.
//!
//! All operations follow functional programming principles:
//!
//! - **Referential Transparency**: Same inputs always produce same outputs
//! - **Immutability**: All operations return new instances without modifying the original
//! - **No Side Effects**: Pure functions with no observable side effects
//!
//! ## Feature Flags
//!
//! - `rand` (default): Shuffling and random element selection via the `rand` crate
//! - `serde`: Serialization as a plain sequence; deserialization rejects duplicates
//! - `fxhash`: Position-index hashing via `rustc-hash` instead of `DefaultHasher`
//!
//! ## Example
//!
//! ```rust
//! use ordset::prelude::*;
//!
//! let set: OrderedSet<i32> = [1, 2, 3, 4, 5, 4, 2].into();
//! assert_eq!(set.as_slice(), &[1, 2, 3, 4, 5]);
//! assert!(set.contains(&4));
//! assert_eq!(set.index_of(&4), Some(3));
//!
//! // Producing operations leave the receiver untouched
//! let appended = set.append(6);
//! assert_eq!(set.len(), 5);
//! assert_eq!(appended.len(), 6);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types.
///
/// # Usage
///
/// ```rust
/// use ordset::prelude::*;
/// ```
pub mod prelude {
    pub use crate::persistent::NonUniqueElementsError;
    pub use crate::persistent::OrderedSet;
}

pub mod persistent;
