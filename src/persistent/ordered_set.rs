//! Persistent ordered set backed by three synchronized views.
//!
//! This module provides [`OrderedSet`], a persistent collection that
//! preserves insertion order, guarantees element uniqueness, and answers
//! membership and index queries in O(1) expected time.
//!
//! # Overview
//!
//! `OrderedSet` maintains three views of the same logical contents:
//!
//! - **Sequence view**: a `Vec<T>` holding the elements in order. Source of
//!   truth for iteration order and positional access.
//! - **Membership view**: a `HashSet<T>` holding the same elements. Answers
//!   presence queries without scanning the sequence.
//! - **Position index**: a `HashMap<u64, usize>` from an element's hash to
//!   its position in the sequence view. Answers index queries without
//!   scanning the sequence.
//!
//! Every producing operation computes fresh contents for the views and
//! returns a brand-new value. The receiver is never mutated, so previously
//! obtained instances remain valid and can be read concurrently without
//! coordination.
//!
//! # Time Complexity
//!
//! | Operation          | Complexity        |
//! |--------------------|-------------------|
//! | `contains`         | O(1) expected     |
//! | `index_of`         | O(1) expected     |
//! | `get`, indexing    | O(1)              |
//! | `append`           | O(n)              |
//! | `insert_at`        | O(n)              |
//! | `remove` family    | O(n)              |
//! | `union`            | O(n + m)          |
//! | `filter`, `map`    | O(n)              |
//! | `sorted_by`        | O(n log n)        |
//! | `swap_at`          | O(n) copy, O(1) index patch |
//!
//! Producing operations pay at least one O(n) copy because the result is an
//! independent value. `swap_at` is the only operation whose index
//! maintenance is incremental; every other mutation either changes set
//! membership or shifts many positions at once, so the index is rebuilt.
//!
//! # Examples
//!
//! ```rust
//! use ordset::persistent::OrderedSet;
//!
//! // Duplicates collapse onto their first occurrence
//! let set: OrderedSet<i32> = [1, 2, 3, 4, 5, 4, 2].into();
//! assert_eq!(set.as_slice(), &[1, 2, 3, 4, 5]);
//!
//! // Membership and index lookups are O(1)
//! assert!(set.contains(&4));
//! assert_eq!(set.index_of(&4), Some(3));
//!
//! // Producing operations leave the receiver untouched
//! let removed = set.remove(&3);
//! assert_eq!(set.len(), 5);
//! assert_eq!(removed.as_slice(), &[1, 2, 4, 5]);
//! ```

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{BitAnd, BitOr, Index, Sub};

// =============================================================================
// Hash computation
// =============================================================================

/// Computes the hash of an element for the position index.
///
/// Uses `FxHasher` when the `fxhash` feature is enabled, `DefaultHasher`
/// otherwise. Both produce the same value for equal elements across calls
/// within a process, which the position index relies on.
fn compute_hash<T: Hash + ?Sized>(element: &T) -> u64 {
    #[cfg(feature = "fxhash")]
    let mut hasher = rustc_hash::FxHasher::default();
    #[cfg(not(feature = "fxhash"))]
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    element.hash(&mut hasher);
    hasher.finish()
}

// =============================================================================
// OrderedSet Definition
// =============================================================================

/// A persistent, order-preserving set with O(1) membership and index lookup.
///
/// The collection behaves like a sequence (stable insertion order, positional
/// access) and like a set (unique elements, cheap membership tests) at the
/// same time. All operations are immutable and return new instances.
///
/// # Type Parameters
///
/// * `T` - The element type. Must implement `Clone`, `Hash`, and `Eq`.
///   Equal elements must hash equally; mutating an element after insertion
///   in a way that changes its hash or equality is a caller contract
///   violation and desynchronizes the internal views.
///
/// # Examples
///
/// ```rust
/// use ordset::persistent::OrderedSet;
///
/// let set: OrderedSet<&str> = ["a", "b", "c"].into();
/// assert_eq!(set[0], "a");
/// assert_eq!(set.index_of(&"c"), Some(2));
///
/// let appended = set.append("d");
/// assert_eq!(set.len(), 3);      // Original unchanged
/// assert_eq!(appended.len(), 4); // New set
/// ```
#[derive(Clone)]
pub struct OrderedSet<T: Clone + Hash + Eq> {
    sequence: Vec<T>,
    membership: HashSet<T>,
    position_index: HashMap<u64, usize>,
}

// =============================================================================
// Construction
// =============================================================================

impl<T: Clone + Hash + Eq> OrderedSet<T> {
    /// Creates a new empty set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordset::persistent::OrderedSet;
    ///
    /// let set: OrderedSet<i32> = OrderedSet::new();
    /// assert!(set.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            sequence: Vec::new(),
            membership: HashSet::new(),
            position_index: HashMap::new(),
        }
    }

    /// Creates a set from `elements`, keeping the FIRST occurrence of each
    /// duplicate at its original position.
    ///
    /// This is the default construction policy; `FromIterator`, `From<[T; N]>`
    /// and `collect()` all use it.
    ///
    /// # Complexity
    ///
    /// O(n) expected.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordset::persistent::OrderedSet;
    ///
    /// let set = OrderedSet::retaining_first_occurrences([1, 2, 3, 4, 5, 4, 2]);
    /// assert_eq!(set.as_slice(), &[1, 2, 3, 4, 5]);
    /// ```
    #[must_use]
    pub fn retaining_first_occurrences<I>(elements: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let elements = elements.into_iter();
        let (lower_bound, _) = elements.size_hint();
        let mut sequence = Vec::with_capacity(lower_bound);
        let mut membership = HashSet::with_capacity(lower_bound);
        let mut position_index = HashMap::with_capacity(lower_bound);
        for element in elements {
            if membership.insert(element.clone()) {
                position_index.insert(compute_hash(&element), sequence.len());
                sequence.push(element);
            }
        }
        Self::from_views(sequence, membership, position_index)
    }

    /// Creates a set from `elements`, keeping the LAST occurrence of each
    /// duplicate at its last-seen position.
    ///
    /// Unlike [`retaining_first_occurrences`](Self::retaining_first_occurrences),
    /// a repeated element moves to the position of its final appearance.
    ///
    /// # Complexity
    ///
    /// O(n) expected. The previous occurrence is never searched for
    /// linearly; positions are tracked during a single pass instead.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordset::persistent::OrderedSet;
    ///
    /// let set = OrderedSet::retaining_last_occurrences([1, 2, 3, 4, 5, 4, 2]);
    /// assert_eq!(set.as_slice(), &[1, 3, 5, 4, 2]);
    /// ```
    #[must_use]
    pub fn retaining_last_occurrences<I>(elements: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let input: Vec<T> = elements.into_iter().collect();
        let mut last_positions: HashMap<T, usize> = HashMap::with_capacity(input.len());
        for (position, element) in input.iter().enumerate() {
            last_positions.insert(element.clone(), position);
        }

        let mut sequence = Vec::with_capacity(last_positions.len());
        let mut membership = HashSet::with_capacity(last_positions.len());
        for (position, element) in input.into_iter().enumerate() {
            if last_positions.get(&element) == Some(&position) {
                membership.insert(element.clone());
                sequence.push(element);
            }
        }
        Self::from_deduplicated(sequence, membership)
    }

    /// Creates a set from the contents of `set`, ordered by `comparator`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::collections::HashSet;
    /// use ordset::persistent::OrderedSet;
    ///
    /// let unordered: HashSet<i32> = [1, 2, 3, 4, 5].into();
    /// let descending = OrderedSet::from_hash_set_sorted_by(unordered, |a, b| b.cmp(a));
    /// assert_eq!(descending.as_slice(), &[5, 4, 3, 2, 1]);
    /// ```
    #[must_use]
    pub fn from_hash_set_sorted_by<F>(set: HashSet<T>, comparator: F) -> Self
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let mut sequence: Vec<T> = set.iter().cloned().collect();
        sequence.sort_by(comparator);
        Self::from_deduplicated(sequence, set)
    }

    /// Creates a set from the contents of `set`, in the element type's
    /// natural order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::collections::HashSet;
    /// use ordset::persistent::OrderedSet;
    ///
    /// let unordered: HashSet<i32> = [4, 1, 2, 6, 3].into();
    /// let ascending = OrderedSet::from_hash_set(unordered);
    /// assert_eq!(ascending.as_slice(), &[1, 2, 3, 4, 6]);
    /// ```
    #[must_use]
    pub fn from_hash_set(set: HashSet<T>) -> Self
    where
        T: Ord,
    {
        let mut sequence: Vec<T> = set.iter().cloned().collect();
        sequence.sort_unstable();
        Self::from_deduplicated(sequence, set)
    }

    // =========================================================================
    // Rebuild primitives
    // =========================================================================

    /// Derives the position index from an already deduplicated sequence.
    fn rebuild_position_index(sequence: &[T]) -> HashMap<u64, usize> {
        sequence
            .iter()
            .enumerate()
            .map(|(position, element)| (compute_hash(element), position))
            .collect()
    }

    /// Assembles a set from a deduplicated sequence and its matching
    /// membership view, rebuilding only the position index.
    fn from_deduplicated(sequence: Vec<T>, membership: HashSet<T>) -> Self {
        let position_index = Self::rebuild_position_index(&sequence);
        Self::from_views(sequence, membership, position_index)
    }

    /// Assembles a set from a deduplicated sequence alone, rebuilding the
    /// membership view and the position index.
    fn from_deduplicated_sequence(sequence: Vec<T>) -> Self {
        let membership: HashSet<T> = sequence.iter().cloned().collect();
        Self::from_deduplicated(sequence, membership)
    }

    /// Assembles a set from three fully prepared views.
    ///
    /// Every constructor and producing operation funnels through here, so
    /// view consistency is checked in exactly one place.
    fn from_views(
        sequence: Vec<T>,
        membership: HashSet<T>,
        position_index: HashMap<u64, usize>,
    ) -> Self {
        let set = Self {
            sequence,
            membership,
            position_index,
        };
        debug_assert!(set.check_invariants(), "internal views are out of sync");
        set
    }

    /// Verifies mutual consistency of the three views.
    ///
    /// Holds after every construction and every producing operation:
    /// the views agree on length, every sequence element is a member,
    /// every element's indexed position is its sequence position, and no
    /// two index entries share a position.
    fn check_invariants(&self) -> bool {
        let distinct_positions: HashSet<usize> = self.position_index.values().copied().collect();
        self.sequence.len() == self.membership.len()
            && self.membership.len() == self.position_index.len()
            && distinct_positions.len() == self.position_index.len()
            && self
                .sequence
                .iter()
                .enumerate()
                .all(|(position, element)| {
                    self.position_index.get(&compute_hash(element)).copied() == Some(position)
                })
            && self
                .sequence
                .iter()
                .all(|element| self.membership.contains(element))
    }

    // =========================================================================
    // Queries and metadata
    // =========================================================================

    /// Returns the number of elements in the set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordset::persistent::OrderedSet;
    ///
    /// let set: OrderedSet<i32> = [1, 2, 3, 3].into();
    /// assert_eq!(set.len(), 3);
    /// ```
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// Returns `true` if the set contains no elements.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Returns `true` if the set contains `element`.
    ///
    /// This method supports borrowed forms of the element type through the
    /// `Borrow` trait. For example, with `OrderedSet<String>`, you can
    /// query using `&str` directly without allocating a new `String`.
    ///
    /// # Complexity
    ///
    /// O(1) expected.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordset::persistent::OrderedSet;
    ///
    /// let set: OrderedSet<i32> = [1, 2, 3].into();
    /// assert!(set.contains(&2));
    /// assert!(!set.contains(&9));
    /// ```
    #[inline]
    #[must_use]
    pub fn contains<Q>(&self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.membership.contains(element)
    }

    /// Returns `true` if the set contains any element of `elements`.
    ///
    /// Short-circuits on the first hit.
    ///
    /// # Complexity
    ///
    /// O(k) expected, where k is the length of `elements`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordset::persistent::OrderedSet;
    ///
    /// let set: OrderedSet<i32> = [1, 2, 3, 4, 5].into();
    /// assert!(set.contains_any_of(&[7, 5]));
    /// assert!(!set.contains_any_of(&[7, 8]));
    /// ```
    #[must_use]
    pub fn contains_any_of<'a, I>(&self, elements: I) -> bool
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        elements
            .into_iter()
            .any(|element| self.membership.contains(element))
    }

    /// Returns the position of `element`, or `None` if it is not a member.
    ///
    /// # Complexity
    ///
    /// O(1) expected. The position comes from the position index, not from
    /// scanning the sequence.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordset::persistent::OrderedSet;
    ///
    /// let set: OrderedSet<i32> = [1, 2, 3, 4, 5].into();
    /// assert_eq!(set.index_of(&1), Some(0));
    /// assert_eq!(set.index_of(&5), Some(4));
    /// assert_eq!(set.index_of(&6), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn index_of<Q>(&self, element: &Q) -> Option<usize>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.position_index.get(&compute_hash(element)).copied()
    }

    /// Returns the position of `element`, or `None` if it is not a member.
    ///
    /// All members are unique, so the first index of an element is its only
    /// index; this is an alias for [`index_of`](Self::index_of) and always
    /// agrees with [`last_index_of`](Self::last_index_of).
    #[inline]
    #[must_use]
    pub fn first_index_of<Q>(&self, element: &Q) -> Option<usize>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index_of(element)
    }

    /// Returns the position of `element`, or `None` if it is not a member.
    ///
    /// All members are unique, so the last index of an element is its only
    /// index; this is an alias for [`index_of`](Self::index_of) and always
    /// agrees with [`first_index_of`](Self::first_index_of).
    #[inline]
    #[must_use]
    pub fn last_index_of<Q>(&self, element: &Q) -> Option<usize>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index_of(element)
    }

    /// Returns a reference to the element at `position`, or `None` if the
    /// position is out of bounds.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordset::persistent::OrderedSet;
    ///
    /// let set: OrderedSet<i32> = [0, 1, 2, 3, 4].into();
    /// assert_eq!(set.get(2), Some(&2));
    /// assert_eq!(set.get(6), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&T> {
        self.sequence.get(position)
    }

    /// Returns a reference to the first element, or `None` if the set is empty.
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.sequence.first()
    }

    /// Returns a reference to the last element, or `None` if the set is empty.
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.sequence.last()
    }

    /// Returns the elements as a slice, in order.
    ///
    /// # Complexity
    ///
    /// O(1).
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.sequence
    }

    /// Returns a `Vec` containing clones of the elements, in order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.sequence.clone()
    }

    /// Returns the membership view as an unordered `HashSet`.
    ///
    /// # Complexity
    ///
    /// O(1).
    #[inline]
    #[must_use]
    pub fn as_hash_set(&self) -> &HashSet<T> {
        &self.membership
    }

    /// Returns an iterator over references to the elements, in order.
    #[inline]
    #[must_use]
    pub fn iter(&self) -> OrderedSetIterator<'_, T> {
        OrderedSetIterator {
            inner: self.sequence.iter(),
        }
    }

    // =========================================================================
    // Set predicates
    // =========================================================================

    /// Returns `true` if every element of this set is also in `other`.
    ///
    /// Order is ignored; only the membership views are compared.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordset::persistent::OrderedSet;
    ///
    /// let set: OrderedSet<i32> = [1, 2, 3, 4, 5].into();
    /// let subset: OrderedSet<i32> = [2, 3, 5].into();
    /// assert!(subset.is_subset(&set));
    /// assert!(!set.is_subset(&subset));
    /// ```
    #[must_use]
    pub fn is_subset(&self, other: &Self) -> bool {
        self.membership.is_subset(&other.membership)
    }

    /// Returns `true` if every element of this set is also in the unordered
    /// set `other`.
    #[must_use]
    pub fn is_subset_of_set(&self, other: &HashSet<T>) -> bool {
        self.membership.is_subset(other)
    }

    /// Returns `true` if every element of `other` is also in this set.
    #[must_use]
    pub fn is_superset(&self, other: &Self) -> bool {
        self.membership.is_superset(&other.membership)
    }

    /// Returns `true` if every element of the unordered set `other` is also
    /// in this set.
    #[must_use]
    pub fn is_superset_of_set(&self, other: &HashSet<T>) -> bool {
        self.membership.is_superset(other)
    }

    /// Returns `true` if this set and `other` share no elements.
    #[must_use]
    pub fn is_disjoint(&self, other: &Self) -> bool {
        self.membership.is_disjoint(&other.membership)
    }

    /// Returns `true` if this set and the unordered set `other` share no
    /// elements.
    #[must_use]
    pub fn is_disjoint_from_set(&self, other: &HashSet<T>) -> bool {
        self.membership.is_disjoint(other)
    }

    /// Returns `true` if this set and `other` share at least one element.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        !self.is_disjoint(other)
    }

    /// Returns `true` if this set and the unordered set `other` share at
    /// least one element.
    #[must_use]
    pub fn intersects_set(&self, other: &HashSet<T>) -> bool {
        !self.is_disjoint_from_set(other)
    }

    // =========================================================================
    // Adding elements
    // =========================================================================

    /// Returns a new set with `element` appended at the end.
    ///
    /// Returns an equivalent set if `element` is already a member; an
    /// existing member is never relocated.
    ///
    /// # Complexity
    ///
    /// O(n) for the copy; the new element's index entry is derived
    /// incrementally (its position is the old length).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordset::persistent::OrderedSet;
    ///
    /// let set: OrderedSet<i32> = [1, 2, 3].into();
    /// assert_eq!(set.append(4).as_slice(), &[1, 2, 3, 4]);
    /// assert_eq!(set.append(2), set);
    /// ```
    #[must_use]
    pub fn append(&self, element: T) -> Self {
        if self.membership.contains(&element) {
            return self.clone();
        }

        let mut sequence = self.sequence.clone();
        let mut membership = self.membership.clone();
        let mut position_index = self.position_index.clone();
        position_index.insert(compute_hash(&element), sequence.len());
        sequence.push(element.clone());
        membership.insert(element);
        Self::from_views(sequence, membership, position_index)
    }

    /// Returns a new set with `element` inserted at `position`, shifting
    /// later elements towards the end.
    ///
    /// Returns an equivalent set if `element` is already a member; an
    /// existing member is never relocated.
    ///
    /// # Panics
    ///
    /// Panics if `position > len()`. `len()` itself is a valid insertion
    /// point and appends.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordset::persistent::OrderedSet;
    ///
    /// let set: OrderedSet<i32> = [1, 2, 3, 4, 5].into();
    /// assert_eq!(set.insert_at(9, 3).as_slice(), &[1, 2, 3, 9, 4, 5]);
    /// ```
    #[must_use]
    pub fn insert_at(&self, element: T, position: usize) -> Self {
        assert!(
            position <= self.len(),
            "insertion position {position} is out of bounds (len {})",
            self.len()
        );
        if self.membership.contains(&element) {
            return self.clone();
        }

        let mut sequence = self.sequence.clone();
        sequence.insert(position, element.clone());
        let mut membership = self.membership.clone();
        membership.insert(element);
        Self::from_deduplicated(sequence, membership)
    }

    /// Returns a new set with the contents of `other` appended to the end
    /// of this set.
    ///
    /// Elements already present keep their original position; new elements
    /// from `other` follow in their relative order.
    ///
    /// # Complexity
    ///
    /// O(n + m) expected.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordset::persistent::OrderedSet;
    ///
    /// let left: OrderedSet<i32> = [1, 2, 3].into();
    /// let right: OrderedSet<i32> = [3, 4, 5].into();
    /// assert_eq!(left.union(&right).as_slice(), &[1, 2, 3, 4, 5]);
    /// ```
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self::retaining_first_occurrences(
            self.sequence.iter().chain(other.sequence.iter()).cloned(),
        )
    }

    // =========================================================================
    // Removing elements
    // =========================================================================

    /// Returns a new set with the first element removed.
    ///
    /// # Panics
    ///
    /// Panics if the set is empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordset::persistent::OrderedSet;
    ///
    /// let set: OrderedSet<i32> = [1, 2, 3].into();
    /// assert_eq!(set.remove_first().as_slice(), &[2, 3]);
    /// ```
    #[must_use]
    pub fn remove_first(&self) -> Self {
        assert!(!self.is_empty(), "cannot remove from an empty OrderedSet");
        self.remove_at(0)
    }

    /// Returns a new set with the last element removed.
    ///
    /// # Panics
    ///
    /// Panics if the set is empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordset::persistent::OrderedSet;
    ///
    /// let set: OrderedSet<i32> = [1, 2, 3].into();
    /// assert_eq!(set.remove_last().as_slice(), &[1, 2]);
    /// ```
    #[must_use]
    pub fn remove_last(&self) -> Self {
        assert!(!self.is_empty(), "cannot remove from an empty OrderedSet");
        self.remove_at(self.len() - 1)
    }

    /// Returns a new set with the element at `position` removed, shifting
    /// later elements towards the front.
    ///
    /// # Panics
    ///
    /// Panics if `position >= len()`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordset::persistent::OrderedSet;
    ///
    /// let set: OrderedSet<i32> = [1, 2, 3, 4, 5].into();
    /// assert_eq!(set.remove_at(2).as_slice(), &[1, 2, 4, 5]);
    /// ```
    #[must_use]
    pub fn remove_at(&self, position: usize) -> Self {
        assert!(
            position < self.len(),
            "removal position {position} is out of bounds (len {})",
            self.len()
        );

        let mut sequence = self.sequence.clone();
        let element = sequence.remove(position);
        let mut membership = self.membership.clone();
        membership.remove(&element);
        Self::from_deduplicated(sequence, membership)
    }

    /// Returns a new set with `element` removed.
    ///
    /// Returns an equivalent set if `element` is not a member.
    ///
    /// This method supports borrowed forms of the element type through the
    /// `Borrow` trait.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordset::persistent::OrderedSet;
    ///
    /// let set: OrderedSet<i32> = [1, 2, 3].into();
    /// assert_eq!(set.remove(&2).as_slice(), &[1, 3]);
    /// assert_eq!(set.remove(&9), set);
    /// ```
    #[must_use]
    pub fn remove<Q>(&self, element: &Q) -> Self
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.index_of(element) {
            Some(position) => self.remove_at(position),
            None => self.clone(),
        }
    }

    /// Returns a new set without the elements for which `should_be_removed`
    /// returns `true`, preserving the relative order of the survivors.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordset::persistent::OrderedSet;
    ///
    /// let set: OrderedSet<i32> = [1, 2, 3, 4, 5].into();
    /// assert_eq!(set.remove_all(|element| element % 2 == 0).as_slice(), &[1, 3, 5]);
    /// ```
    #[must_use]
    pub fn remove_all<P>(&self, mut should_be_removed: P) -> Self
    where
        P: FnMut(&T) -> bool,
    {
        let sequence: Vec<T> = self
            .sequence
            .iter()
            .filter(|element| !should_be_removed(element))
            .cloned()
            .collect();
        Self::from_deduplicated_sequence(sequence)
    }

    /// Returns a new set with the elements at the given offsets removed.
    ///
    /// The offsets may be unordered and non-contiguous; survivors keep
    /// their relative order. Duplicate offsets are tolerated.
    ///
    /// # Panics
    ///
    /// Panics if any offset is out of bounds.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordset::persistent::OrderedSet;
    ///
    /// let set: OrderedSet<i32> = (1..=10).collect();
    /// let removed = set.remove_at_offsets([0, 9, 3, 1, 6]);
    /// assert_eq!(removed.as_slice(), &[3, 5, 6, 8, 9]);
    /// ```
    #[must_use]
    pub fn remove_at_offsets<I>(&self, offsets: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        let offsets: HashSet<usize> = offsets.into_iter().collect();
        for &offset in &offsets {
            assert!(
                offset < self.len(),
                "offset {offset} is out of bounds (len {})",
                self.len()
            );
        }

        let sequence: Vec<T> = self
            .sequence
            .iter()
            .enumerate()
            .filter(|(position, _)| !offsets.contains(position))
            .map(|(_, element)| element.clone())
            .collect();
        Self::from_deduplicated_sequence(sequence)
    }

    // =========================================================================
    // Filtering and set algebra
    // =========================================================================

    /// Returns a new set with the elements for which `is_included` returns
    /// `true`, preserving their relative order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordset::persistent::OrderedSet;
    ///
    /// let set: OrderedSet<i32> = [1, 2, 3, 4, 5].into();
    /// assert_eq!(set.filter(|element| element % 2 == 0).as_slice(), &[2, 4]);
    /// ```
    #[must_use]
    pub fn filter<P>(&self, mut is_included: P) -> Self
    where
        P: FnMut(&T) -> bool,
    {
        let sequence: Vec<T> = self
            .sequence
            .iter()
            .filter(|element| is_included(element))
            .cloned()
            .collect();
        Self::from_deduplicated_sequence(sequence)
    }

    /// Returns a new set with the elements for which `is_included` returns
    /// `true`, without any order guarantee.
    ///
    /// The predicate runs over the membership view instead of the sequence
    /// view. When the caller does not care about order this skips the
    /// order-bookkeeping of [`filter`](Self::filter).
    #[must_use]
    pub fn filter_unordered<P>(&self, mut is_included: P) -> Self
    where
        P: FnMut(&T) -> bool,
    {
        let membership: HashSet<T> = self
            .membership
            .iter()
            .filter(|element| is_included(element))
            .cloned()
            .collect();
        let sequence: Vec<T> = membership.iter().cloned().collect();
        Self::from_deduplicated(sequence, membership)
    }

    /// Returns a new set with the elements for which `is_included` returns
    /// `Ok(true)`, preserving their relative order.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by `is_included`; no partially
    /// filtered set is observable.
    pub fn try_filter<P, E>(&self, mut is_included: P) -> Result<Self, E>
    where
        P: FnMut(&T) -> Result<bool, E>,
    {
        let mut sequence = Vec::with_capacity(self.len());
        for element in &self.sequence {
            if is_included(element)? {
                sequence.push(element.clone());
            }
        }
        Ok(Self::from_deduplicated_sequence(sequence))
    }

    /// Returns a new set containing the elements of this set that are not
    /// members of `other`, preserving their relative order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordset::persistent::OrderedSet;
    ///
    /// let left: OrderedSet<i32> = [1, 2, 3, 4, 5].into();
    /// let right: OrderedSet<i32> = [4, 2].into();
    /// assert_eq!(left.difference(&right).as_slice(), &[1, 3, 5]);
    /// ```
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        self.filter(|element| !other.contains(element))
    }

    /// Returns a new set containing the elements of this set that are not
    /// in the unordered set `other`, preserving their relative order.
    #[must_use]
    pub fn difference_set(&self, other: &HashSet<T>) -> Self {
        self.filter(|element| !other.contains(element))
    }

    /// Returns a new set containing the elements of this set that are not
    /// in the unordered set `other`, without any order guarantee.
    ///
    /// Operates directly on the membership views.
    #[must_use]
    pub fn difference_set_unordered(&self, other: &HashSet<T>) -> Self {
        let membership: HashSet<T> = self.membership.difference(other).cloned().collect();
        let sequence: Vec<T> = membership.iter().cloned().collect();
        Self::from_deduplicated(sequence, membership)
    }

    /// Returns a new set containing the elements of this set that are also
    /// members of `other`, preserving their relative order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordset::persistent::OrderedSet;
    ///
    /// let left: OrderedSet<i32> = [1, 2, 3, 4, 5].into();
    /// let right: OrderedSet<i32> = [5, 3, 9].into();
    /// assert_eq!(left.intersection(&right).as_slice(), &[3, 5]);
    /// ```
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        self.filter(|element| other.contains(element))
    }

    /// Returns a new set containing the elements of this set that are also
    /// in the unordered set `other`, preserving their relative order.
    #[must_use]
    pub fn intersection_set(&self, other: &HashSet<T>) -> Self {
        self.filter(|element| other.contains(element))
    }

    /// Returns a new set containing the elements of this set that are also
    /// in the unordered set `other`, without any order guarantee.
    ///
    /// Operates directly on the membership views.
    #[must_use]
    pub fn intersection_set_unordered(&self, other: &HashSet<T>) -> Self {
        let membership: HashSet<T> = self.membership.intersection(other).cloned().collect();
        let sequence: Vec<T> = membership.iter().cloned().collect();
        Self::from_deduplicated(sequence, membership)
    }

    // =========================================================================
    // Reordering elements
    // =========================================================================

    /// Returns a new set with the elements ordered by `comparator`.
    ///
    /// The membership view is unchanged; the position index is rebuilt.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordset::persistent::OrderedSet;
    ///
    /// let set: OrderedSet<i32> = [3, 1, 2].into();
    /// assert_eq!(set.sorted_by(|a, b| b.cmp(a)).as_slice(), &[3, 2, 1]);
    /// ```
    #[must_use]
    pub fn sorted_by<F>(&self, comparator: F) -> Self
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let mut sequence = self.sequence.clone();
        sequence.sort_by(comparator);
        Self::from_deduplicated(sequence, self.membership.clone())
    }

    /// Returns a new set with the elements in their natural order.
    #[must_use]
    pub fn sorted(&self) -> Self
    where
        T: Ord,
    {
        self.sorted_by(Ord::cmp)
    }

    /// Returns a new set with the elements ordered by the fallible
    /// `comparator`.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by `comparator`. On error no new
    /// set is produced; a partially sorted result is never observable.
    pub fn try_sorted_by<F, E>(&self, mut comparator: F) -> Result<Self, E>
    where
        F: FnMut(&T, &T) -> Result<Ordering, E>,
    {
        let mut sequence = self.sequence.clone();
        let mut first_error: Option<E> = None;
        sequence.sort_by(|left, right| {
            if first_error.is_some() {
                return Ordering::Equal;
            }
            match comparator(left, right) {
                Ok(ordering) => ordering,
                Err(error) => {
                    first_error = Some(error);
                    Ordering::Equal
                }
            }
        });

        match first_error {
            Some(error) => Err(error),
            None => Ok(Self::from_deduplicated(sequence, self.membership.clone())),
        }
    }

    /// Returns a new set with the elements at positions `i` and `j`
    /// swapped.
    ///
    /// This is the one incremental fast path: only the two affected
    /// position-index entries are patched; every other element's index is
    /// untouched. The membership view is reused as-is.
    ///
    /// # Panics
    ///
    /// Panics if `i` or `j` is out of bounds.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordset::persistent::OrderedSet;
    ///
    /// let set: OrderedSet<i32> = [1, 2, 3, 4, 5].into();
    /// let swapped = set.swap_at(1, 4);
    /// assert_eq!(swapped.as_slice(), &[1, 5, 3, 4, 2]);
    /// assert_eq!(swapped.index_of(&5), Some(1));
    /// assert_eq!(swapped.index_of(&2), Some(4));
    /// ```
    #[must_use]
    pub fn swap_at(&self, i: usize, j: usize) -> Self {
        assert!(
            i < self.len(),
            "swap position {i} is out of bounds (len {})",
            self.len()
        );
        assert!(
            j < self.len(),
            "swap position {j} is out of bounds (len {})",
            self.len()
        );

        let mut sequence = self.sequence.clone();
        let mut position_index = self.position_index.clone();
        let hash_at_i = compute_hash(&sequence[i]);
        let hash_at_j = compute_hash(&sequence[j]);
        sequence.swap(i, j);
        position_index.insert(hash_at_i, j);
        position_index.insert(hash_at_j, i);
        Self::from_views(sequence, self.membership.clone(), position_index)
    }

    /// Returns a new set with the elements in a random order.
    ///
    /// Equivalent to calling [`shuffled_using`](Self::shuffled_using) with
    /// the thread-local generator.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordset::persistent::OrderedSet;
    ///
    /// let set: OrderedSet<i32> = (0..10).collect();
    /// let shuffled = set.shuffled();
    /// assert_eq!(shuffled.len(), set.len());
    /// assert!(set.as_hash_set() == shuffled.as_hash_set());
    /// ```
    #[cfg(feature = "rand")]
    #[must_use]
    pub fn shuffled(&self) -> Self {
        self.shuffled_using(&mut rand::thread_rng())
    }

    /// Returns a new set with the elements in a random order drawn from
    /// `generator`.
    ///
    /// The permutation is drawn over the membership view; the membership
    /// view itself is unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordset::persistent::OrderedSet;
    /// use rand::SeedableRng;
    ///
    /// let set: OrderedSet<i32> = (0..10).collect();
    /// let mut generator = rand::rngs::StdRng::seed_from_u64(7);
    /// let shuffled = set.shuffled_using(&mut generator);
    /// assert_eq!(shuffled.len(), set.len());
    /// ```
    #[cfg(feature = "rand")]
    #[must_use]
    pub fn shuffled_using<R>(&self, generator: &mut R) -> Self
    where
        R: rand::Rng + ?Sized,
    {
        use rand::seq::SliceRandom;

        let mut sequence: Vec<T> = self.membership.iter().cloned().collect();
        sequence.shuffle(generator);
        Self::from_deduplicated(sequence, self.membership.clone())
    }

    /// Returns a reference to a uniformly random element, or `None` if the
    /// set is empty.
    #[cfg(feature = "rand")]
    #[must_use]
    pub fn random_element(&self) -> Option<&T> {
        use rand::seq::SliceRandom;

        self.sequence.choose(&mut rand::thread_rng())
    }

    // =========================================================================
    // Transforming elements
    // =========================================================================

    /// Returns a new set with the results of applying `transform` to every
    /// element, in sequence order.
    ///
    /// When `transform` maps several elements to one value, the first
    /// occurrence wins and keeps its position.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordset::persistent::OrderedSet;
    ///
    /// let set: OrderedSet<i32> = [1, 2, 3].into();
    /// assert_eq!(set.map(|element| element * 2).as_slice(), &[2, 4, 6]);
    ///
    /// // Collapsing transform: first occurrence wins
    /// let parities = set.map(|element| element % 2);
    /// assert_eq!(parities.as_slice(), &[1, 0]);
    /// ```
    #[must_use]
    pub fn map<U, F>(&self, transform: F) -> OrderedSet<U>
    where
        U: Clone + Hash + Eq,
        F: FnMut(&T) -> U,
    {
        OrderedSet::retaining_first_occurrences(self.sequence.iter().map(transform))
    }

    /// Returns a new set with the results of applying `transform` to every
    /// element, without any order guarantee.
    ///
    /// The transform runs over the membership view instead of the sequence
    /// view.
    #[must_use]
    pub fn map_unordered<U, F>(&self, transform: F) -> OrderedSet<U>
    where
        U: Clone + Hash + Eq,
        F: FnMut(&T) -> U,
    {
        OrderedSet::retaining_first_occurrences(self.membership.iter().map(transform))
    }

    /// Returns a new set with the results of applying the fallible
    /// `transform` to every element, in sequence order.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by `transform`; no partially
    /// transformed set is observable.
    pub fn try_map<U, F, E>(&self, mut transform: F) -> Result<OrderedSet<U>, E>
    where
        U: Clone + Hash + Eq,
        F: FnMut(&T) -> Result<U, E>,
    {
        let mut transformed = Vec::with_capacity(self.len());
        for element in &self.sequence {
            transformed.push(transform(element)?);
        }
        Ok(OrderedSet::retaining_first_occurrences(transformed))
    }

    /// Returns a new set with the `Some` results of applying `transform` to
    /// every element, in sequence order.
    ///
    /// `None` results are dropped before deduplication.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordset::persistent::OrderedSet;
    ///
    /// let set: OrderedSet<i32> = [1, 2, 3, 4, 5].into();
    /// let odd = set.filter_map(|element| {
    ///     if element % 2 == 0 { None } else { Some(*element) }
    /// });
    /// assert_eq!(odd.as_slice(), &[1, 3, 5]);
    /// ```
    #[must_use]
    pub fn filter_map<U, F>(&self, transform: F) -> OrderedSet<U>
    where
        U: Clone + Hash + Eq,
        F: FnMut(&T) -> Option<U>,
    {
        OrderedSet::retaining_first_occurrences(self.sequence.iter().filter_map(transform))
    }

    /// Returns a new set with the `Some` results of applying `transform` to
    /// every element, without any order guarantee.
    #[must_use]
    pub fn filter_map_unordered<U, F>(&self, transform: F) -> OrderedSet<U>
    where
        U: Clone + Hash + Eq,
        F: FnMut(&T) -> Option<U>,
    {
        OrderedSet::retaining_first_occurrences(self.membership.iter().filter_map(transform))
    }

    /// Returns a new set with the `Ok(Some)` results of applying the
    /// fallible `transform` to every element, in sequence order.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by `transform`; no partially
    /// transformed set is observable.
    pub fn try_filter_map<U, F, E>(&self, mut transform: F) -> Result<OrderedSet<U>, E>
    where
        U: Clone + Hash + Eq,
        F: FnMut(&T) -> Result<Option<U>, E>,
    {
        let mut transformed = Vec::with_capacity(self.len());
        for element in &self.sequence {
            if let Some(value) = transform(element)? {
                transformed.push(value);
            }
        }
        Ok(OrderedSet::retaining_first_occurrences(transformed))
    }
}

// =============================================================================
// Standard trait implementations
// =============================================================================

impl<T: Clone + Hash + Eq> Default for OrderedSet<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Hash + Eq> FromIterator<T> for OrderedSet<T> {
    /// Builds a set retaining the first occurrence of each duplicate.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::retaining_first_occurrences(iter)
    }
}

impl<T: Clone + Hash + Eq, const N: usize> From<[T; N]> for OrderedSet<T> {
    /// Builds a set from an array, retaining the first occurrence of each
    /// duplicate.
    fn from(elements: [T; N]) -> Self {
        Self::retaining_first_occurrences(elements)
    }
}

impl<T: Clone + Hash + Eq> TryFrom<Vec<T>> for OrderedSet<T> {
    type Error = NonUniqueElementsError;

    /// Builds a set from a sequence that is required to already be free of
    /// duplicates.
    ///
    /// # Errors
    ///
    /// Returns [`NonUniqueElementsError`] if `sequence` contains the same
    /// element more than once. No set is produced in that case.
    fn try_from(sequence: Vec<T>) -> Result<Self, Self::Error> {
        let membership: HashSet<T> = sequence.iter().cloned().collect();
        if membership.len() != sequence.len() {
            return Err(NonUniqueElementsError);
        }
        Ok(Self::from_deduplicated(sequence, membership))
    }
}

impl<T: Clone + Hash + Eq> Index<usize> for OrderedSet<T> {
    type Output = T;

    /// Returns the element at `position`.
    ///
    /// # Panics
    ///
    /// Panics if `position` is out of bounds. Use
    /// [`get`](OrderedSet::get) for a non-panicking variant.
    #[inline]
    fn index(&self, position: usize) -> &T {
        &self.sequence[position]
    }
}

impl<T: Clone + Hash + Eq> PartialEq for OrderedSet<T> {
    /// Two sets are equal when their sequences are equal: same elements in
    /// the same order.
    fn eq(&self, other: &Self) -> bool {
        self.sequence == other.sequence
    }
}

impl<T: Clone + Hash + Eq> Eq for OrderedSet<T> {}

impl<T: Clone + Hash + Eq> Hash for OrderedSet<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sequence.hash(state);
    }
}

impl<T: Clone + Hash + Eq + fmt::Debug> fmt::Debug for OrderedSet<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "OrderedSet ({} elements): ", self.len())?;
        formatter.debug_list().entries(self.iter()).finish()
    }
}

impl<T: Clone + Hash + Eq + fmt::Display> fmt::Display for OrderedSet<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "[")?;
        let mut first = true;
        for element in self {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{element}")?;
        }
        write!(formatter, "]")
    }
}

impl<T: Clone + Hash + Eq> BitOr<&OrderedSet<T>> for &OrderedSet<T> {
    type Output = OrderedSet<T>;

    /// Returns the union of `self` and `other` as
    /// [`union`](OrderedSet::union) computes it.
    fn bitor(self, other: &OrderedSet<T>) -> OrderedSet<T> {
        self.union(other)
    }
}

impl<T: Clone + Hash + Eq> BitAnd<&OrderedSet<T>> for &OrderedSet<T> {
    type Output = OrderedSet<T>;

    /// Returns the order-preserving intersection of `self` and `other`.
    fn bitand(self, other: &OrderedSet<T>) -> OrderedSet<T> {
        self.intersection(other)
    }
}

impl<T: Clone + Hash + Eq> Sub<&OrderedSet<T>> for &OrderedSet<T> {
    type Output = OrderedSet<T>;

    /// Returns the order-preserving difference of `self` and `other`.
    fn sub(self, other: &OrderedSet<T>) -> OrderedSet<T> {
        self.difference(other)
    }
}

// =============================================================================
// Iterators
// =============================================================================

/// Iterator over references to the elements of an [`OrderedSet`], in
/// sequence order.
pub struct OrderedSetIterator<'a, T> {
    inner: std::slice::Iter<'a, T>,
}

impl<'a, T> Iterator for OrderedSetIterator<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for OrderedSetIterator<'_, T> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<T> ExactSizeIterator for OrderedSetIterator<'_, T> {
    #[inline]
    fn len(&self) -> usize {
        self.inner.len()
    }
}

/// Iterator over the owned elements of an [`OrderedSet`], in sequence
/// order.
pub struct OrderedSetIntoIterator<T> {
    inner: std::vec::IntoIter<T>,
}

impl<T> Iterator for OrderedSetIntoIterator<T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for OrderedSetIntoIterator<T> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<T> ExactSizeIterator for OrderedSetIntoIterator<T> {
    #[inline]
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<T: Clone + Hash + Eq> IntoIterator for OrderedSet<T> {
    type Item = T;
    type IntoIter = OrderedSetIntoIterator<T>;

    fn into_iter(self) -> Self::IntoIter {
        OrderedSetIntoIterator {
            inner: self.sequence.into_iter(),
        }
    }
}

impl<'a, T: Clone + Hash + Eq> IntoIterator for &'a OrderedSet<T> {
    type Item = &'a T;
    type IntoIter = OrderedSetIterator<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Error returned when a decoded or converted sequence contains the same
/// element more than once.
///
/// Produced by `TryFrom<Vec<T>>` and by deserialization (with the `serde`
/// feature). Construction through this path never silently deduplicates:
/// either every element is unique, or this error is returned and no
/// collection is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonUniqueElementsError;

impl fmt::Display for NonUniqueElementsError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(
            "attempted to decode a sequence into an OrderedSet, \
             but found non-unique elements in the collection",
        )
    }
}

impl std::error::Error for NonUniqueElementsError {}

// =============================================================================
// Serde support
// =============================================================================

#[cfg(feature = "serde")]
impl<T: serde::Serialize + Clone + Hash + Eq> serde::Serialize for OrderedSet<T> {
    /// Serializes the sequence view only; order is preserved on the wire
    /// and uniqueness is implicit.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for element in self {
            seq.serialize_element(element)?;
        }
        seq.end()
    }
}

#[cfg(feature = "serde")]
struct OrderedSetVisitor<T> {
    marker: std::marker::PhantomData<T>,
}

#[cfg(feature = "serde")]
impl<T> OrderedSetVisitor<T> {
    const fn new() -> Self {
        Self {
            marker: std::marker::PhantomData,
        }
    }
}

#[cfg(feature = "serde")]
impl<'de, T> serde::de::Visitor<'de> for OrderedSetVisitor<T>
where
    T: serde::Deserialize<'de> + Clone + Hash + Eq,
{
    type Value = OrderedSet<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a sequence of unique elements")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::SeqAccess<'de>,
    {
        let mut elements: Vec<T> = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(element) = seq.next_element()? {
            elements.push(element);
        }
        OrderedSet::try_from(elements).map_err(serde::de::Error::custom)
    }
}

#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for OrderedSet<T>
where
    T: serde::Deserialize<'de> + Clone + Hash + Eq,
{
    /// Deserializes a sequence, rejecting duplicate elements.
    ///
    /// Decoding a sequence with duplicates fails with a
    /// [`NonUniqueElementsError`] message; no partially decoded set is
    /// produced.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_seq(OrderedSetVisitor::new())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn assert_views_consistent<T: Clone + Hash + Eq>(set: &OrderedSet<T>) {
        assert!(set.check_invariants(), "internal views are out of sync");
    }

    // =========================================================================
    // Hash helper
    // =========================================================================

    #[rstest]
    fn compute_hash_is_stable_across_calls() {
        assert_eq!(compute_hash(&42_i32), compute_hash(&42_i32));
        assert_eq!(compute_hash("hello"), compute_hash("hello"));
    }

    #[rstest]
    fn compute_hash_agrees_for_borrowed_forms() {
        let owned = "apple".to_string();
        let borrowed: &str = &owned;
        assert_eq!(compute_hash(&owned), compute_hash(borrowed));
    }

    // =========================================================================
    // Construction and invariants
    // =========================================================================

    #[rstest]
    fn new_creates_empty_consistent_views() {
        let set: OrderedSet<i32> = OrderedSet::new();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
        assert_views_consistent(&set);
    }

    #[rstest]
    fn retaining_first_occurrences_drops_later_duplicates() {
        let set = OrderedSet::retaining_first_occurrences([1, 2, 3, 4, 5, 4, 2]);
        assert_eq!(set.as_slice(), &[1, 2, 3, 4, 5]);
        assert_views_consistent(&set);
    }

    #[rstest]
    fn retaining_last_occurrences_relocates_duplicates() {
        let set = OrderedSet::retaining_last_occurrences([1, 2, 3, 4, 5, 4, 2]);
        assert_eq!(set.as_slice(), &[1, 3, 5, 4, 2]);
        assert_views_consistent(&set);
    }

    #[rstest]
    fn retaining_policies_agree_on_duplicate_free_input() {
        let first = OrderedSet::retaining_first_occurrences([1, 2, 3]);
        let last = OrderedSet::retaining_last_occurrences([1, 2, 3]);
        assert_eq!(first, last);
    }

    #[rstest]
    fn from_hash_set_orders_naturally() {
        let set = OrderedSet::from_hash_set(HashSet::from([4, 1, 2, 6, 3]));
        assert_eq!(set.as_slice(), &[1, 2, 3, 4, 6]);
        assert_views_consistent(&set);
    }

    #[rstest]
    fn from_hash_set_sorted_by_orders_by_comparator() {
        let set =
            OrderedSet::from_hash_set_sorted_by(HashSet::from([1, 2, 3, 4, 5]), |a, b| b.cmp(a));
        assert_eq!(set.as_slice(), &[5, 4, 3, 2, 1]);
        assert_views_consistent(&set);
    }

    #[rstest]
    fn try_from_rejects_duplicates() {
        let result = OrderedSet::try_from(vec![1, 2, 2, 3]);
        assert_eq!(result, Err(NonUniqueElementsError));
    }

    #[rstest]
    fn try_from_accepts_unique_sequence() {
        let set = OrderedSet::try_from(vec![1, 2, 3]).unwrap();
        assert_eq!(set.as_slice(), &[1, 2, 3]);
        assert_views_consistent(&set);
    }

    // =========================================================================
    // Queries
    // =========================================================================

    #[rstest]
    fn index_of_tracks_sequence_positions() {
        let set: OrderedSet<i32> = [1, 2, 3, 4, 5].into();
        assert_eq!(set.index_of(&1), Some(0));
        assert_eq!(set.index_of(&5), Some(4));
        assert_eq!(set.index_of(&6), None);
    }

    #[rstest]
    fn first_and_last_index_agree_with_index_of() {
        let set: OrderedSet<i32> = [1, 2, 3].into();
        for element in &set {
            assert_eq!(set.first_index_of(element), set.index_of(element));
            assert_eq!(set.last_index_of(element), set.index_of(element));
        }
    }

    #[rstest]
    fn borrowed_lookups_work_for_string_elements() {
        let set: OrderedSet<String> = ["apple".to_string(), "banana".to_string()].into();
        assert!(set.contains("apple"));
        assert_eq!(set.index_of("banana"), Some(1));
        assert!(!set.remove("apple").contains("apple"));
    }

    // =========================================================================
    // Producing operations keep views in sync
    // =========================================================================

    #[rstest]
    fn append_existing_member_returns_equivalent_set() {
        let set: OrderedSet<i32> = [1, 2, 3].into();
        let appended = set.append(2);
        assert_eq!(appended, set);
        assert_views_consistent(&appended);
    }

    #[rstest]
    fn append_records_position_incrementally() {
        let set: OrderedSet<i32> = [1, 2, 3].into();
        let appended = set.append(9);
        assert_eq!(appended.index_of(&9), Some(3));
        assert_views_consistent(&appended);
    }

    #[rstest]
    fn insert_at_end_position_appends() {
        let set: OrderedSet<i32> = [1, 2].into();
        let inserted = set.insert_at(3, 2);
        assert_eq!(inserted.as_slice(), &[1, 2, 3]);
        assert_views_consistent(&inserted);
    }

    #[rstest]
    fn insert_at_shifts_later_positions() {
        let set: OrderedSet<i32> = [1, 2, 3, 4, 5].into();
        let inserted = set.insert_at(9, 3);
        assert_eq!(inserted.as_slice(), &[1, 2, 3, 9, 4, 5]);
        assert_eq!(inserted.index_of(&4), Some(4));
        assert_eq!(inserted.index_of(&5), Some(5));
        assert_views_consistent(&inserted);
    }

    #[rstest]
    #[should_panic(expected = "out of bounds")]
    fn insert_at_invalid_position_panics() {
        let set: OrderedSet<i32> = [1, 2, 3].into();
        let _ = set.insert_at(9, 4);
    }

    #[rstest]
    fn remove_at_rebuilds_later_positions() {
        let set: OrderedSet<i32> = [1, 2, 3, 4, 5].into();
        let removed = set.remove_at(2);
        assert_eq!(removed.as_slice(), &[1, 2, 4, 5]);
        assert_eq!(removed.index_of(&4), Some(2));
        assert_views_consistent(&removed);
    }

    #[rstest]
    #[should_panic(expected = "empty OrderedSet")]
    fn remove_first_on_empty_panics() {
        let set: OrderedSet<i32> = OrderedSet::new();
        let _ = set.remove_first();
    }

    #[rstest]
    #[should_panic(expected = "empty OrderedSet")]
    fn remove_last_on_empty_panics() {
        let set: OrderedSet<i32> = OrderedSet::new();
        let _ = set.remove_last();
    }

    #[rstest]
    #[should_panic(expected = "out of bounds")]
    fn remove_at_offsets_rejects_invalid_offset() {
        let set: OrderedSet<i32> = [1, 2, 3].into();
        let _ = set.remove_at_offsets([0, 3]);
    }

    #[rstest]
    fn remove_at_offsets_handles_unordered_non_contiguous_offsets() {
        let set: OrderedSet<i32> = (1..=10).collect();
        let removed = set.remove_at_offsets([0, 9, 3, 1, 6]);
        assert_eq!(removed.as_slice(), &[3, 5, 6, 8, 9]);
        assert_views_consistent(&removed);
    }

    #[rstest]
    fn remove_at_offsets_tolerates_duplicate_offsets() {
        let set: OrderedSet<i32> = [1, 2, 3].into();
        let removed = set.remove_at_offsets([1, 1]);
        assert_eq!(removed.as_slice(), &[1, 3]);
    }

    #[rstest]
    fn swap_at_patches_only_the_two_entries() {
        let set: OrderedSet<i32> = [1, 2, 3, 4, 5].into();
        let swapped = set.swap_at(1, 4);
        assert_eq!(swapped.as_slice(), &[1, 5, 3, 4, 2]);
        assert_eq!(swapped.index_of(&5), Some(1));
        assert_eq!(swapped.index_of(&2), Some(4));
        assert_eq!(swapped.index_of(&1), Some(0));
        assert_eq!(swapped.index_of(&3), Some(2));
        assert_eq!(swapped.index_of(&4), Some(3));
        assert_views_consistent(&swapped);
    }

    #[rstest]
    fn swap_at_same_position_is_identity() {
        let set: OrderedSet<i32> = [1, 2, 3].into();
        assert_eq!(set.swap_at(1, 1), set);
    }

    #[rstest]
    #[should_panic(expected = "out of bounds")]
    fn swap_at_invalid_position_panics() {
        let set: OrderedSet<i32> = [1, 2, 3].into();
        let _ = set.swap_at(0, 3);
    }

    // =========================================================================
    // Fallible operations
    // =========================================================================

    #[rstest]
    fn try_sorted_by_propagates_comparator_error() {
        let set: OrderedSet<i32> = [3, 1, 2].into();
        let result = set.try_sorted_by(|_, _| Err::<Ordering, &str>("comparator failed"));
        assert_eq!(result.unwrap_err(), "comparator failed");
        // The receiver is untouched
        assert_eq!(set.as_slice(), &[3, 1, 2]);
        assert_views_consistent(&set);
    }

    #[rstest]
    fn try_sorted_by_sorts_on_success() {
        let set: OrderedSet<i32> = [3, 1, 2].into();
        let sorted = set.try_sorted_by(|a, b| Ok::<_, ()>(a.cmp(b))).unwrap();
        assert_eq!(sorted.as_slice(), &[1, 2, 3]);
        assert_views_consistent(&sorted);
    }

    #[rstest]
    fn try_map_stops_at_first_error() {
        let set: OrderedSet<i32> = [1, 2, 3].into();
        let mut calls = 0;
        let result: Result<OrderedSet<i32>, &str> = set.try_map(|element| {
            calls += 1;
            if *element == 2 { Err("boom") } else { Ok(*element) }
        });
        assert_eq!(result.unwrap_err(), "boom");
        assert_eq!(calls, 2);
    }

    #[rstest]
    fn try_filter_map_drops_none_and_propagates_error() {
        let set: OrderedSet<i32> = [1, 2, 3, 4].into();
        let halved = set
            .try_filter_map(|element| {
                Ok::<_, ()>(if element % 2 == 0 {
                    Some(element / 2)
                } else {
                    None
                })
            })
            .unwrap();
        assert_eq!(halved.as_slice(), &[1, 2]);

        let failed: Result<OrderedSet<i32>, &str> = set.try_filter_map(|_| Err("boom"));
        assert!(failed.is_err());
    }

    // =========================================================================
    // Transforms collapse duplicates
    // =========================================================================

    #[rstest]
    fn map_collapses_onto_first_occurrence() {
        let set: OrderedSet<i32> = [1, 2, 3, 4, 5].into();
        let parities = set.map(|element| element % 2);
        assert_eq!(parities.as_slice(), &[1, 0]);
        assert_views_consistent(&parities);
    }

    #[rstest]
    fn map_unordered_yields_same_membership_as_map() {
        let set: OrderedSet<i32> = [1, 2, 3, 4, 5].into();
        let ordered = set.map(|element| element % 3);
        let unordered = set.map_unordered(|element| element % 3);
        assert_eq!(ordered.as_hash_set(), unordered.as_hash_set());
        assert_views_consistent(&unordered);
    }

    #[rstest]
    fn filter_unordered_yields_same_membership_as_filter() {
        let set: OrderedSet<i32> = (0..20).collect();
        let ordered = set.filter(|element| element % 3 == 0);
        let unordered = set.filter_unordered(|element| element % 3 == 0);
        assert_eq!(ordered.as_hash_set(), unordered.as_hash_set());
        assert_views_consistent(&unordered);
    }

    // =========================================================================
    // Equality, hashing, rendering
    // =========================================================================

    #[rstest]
    fn equality_is_order_sensitive() {
        let set: OrderedSet<i32> = [1, 2, 3, 4, 5].into();
        let same: OrderedSet<i32> = [1, 2, 3, 4, 5].into();
        let reordered: OrderedSet<i32> = [1, 3, 2, 4, 5].into();
        assert_eq!(set, same);
        assert_ne!(set, reordered);
    }

    #[rstest]
    fn display_renders_the_sequence_view() {
        let set: OrderedSet<i32> = [1, 2, 3].into();
        assert_eq!(set.to_string(), "[1, 2, 3]");
    }

    #[rstest]
    fn debug_includes_the_element_count() {
        let set: OrderedSet<i32> = [1, 2, 3].into();
        assert_eq!(format!("{set:?}"), "OrderedSet (3 elements): [1, 2, 3]");
    }

    #[rstest]
    fn operators_delegate_to_set_algebra() {
        let left: OrderedSet<i32> = [1, 2, 3].into();
        let right: OrderedSet<i32> = [3, 4, 5].into();
        assert_eq!(&left | &right, left.union(&right));
        assert_eq!(&left & &right, left.intersection(&right));
        assert_eq!(&left - &right, left.difference(&right));
    }

    // =========================================================================
    // Shuffling
    // =========================================================================

    #[cfg(feature = "rand")]
    #[rstest]
    fn shuffled_using_preserves_membership() {
        use rand::SeedableRng;

        let set: OrderedSet<i32> = (0..32).collect();
        let mut generator = rand::rngs::StdRng::seed_from_u64(42);
        let shuffled = set.shuffled_using(&mut generator);
        assert_eq!(shuffled.len(), set.len());
        assert_eq!(shuffled.as_hash_set(), set.as_hash_set());
        assert_views_consistent(&shuffled);
    }

    #[cfg(feature = "rand")]
    #[rstest]
    fn shuffled_using_is_deterministic_for_a_seed() {
        use rand::SeedableRng;

        let set: OrderedSet<i32> = (0..32).collect();
        let mut generator_a = rand::rngs::StdRng::seed_from_u64(7);
        let mut generator_b = rand::rngs::StdRng::seed_from_u64(7);
        assert_eq!(
            set.shuffled_using(&mut generator_a),
            set.shuffled_using(&mut generator_b)
        );
    }

    #[cfg(feature = "rand")]
    #[rstest]
    fn random_element_is_none_only_when_empty() {
        let empty: OrderedSet<i32> = OrderedSet::new();
        assert_eq!(empty.random_element(), None);

        let set: OrderedSet<i32> = [1, 2, 3].into();
        assert!(set.contains(set.random_element().unwrap()));
    }
}
