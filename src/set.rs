//! Persistent (immutable) hash set.
//!
//! This module provides [`PersistentHashSet`], an immutable hash set
//! built as a unit-valued [`PersistentHashMap`], so it inherits the
//! CHAMP trie's structural sharing and complexity guarantees.
//!
//! # Examples
//!
//! ```rust
//! use chamt::PersistentHashSet;
//!
//! let set = PersistentHashSet::new().insert(1).insert(2).insert(3);
//! assert!(set.contains(&1));
//!
//! // Structural sharing: the original set is preserved
//! let updated = set.insert(4);
//! assert_eq!(set.len(), 3);     // Original unchanged
//! assert_eq!(updated.len(), 4); // New version
//!
//! // Set operations
//! let other: PersistentHashSet<i32> = [2, 3, 4].into_iter().collect();
//! assert_eq!(set.union(&other).len(), 4);        // {1, 2, 3, 4}
//! assert_eq!(set.intersection(&other).len(), 2); // {2, 3}
//! ```

use std::borrow::Borrow;
use std::collections::hash_map::RandomState;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::iter::FusedIterator;

use crate::map::{PersistentHashMap, PersistentHashMapIterator};

/// [`PersistentHashSet`] keyed with the Fx hasher.
#[cfg(feature = "fxhash")]
pub type FxPersistentHashSet<T> = PersistentHashSet<T, rustc_hash::FxBuildHasher>;

/// [`PersistentHashSet`] keyed with the aHash hasher.
#[cfg(feature = "ahash")]
pub type AHashPersistentHashSet<T> = PersistentHashSet<T, ahash::RandomState>;

// =============================================================================
// PersistentHashSet Definition
// =============================================================================

/// A persistent (immutable) hash set backed by a CHAMP trie.
///
/// `PersistentHashSet` is an immutable data structure: operations like
/// [`insert`](Self::insert) and [`remove`](Self::remove) return a new
/// set sharing structure with the receiver instead of modifying it.
///
/// # Examples
///
/// ```rust
/// use chamt::PersistentHashSet;
///
/// let set = PersistentHashSet::singleton(42);
/// assert!(set.contains(&42));
/// ```
pub struct PersistentHashSet<T, S = RandomState> {
    inner: PersistentHashMap<T, (), S>,
}

impl<T> PersistentHashSet<T, RandomState> {
    /// Creates a new empty set with the default hasher.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chamt::PersistentHashSet;
    ///
    /// let set: PersistentHashSet<i32> = PersistentHashSet::new();
    /// assert!(set.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: PersistentHashMap::new(),
        }
    }

    /// Creates a set containing a single element.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chamt::PersistentHashSet;
    ///
    /// let set = PersistentHashSet::singleton(1);
    /// assert_eq!(set.len(), 1);
    /// ```
    #[inline]
    #[must_use]
    pub fn singleton(element: T) -> Self
    where
        T: Clone + Hash + Eq,
    {
        Self::new().insert(element)
    }
}

impl<T, S> PersistentHashSet<T, S> {
    /// Creates a new empty set using the given hash builder.
    #[inline]
    #[must_use]
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            inner: PersistentHashMap::with_hasher(hasher),
        }
    }

    /// Returns the number of elements in the set.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if the set contains no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns `true` if both sets are the same version: they share the
    /// identical root node.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.inner.ptr_eq(&other.inner)
    }

    /// Returns an iterator over the elements.
    ///
    /// The iteration order is the trie's traversal order: stable for a
    /// given set, but neither insertion order nor sorted.
    #[must_use]
    pub fn iter(&self) -> PersistentHashSetIterator<'_, T> {
        PersistentHashSetIterator {
            inner: self.inner.iter(),
        }
    }
}

impl<T, S> PersistentHashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    /// Returns `true` if the set contains the element.
    ///
    /// # Complexity
    ///
    /// O(log32 N); never allocates.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chamt::PersistentHashSet;
    ///
    /// let set = PersistentHashSet::new().insert(1);
    /// assert!(set.contains(&1));
    /// assert!(!set.contains(&2));
    /// ```
    #[must_use]
    pub fn contains<Q>(&self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.contains_key(element)
    }

    /// Returns a reference to the stored element equal to the given one.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chamt::PersistentHashSet;
    ///
    /// let set = PersistentHashSet::new().insert("stored".to_string());
    /// assert_eq!(set.get("stored"), Some(&"stored".to_string()));
    /// assert_eq!(set.get("missing"), None);
    /// ```
    #[must_use]
    pub fn get<Q>(&self, element: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.get_key_value(element).map(|(stored, _)| stored)
    }
}

impl<T, S> PersistentHashSet<T, S>
where
    T: Clone + Hash + Eq,
    S: BuildHasher + Clone,
{
    /// Inserts an element, returning the new set.
    ///
    /// Inserting a present element returns an equal set of the same
    /// length. The receiver is never modified.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chamt::PersistentHashSet;
    ///
    /// let set = PersistentHashSet::new();
    /// let updated = set.insert(42);
    ///
    /// assert!(set.is_empty());      // Original unchanged
    /// assert!(updated.contains(&42));
    /// ```
    #[must_use]
    pub fn insert(&self, element: T) -> Self {
        Self {
            inner: self.inner.insert(element, ()),
        }
    }

    /// Removes an element, returning the new set.
    ///
    /// If the element is absent the receiver is returned unchanged:
    /// the result shares the identical root and nothing is allocated.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chamt::PersistentHashSet;
    ///
    /// let set = PersistentHashSet::new().insert(1).insert(2);
    /// let removed = set.remove(&1);
    ///
    /// assert_eq!(set.len(), 2);     // Original unchanged
    /// assert_eq!(removed.len(), 1); // New version
    /// assert!(!removed.contains(&1));
    /// ```
    #[must_use]
    pub fn remove<Q>(&self, element: &Q) -> Self
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        Self {
            inner: self.inner.remove(element),
        }
    }

    /// Returns the union of the two sets.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chamt::PersistentHashSet;
    ///
    /// let left: PersistentHashSet<i32> = [1, 2].into_iter().collect();
    /// let right: PersistentHashSet<i32> = [2, 3].into_iter().collect();
    /// assert_eq!(left.union(&right).len(), 3);
    /// ```
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let mut result = self.clone();
        for element in other {
            result = result.insert(element.clone());
        }
        result
    }

    /// Returns the intersection of the two sets.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chamt::PersistentHashSet;
    ///
    /// let left: PersistentHashSet<i32> = [1, 2].into_iter().collect();
    /// let right: PersistentHashSet<i32> = [2, 3].into_iter().collect();
    /// assert_eq!(left.intersection(&right).len(), 1);
    /// ```
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        let mut result = Self {
            inner: PersistentHashMap::with_hasher(self.hasher().clone()),
        };
        for element in self {
            if other.contains(element) {
                result = result.insert(element.clone());
            }
        }
        result
    }

    /// Returns the elements of `self` that are not in `other`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chamt::PersistentHashSet;
    ///
    /// let left: PersistentHashSet<i32> = [1, 2].into_iter().collect();
    /// let right: PersistentHashSet<i32> = [2, 3].into_iter().collect();
    ///
    /// let difference = left.difference(&right);
    /// assert!(difference.contains(&1));
    /// assert_eq!(difference.len(), 1);
    /// ```
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        let mut result = Self {
            inner: PersistentHashMap::with_hasher(self.hasher().clone()),
        };
        for element in self {
            if !other.contains(element) {
                result = result.insert(element.clone());
            }
        }
        result
    }

    /// Returns `true` if every element of `self` is in `other`.
    #[must_use]
    pub fn is_subset(&self, other: &Self) -> bool {
        self.len() <= other.len() && self.iter().all(|element| other.contains(element))
    }

    /// Returns `true` if every element of `other` is in `self`.
    #[must_use]
    pub fn is_superset(&self, other: &Self) -> bool {
        other.is_subset(self)
    }

    /// Returns `true` if the two sets have no elements in common.
    #[must_use]
    pub fn is_disjoint(&self, other: &Self) -> bool {
        self.iter().all(|element| !other.contains(element))
    }

    fn hasher(&self) -> &S {
        self.inner.hasher()
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An iterator over the elements of a [`PersistentHashSet`].
pub struct PersistentHashSetIterator<'a, T> {
    inner: PersistentHashMapIterator<'a, T, ()>,
}

// Implemented by hand so the cursor clones even when T doesn't.
impl<T> Clone for PersistentHashSetIterator<'_, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, T> Iterator for PersistentHashSetIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(element, _)| element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for PersistentHashSetIterator<'_, T> {}

impl<T> FusedIterator for PersistentHashSetIterator<'_, T> {}

/// An owning iterator over the elements of a [`PersistentHashSet`].
pub struct PersistentHashSetIntoIterator<T> {
    elements: std::vec::IntoIter<T>,
}

impl<T> Iterator for PersistentHashSetIntoIterator<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.elements.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.elements.size_hint()
    }
}

impl<T> ExactSizeIterator for PersistentHashSetIntoIterator<T> {}

impl<T> FusedIterator for PersistentHashSetIntoIterator<T> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

// Implemented by hand to avoid requiring T: Clone; cloning a set only
// copies the shared root handle and the hasher.
impl<T, S: Clone> Clone for PersistentHashSet<T, S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T, S: Default> Default for PersistentHashSet<T, S> {
    #[inline]
    fn default() -> Self {
        Self {
            inner: PersistentHashMap::default(),
        }
    }
}

impl<T, S> FromIterator<T> for PersistentHashSet<T, S>
where
    T: Clone + Hash + Eq,
    S: BuildHasher + Default + Clone,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::default();
        for element in iter {
            set = set.insert(element);
        }
        set
    }
}

impl<T: Clone, S> IntoIterator for PersistentHashSet<T, S> {
    type Item = T;
    type IntoIter = PersistentHashSetIntoIterator<T>;

    fn into_iter(self) -> Self::IntoIter {
        let elements: Vec<T> = self.iter().cloned().collect();
        PersistentHashSetIntoIterator {
            elements: elements.into_iter(),
        }
    }
}

impl<'a, T, S> IntoIterator for &'a PersistentHashSet<T, S> {
    type Item = &'a T;
    type IntoIter = PersistentHashSetIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, S> PartialEq for PersistentHashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T, S> Eq for PersistentHashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
}

impl<T: fmt::Debug, S> fmt::Debug for PersistentHashSet<T, S> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<T, S> serde::Serialize for PersistentHashSet<T, S>
where
    T: serde::Serialize,
{
    fn serialize<Ser>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error>
    where
        Ser: serde::Serializer,
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
struct PersistentHashSetVisitor<T, S> {
    marker: std::marker::PhantomData<(T, S)>,
}

#[cfg(feature = "serde")]
impl<T, S> PersistentHashSetVisitor<T, S> {
    const fn new() -> Self {
        Self {
            marker: std::marker::PhantomData,
        }
    }
}

#[cfg(feature = "serde")]
impl<'de, T, S> serde::de::Visitor<'de> for PersistentHashSetVisitor<T, S>
where
    T: serde::Deserialize<'de> + Clone + Hash + Eq,
    S: BuildHasher + Default + Clone,
{
    type Value = PersistentHashSet<T, S>;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a sequence")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::SeqAccess<'de>,
    {
        // Note: Sequential insert ensures gradual memory usage even for
        // large inputs.
        let mut set = PersistentHashSet::default();
        while let Some(element) = seq.next_element()? {
            set = set.insert(element);
        }
        Ok(set)
    }
}

#[cfg(feature = "serde")]
impl<'de, T, S> serde::Deserialize<'de> for PersistentHashSet<T, S>
where
    T: serde::Deserialize<'de> + Clone + Hash + Eq,
    S: BuildHasher + Default + Clone,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_seq(PersistentHashSetVisitor::new())
    }
}

// =============================================================================
// Tests
// =============================================================================
