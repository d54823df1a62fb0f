//! Persistent (immutable) hash map.
//!
//! This module provides [`PersistentHashMap`], an immutable hash map on
//! top of the crate's CHAMP trie engine.
//!
//! # Overview
//!
//! Every mutating operation returns a new map and leaves the receiver
//! untouched; the two versions share all structure off the touched
//! hash path.
//!
//! - O(log32 N) get (effectively O(1) for practical sizes)
//! - O(log32 N) insert
//! - O(log32 N) remove
//! - O(1) len and `is_empty`
//!
//! # Examples
//!
//! ```rust
//! use chamt::PersistentHashMap;
//!
//! let map = PersistentHashMap::new()
//!     .insert("one".to_string(), 1)
//!     .insert("two".to_string(), 2);
//!
//! assert_eq!(map.get("one"), Some(&1));
//!
//! // Structural sharing: the original map is preserved
//! let updated = map.insert("one".to_string(), 100);
//! assert_eq!(map.get("one"), Some(&1));       // Original unchanged
//! assert_eq!(updated.get("one"), Some(&100)); // New version
//! ```
//!
//! # Hashers
//!
//! The hasher is a type parameter, defaulting to the standard library's
//! [`RandomState`]. Any [`BuildHasher`] can be plugged in through
//! [`PersistentHashMap::with_hasher`]; the `fxhash` and `ahash` cargo
//! features provide aliases for two common fast hashers.

use std::borrow::Borrow;
use std::collections::hash_map::RandomState;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::iter::FusedIterator;
use std::ops::Index;

use crate::champ::{self, Champ, KeyedEntry};

/// [`PersistentHashMap`] keyed with the Fx hasher.
#[cfg(feature = "fxhash")]
pub type FxPersistentHashMap<K, V> = PersistentHashMap<K, V, rustc_hash::FxBuildHasher>;

/// [`PersistentHashMap`] keyed with the aHash hasher.
#[cfg(feature = "ahash")]
pub type AHashPersistentHashMap<K, V> = PersistentHashMap<K, V, ahash::RandomState>;

// Map entries are (key, value) pairs looked up by their key.
impl<K: Eq, V> KeyedEntry for (K, V) {
    type Key = K;

    fn key(&self) -> &K {
        &self.0
    }
}

// =============================================================================
// PersistentHashMap Definition
// =============================================================================

/// A persistent (immutable) hash map backed by a CHAMP trie.
///
/// `PersistentHashMap` is an immutable data structure: operations like
/// [`insert`](Self::insert) and [`remove`](Self::remove) return a new
/// map sharing structure with the receiver instead of modifying it.
/// Any number of versions remain valid side by side, and with the `arc`
/// feature a single version may be read from many threads at once.
///
/// # Time Complexity
///
/// | Operation      | Complexity        |
/// |----------------|-------------------|
/// | `new`          | O(1)              |
/// | `get`          | O(log32 N)        |
/// | `insert`       | O(log32 N)        |
/// | `remove`       | O(log32 N)        |
/// | `contains_key` | O(log32 N)        |
/// | `len`          | O(1)              |
/// | `is_empty`     | O(1)              |
///
/// # Examples
///
/// ```rust
/// use chamt::PersistentHashMap;
///
/// let map = PersistentHashMap::singleton("key".to_string(), 42);
/// assert_eq!(map.get("key"), Some(&42));
/// ```
pub struct PersistentHashMap<K, V, S = RandomState> {
    /// The trie holding `(K, V)` entries.
    trie: Champ<(K, V)>,
    /// Hash builder applied to keys before they reach the trie.
    hasher: S,
}

impl<K, V> PersistentHashMap<K, V, RandomState> {
    /// Creates a new empty map with the default hasher.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chamt::PersistentHashMap;
    ///
    /// let map: PersistentHashMap<String, i32> = PersistentHashMap::new();
    /// assert!(map.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }

    /// Creates a map containing a single key-value pair.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chamt::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::singleton("key".to_string(), 42);
    /// assert_eq!(map.len(), 1);
    /// assert_eq!(map.get("key"), Some(&42));
    /// ```
    #[inline]
    #[must_use]
    pub fn singleton(key: K, value: V) -> Self
    where
        K: Clone + Hash + Eq,
        V: Clone,
    {
        Self::new().insert(key, value)
    }
}

impl<K, V, S> PersistentHashMap<K, V, S> {
    /// Creates a new empty map using the given hash builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chamt::PersistentHashMap;
    /// use std::collections::hash_map::RandomState;
    ///
    /// let map: PersistentHashMap<String, i32, _> =
    ///     PersistentHashMap::with_hasher(RandomState::new());
    /// assert!(map.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            trie: Champ::new(),
            hasher,
        }
    }

    /// Returns the number of entries in the map.
    ///
    /// # Complexity
    ///
    /// O(1)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chamt::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new()
    ///     .insert("a".to_string(), 1)
    ///     .insert("b".to_string(), 2);
    /// assert_eq!(map.len(), 2);
    /// ```
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.trie.size()
    }

    /// Returns `true` if the map contains no entries.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chamt::PersistentHashMap;
    ///
    /// let empty: PersistentHashMap<String, i32> = PersistentHashMap::new();
    /// assert!(empty.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if both maps are the same version: they share the
    /// identical root node.
    ///
    /// Pointer identity implies equality but not vice versa; this is
    /// chiefly useful for observing structural sharing, e.g. that
    /// removing an absent key hands back the receiver's own root.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chamt::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new().insert("a".to_string(), 1);
    /// let same = map.clone();
    /// assert!(map.ptr_eq(&same));
    /// assert!(!map.ptr_eq(&map.insert("b".to_string(), 2)));
    /// ```
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.trie.ptr_eq(&other.trie)
    }

    /// Returns an iterator over key-value pairs.
    ///
    /// The iteration order is the trie's traversal order: stable for a
    /// given map, but neither insertion order nor sorted.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chamt::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new()
    ///     .insert("a".to_string(), 1)
    ///     .insert("b".to_string(), 2);
    ///
    /// let total: i32 = map.iter().map(|(_, value)| value).sum();
    /// assert_eq!(total, 3);
    /// ```
    #[must_use]
    pub fn iter(&self) -> PersistentHashMapIterator<'_, K, V> {
        PersistentHashMapIterator {
            inner: self.trie.iter(),
        }
    }

    /// Returns a reference to the map's hash builder.
    #[must_use]
    pub const fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Returns an iterator over keys.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(key, _)| key)
    }

    /// Returns an iterator over values.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, value)| value)
    }
}

impl<K, V, S> PersistentHashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Returns a reference to the value corresponding to the key.
    ///
    /// The key may be any borrowed form of the map's key type, but
    /// `Hash` and `Eq` on the borrowed form must match those for the
    /// key type.
    ///
    /// # Complexity
    ///
    /// O(log32 N); never allocates.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chamt::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new().insert("hello".to_string(), 42);
    ///
    /// // Can use &str to look up String keys
    /// assert_eq!(map.get("hello"), Some(&42));
    /// assert_eq!(map.get("world"), None);
    /// ```
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = champ::hash_of(&self.hasher, key);
        self.trie.get(hash, key).map(|entry| &entry.1)
    }

    /// Returns the stored key-value pair corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chamt::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new().insert("hello".to_string(), 42);
    /// assert_eq!(
    ///     map.get_key_value("hello"),
    ///     Some((&"hello".to_string(), &42))
    /// );
    /// ```
    #[must_use]
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = champ::hash_of(&self.hasher, key);
        self.trie.get(hash, key).map(|entry| (&entry.0, &entry.1))
    }

    /// Returns the value for the key, or the caller-supplied default
    /// when the key is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chamt::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new().insert("a".to_string(), 1);
    /// assert_eq!(map.get_or("a", &0), &1);
    /// assert_eq!(map.get_or("b", &0), &0);
    /// ```
    #[must_use]
    pub fn get_or<'a, Q>(&'a self, key: &Q, default: &'a V) -> &'a V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).unwrap_or(default)
    }

    /// Returns `true` if the map contains a value for the specified key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chamt::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new().insert("key".to_string(), 42);
    ///
    /// assert!(map.contains_key("key"));
    /// assert!(!map.contains_key("other"));
    /// ```
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).is_some()
    }
}

impl<K, V, S> PersistentHashMap<K, V, S>
where
    K: Clone + Hash + Eq,
    V: Clone,
    S: BuildHasher + Clone,
{
    /// Inserts a key-value pair, returning the new map.
    ///
    /// If the map already contains the key, the value is replaced and
    /// the length is unchanged. The receiver is never modified.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chamt::PersistentHashMap;
    ///
    /// let map1 = PersistentHashMap::new().insert("key".to_string(), 1);
    /// let map2 = map1.insert("key".to_string(), 2);
    ///
    /// assert_eq!(map1.get("key"), Some(&1)); // Original unchanged
    /// assert_eq!(map2.get("key"), Some(&2)); // New version
    /// ```
    #[must_use]
    pub fn insert(&self, key: K, value: V) -> Self {
        self.insert_entry((key, value))
    }

    /// Inserts an already-paired entry, returning the new map.
    ///
    /// Equivalent to [`insert`](Self::insert) for callers that hold the
    /// pair as one value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chamt::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new().insert_entry(("key".to_string(), 42));
    /// assert_eq!(map.get("key"), Some(&42));
    /// ```
    #[must_use]
    pub fn insert_entry(&self, entry: (K, V)) -> Self {
        let hash = champ::hash_of(&self.hasher, &entry.0);
        let (trie, _) = self.trie.add(hash, entry);
        Self {
            trie,
            hasher: self.hasher.clone(),
        }
    }

    /// Removes a key, returning the new map.
    ///
    /// If the key is absent the receiver is returned unchanged: the
    /// result shares the identical root and nothing is allocated.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chamt::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new()
    ///     .insert("a".to_string(), 1)
    ///     .insert("b".to_string(), 2);
    /// let removed = map.remove("a");
    ///
    /// assert_eq!(map.len(), 2);     // Original unchanged
    /// assert_eq!(removed.len(), 1); // New version
    /// assert_eq!(removed.get("a"), None);
    /// ```
    #[must_use]
    pub fn remove<Q>(&self, key: &Q) -> Self
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = champ::hash_of(&self.hasher, key);
        match self.trie.sub(hash, key) {
            Some(trie) => Self {
                trie,
                hasher: self.hasher.clone(),
            },
            None => self.clone(),
        }
    }

    /// Updates the value for a key using a function.
    ///
    /// Returns `None` if the key doesn't exist.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chamt::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new().insert("count".to_string(), 10);
    /// let updated = map.update("count", |value| value + 1);
    ///
    /// assert_eq!(updated.unwrap().get("count"), Some(&11));
    /// ```
    #[must_use]
    pub fn update<Q, F>(&self, key: &Q, function: F) -> Option<Self>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        F: FnOnce(&V) -> V,
    {
        let hash = champ::hash_of(&self.hasher, key);
        let (stored_key, value) = self.trie.get(hash, key)?;
        let entry = (stored_key.clone(), function(value));
        let (trie, _) = self.trie.add(hash, entry);
        Some(Self {
            trie,
            hasher: self.hasher.clone(),
        })
    }

    /// Updates or removes a value for a key using an updater function.
    ///
    /// The updater receives `Some(&V)` if the key exists, or `None` if
    /// it doesn't. Returning `Some(V)` inserts or updates; returning
    /// `None` removes the key (if it exists).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chamt::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new().insert("count".to_string(), 10);
    ///
    /// // Increment existing value
    /// let updated = map.update_with("count", |value| value.map(|count| count + 1));
    /// assert_eq!(updated.get("count"), Some(&11));
    ///
    /// // Insert if not exists
    /// let inserted = map.update_with("fresh", |value| value.copied().or(Some(100)));
    /// assert_eq!(inserted.get("fresh"), Some(&100));
    ///
    /// // Remove by returning None
    /// let removed = map.update_with("count", |_| None);
    /// assert_eq!(removed.get("count"), None);
    /// ```
    #[must_use]
    pub fn update_with<Q, F>(&self, key: &Q, updater: F) -> Self
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
        F: FnOnce(Option<&V>) -> Option<V>,
    {
        let hash = champ::hash_of(&self.hasher, key);
        let current = self.trie.get(hash, key);
        match (current, updater(current.map(|entry| &entry.1))) {
            (Some((stored_key, _)), Some(value)) => {
                let entry = (stored_key.clone(), value);
                let (trie, _) = self.trie.add(hash, entry);
                Self {
                    trie,
                    hasher: self.hasher.clone(),
                }
            }
            (None, Some(value)) => {
                let (trie, _) = self.trie.add(hash, (key.to_owned(), value));
                Self {
                    trie,
                    hasher: self.hasher.clone(),
                }
            }
            (Some(_), None) => self.remove(key),
            (None, None) => self.clone(),
        }
    }

    /// Merges two maps, with values from `other` taking precedence on
    /// key conflicts.
    ///
    /// # Complexity
    ///
    /// O(m log32 (n + m)) where m is the size of `other`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chamt::PersistentHashMap;
    ///
    /// let left = PersistentHashMap::new()
    ///     .insert("a".to_string(), 1)
    ///     .insert("b".to_string(), 2);
    /// let right = PersistentHashMap::new()
    ///     .insert("b".to_string(), 20)
    ///     .insert("c".to_string(), 3);
    ///
    /// let merged = left.merge(&right);
    ///
    /// assert_eq!(merged.get("a"), Some(&1));
    /// assert_eq!(merged.get("b"), Some(&20)); // From right
    /// assert_eq!(merged.get("c"), Some(&3));
    /// ```
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        let mut result = self.clone();
        for (key, value) in other {
            result = result.insert(key.clone(), value.clone());
        }
        result
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An iterator over key-value pairs of a [`PersistentHashMap`].
pub struct PersistentHashMapIterator<'a, K, V> {
    inner: champ::Iter<'a, (K, V)>,
}

// Implemented by hand so the cursor clones even when K and V don't.
impl<K, V> Clone for PersistentHashMapIterator<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Iterator for PersistentHashMapIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|entry| (&entry.0, &entry.1))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for PersistentHashMapIterator<'_, K, V> {}

impl<K, V> FusedIterator for PersistentHashMapIterator<'_, K, V> {}

/// An owning iterator over key-value pairs of a [`PersistentHashMap`].
///
/// Entries are cloned out of the (possibly shared) trie as the map
/// itself only ever hands out references.
pub struct PersistentHashMapIntoIterator<K, V> {
    entries: std::vec::IntoIter<(K, V)>,
}

impl<K, V> Iterator for PersistentHashMapIntoIterator<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<K, V> ExactSizeIterator for PersistentHashMapIntoIterator<K, V> {}

impl<K, V> FusedIterator for PersistentHashMapIntoIterator<K, V> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

// Implemented by hand to avoid requiring K: Clone and V: Clone; cloning
// a map only copies the shared root handle and the hasher.
impl<K, V, S: Clone> Clone for PersistentHashMap<K, V, S> {
    fn clone(&self) -> Self {
        Self {
            trie: self.trie.clone(),
            hasher: self.hasher.clone(),
        }
    }
}

impl<K, V, S: Default> Default for PersistentHashMap<K, V, S> {
    #[inline]
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> FromIterator<(K, V)> for PersistentHashMap<K, V, S>
where
    K: Clone + Hash + Eq,
    V: Clone,
    S: BuildHasher + Default + Clone,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        for entry in iter {
            map = map.insert_entry(entry);
        }
        map
    }
}

impl<K: Clone, V: Clone, S> IntoIterator for PersistentHashMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = PersistentHashMapIntoIterator<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        let entries: Vec<(K, V)> = self
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        PersistentHashMapIntoIterator {
            entries: entries.into_iter(),
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a PersistentHashMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = PersistentHashMapIterator<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, S> PartialEq for PersistentHashMap<K, V, S>
where
    K: Hash + Eq,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.trie
            .equals_by(&other.trie, |key| champ::hash_of(&other.hasher, key))
    }
}

impl<K, V, S> Eq for PersistentHashMap<K, V, S>
where
    K: Hash + Eq,
    V: Eq,
    S: BuildHasher,
{
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for PersistentHashMap<K, V, S> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, Q, S> Index<&Q> for PersistentHashMap<K, V, S>
where
    K: Borrow<Q> + Hash + Eq,
    Q: Hash + Eq + ?Sized,
    S: BuildHasher,
{
    type Output = V;

    /// Returns the value for the key.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present. Use [`PersistentHashMap::get`]
    /// or [`PersistentHashMap::get_or`] for a non-panicking lookup.
    fn index(&self, key: &Q) -> &V {
        match self.get(key) {
            Some(value) => value,
            None => panic!("key not found"),
        }
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<K, V, S> serde::Serialize for PersistentHashMap<K, V, S>
where
    K: serde::Serialize,
    V: serde::Serialize,
{
    fn serialize<Ser>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error>
    where
        Ser: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
struct PersistentHashMapVisitor<K, V, S> {
    marker: std::marker::PhantomData<(K, V, S)>,
}

#[cfg(feature = "serde")]
impl<K, V, S> PersistentHashMapVisitor<K, V, S> {
    const fn new() -> Self {
        Self {
            marker: std::marker::PhantomData,
        }
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V, S> serde::de::Visitor<'de> for PersistentHashMapVisitor<K, V, S>
where
    K: serde::Deserialize<'de> + Clone + Hash + Eq,
    V: serde::Deserialize<'de> + Clone,
    S: BuildHasher + Default + Clone,
{
    type Value = PersistentHashMap<K, V, S>;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        // Note: Sequential insert ensures gradual memory usage even for
        // large inputs.
        let mut map = PersistentHashMap::default();
        while let Some((key, value)) = access.next_entry()? {
            map = map.insert(key, value);
        }
        Ok(map)
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V, S> serde::Deserialize<'de> for PersistentHashMap<K, V, S>
where
    K: serde::Deserialize<'de> + Clone + Hash + Eq,
    V: serde::Deserialize<'de> + Clone,
    S: BuildHasher + Default + Clone,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(PersistentHashMapVisitor::new())
    }
}

// =============================================================================
// Tests
// =============================================================================
