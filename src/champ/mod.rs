//! The CHAMP trie engine.
//!
//! This module is the core of the crate: a Compressed Hash-Array Mapped
//! Prefix trie over an opaque entry type. The engine knows nothing about
//! keys and values. The adapters in [`crate::map`] and [`crate::set`]
//! supply an entry type, a search-key projection ([`KeyedEntry`]) and
//! precomputed hashes, and the engine provides persistent `get`/`add`/
//! `sub`/`equals` plus iteration on top of them.
//!
//! Layout:
//!
//! - [`node`]: the immutable node representation and the branch algebra
//!   (bitmap addressing, copy-with-one-slot-changed operations).
//! - [`trie`]: the hash-guided recursive rewrites, from path-copying
//!   insert to removal with bottom-up collapse.
//! - [`iter`]: a lazy, stack-based cursor over a frozen trie snapshot.

use std::hash::{BuildHasher, Hash, Hasher};

pub(crate) mod iter;
pub(crate) mod node;
pub(crate) mod trie;

pub(crate) use iter::Iter;
pub(crate) use trie::Champ;

// =============================================================================
// Constants
// =============================================================================

/// Bits of hash consumed per trie level.
pub(crate) const BITS_PER_LEVEL: usize = 5;

/// Branch fan-out (2^5 = 32).
pub(crate) const BRANCHING_FACTOR: usize = 1 << BITS_PER_LEVEL;

/// Bit mask for extracting one level's hash fragment.
pub(crate) const MASK: u64 = (BRANCHING_FACTOR - 1) as u64;

/// Width of the hash values consumed by the trie.
pub(crate) const HASH_BITS: usize = 64;

/// Maximum trie depth: ceil(64 / 5) = 13 levels (the last level uses
/// the remaining 4 bits). Below the last level the hash is exhausted
/// and equal hashes go into collision nodes.
pub(crate) const MAX_DEPTH: usize = HASH_BITS.div_ceil(BITS_PER_LEVEL);

// =============================================================================
// Hash computation
// =============================================================================

/// Computes the 64-bit hash of a key with the adapter-supplied hasher.
///
/// The engine itself never hashes; adapters call this and pass the
/// result down.
pub(crate) fn hash_of<K, S>(build_hasher: &S, key: &K) -> u64
where
    K: Hash + ?Sized,
    S: BuildHasher,
{
    let mut hasher = build_hasher.build_hasher();
    key.hash(&mut hasher);
    hasher.finish()
}

/// Extracts the branch index at a given depth from a hash.
#[inline]
pub(crate) const fn hash_index(hash: u64, depth: usize) -> usize {
    ((hash >> (depth * BITS_PER_LEVEL)) & MASK) as usize
}

// =============================================================================
// Entry interface
// =============================================================================

/// The interface an entry type offers the engine.
///
/// Entries are opaque payloads to the trie; the only structure the
/// engine relies on is a projection to a search key that supports
/// equality. The map adapter implements this for `(K, V)` pairs
/// (projecting the key), the set adapter for its element wrapper
/// (projecting the element itself). Hashes are computed by the adapter
/// over this projected key, never by the engine.
pub(crate) trait KeyedEntry {
    /// The search-key type entries are looked up by.
    type Key: Eq;

    /// Projects the search key out of the entry.
    fn key(&self) -> &Self::Key;
}

// =============================================================================
// Tests
// =============================================================================
