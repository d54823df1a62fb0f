//! Trie node representation and branch algebra.
//!
//! Nodes are immutable: every mutation in [`super::trie`] builds a
//! replacement node with one slot changed and relinks the path above it,
//! sharing all sibling subtrees. The helpers here are the mechanical
//! copy-with-one-slot-changed operations; the collapse policy lives with
//! the algorithms in [`super::trie`].

use crate::shared::ReferenceCounter;

// =============================================================================
// Node definition
// =============================================================================

/// A CHAMP trie node.
#[derive(Clone)]
pub(crate) enum Node<A> {
    /// The canonical zero-entry node. Only ever the root.
    Empty,
    /// A single entry. Only ever the root; inside a branch, lone entries
    /// are stored inline as [`Child::Entry`].
    Entry {
        /// Full hash of the entry's key.
        hash: u64,
        /// The entry payload.
        entry: A,
    },
    /// Bitmap-compressed branch.
    ///
    /// The child array has no gaps: its length equals
    /// `bitmap.count_ones()`, and slot order matches ascending bit
    /// position.
    Branch {
        /// Bitmap of occupied positions (one bit per hash fragment).
        bitmap: u32,
        /// Compacted child slots.
        children: ReferenceCounter<[Child<A>]>,
    },
    /// Entries whose full 64-bit hashes are equal, reachable only below
    /// the deepest branch level once the hash is exhausted.
    ///
    /// Invariant: `entries.len() >= 2`.
    Collision {
        /// The shared full hash.
        hash: u64,
        /// The colliding entries, in no particular order.
        entries: ReferenceCounter<[A]>,
    },
}

/// One slot of a branch node.
#[derive(Clone)]
pub(crate) enum Child<A> {
    /// An entry stored inline in the branch.
    Entry {
        /// Full hash of the entry's key.
        hash: u64,
        /// The entry payload.
        entry: A,
    },
    /// A nested subtree: always a `Branch` or `Collision` node.
    Node(ReferenceCounter<Node<A>>),
}

impl<A> Node<A> {
    /// Creates the canonical empty node.
    pub(crate) const fn empty() -> Self {
        Self::Empty
    }
}

impl<A> Child<A> {
    /// Returns the hash and entry when this slot holds an inline entry.
    pub(crate) const fn inline(&self) -> Option<(u64, &A)> {
        match self {
            Self::Entry { hash, entry } => Some((*hash, entry)),
            Self::Node(_) => None,
        }
    }
}

// =============================================================================
// Bitmap addressing
// =============================================================================

/// Returns the single-bit mask for a branch index (0..32).
#[inline]
pub(crate) const fn bit_at(index: usize) -> u32 {
    1 << index
}

/// Returns the compacted array position of `bit` within `bitmap`: the
/// number of occupied slots below it.
#[inline]
pub(crate) const fn compact_index(bitmap: u32, bit: u32) -> usize {
    (bitmap & (bit - 1)).count_ones() as usize
}

// =============================================================================
// Branch algebra
// =============================================================================

/// Builds a branch holding two children at distinct indices.
pub(crate) fn branch_pair<A>(
    index_a: usize,
    child_a: Child<A>,
    index_b: usize,
    child_b: Child<A>,
) -> Node<A> {
    debug_assert_ne!(index_a, index_b);
    let bitmap = bit_at(index_a) | bit_at(index_b);
    let children = if index_a < index_b {
        vec![child_a, child_b]
    } else {
        vec![child_b, child_a]
    };
    Node::Branch {
        bitmap,
        children: ReferenceCounter::from(children),
    }
}

/// Builds a branch holding a single child.
pub(crate) fn branch_single<A>(index: usize, child: Child<A>) -> Node<A> {
    Node::Branch {
        bitmap: bit_at(index),
        children: ReferenceCounter::from(vec![child]),
    }
}

/// Copies a branch with a new child inserted at an unoccupied bit.
pub(crate) fn branch_insert<A: Clone>(
    bitmap: u32,
    children: &[Child<A>],
    bit: u32,
    position: usize,
    child: Child<A>,
) -> Node<A> {
    debug_assert_eq!(bitmap & bit, 0);
    let mut new_children = children.to_vec();
    new_children.insert(position, child);
    Node::Branch {
        bitmap: bitmap | bit,
        children: ReferenceCounter::from(new_children),
    }
}

/// Copies a branch with the child at `position` replaced.
pub(crate) fn branch_replace<A: Clone>(
    bitmap: u32,
    children: &[Child<A>],
    position: usize,
    child: Child<A>,
) -> Node<A> {
    let mut new_children = children.to_vec();
    new_children[position] = child;
    Node::Branch {
        bitmap,
        children: ReferenceCounter::from(new_children),
    }
}

/// Copies a branch with the child at `position` removed and its bit
/// cleared. The caller decides whether the result is collapsible.
pub(crate) fn branch_remove<A: Clone>(
    bitmap: u32,
    children: &[Child<A>],
    bit: u32,
    position: usize,
) -> (u32, Vec<Child<A>>) {
    debug_assert_ne!(bitmap & bit, 0);
    let mut new_children = children.to_vec();
    new_children.remove(position);
    (bitmap & !bit, new_children)
}

// =============================================================================
// Tests
// =============================================================================
