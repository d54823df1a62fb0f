//! The persistent trie engine.
//!
//! Every mutating operation is a hash-guided recursive rewrite that
//! copies only the nodes on the path from the root to the touched slot;
//! all sibling subtrees are shared with the receiver, which is never
//! written through. Removal reports collapses upward one level at a
//! time via [`Removal`], so each ancestor decides independently whether
//! it, too, has become collapsible.

use std::borrow::Borrow;

use super::iter::Iter;
use super::node::{self, Child, Node};
use super::{KeyedEntry, MAX_DEPTH, hash_index};
use crate::shared::ReferenceCounter;

// =============================================================================
// Champ definition
// =============================================================================

/// A persistent CHAMP trie: a shared root node plus an entry count.
///
/// Values of this type are frozen snapshots. `add` and `sub` construct
/// a new `Champ` and leave the receiver untouched, so any number of
/// versions stay valid and iterable side by side, sharing structure.
pub(crate) struct Champ<A> {
    root: ReferenceCounter<Node<A>>,
    size: usize,
}

impl<A> Clone for Champ<A> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            size: self.size,
        }
    }
}

impl<A> Champ<A> {
    /// Creates an empty trie.
    pub(crate) fn new() -> Self {
        Self {
            root: ReferenceCounter::new(Node::empty()),
            size: 0,
        }
    }

    /// Returns the number of entries.
    pub(crate) const fn size(&self) -> usize {
        self.size
    }

    /// Returns `true` if the two tries share the identical root node.
    pub(crate) fn ptr_eq(&self, other: &Self) -> bool {
        ReferenceCounter::ptr_eq(&self.root, &other.root)
    }

    /// Returns a lazy cursor over the entries of this snapshot.
    pub(crate) fn iter(&self) -> Iter<'_, A> {
        Iter::new(&self.root, self.size)
    }
}

impl<A: KeyedEntry> Champ<A> {
    /// Looks up the entry whose key equals `key` under the given hash.
    ///
    /// Never allocates; cost is bounded by the trie depth.
    pub(crate) fn get<Q>(&self, hash: u64, key: &Q) -> Option<&A>
    where
        A::Key: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        get_in_node(&self.root, hash, key, 0)
    }

    /// Whole-container equality: equal sizes and every entry of `self`
    /// present and equal in `other`.
    ///
    /// `hash_in_other` must hash a key the way `other`'s entries were
    /// hashed; the two tries need not share a hasher instance. Sharing
    /// the identical root short-circuits to `true` immediately, which
    /// makes comparing a trie against a lightly-diverged descendant of
    /// itself cheap.
    pub(crate) fn equals_by<F>(&self, other: &Self, hash_in_other: F) -> bool
    where
        A: PartialEq,
        F: Fn(&A::Key) -> u64,
    {
        if self.size != other.size {
            return false;
        }
        if self.ptr_eq(other) {
            return true;
        }
        self.iter().all(|entry| {
            let hash = hash_in_other(entry.key());
            other
                .get(hash, entry.key())
                .is_some_and(|found| found == entry)
        })
    }
}

impl<A: KeyedEntry + Clone> Champ<A> {
    /// Returns a trie containing `entry`, plus whether the key was
    /// previously absent (in which case the size grew by one; a present
    /// key has its entry replaced instead).
    pub(crate) fn add(&self, hash: u64, entry: A) -> (Self, bool) {
        let (new_root, added) = add_to_node(&self.root, hash, entry, 0);
        (
            Self {
                root: ReferenceCounter::new(new_root),
                size: self.size + usize::from(added),
            },
            added,
        )
    }

    /// Returns a trie without the entry for `key`, or `None` when the
    /// key is absent. The caller then keeps the receiver as-is, so a
    /// no-op erase allocates nothing and preserves the identical root.
    pub(crate) fn sub<Q>(&self, hash: u64, key: &Q) -> Option<Self>
    where
        A::Key: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        let new_root = match remove_from_node(&self.root, hash, key, 0)? {
            Removal::Empty => Node::empty(),
            Removal::Inline { hash, entry } => Node::Entry { hash, entry },
            Removal::Subtree(root) => root,
        };
        Some(Self {
            root: ReferenceCounter::new(new_root),
            size: self.size - 1,
        })
    }
}

// =============================================================================
// Lookup
// =============================================================================

fn get_in_node<'a, A, Q>(node: &'a Node<A>, hash: u64, key: &Q, depth: usize) -> Option<&'a A>
where
    A: KeyedEntry,
    A::Key: Borrow<Q>,
    Q: Eq + ?Sized,
{
    match node {
        Node::Empty => None,
        Node::Entry {
            hash: entry_hash,
            entry,
        } => (*entry_hash == hash && entry.key().borrow() == key).then_some(entry),
        Node::Branch { bitmap, children } => {
            let bit = node::bit_at(hash_index(hash, depth));
            if bitmap & bit == 0 {
                return None;
            }
            match &children[node::compact_index(*bitmap, bit)] {
                Child::Entry {
                    hash: child_hash,
                    entry,
                } => (*child_hash == hash && entry.key().borrow() == key).then_some(entry),
                Child::Node(subnode) => get_in_node(subnode, hash, key, depth + 1),
            }
        }
        Node::Collision {
            hash: collision_hash,
            entries,
        } => {
            if *collision_hash != hash {
                return None;
            }
            entries.iter().find(|entry| entry.key().borrow() == key)
        }
    }
}

// =============================================================================
// Insertion
// =============================================================================

fn add_to_node<A: KeyedEntry + Clone>(
    node: &Node<A>,
    hash: u64,
    entry: A,
    depth: usize,
) -> (Node<A>, bool) {
    match node {
        Node::Empty => (Node::Entry { hash, entry }, true),
        Node::Entry {
            hash: existing_hash,
            entry: existing,
        } => {
            if *existing_hash == hash && existing.key() == entry.key() {
                (Node::Entry { hash, entry }, false)
            } else {
                (
                    merge_entries(existing.clone(), *existing_hash, entry, hash, depth),
                    true,
                )
            }
        }
        Node::Branch { bitmap, children } => add_to_branch(*bitmap, children, hash, entry, depth),
        Node::Collision {
            hash: collision_hash,
            entries,
        } => {
            // Reachable only through a full descent, so the hashes agree.
            debug_assert_eq!(*collision_hash, hash);
            add_to_collision(*collision_hash, entries, entry)
        }
    }
}

fn add_to_branch<A: KeyedEntry + Clone>(
    bitmap: u32,
    children: &[Child<A>],
    hash: u64,
    entry: A,
    depth: usize,
) -> (Node<A>, bool) {
    let bit = node::bit_at(hash_index(hash, depth));
    let position = node::compact_index(bitmap, bit);

    if bitmap & bit == 0 {
        return (
            node::branch_insert(bitmap, children, bit, position, Child::Entry { hash, entry }),
            true,
        );
    }

    let (new_child, added) = match &children[position] {
        Child::Entry {
            hash: child_hash,
            entry: existing,
        } => {
            if *child_hash == hash && existing.key() == entry.key() {
                (Child::Entry { hash, entry }, false)
            } else {
                let merged = merge_entries(existing.clone(), *child_hash, entry, hash, depth + 1);
                (Child::Node(ReferenceCounter::new(merged)), true)
            }
        }
        Child::Node(subnode) => {
            let (new_subnode, added) = add_to_node(subnode, hash, entry, depth + 1);
            (Child::Node(ReferenceCounter::new(new_subnode)), added)
        }
    };

    (
        node::branch_replace(bitmap, children, position, new_child),
        added,
    )
}

/// Builds the subtree holding two entries with distinct keys, starting
/// at `depth`. While their hash fragments keep matching the entries are
/// pushed one level down; once the hash is exhausted the full hashes
/// are necessarily equal and the pair becomes a collision node.
fn merge_entries<A>(existing: A, existing_hash: u64, new: A, new_hash: u64, depth: usize) -> Node<A> {
    if depth >= MAX_DEPTH {
        debug_assert_eq!(existing_hash, new_hash);
        return Node::Collision {
            hash: existing_hash,
            entries: ReferenceCounter::from(vec![existing, new]),
        };
    }

    let existing_index = hash_index(existing_hash, depth);
    let new_index = hash_index(new_hash, depth);

    if existing_index == new_index {
        let subtree = merge_entries(existing, existing_hash, new, new_hash, depth + 1);
        node::branch_single(existing_index, Child::Node(ReferenceCounter::new(subtree)))
    } else {
        node::branch_pair(
            existing_index,
            Child::Entry {
                hash: existing_hash,
                entry: existing,
            },
            new_index,
            Child::Entry {
                hash: new_hash,
                entry: new,
            },
        )
    }
}

fn add_to_collision<A: KeyedEntry + Clone>(hash: u64, entries: &[A], entry: A) -> (Node<A>, bool) {
    let mut new_entries = entries.to_vec();
    let replaced = match new_entries
        .iter()
        .position(|existing| existing.key() == entry.key())
    {
        Some(position) => {
            new_entries[position] = entry;
            true
        }
        None => {
            new_entries.push(entry);
            false
        }
    };
    (
        Node::Collision {
            hash,
            entries: ReferenceCounter::from(new_entries),
        },
        !replaced,
    )
}

// =============================================================================
// Removal
// =============================================================================

/// Outcome of removing an entry from a subtree, reported to the parent
/// so it can relink (or collapse) accordingly.
enum Removal<A> {
    /// The subtree became empty.
    Empty,
    /// The subtree collapsed to a single inline entry.
    Inline { hash: u64, entry: A },
    /// The subtree survives in rewritten form.
    Subtree(Node<A>),
}

fn remove_from_node<A, Q>(node: &Node<A>, hash: u64, key: &Q, depth: usize) -> Option<Removal<A>>
where
    A: KeyedEntry + Clone,
    A::Key: Borrow<Q>,
    Q: Eq + ?Sized,
{
    match node {
        Node::Empty => None,
        Node::Entry {
            hash: entry_hash,
            entry,
        } => (*entry_hash == hash && entry.key().borrow() == key).then_some(Removal::Empty),
        Node::Branch { bitmap, children } => {
            remove_from_branch(*bitmap, children, hash, key, depth)
        }
        Node::Collision {
            hash: collision_hash,
            entries,
        } => {
            if *collision_hash != hash {
                return None;
            }
            remove_from_collision(*collision_hash, entries, key)
        }
    }
}

fn remove_from_branch<A, Q>(
    bitmap: u32,
    children: &[Child<A>],
    hash: u64,
    key: &Q,
    depth: usize,
) -> Option<Removal<A>>
where
    A: KeyedEntry + Clone,
    A::Key: Borrow<Q>,
    Q: Eq + ?Sized,
{
    let bit = node::bit_at(hash_index(hash, depth));
    if bitmap & bit == 0 {
        return None;
    }
    let position = node::compact_index(bitmap, bit);

    match &children[position] {
        Child::Entry {
            hash: child_hash,
            entry,
        } => {
            if *child_hash != hash || entry.key().borrow() != key {
                return None;
            }
            let (new_bitmap, new_children) = node::branch_remove(bitmap, children, bit, position);
            Some(collapse_branch(new_bitmap, new_children))
        }
        Child::Node(subnode) => {
            let outcome = match remove_from_node(subnode, hash, key, depth + 1)? {
                // A nested subtree holds at least two entries, so it can
                // shrink but never vanish outright; handled uniformly
                // with the inline-entry slot anyway.
                Removal::Empty => {
                    let (new_bitmap, new_children) =
                        node::branch_remove(bitmap, children, bit, position);
                    collapse_branch(new_bitmap, new_children)
                }
                Removal::Inline {
                    hash: entry_hash,
                    entry,
                } => {
                    if children.len() == 1 {
                        // The collapsed entry is this branch's only
                        // child: the branch collapses as well.
                        Removal::Inline {
                            hash: entry_hash,
                            entry,
                        }
                    } else {
                        Removal::Subtree(node::branch_replace(
                            bitmap,
                            children,
                            position,
                            Child::Entry {
                                hash: entry_hash,
                                entry,
                            },
                        ))
                    }
                }
                Removal::Subtree(new_subnode) => Removal::Subtree(node::branch_replace(
                    bitmap,
                    children,
                    position,
                    Child::Node(ReferenceCounter::new(new_subnode)),
                )),
            };
            Some(outcome)
        }
    }
}

fn collapse_branch<A: Clone>(bitmap: u32, children: Vec<Child<A>>) -> Removal<A> {
    if children.is_empty() {
        return Removal::Empty;
    }
    if children.len() == 1 {
        if let Some((hash, entry)) = children[0].inline() {
            return Removal::Inline {
                hash,
                entry: entry.clone(),
            };
        }
    }
    Removal::Subtree(Node::Branch {
        bitmap,
        children: ReferenceCounter::from(children),
    })
}

fn remove_from_collision<A, Q>(hash: u64, entries: &[A], key: &Q) -> Option<Removal<A>>
where
    A: KeyedEntry + Clone,
    A::Key: Borrow<Q>,
    Q: Eq + ?Sized,
{
    let position = entries.iter().position(|entry| entry.key().borrow() == key)?;
    let mut new_entries = entries.to_vec();
    new_entries.remove(position);

    if new_entries.len() == 1 {
        let entry = new_entries.remove(0);
        Some(Removal::Inline { hash, entry })
    } else {
        Some(Removal::Subtree(Node::Collision {
            hash,
            entries: ReferenceCounter::from(new_entries),
        }))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    // Driving the engine with hand-picked hashes makes fragment
    // collisions and full collisions deterministic.
    type Trie = Champ<(u32, &'static str)>;

    fn empty() -> Trie {
        Champ::new()
    }

    fn added(trie: &Trie, hash: u64, key: u32, value: &'static str) -> Trie {
        trie.add(hash, (key, value)).0
    }

    #[rstest]
    fn test_empty_trie_has_size_zero() {
        let trie = empty();
        assert_eq!(trie.size(), 0);
        assert_eq!(trie.get(0, &0), None);
    }

    #[rstest]
    fn test_add_then_get_round_trip() {
        let trie = added(&empty(), 0b00001, 1, "one");
        assert_eq!(trie.size(), 1);
        assert_eq!(trie.get(0b00001, &1), Some(&(1, "one")));
        assert_eq!(trie.get(0b00010, &2), None);
    }

    #[rstest]
    fn test_replace_keeps_size() {
        let first = added(&empty(), 7, 1, "one");
        let second = added(&first, 7, 1, "uno");

        assert_eq!(second.size(), 1);
        assert_eq!(second.get(7, &1), Some(&(1, "uno")));
        // The receiver still sees its own value.
        assert_eq!(first.get(7, &1), Some(&(1, "one")));
    }

    #[rstest]
    fn test_fragment_collision_builds_nested_branch() {
        // Same 5-bit fragment at depth 0, diverging at depth 1.
        let hash_a = 0b00001_00011;
        let hash_b = 0b00010_00011;
        let trie = added(&added(&empty(), hash_a, 1, "a"), hash_b, 2, "b");

        assert_eq!(trie.size(), 2);
        assert_eq!(trie.get(hash_a, &1), Some(&(1, "a")));
        assert_eq!(trie.get(hash_b, &2), Some(&(2, "b")));
    }

    #[rstest]
    fn test_full_hash_collision_is_stored_at_maximum_depth() {
        let trie = added(&added(&empty(), 42, 1, "a"), 42, 2, "b");

        assert_eq!(trie.size(), 2);
        assert_eq!(trie.get(42, &1), Some(&(1, "a")));
        assert_eq!(trie.get(42, &2), Some(&(2, "b")));

        // The colliding pair sits below a chain of single-child
        // branches spanning every level of the trie.
        let mut node = trie.root.clone();
        let mut branch_levels = 0;
        loop {
            let next = match &*node {
                Node::Branch { children, .. } => {
                    assert_eq!(children.len(), 1);
                    branch_levels += 1;
                    match &children[0] {
                        Child::Node(subnode) => subnode.clone(),
                        Child::Entry { .. } => panic!("expected a nested node"),
                    }
                }
                Node::Collision { entries, .. } => {
                    assert_eq!(entries.len(), 2);
                    break;
                }
                _ => panic!("expected a branch or collision node"),
            };
            node = next;
        }
        assert_eq!(branch_levels, MAX_DEPTH);
    }

    #[rstest]
    fn test_collision_replace_and_remove() {
        let trie = added(&added(&added(&empty(), 42, 1, "a"), 42, 2, "b"), 42, 3, "c");
        assert_eq!(trie.size(), 3);

        let replaced = added(&trie, 42, 2, "B");
        assert_eq!(replaced.size(), 3);
        assert_eq!(replaced.get(42, &2), Some(&(2, "B")));

        let shrunk = trie.sub(42, &1).expect("key is present");
        assert_eq!(shrunk.size(), 2);
        assert_eq!(shrunk.get(42, &1), None);
        assert_eq!(shrunk.get(42, &2), Some(&(2, "b")));
        assert_eq!(shrunk.get(42, &3), Some(&(3, "c")));
    }

    #[rstest]
    fn test_collision_collapses_to_root_entry() {
        let trie = added(&added(&empty(), 42, 1, "a"), 42, 2, "b");
        let shrunk = trie.sub(42, &2).expect("key is present");

        assert_eq!(shrunk.size(), 1);
        assert_eq!(shrunk.get(42, &1), Some(&(1, "a")));
        // The single-child branch chain above the collision collapsed
        // all the way back into a root entry.
        assert!(matches!(&*shrunk.root, Node::Entry { .. }));
    }

    #[rstest]
    fn test_sub_absent_key_returns_none() {
        let trie = added(&empty(), 1, 1, "one");
        assert!(trie.sub(2, &2).is_none());
        // Same hash, different key.
        assert!(trie.sub(1, &9).is_none());
    }

    #[rstest]
    fn test_sub_collapses_pair_branch() {
        let trie = added(&added(&empty(), 0b00001, 1, "a"), 0b00010, 2, "b");
        let shrunk = trie.sub(0b00001, &1).expect("key is present");

        assert_eq!(shrunk.size(), 1);
        assert!(matches!(&*shrunk.root, Node::Entry { .. }));
        assert_eq!(shrunk.get(0b00010, &2), Some(&(2, "b")));
    }

    #[rstest]
    fn test_removal_collapse_cascades_through_chain() {
        // Two entries sharing fragments at depths 0 and 1 produce a
        // two-level single-child chain before the pair branch.
        let hash_a = 0b00001_11111_11111;
        let hash_b = 0b00010_11111_11111;
        let trie = added(&added(&empty(), hash_a, 1, "a"), hash_b, 2, "b");

        let shrunk = trie.sub(hash_b, &2).expect("key is present");
        assert_eq!(shrunk.size(), 1);
        assert!(matches!(&*shrunk.root, Node::Entry { .. }));
        assert_eq!(shrunk.get(hash_a, &1), Some(&(1, "a")));
    }

    #[rstest]
    fn test_persistence_across_versions() {
        let v0 = empty();
        let v1 = added(&v0, 1, 1, "one");
        let v2 = added(&v1, 2, 2, "two");
        let v3 = v2.sub(1, &1).expect("key is present");

        assert_eq!(v0.size(), 0);
        assert_eq!(v1.size(), 1);
        assert_eq!(v2.size(), 2);
        assert_eq!(v3.size(), 1);
        assert_eq!(v1.get(1, &1), Some(&(1, "one")));
        assert_eq!(v3.get(1, &1), None);
        assert_eq!(v3.get(2, &2), Some(&(2, "two")));
    }

    #[rstest]
    fn test_equals_by_ignores_insertion_order() {
        let forward = added(&added(&empty(), 1, 1, "a"), 2, 2, "b");
        let backward = added(&added(&empty(), 2, 2, "b"), 1, 1, "a");

        let hash_of_key = |key: &u32| u64::from(*key);
        assert!(forward.equals_by(&backward, hash_of_key));
        assert!(backward.equals_by(&forward, hash_of_key));

        let diverged = added(&forward, 3, 3, "c");
        assert!(!forward.equals_by(&diverged, hash_of_key));
    }

    #[rstest]
    fn test_equals_by_shares_root_after_clone() {
        let trie = added(&empty(), 5, 5, "five");
        let clone = trie.clone();
        assert!(trie.ptr_eq(&clone));
        assert!(trie.equals_by(&clone, |key| u64::from(*key)));
    }
}
