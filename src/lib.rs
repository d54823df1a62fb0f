//! # chamt
//!
//! Persistent hash maps and sets backed by a CHAMP trie
//! (Compressed Hash-Array Mapped Prefix trie) with structural sharing.
//!
//! ## Overview
//!
//! Every mutating operation on [`PersistentHashMap`] and
//! [`PersistentHashSet`] returns a new logical version while leaving all
//! prior versions valid and observable, without copying the whole
//! structure: only the nodes on the changed hash path are rebuilt, and
//! everything else is shared between versions. This gives map/set-style
//! lookup with the reasoning benefits of immutability, such as lock-free
//! concurrent readers and cheap snapshotting, at near-hash-table
//! performance (all per-operation costs are O(log32 N), effectively
//! constant for practical sizes).
//!
//! ## Feature Flags
//!
//! - `arc`: count node references with `Arc` instead of `Rc`, making a
//!   single map or set value shareable across threads
//! - `serde`: `Serialize`/`Deserialize` implementations
//! - `fxhash`: aliases using the Fx hasher (`rustc-hash`)
//! - `ahash`: aliases using the aHash hasher
//!
//! ## Example
//!
//! ```rust
//! use chamt::PersistentHashMap;
//!
//! let empty = PersistentHashMap::new();
//! let one = empty.insert("a".to_string(), 1);
//! let two = one.insert("b".to_string(), 2);
//!
//! // Every version remains intact.
//! assert_eq!(empty.len(), 0);
//! assert_eq!(one.len(), 1);
//! assert_eq!(two.len(), 2);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod champ;
mod shared;

pub mod map;
pub mod set;

pub use map::PersistentHashMap;
pub use map::PersistentHashMapIntoIterator;
pub use map::PersistentHashMapIterator;
pub use set::PersistentHashSet;
pub use set::PersistentHashSetIntoIterator;
pub use set::PersistentHashSetIterator;

#[cfg(feature = "fxhash")]
pub use map::FxPersistentHashMap;
#[cfg(feature = "fxhash")]
pub use set::FxPersistentHashSet;

#[cfg(feature = "ahash")]
pub use map::AHashPersistentHashMap;
#[cfg(feature = "ahash")]
pub use set::AHashPersistentHashSet;
