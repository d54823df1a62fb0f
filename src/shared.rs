//! Reference-counting policy for trie nodes.
//!
//! Every node handle in the CHAMP engine goes through the
//! [`ReferenceCounter`] alias defined here, so the engine itself never
//! commits to a particular counting strategy. The strategy is selected
//! at compile time by the `arc` cargo feature:
//!
//! - Without `arc` (the default), nodes are counted with [`std::rc::Rc`]:
//!   cheaper increments, but a given map or set must stay on one thread.
//! - With `arc`, nodes are counted with [`std::sync::Arc`]: a single map
//!   or set value (and the node graph it shares with other versions) may
//!   be read concurrently from any number of threads.
//!
//! A node is freed exactly when the last version referencing it is
//! dropped; releasing a version walks only the unshared portion of its
//! node graph, because the count of a shared node simply decrements and
//! the walk stops there.

/// Reference-counted smart pointer type for trie nodes.
///
/// When the `arc` feature is enabled, this is `std::sync::Arc`,
/// which is thread-safe but has slightly higher overhead.
///
/// When the `arc` feature is disabled (default), this is `std::rc::Rc`,
/// which is faster but not thread-safe.
#[cfg(feature = "arc")]
pub(crate) type ReferenceCounter<T> = std::sync::Arc<T>;

#[cfg(not(feature = "arc"))]
pub(crate) type ReferenceCounter<T> = std::rc::Rc<T>;

// Polarity checks: the containers must be shareable across threads
// exactly when the atomic policy is selected.
#[cfg(feature = "arc")]
mod arc_send_sync_verification {
    use crate::{PersistentHashMap, PersistentHashSet};

    static_assertions::assert_impl_all!(PersistentHashMap<String, i32>: Send, Sync);
    static_assertions::assert_impl_all!(PersistentHashSet<String>: Send, Sync);
}

#[cfg(not(feature = "arc"))]
mod rc_send_sync_verification {
    use crate::{PersistentHashMap, PersistentHashSet};

    static_assertions::assert_not_impl_any!(PersistentHashMap<String, i32>: Send, Sync);
    static_assertions::assert_not_impl_any!(PersistentHashSet<String>: Send, Sync);
}

// =============================================================================
// Tests
// =============================================================================
