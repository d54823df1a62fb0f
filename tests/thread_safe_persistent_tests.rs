//! Integration tests for thread-safe sharing.
//!
//! These tests verify that the containers work correctly with the `arc`
//! feature enabled: a single version may be read from many threads, and
//! threads may derive new versions concurrently without disturbing the
//! shared original.

#![cfg(feature = "arc")]

use chamt::{PersistentHashMap, PersistentHashSet};
use rstest::rstest;
use std::sync::Arc;
use std::thread;

// =============================================================================
// PersistentHashMap
// =============================================================================

#[rstest]
fn test_map_shared_across_threads() {
    let map: Arc<PersistentHashMap<i32, i32>> =
        Arc::new((0..100).map(|index| (index, index * 2)).collect());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let map_clone = Arc::clone(&map);
            thread::spawn(move || {
                for index in 0..100 {
                    assert_eq!(map_clone.get(&index), Some(&(index * 2)));
                }
                assert_eq!(map_clone.len(), 100);
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("thread panicked");
    }
}

#[rstest]
fn test_map_cross_thread_structural_sharing() {
    let original: Arc<PersistentHashMap<i32, i32>> =
        Arc::new((0..100).map(|index| (index, index)).collect());

    let handles: Vec<_> = (0..4)
        .map(|index| {
            let map_clone = Arc::clone(&original);
            thread::spawn(move || {
                // Each thread derives its own version.
                let derived = map_clone.insert(1_000 + index, -index);
                assert_eq!(derived.len(), 101);
                assert_eq!(derived.get(&(1_000 + index)), Some(&-index));
                // The shared original is unchanged.
                assert_eq!(map_clone.len(), 100);
                derived
            })
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().expect("thread panicked"))
        .collect();

    for (index, derived) in (0i32..).zip(results.iter()) {
        assert_eq!(derived.get(&(1_000 + index)), Some(&-index));
    }
    assert_eq!(original.len(), 100);
}

#[rstest]
fn test_map_concurrent_removals() {
    let original: Arc<PersistentHashMap<i32, i32>> =
        Arc::new((0..100).map(|index| (index, index)).collect());

    let handles: Vec<_> = (0..4)
        .map(|index| {
            let map_clone = Arc::clone(&original);
            thread::spawn(move || {
                let derived = map_clone.remove(&(index * 10));
                assert_eq!(derived.len(), 99);
                assert_eq!(derived.get(&(index * 10)), None);
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("thread panicked");
    }
    assert_eq!(original.len(), 100);
}

#[rstest]
fn test_map_iteration_from_multiple_threads() {
    let map: Arc<PersistentHashMap<i32, i32>> =
        Arc::new((0..500).map(|index| (index, index)).collect());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let map_clone = Arc::clone(&map);
            thread::spawn(move || {
                let total: i64 = map_clone.iter().map(|(_, value)| i64::from(*value)).sum();
                assert_eq!(total, (0..500).sum::<i64>());
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("thread panicked");
    }
}

// =============================================================================
// PersistentHashSet
// =============================================================================

#[rstest]
fn test_set_shared_across_threads() {
    let set: Arc<PersistentHashSet<i32>> = Arc::new((0..100).collect());

    let handles: Vec<_> = (0..4)
        .map(|index| {
            let set_clone = Arc::clone(&set);
            thread::spawn(move || {
                assert!(set_clone.contains(&index));
                let extended = set_clone.insert(1_000 + index);
                assert_eq!(extended.len(), 101);
                assert_eq!(set_clone.len(), 100);
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("thread panicked");
    }
    assert_eq!(set.len(), 100);
}
