//! Splitting a run's pending tests across worker slots
//!
//! Assignment is round-robin on the test's index, which keeps slot sizes
//! within one of each other without any knowledge of test durations.

/// Number of workers a run actually uses
///
/// Clamped to the number of pending tests; a request for zero workers is
/// treated as a request for one.
pub fn effective_worker_count(requested: usize, pending: usize) -> usize {
    requested.max(1).min(pending)
}

/// Assign `items` to `workers` slots, `slot = index % workers`
///
/// Returns one (possibly empty) list per slot, preserving the relative order
/// of the items inside each slot. Returns no slots when `workers` is zero.
pub fn round_robin<T: Clone>(items: &[T], workers: usize) -> Vec<Vec<T>> {
    if workers == 0 {
        return Vec::new();
    }

    let mut slots: Vec<Vec<T>> = vec![Vec::new(); workers];
    for (index, item) in items.iter().enumerate() {
        slots[index % workers].push(item.clone());
    }
    slots
}
