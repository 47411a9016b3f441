//! Order-preserving parallel iteration utilities.
//!
//! Thin wrappers over rayon's `par_iter` for batch workloads where output
//! row i must correspond to input row i.

use rayon::prelude::*;

/// Maps `f` over `items` in parallel, preserving input order in the output.
pub fn par_map<T, R, F>(items: &[T], f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync,
{
    items.par_iter().map(&f).collect()
}

/// Like [`par_map`], but the closure receives the item index as well.
pub fn par_map_indexed<T, R, F>(items: &[T], f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(usize, &T) -> R + Sync,
{
    items
        .par_iter()
        .enumerate()
        .map(|(index, item)| f(index, item))
        .collect()
}

/// Like [`par_map_indexed`], but the closure returns `Result<R, E>`.
///
/// Returns the error for the lowest-indexed failing item; later items may
/// still have been processed.
pub fn try_par_map_indexed<T, R, E, F>(items: &[T], f: F) -> Result<Vec<R>, E>
where
    T: Sync,
    R: Send,
    E: Send,
    F: Fn(usize, &T) -> Result<R, E> + Sync,
{
    let outcomes: Vec<Result<R, E>> = items
        .par_iter()
        .enumerate()
        .map(|(index, item)| f(index, item))
        .collect();

    // sequential pass so the reported error is deterministic
    let mut results = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        results.push(outcome?);
    }
    Ok(results)
}
