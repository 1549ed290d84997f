//! Parallel assignment over disjoint bands of a dense target.

use log::trace;
use rayon::prelude::*;
use spx_matrix::{DenseViewMut, Element};

/// Split `view` into one band per worker thread and run `kernel` on every
/// band concurrently.
///
/// Bands cover whole rows of a row-major target or whole columns of a
/// column-major one, so the kernel never writes a cell another band owns.
pub fn for_each_band<T, F>(view: DenseViewMut<'_, T>, kernel: F)
where
    T: Element,
    F: Fn(&mut DenseViewMut<'_, T>) + Sync + Send,
{
    let threads = rayon::current_num_threads();
    let bands = view.split_bands(threads);
    trace!(
        "parallel assignment: {} bands on {} threads ({})",
        bands.len(),
        threads,
        bands
            .iter()
            .map(|b| format!("{:?}x{:?}", b.rows(), b.columns()))
            .collect::<Vec<_>>()
            .join(", ")
    );
    bands.into_par_iter().for_each(|mut band| kernel(&mut band));
}
