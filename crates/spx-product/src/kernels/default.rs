//! Default kernels: legal for every element type and every operand
//! structure.

use spx_matrix::{DenseViewMut, Element, Matrix, SparseMatrix};

use super::{column_blocks, group_range, row_groups, Update};

/// `C = A * B` over the cells of `view`.
///
/// Each cell is written exactly once. A cell whose sparse range is empty is
/// reset to zero, so stale target values never survive.
pub fn assign<T, L, R>(view: &mut DenseViewMut<'_, T>, left: &L, right: &R)
where
    T: Element,
    L: Matrix<Elem = T> + ?Sized,
    R: SparseMatrix<Elem = T> + ?Sized,
{
    let structure = left.structure();
    for block in column_blocks(view) {
        row_groups!(view.rows(), i, G => {
            for j in block.clone() {
                let column = right.column(j);
                let range = group_range(&column, structure, i, i + G - 1);
                let mut entries = column.entries(range);

                let Some((k, v)) = entries.next() else {
                    for r in 0..G {
                        view.set(i + r, j, T::zero());
                    }
                    continue;
                };
                let mut acc: [T; G] = std::array::from_fn(|r| left.get(i + r, k) * v);
                for (k, v) in entries {
                    for r in 0..G {
                        acc[r] += left.get(i + r, k) * v;
                    }
                }
                for r in 0..G {
                    view.set(i + r, j, acc[r]);
                }
            }
        });
    }
}

/// `C += A * B` or `C -= A * B` over the cells of `view`, depending on `U`.
pub fn update<U, T, L, R>(view: &mut DenseViewMut<'_, T>, left: &L, right: &R)
where
    U: Update,
    T: Element,
    L: Matrix<Elem = T> + ?Sized,
    R: SparseMatrix<Elem = T> + ?Sized,
{
    let structure = left.structure();
    for block in column_blocks(view) {
        row_groups!(view.rows(), i, G => {
            for j in block.clone() {
                let column = right.column(j);
                let range = group_range(&column, structure, i, i + G - 1);
                if range.is_empty() {
                    continue;
                }
                let mut acc = [T::zero(); G];
                for (k, v) in column.entries(range) {
                    for r in 0..G {
                        acc[r] += left.get(i + r, k) * v;
                    }
                }
                for r in 0..G {
                    U::apply(view.get_mut(i + r, j), acc[r]);
                }
            }
        });
    }
}
