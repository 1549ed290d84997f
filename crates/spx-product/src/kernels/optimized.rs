//! Loop-unrolled kernels: consume four sparse entries per step.
//!
//! Only selected for fixed-size element types and a non-diagonal right
//! operand.

use spx_matrix::{DenseViewMut, Element, Matrix, SparseMatrix};

use super::{column_blocks, group_range, row_groups, Add, Update};

/// `C = A * B` over the cells of `view`: reset, then accumulate.
pub fn assign<T, L, R>(view: &mut DenseViewMut<'_, T>, left: &L, right: &R)
where
    T: Element,
    L: Matrix<Elem = T> + ?Sized,
    R: SparseMatrix<Elem = T> + ?Sized,
{
    view.reset();
    update::<Add, T, L, R>(view, left, right);
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
                debug_assert!(
                    column.is_sorted_strict(),
                    "sparse column {} is not strictly increasing",
                    j
                );
                let range = group_range(&column, structure, i, i + G - 1);
                let indices = &column.indices()[range.clone()];
                let values = &column.values()[range];

                let mut acc = [T::zero(); G];
                for (k, v) in indices.chunks_exact(4).zip(values.chunks_exact(4)) {
                    for r in 0..G {
                        let row = i + r;
                        acc[r] += left.get(row, k[0]) * v[0]
                            + left.get(row, k[1]) * v[1]
                            + left.get(row, k[2]) * v[2]
                            + left.get(row, k[3]) * v[3];
                    }
                }

                let tail = indices.len() - indices.len() % 4;
                for (&k, &v) in indices[tail..].iter().zip(&values[tail..]) {
                    for r in 0..G {
                        acc[r] += left.get(i + r, k) * v;
                    }
                }

                if !indices.is_empty() {
                    for r in 0..G {
                        U::apply(view.get_mut(i + r, j), acc[r]);
                    }
                }
            }
        });
    }
}
