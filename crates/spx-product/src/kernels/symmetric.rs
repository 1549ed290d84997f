//! Traversals that exploit a symmetric operand.
//!
//! - `by_rows`: `B == transpose(B)`, so column k of `B` holds exactly the
//!   entries of row k and each target row is built as
//!   `C(i, :) = sum_k A(i, k) * column_k(B)`.
//! - `by_columns`: `A == transpose(A)`, so the product is
//!   `transpose(A) * B` and each target column is built as
//!   `C(:, j) = sum_k B(k, j) * row_k(A)`, reading the contiguous row k of a
//!   row-major `A` in place of its column k.

use spx_matrix::{DenseViewMut, Element, Matrix, SparseMatrix};

use super::{row_span, Add, Update};

/// `C = A * B` over the cells of `view` for a symmetric right operand.
pub fn assign_by_rows<T, L, R>(view: &mut DenseViewMut<'_, T>, left: &L, right: &R)
where
    T: Element,
    L: Matrix<Elem = T> + ?Sized,
    R: SparseMatrix<Elem = T> + ?Sized,
{
    view.reset();
    update_by_rows::<Add, T, L, R>(view, left, right);
}

/// `C += A * B` or `C -= A * B` for a symmetric right operand, depending on
/// `U`.
pub fn update_by_rows<U, T, L, R>(view: &mut DenseViewMut<'_, T>, left: &L, right: &R)
where
    U: Update,
    T: Element,
    L: Matrix<Elem = T> + ?Sized,
    R: SparseMatrix<Elem = T> + ?Sized,
{
    debug_assert!(right.structure().is_symmetric());
    let structure = left.structure();
    let columns = view.columns();
    for i in view.rows() {
        for k in row_span(structure, i, left.columns()) {
            let a = left.get(i, k);
            let row = right.column(k);
            let range = row.lower_bound(columns.start)..row.lower_bound(columns.end);
            for (j, v) in row.entries(range) {
                U::apply(view.get_mut(i, j), a * v);
            }
        }
    }
}

/// `C = A * B` over the cells of `view` for a symmetric left operand.
pub fn assign_by_columns<T, L, R>(view: &mut DenseViewMut<'_, T>, left: &L, right: &R)
where
    T: Element,
    L: Matrix<Elem = T> + ?Sized,
    R: SparseMatrix<Elem = T> + ?Sized,
{
    view.reset();
    update_by_columns::<Add, T, L, R>(view, left, right);
}

/// `C += A * B` or `C -= A * B` for a symmetric left operand, depending on
/// `U`.
pub fn update_by_columns<U, T, L, R>(view: &mut DenseViewMut<'_, T>, left: &L, right: &R)
where
    U: Update,
    T: Element,
    L: Matrix<Elem = T> + ?Sized,
    R: SparseMatrix<Elem = T> + ?Sized,
{
    debug_assert!(left.structure().is_symmetric());
    let structure = left.structure();
    let rows = view.rows();
    for j in view.columns() {
        let column = right.column(j);
        for (k, v) in column.iter() {
            // A(:, k) == A(k, :), clipped to the rows this view owns.
            let span = row_span(structure, k, left.columns());
            let begin = span.start.max(rows.start);
            let end = span.end.min(rows.end).max(begin);
            for i in begin..end {
                U::apply(view.get_mut(i, j), left.get(k, i) * v);
            }
        }
    }
}
