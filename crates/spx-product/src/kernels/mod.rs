//! Assignment kernels streaming sparse columns against dense rows.
//!
//! Every kernel writes into a [`DenseViewMut`] and only touches the cells the
//! view covers, so the same code runs on a whole target or on one band of a
//! parallel assignment.
//!
//! - `default` - seeded accumulation; resets cells whose range is empty
//! - `optimized` - reset first, then four nonzeros per step
//! - `symmetric` - traversals for a symmetric left or right operand

pub mod default;
pub mod optimized;
pub mod symmetric;

use std::ops::Range;

use spx_matrix::{DenseViewMut, Element, SparseColumn, StorageOrder, Structure};

/// Column tile used for column-major targets.
pub const COLUMN_TILE: usize = 256;

/// How a computed value is folded into an existing target cell.
pub trait Update {
    fn apply<T: Element>(target: &mut T, value: T);
}

/// `C += value`
#[derive(Debug, Clone, Copy)]
pub struct Add;

/// `C -= value`
#[derive(Debug, Clone, Copy)]
pub struct Sub;

impl Update for Add {
    #[inline]
    fn apply<T: Element>(target: &mut T, value: T) {
        *target += value;
    }
}

impl Update for Sub {
    #[inline]
    fn apply<T: Element>(target: &mut T, value: T) {
        *target -= value;
    }
}

/// Column blocks of the view: all columns at once for a row-major target,
/// tiles of `COLUMN_TILE` for a column-major one.
pub(crate) fn column_blocks<T: Element>(view: &DenseViewMut<'_, T>) -> Vec<Range<usize>> {
    let columns = view.columns();
    let block = match view.order() {
        StorageOrder::RowMajor => columns.len().max(1),
        StorageOrder::ColumnMajor => COLUMN_TILE,
    };
    columns
        .clone()
        .step_by(block)
        .map(|start| start..(start + block).min(columns.end))
        .collect()
}

/// Positions of `column` that can meet a nonzero of the left operand in any
/// of the rows `first..=last`.
///
/// An upper left operand has no nonzeros left of the diagonal, so the range
/// starts at the first row of the group; a lower one has none right of the
/// diagonal, so it ends at the last row.
#[inline]
pub(crate) fn group_range<T: Element>(
    column: &SparseColumn<'_, T>,
    left: Structure,
    first: usize,
    last: usize,
) -> Range<usize> {
    let begin = if left.is_strictly_upper() {
        column.upper_bound(first)
    } else if left.is_upper() {
        column.lower_bound(first)
    } else {
        0
    };
    let end = if left.is_strictly_lower() {
        column.lower_bound(last)
    } else if left.is_lower() {
        column.upper_bound(last)
    } else {
        column.len()
    };
    begin..end.max(begin)
}

/// Columns of row `i` that can hold a nonzero of a matrix with `structure`
/// and `columns` columns.
pub(crate) fn row_span(structure: Structure, i: usize, columns: usize) -> Range<usize> {
    let begin = if structure.is_strictly_upper() {
        i + 1
    } else if structure.is_upper() {
        i
    } else {
        0
    };
    let end = if structure.is_strictly_lower() {
        i
    } else if structure.is_lower() {
        i + 1
    } else {
        columns
    };
    let end = end.min(columns);
    begin.min(end)..end
}

/// Rows of column `j` that can hold a nonzero of a matrix with `structure`
/// and `rows` rows.
pub(crate) fn column_span(structure: Structure, j: usize, rows: usize) -> Range<usize> {
    let begin = if structure.is_strictly_lower() {
        j + 1
    } else if structure.is_lower() {
        j
    } else {
        0
    };
    let end = if structure.is_strictly_upper() {
        j
    } else if structure.is_upper() {
        j + 1
    } else {
        rows
    };
    let end = end.min(rows);
    begin.min(end)..end
}

/// Walk `rows` in groups of 4, then 2, then 1, binding the group's first row
/// to `$i` and its size to the constant `$g`.
macro_rules! row_groups {
    ($rows:expr, $i:ident, $g:ident => $body:block) => {{
        let rows: ::std::ops::Range<usize> = $rows;
        let mut $i = rows.start;
        while $i + 4 <= rows.end {
            {
                const $g: usize = 4;
                $body
            }
            $i += 4;
        }
        if $i + 2 <= rows.end {
            {
                const $g: usize = 2;
                $body
            }
            $i += 2;
        }
        if $i < rows.end {
            const $g: usize = 1;
            $body
        }
    }};
}

pub(crate) use row_groups;
