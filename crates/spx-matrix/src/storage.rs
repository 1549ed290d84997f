use crate::shape::Shape;

/// Memory layout of a dense matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StorageOrder {
    /// Rows are contiguous.
    #[default]
    RowMajor,
    /// Columns are contiguous.
    ColumnMajor,
}

impl StorageOrder {
    /// Distance between the starts of two consecutive rows (row-major) or
    /// columns (column-major).
    pub fn leading_dimension(&self, shape: Shape) -> usize {
        match self {
            StorageOrder::RowMajor => shape.columns(),
            StorageOrder::ColumnMajor => shape.rows(),
        }
    }

    /// Offset of element (i, j) in a contiguous buffer with leading dimension `ld`.
    #[inline]
    pub fn offset(&self, i: usize, j: usize, ld: usize) -> usize {
        match self {
            StorageOrder::RowMajor => i * ld + j,
            StorageOrder::ColumnMajor => j * ld + i,
        }
    }
}
