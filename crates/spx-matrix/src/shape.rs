use crate::error::{MatrixError, Result};
use std::fmt;

/// The shape of a matrix: number of rows and columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    rows: usize,
    columns: usize,
}

impl Shape {
    /// Create a new shape.
    pub fn new(rows: usize, columns: usize) -> Self {
        Shape { rows, columns }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Total number of elements.
    pub fn numel(&self) -> usize {
        self.rows * self.columns
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.columns
    }

    /// Returns `Ok(())` if `(i, j)` is a valid index for this shape.
    pub fn check_index(&self, i: usize, j: usize) -> Result<()> {
        if i >= self.rows || j >= self.columns {
            return Err(MatrixError::IndexOutOfRange {
                row: i,
                column: j,
                rows: self.rows,
                columns: self.columns,
            });
        }
        Ok(())
    }

    /// Compute the shape of the product `a * b`.
    ///
    /// The inner dimensions must agree: `a.columns() == b.rows()`.
    pub fn product_shape(a: Shape, b: Shape) -> Result<Shape> {
        if a.columns != b.rows {
            return Err(MatrixError::ProductMismatch {
                m: a.rows,
                k: a.columns,
                k2: b.rows,
                n: b.columns,
            });
        }
        Ok(Shape::new(a.rows, b.columns))
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.columns)
    }
}
