use std::ops::{Index, IndexMut, Range};

use crate::element::Element;
use crate::error::{MatrixError, Result};
use crate::matrix::{AliasId, Matrix};
use crate::shape::Shape;
use crate::storage::StorageOrder;
use crate::structure::Structure;

/// Byte alignment reported by `is_aligned`.
const ALIGNMENT: usize = 16;

/// A dense matrix with contiguous storage in either row-major or
/// column-major order.
///
/// Row-major is the default and the layout expected of the left operand of a
/// dense x sparse product; column-major matrices are supported as targets.
#[derive(Debug, Clone)]
pub struct DynamicMatrix<T: Element> {
    data: Vec<T>,
    shape: Shape,
    order: StorageOrder,
    structure: Structure,
}

impl<T: Element> DynamicMatrix<T> {
    /// Create a zero-filled row-major matrix.
    pub fn zeros(rows: usize, columns: usize) -> Self {
        Self::zeros_with_order(rows, columns, StorageOrder::RowMajor)
    }

    /// Create a zero-filled matrix with the given storage order.
    pub fn zeros_with_order(rows: usize, columns: usize, order: StorageOrder) -> Self {
        DynamicMatrix {
            data: vec![T::zero(); rows * columns],
            shape: Shape::new(rows, columns),
            order,
            structure: Structure::GENERAL,
        }
    }

    /// Create a row-major matrix from row-major data.
    pub fn from_vec(rows: usize, columns: usize, data: Vec<T>) -> Result<Self> {
        Self::from_vec_with_order(rows, columns, data, StorageOrder::RowMajor)
    }

    /// Create a matrix from data laid out in `order`.
    pub fn from_vec_with_order(
        rows: usize,
        columns: usize,
        data: Vec<T>,
        order: StorageOrder,
    ) -> Result<Self> {
        let shape = Shape::new(rows, columns);
        if data.len() != shape.numel() {
            return Err(MatrixError::Other(format!(
                "data length {} does not match shape {} (numel={})",
                data.len(),
                shape,
                shape.numel()
            )));
        }
        Ok(DynamicMatrix {
            data,
            shape,
            order,
            structure: Structure::GENERAL,
        })
    }

    /// Create a row-major matrix from a slice of equally long rows.
    pub fn from_rows<R: AsRef<[T]>>(rows: &[R]) -> Result<Self> {
        let columns = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        let mut data = Vec::with_capacity(rows.len() * columns);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != columns {
                return Err(MatrixError::ShapeMismatch {
                    expected_rows: i + 1,
                    expected_columns: columns,
                    rows: i + 1,
                    columns: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Self::from_vec(rows.len(), columns, data)
    }

    /// Create a row-major matrix with element (i, j) set to `f(i, j)`.
    pub fn from_fn(rows: usize, columns: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(rows * columns);
        for i in 0..rows {
            for j in 0..columns {
                data.push(f(i, j));
            }
        }
        DynamicMatrix {
            data,
            shape: Shape::new(rows, columns),
            order: StorageOrder::RowMajor,
            structure: Structure::GENERAL,
        }
    }

    /// Materialize any matrix into row-major storage, keeping its declared
    /// structure.
    pub fn from_matrix<M: Matrix<Elem = T> + ?Sized>(m: &M) -> Self {
        let mut out = Self::from_fn(m.rows(), m.columns(), |i, j| m.get(i, j));
        out.structure = m.structure();
        out
    }

    /// Declare a structure for this matrix after checking that the stored
    /// values satisfy it.
    ///
    /// # Errors
    /// `NotSquare` for a non-general structure on a non-square matrix,
    /// `StructureViolation` for the first offending element.
    pub fn with_structure(mut self, structure: Structure) -> Result<Self> {
        check_structure(&self, structure)?;
        self.structure = structure;
        Ok(self)
    }

    /// Drop any declared structure.
    pub fn clear_structure(&mut self) {
        self.structure = Structure::GENERAL;
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn order(&self) -> StorageOrder {
        self.order
    }

    /// The raw storage in `order()` layout.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Identity of this matrix's storage.
    pub fn alias_id(&self) -> AliasId {
        AliasId::of(self.data.as_ptr())
    }

    #[inline]
    fn offset(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < self.shape.rows() && j < self.shape.columns());
        self.order
            .offset(i, j, self.order.leading_dimension(self.shape))
    }

    /// Overwrite element (i, j).
    ///
    /// # Panics
    /// Panics if the index is out of range.
    pub fn set(&mut self, i: usize, j: usize, value: T) {
        let off = self.offset(i, j);
        self.data[off] = value;
    }

    /// Reset every element to zero.
    pub fn reset(&mut self) {
        self.data.fill(T::zero());
    }

    /// Mutable window over the whole matrix.
    pub fn view_mut(&mut self) -> DenseViewMut<'_, T> {
        let ld = self.order.leading_dimension(self.shape);
        DenseViewMut {
            data: &mut self.data,
            rows: 0..self.shape.rows(),
            columns: 0..self.shape.columns(),
            ld,
            order: self.order,
        }
    }

    /// Copy of this matrix stored in `order`.
    pub fn to_order(&self, order: StorageOrder) -> Self {
        if order == self.order {
            return self.clone();
        }
        let mut out = Self::zeros_with_order(self.shape.rows(), self.shape.columns(), order);
        for i in 0..self.shape.rows() {
            for j in 0..self.shape.columns() {
                out.set(i, j, self.get(i, j));
            }
        }
        out.structure = self.structure;
        out
    }

    /// Dense matrix product `self * other` (reference triple loop).
    pub fn matmul(&self, other: &DynamicMatrix<T>) -> Result<DynamicMatrix<T>> {
        let out = Shape::product_shape(self.shape, other.shape)?;
        let (m, k, n) = (out.rows(), self.shape.columns(), out.columns());

        let mut c = Vec::with_capacity(m * n);
        for i in 0..m {
            for j in 0..n {
                let mut sum = T::zero();
                for p in 0..k {
                    sum += self.get(i, p) * other.get(p, j);
                }
                c.push(sum);
            }
        }
        DynamicMatrix::from_vec(m, n, c)
    }
}

/// Check that the values of `m` satisfy `structure`.
pub(crate) fn check_structure<M: Matrix + ?Sized>(m: &M, structure: Structure) -> Result<()> {
    if structure.is_general() {
        return Ok(());
    }
    if !m.shape().is_square() {
        return Err(MatrixError::NotSquare {
            structure,
            rows: m.rows(),
            columns: m.columns(),
        });
    }
    for i in 0..m.rows() {
        for j in 0..m.columns() {
            let v = m.get(i, j);
            let ok = if i == j && structure.has_unit_diagonal() {
                v == M::Elem::one()
            } else if structure.allows(i, j) {
                !structure.is_symmetric() || j <= i || v == m.get(j, i)
            } else {
                v.is_zero()
            };
            if !ok {
                return Err(MatrixError::StructureViolation {
                    structure,
                    row: i,
                    column: j,
                });
            }
        }
    }
    Ok(())
}

impl<T: Element> Matrix for DynamicMatrix<T> {
    type Elem = T;

    fn rows(&self) -> usize {
        self.shape.rows()
    }

    fn columns(&self) -> usize {
        self.shape.columns()
    }

    #[inline]
    fn get(&self, i: usize, j: usize) -> T {
        self.data[self.offset(i, j)]
    }

    fn structure(&self) -> Structure {
        self.structure
    }

    fn is_aliased(&self, alias: AliasId) -> bool {
        !self.data.is_empty() && self.alias_id() == alias
    }

    fn is_aligned(&self) -> bool {
        self.data.as_ptr() as usize % ALIGNMENT == 0
    }
}

impl<T: Element> PartialEq for DynamicMatrix<T> {
    fn eq(&self, other: &Self) -> bool {
        if self.shape != other.shape {
            return false;
        }
        if self.order == other.order {
            return self.data == other.data;
        }
        (0..self.shape.rows())
            .all(|i| (0..self.shape.columns()).all(|j| self.get(i, j) == other.get(i, j)))
    }
}

impl<T: Element> Index<(usize, usize)> for DynamicMatrix<T> {
    type Output = T;

    fn index(&self, (i, j): (usize, usize)) -> &T {
        &self.data[self.offset(i, j)]
    }
}

impl<T: Element> IndexMut<(usize, usize)> for DynamicMatrix<T> {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut T {
        let off = self.offset(i, j);
        &mut self.data[off]
    }
}

/// Mutable window over a contiguous band of a dense matrix.
///
/// A band always spans the full extent of the minor dimension: whole rows of
/// a row-major matrix or whole columns of a column-major one. Indices passed
/// to the accessors are global matrix indices.
#[derive(Debug)]
pub struct DenseViewMut<'a, T: Element> {
    data: &'a mut [T],
    rows: Range<usize>,
    columns: Range<usize>,
    ld: usize,
    order: StorageOrder,
}

impl<'a, T: Element> DenseViewMut<'a, T> {
    /// Global row indices covered by this window.
    pub fn rows(&self) -> Range<usize> {
        self.rows.clone()
    }

    /// Global column indices covered by this window.
    pub fn columns(&self) -> Range<usize> {
        self.columns.clone()
    }

    pub fn order(&self) -> StorageOrder {
        self.order
    }

    #[inline]
    fn offset(&self, i: usize, j: usize) -> usize {
        debug_assert!(self.rows.contains(&i) && self.columns.contains(&j));
        self.order
            .offset(i - self.rows.start, j - self.columns.start, self.ld)
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> T {
        self.data[self.offset(i, j)]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: T) {
        let off = self.offset(i, j);
        self.data[off] = value;
    }

    #[inline]
    pub fn get_mut(&mut self, i: usize, j: usize) -> &mut T {
        let off = self.offset(i, j);
        &mut self.data[off]
    }

    /// Reset every element in the window to zero.
    pub fn reset(&mut self) {
        self.data.fill(T::zero());
    }

    /// Split into at most `n` disjoint bands along the major dimension.
    pub fn split_bands(self, n: usize) -> Vec<DenseViewMut<'a, T>> {
        let major = match self.order {
            StorageOrder::RowMajor => self.rows.clone(),
            StorageOrder::ColumnMajor => self.columns.clone(),
        };
        if n <= 1 || major.len() <= 1 || self.data.is_empty() {
            return vec![self];
        }
        let per_band = major.len().div_ceil(n);
        let DenseViewMut {
            data,
            rows,
            columns,
            ld,
            order,
        } = self;

        data.chunks_mut(per_band * ld)
            .enumerate()
            .map(|(b, chunk)| {
                let start = major.start + b * per_band;
                let end = (start + per_band).min(major.end);
                let (rows, columns) = match order {
                    StorageOrder::RowMajor => (start..end, columns.clone()),
                    StorageOrder::ColumnMajor => (rows.clone(), start..end),
                };
                DenseViewMut {
                    data: chunk,
                    rows,
                    columns,
                    ld,
                    order,
                }
            })
            .collect()
    }
}
