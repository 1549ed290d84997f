use crate::cursor::SparseColumn;
use crate::dense::{check_structure, DynamicMatrix};
use crate::element::Element;
use crate::error::{MatrixError, Result};
use crate::matrix::{AliasId, Matrix, SparseMatrix};
use crate::shape::Shape;
use crate::structure::Structure;

/// A compressed sparse column (CSC) matrix.
///
/// Column `j` owns the entries at positions `col_ptr[j]..col_ptr[j + 1]` of
/// `row_indices` / `values`; row indices within a column are strictly
/// increasing.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressedMatrix<T: Element> {
    shape: Shape,
    col_ptr: Vec<usize>,
    row_indices: Vec<usize>,
    values: Vec<T>,
    structure: Structure,
}

impl<T: Element> CompressedMatrix<T> {
    /// An empty (all-zero) matrix.
    pub fn zeros(rows: usize, columns: usize) -> Self {
        CompressedMatrix {
            shape: Shape::new(rows, columns),
            col_ptr: vec![0; columns + 1],
            row_indices: Vec::new(),
            values: Vec::new(),
            structure: Structure::GENERAL,
        }
    }

    /// Build from raw CSC arrays.
    ///
    /// # Errors
    /// Returns `InvalidSparse` if the arrays are inconsistent, a row index is
    /// out of range, or the indices of a column are not strictly increasing.
    pub fn from_parts(
        rows: usize,
        columns: usize,
        col_ptr: Vec<usize>,
        row_indices: Vec<usize>,
        values: Vec<T>,
    ) -> Result<Self> {
        if col_ptr.len() != columns + 1 {
            return Err(MatrixError::InvalidSparse(format!(
                "col_ptr has {} entries, expected {}",
                col_ptr.len(),
                columns + 1
            )));
        }
        if row_indices.len() != values.len() {
            return Err(MatrixError::InvalidSparse(format!(
                "{} row indices but {} values",
                row_indices.len(),
                values.len()
            )));
        }
        if col_ptr[0] != 0 || col_ptr[columns] != values.len() {
            return Err(MatrixError::InvalidSparse(format!(
                "col_ptr must span 0..{}",
                values.len()
            )));
        }
        for j in 0..columns {
            let (start, end) = (col_ptr[j], col_ptr[j + 1]);
            if start > end {
                return Err(MatrixError::InvalidSparse(format!(
                    "col_ptr decreases at column {}",
                    j
                )));
            }
            let column = &row_indices[start..end];
            if column.windows(2).any(|w| w[0] >= w[1]) {
                return Err(MatrixError::InvalidSparse(format!(
                    "row indices of column {} are not strictly increasing",
                    j
                )));
            }
            if let Some(&last) = column.last() {
                if last >= rows {
                    return Err(MatrixError::InvalidSparse(format!(
                        "row index {} out of range for {} rows",
                        last, rows
                    )));
                }
            }
        }
        Ok(CompressedMatrix {
            shape: Shape::new(rows, columns),
            col_ptr,
            row_indices,
            values,
            structure: Structure::GENERAL,
        })
    }

    /// Build from `(row, column, value)` triplets in any order.
    ///
    /// Duplicate coordinates are summed; explicit zeros are kept.
    pub fn from_triplets(rows: usize, columns: usize, triplets: &[(usize, usize, T)]) -> Result<Self> {
        let mut sorted = triplets.to_vec();
        for &(i, j, _) in &sorted {
            Shape::new(rows, columns).check_index(i, j)?;
        }
        sorted.sort_by_key(|&(i, j, _)| (j, i));

        let mut col_ptr = vec![0usize; columns + 1];
        let mut row_indices: Vec<usize> = Vec::with_capacity(sorted.len());
        let mut values: Vec<T> = Vec::with_capacity(sorted.len());
        let mut last: Option<(usize, usize)> = None;

        for (i, j, v) in sorted {
            if last == Some((i, j)) {
                if let Some(acc) = values.last_mut() {
                    *acc += v;
                }
                continue;
            }
            row_indices.push(i);
            values.push(v);
            col_ptr[j + 1] += 1;
            last = Some((i, j));
        }
        for j in 0..columns {
            col_ptr[j + 1] += col_ptr[j];
        }
        Self::from_parts(rows, columns, col_ptr, row_indices, values)
    }

    /// Compress a dense matrix, dropping zeros.
    pub fn from_dense<M: Matrix<Elem = T> + ?Sized>(m: &M) -> Self {
        let mut col_ptr = Vec::with_capacity(m.columns() + 1);
        let mut row_indices = Vec::new();
        let mut values = Vec::new();
        col_ptr.push(0);
        for j in 0..m.columns() {
            for i in 0..m.rows() {
                let v = m.get(i, j);
                if !v.is_zero() {
                    row_indices.push(i);
                    values.push(v);
                }
            }
            col_ptr.push(values.len());
        }
        CompressedMatrix {
            shape: Shape::new(m.rows(), m.columns()),
            col_ptr,
            row_indices,
            values,
            structure: m.structure(),
        }
    }

    /// Materialize any sparse matrix into compressed storage, keeping its
    /// declared structure.
    pub fn from_sparse<M: SparseMatrix<Elem = T> + ?Sized>(m: &M) -> Self {
        let mut col_ptr = Vec::with_capacity(m.columns() + 1);
        let mut row_indices = Vec::new();
        let mut values = Vec::new();
        col_ptr.push(0);
        for j in 0..m.columns() {
            let column = m.column(j);
            row_indices.extend_from_slice(column.indices());
            values.extend_from_slice(column.values());
            col_ptr.push(values.len());
        }
        CompressedMatrix {
            shape: Shape::new(m.rows(), m.columns()),
            col_ptr,
            row_indices,
            values,
            structure: m.structure(),
        }
    }

    /// Declare a structure after checking that the stored values satisfy it.
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

    /// Identity of this matrix's value storage.
    pub fn alias_id(&self) -> AliasId {
        AliasId::of(self.values.as_ptr())
    }

    /// Replace the contents with the nonzeros of a dense matrix of the same
    /// shape.
    ///
    /// # Panics
    /// Panics if the shapes differ.
    pub fn assign_dense(&mut self, dense: &DynamicMatrix<T>) {
        assert_eq!(self.shape, dense.shape(), "invalid sparse assignment shape");
        *self = Self::from_dense(dense);
        self.structure = Structure::GENERAL;
    }

    /// `self += other`, merging column by column.
    pub fn add_assign_sparse(&mut self, other: &CompressedMatrix<T>) {
        self.merge(other, |a, b| a + b, |b| b);
    }

    /// `self -= other`, merging column by column.
    pub fn sub_assign_sparse(&mut self, other: &CompressedMatrix<T>) {
        self.merge(other, |a, b| a - b, |b| T::zero() - b);
    }

    fn merge(
        &mut self,
        other: &CompressedMatrix<T>,
        both: impl Fn(T, T) -> T,
        only_other: impl Fn(T) -> T,
    ) {
        assert_eq!(self.shape, other.shape, "invalid sparse merge shape");

        let mut col_ptr = Vec::with_capacity(self.col_ptr.len());
        let mut row_indices = Vec::with_capacity(self.values.len() + other.values.len());
        let mut values = Vec::with_capacity(self.values.len() + other.values.len());
        col_ptr.push(0);

        for j in 0..self.shape.columns() {
            let a = self.column(j);
            let b = other.column(j);
            let (mut p, mut q) = (0, 0);
            while p < a.len() || q < b.len() {
                let ia = a.indices().get(p).copied().unwrap_or(usize::MAX);
                let ib = b.indices().get(q).copied().unwrap_or(usize::MAX);
                if ia == ib {
                    row_indices.push(ia);
                    values.push(both(a.values()[p], b.values()[q]));
                    p += 1;
                    q += 1;
                } else if ia < ib {
                    row_indices.push(ia);
                    values.push(a.values()[p]);
                    p += 1;
                } else {
                    row_indices.push(ib);
                    values.push(only_other(b.values()[q]));
                    q += 1;
                }
            }
            col_ptr.push(values.len());
        }

        self.col_ptr = col_ptr;
        self.row_indices = row_indices;
        self.values = values;
        self.structure = self.structure.meet(other.structure);
    }

    /// Expand into a row-major dense matrix.
    pub fn to_dense(&self) -> DynamicMatrix<T> {
        let mut out = DynamicMatrix::zeros(self.shape.rows(), self.shape.columns());
        for j in 0..self.shape.columns() {
            for (i, v) in self.column(j).iter() {
                out.set(i, j, v);
            }
        }
        out
    }
}

impl<T: Element> Matrix for CompressedMatrix<T> {
    type Elem = T;

    fn rows(&self) -> usize {
        self.shape.rows()
    }

    fn columns(&self) -> usize {
        self.shape.columns()
    }

    fn get(&self, i: usize, j: usize) -> T {
        debug_assert!(i < self.shape.rows());
        self.column(j).get(i)
    }

    fn structure(&self) -> Structure {
        self.structure
    }

    fn is_aliased(&self, alias: AliasId) -> bool {
        !self.values.is_empty() && self.alias_id() == alias
    }
}

impl<T: Element> SparseMatrix for CompressedMatrix<T> {
    #[inline]
    fn column(&self, j: usize) -> SparseColumn<'_, T> {
        let (start, end) = (self.col_ptr[j], self.col_ptr[j + 1]);
        SparseColumn::borrowed(&self.row_indices[start..end], &self.values[start..end])
    }

    fn nonzeros(&self) -> usize {
        self.values.len()
    }
}
