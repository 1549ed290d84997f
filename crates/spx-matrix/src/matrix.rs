use crate::cursor::SparseColumn;
use crate::element::Element;
use crate::error::Result;
use crate::shape::Shape;
use crate::structure::Structure;

/// Identity of a matrix's storage, used for alias detection.
///
/// Two matrices alias if they share the same underlying buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AliasId(usize);

impl AliasId {
    /// Identity of the buffer starting at `ptr`.
    pub fn of<T>(ptr: *const T) -> Self {
        AliasId(ptr as usize)
    }
}

/// Read access to a matrix operand.
///
/// `get` is the unchecked element access: callers guarantee the index is in
/// range and implementations may panic otherwise. `at` is the checked
/// variant.
pub trait Matrix {
    type Elem: Element;

    fn rows(&self) -> usize;

    fn columns(&self) -> usize;

    /// Element at (i, j).
    fn get(&self, i: usize, j: usize) -> Self::Elem;

    /// Declared structural properties.
    fn structure(&self) -> Structure {
        Structure::GENERAL
    }

    /// Returns true if this matrix reads from the storage identified by `alias`.
    fn is_aliased(&self, alias: AliasId) -> bool;

    /// Returns true if the storage is aligned for vectorized access.
    fn is_aligned(&self) -> bool {
        false
    }

    /// Returns true if this matrix can be read concurrently from several
    /// threads during a parallel assignment.
    fn smp_assignable(&self) -> bool {
        true
    }

    /// Returns true if this matrix is a pending computation rather than
    /// stored data.
    fn is_computation(&self) -> bool {
        false
    }

    /// Returns true if element-wise re-reading is expensive enough that the
    /// matrix should be materialized before use.
    fn requires_evaluation(&self) -> bool {
        false
    }

    fn shape(&self) -> Shape {
        Shape::new(self.rows(), self.columns())
    }

    /// Checked element access.
    ///
    /// # Errors
    /// Returns `MatrixError::IndexOutOfRange` if `i >= rows()` or `j >= columns()`.
    fn at(&self, i: usize, j: usize) -> Result<Self::Elem> {
        self.shape().check_index(i, j)?;
        Ok(self.get(i, j))
    }
}

/// A column-major sparse matrix operand.
///
/// Each column exposes its nonzero entries in strictly increasing row order.
pub trait SparseMatrix: Matrix {
    /// The nonzero entries of column `j`.
    fn column(&self, j: usize) -> SparseColumn<'_, Self::Elem>;

    /// Total number of stored entries.
    fn nonzeros(&self) -> usize {
        (0..self.columns()).map(|j| self.column(j).len()).sum()
    }

    /// Position within column `j` of the first entry with row index >= `i`.
    fn lower_bound(&self, i: usize, j: usize) -> usize {
        self.column(j).lower_bound(i)
    }

    /// Position within column `j` of the first entry with row index > `i`.
    fn upper_bound(&self, i: usize, j: usize) -> usize {
        self.column(j).upper_bound(i)
    }
}

impl<M: Matrix + ?Sized> Matrix for &M {
    type Elem = M::Elem;

    fn rows(&self) -> usize {
        (**self).rows()
    }

    fn columns(&self) -> usize {
        (**self).columns()
    }

    #[inline]
    fn get(&self, i: usize, j: usize) -> Self::Elem {
        (**self).get(i, j)
    }

    fn structure(&self) -> Structure {
        (**self).structure()
    }

    fn is_aliased(&self, alias: AliasId) -> bool {
        (**self).is_aliased(alias)
    }

    fn is_aligned(&self) -> bool {
        (**self).is_aligned()
    }

    fn smp_assignable(&self) -> bool {
        (**self).smp_assignable()
    }

    fn is_computation(&self) -> bool {
        (**self).is_computation()
    }

    fn requires_evaluation(&self) -> bool {
        (**self).requires_evaluation()
    }
}

impl<M: SparseMatrix + ?Sized> SparseMatrix for &M {
    #[inline]
    fn column(&self, j: usize) -> SparseColumn<'_, Self::Elem> {
        (**self).column(j)
    }

    fn nonzeros(&self) -> usize {
        (**self).nonzeros()
    }
}
