use crate::cursor::SparseColumn;
use crate::matrix::{AliasId, Matrix, SparseMatrix};
use crate::structure::Structure;

/// Transpose of a column-major sparse matrix, read straight from the inner
/// matrix's storage.
///
/// This is a view, not a pending computation. A column of the transpose is a
/// row of the inner matrix though, and building it searches every inner
/// column, so repeated column reads are expensive and the product machinery
/// materializes a `Transposed` operand before running a kernel.
#[derive(Debug, Clone)]
pub struct Transposed<M> {
    inner: M,
}

impl<M: SparseMatrix> Transposed<M> {
    pub fn new(inner: M) -> Self {
        Transposed { inner }
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }
}

impl<M: SparseMatrix> Matrix for Transposed<M> {
    type Elem = M::Elem;

    fn rows(&self) -> usize {
        self.inner.columns()
    }

    fn columns(&self) -> usize {
        self.inner.rows()
    }

    #[inline]
    fn get(&self, i: usize, j: usize) -> M::Elem {
        self.inner.get(j, i)
    }

    fn structure(&self) -> Structure {
        self.inner.structure().transposed()
    }

    fn is_aliased(&self, alias: AliasId) -> bool {
        self.inner.is_aliased(alias)
    }

    fn smp_assignable(&self) -> bool {
        self.inner.smp_assignable()
    }

    fn requires_evaluation(&self) -> bool {
        true
    }
}

impl<M: SparseMatrix> SparseMatrix for Transposed<M> {
    /// Row `j` of the inner matrix.
    fn column(&self, j: usize) -> SparseColumn<'_, M::Elem> {
        let mut indices = Vec::new();
        let mut values = Vec::new();
        for c in 0..self.inner.columns() {
            let column = self.inner.column(c);
            let pos = column.lower_bound(j);
            if column.indices().get(pos) == Some(&j) {
                indices.push(c);
                values.push(column.values()[pos]);
            }
        }
        SparseColumn::owned(indices, values)
    }

    fn nonzeros(&self) -> usize {
        self.inner.nonzeros()
    }
}
