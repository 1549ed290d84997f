use crate::cursor::SparseColumn;
use crate::matrix::{AliasId, Matrix, SparseMatrix};
use crate::structure::Structure;

/// Lazy scalar multiple `inner * scalar`.
///
/// Nothing is computed until elements are read, so every access pays for the
/// multiplication again. For sparse operands each column read allocates a
/// fresh column, which is why the product machinery always materializes a
/// `Scaled` operand before running a kernel.
#[derive(Debug, Clone)]
pub struct Scaled<M: Matrix> {
    inner: M,
    scalar: M::Elem,
}

impl<M: Matrix> Scaled<M> {
    pub fn new(inner: M, scalar: M::Elem) -> Self {
        Scaled { inner, scalar }
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }

    pub fn scalar(&self) -> M::Elem {
        self.scalar
    }
}

impl<M: Matrix> Matrix for Scaled<M> {
    type Elem = M::Elem;

    fn rows(&self) -> usize {
        self.inner.rows()
    }

    fn columns(&self) -> usize {
        self.inner.columns()
    }

    #[inline]
    fn get(&self, i: usize, j: usize) -> M::Elem {
        self.inner.get(i, j) * self.scalar
    }

    fn structure(&self) -> Structure {
        self.inner.structure().scaled()
    }

    fn is_aliased(&self, alias: AliasId) -> bool {
        self.inner.is_aliased(alias)
    }

    fn is_aligned(&self) -> bool {
        self.inner.is_aligned()
    }

    fn smp_assignable(&self) -> bool {
        self.inner.smp_assignable()
    }

    fn is_computation(&self) -> bool {
        true
    }
}

impl<M: SparseMatrix> SparseMatrix for Scaled<M> {
    fn column(&self, j: usize) -> SparseColumn<'_, M::Elem> {
        let column = self.inner.column(j);
        let values = column.values().iter().map(|&v| v * self.scalar).collect();
        SparseColumn::owned(column.indices().to_vec(), values)
    }

    fn nonzeros(&self) -> usize {
        self.inner.nonzeros()
    }
}
