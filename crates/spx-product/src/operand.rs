use spx_matrix::{
    AliasId, CompressedMatrix, DynamicMatrix, Matrix, SparseColumn, SparseMatrix, Structure,
};

use crate::analysis::requires_evaluation;

/// An operand as seen by a kernel: either read through the caller's
/// reference, or a temporary materialized for the duration of one assignment.
#[derive(Debug)]
pub enum Operand<'a, M, O> {
    Borrowed(&'a M),
    Owned(O),
}

/// A dense left operand, materialized into a row-major `DynamicMatrix` when
/// needed.
pub type DenseOperand<'a, M> = Operand<'a, M, DynamicMatrix<<M as Matrix>::Elem>>;

/// A sparse right operand, materialized into a `CompressedMatrix` when needed.
pub type SparseOperand<'a, M> = Operand<'a, M, CompressedMatrix<<M as Matrix>::Elem>>;

impl<'a, M: Matrix> DenseOperand<'a, M> {
    /// Borrow `m`, or copy it into a temporary if it requires evaluation.
    pub fn dense(m: &'a M) -> Self {
        if requires_evaluation(m) {
            Operand::Owned(DynamicMatrix::from_matrix(m))
        } else {
            Operand::Borrowed(m)
        }
    }
}

impl<'a, M: SparseMatrix> SparseOperand<'a, M> {
    /// Borrow `m`, or copy it into a temporary if it requires evaluation.
    pub fn sparse(m: &'a M) -> Self {
        if requires_evaluation(m) {
            Operand::Owned(CompressedMatrix::from_sparse(m))
        } else {
            Operand::Borrowed(m)
        }
    }
}

macro_rules! forward {
    ($self:ident, $m:ident => $e:expr) => {
        match $self {
            Operand::Borrowed($m) => $e,
            Operand::Owned($m) => $e,
        }
    };
}

impl<M, O> Matrix for Operand<'_, M, O>
where
    M: Matrix,
    O: Matrix<Elem = M::Elem>,
{
    type Elem = M::Elem;

    fn rows(&self) -> usize {
        forward!(self, m => m.rows())
    }

    fn columns(&self) -> usize {
        forward!(self, m => m.columns())
    }

    #[inline]
    fn get(&self, i: usize, j: usize) -> M::Elem {
        forward!(self, m => m.get(i, j))
    }

    fn structure(&self) -> Structure {
        forward!(self, m => m.structure())
    }

    fn is_aliased(&self, alias: AliasId) -> bool {
        forward!(self, m => m.is_aliased(alias))
    }

    fn is_aligned(&self) -> bool {
        forward!(self, m => m.is_aligned())
    }

    fn smp_assignable(&self) -> bool {
        forward!(self, m => m.smp_assignable())
    }

    fn is_computation(&self) -> bool {
        forward!(self, m => m.is_computation())
    }

    fn requires_evaluation(&self) -> bool {
        forward!(self, m => m.requires_evaluation())
    }
}

impl<M, O> SparseMatrix for Operand<'_, M, O>
where
    M: SparseMatrix,
    O: SparseMatrix<Elem = M::Elem>,
{
    #[inline]
    fn column(&self, j: usize) -> SparseColumn<'_, M::Elem> {
        forward!(self, m => m.column(j))
    }

    fn nonzeros(&self) -> usize {
        forward!(self, m => m.nonzeros())
    }
}
