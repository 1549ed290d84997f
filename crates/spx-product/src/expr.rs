use spx_matrix::{AliasId, DynamicMatrix, Element, Matrix, Shape, SparseMatrix, Structure};

use crate::analysis::requires_evaluation;
use crate::config::ProductConfig;
use crate::dispatch;
use crate::error::{ProductError, Result};
use crate::kernels::{column_span, row_span};

/// Deferred product of a dense row-major matrix and a column-major sparse
/// matrix.
///
/// The node holds its operands as given: a reference for stored matrices, a
/// value for expressions such as [`spx_matrix::Scaled`] or another product.
/// Nothing is computed until the node is assigned into a target or an element
/// is read.
#[derive(Debug, Clone)]
pub struct DMatTSMatMultExpr<L, R> {
    lhs: L,
    rhs: R,
    config: ProductConfig,
}

/// Multiply a dense matrix by a column-major sparse matrix.
///
/// # Errors
/// Returns `MatrixError::ProductMismatch` if `lhs.columns() != rhs.rows()`.
pub fn product<L, R>(lhs: L, rhs: R) -> Result<DMatTSMatMultExpr<L, R>>
where
    L: Matrix,
    R: SparseMatrix<Elem = L::Elem>,
{
    DMatTSMatMultExpr::new(lhs, rhs)
}

impl<L, R> DMatTSMatMultExpr<L, R>
where
    L: Matrix,
    R: SparseMatrix<Elem = L::Elem>,
{
    /// Build the node with the default configuration.
    ///
    /// # Errors
    /// Returns `MatrixError::ProductMismatch` if `lhs.columns() != rhs.rows()`.
    pub fn new(lhs: L, rhs: R) -> Result<Self> {
        Shape::product_shape(lhs.shape(), rhs.shape())?;
        Ok(DMatTSMatMultExpr {
            lhs,
            rhs,
            config: ProductConfig::default(),
        })
    }

    pub fn with_config(mut self, config: ProductConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ProductConfig {
        &self.config
    }

    pub fn left_operand(&self) -> &L {
        &self.lhs
    }

    pub fn right_operand(&self) -> &R {
        &self.rhs
    }

    /// Returns true if either operand may read from the storage `alias`.
    pub fn can_alias(&self, alias: AliasId) -> bool {
        self.lhs.is_aliased(alias) || self.rhs.is_aliased(alias)
    }

    /// Returns true if the product can be assigned in parallel: both operands
    /// are safe to share, neither needs evaluation and the row count exceeds
    /// the configured threshold.
    pub fn can_smp_assign(&self) -> bool {
        self.smp_assignable() && self.rows() > self.config.smp_threshold
    }

    /// Realize the product into a row-major dense matrix.
    pub fn evaluate(&self) -> DynamicMatrix<L::Elem>
    where
        L: Sync,
        R: Sync,
    {
        let mut out = DynamicMatrix::zeros(self.rows(), self.columns());
        dispatch::assign(&mut out, self);
        out
    }

    /// `(A * B) * x` computed as `A * (B * x)`.
    ///
    /// # Errors
    /// Returns `ProductError::VectorLength` if `x.len() != columns()`.
    pub fn mul_vector(&self, x: &[L::Elem]) -> Result<Vec<L::Elem>> {
        check_length(self.columns(), x.len())?;

        let mut y = vec![L::Elem::zero(); self.rhs.rows()];
        for (j, &xj) in x.iter().enumerate() {
            for (k, v) in self.rhs.column(j).iter() {
                y[k] += v * xj;
            }
        }

        let structure = self.lhs.structure();
        let z = (0..self.rows())
            .map(|i| {
                row_span(structure, i, self.lhs.columns())
                    .fold(L::Elem::zero(), |acc, k| acc + self.lhs.get(i, k) * y[k])
            })
            .collect();
        Ok(z)
    }

    /// `x^T * (A * B)` computed as `(x^T * A) * B`.
    ///
    /// # Errors
    /// Returns `ProductError::VectorLength` if `x.len() != rows()`.
    pub fn vector_mul(&self, x: &[L::Elem]) -> Result<Vec<L::Elem>> {
        check_length(self.rows(), x.len())?;

        let structure = self.lhs.structure();
        let mut w = vec![L::Elem::zero(); self.lhs.columns()];
        for (i, &xi) in x.iter().enumerate() {
            for k in row_span(structure, i, self.lhs.columns()) {
                w[k] += xi * self.lhs.get(i, k);
            }
        }

        let z = (0..self.columns())
            .map(|j| {
                self.rhs
                    .column(j)
                    .iter()
                    .fold(L::Elem::zero(), |acc, (k, v)| acc + w[k] * v)
            })
            .collect();
        Ok(z)
    }
}

fn check_length(expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(ProductError::VectorLength { expected, got });
    }
    Ok(())
}

impl<L, R> Matrix for DMatTSMatMultExpr<L, R>
where
    L: Matrix,
    R: SparseMatrix<Elem = L::Elem>,
{
    type Elem = L::Elem;

    fn rows(&self) -> usize {
        self.lhs.rows()
    }

    fn columns(&self) -> usize {
        self.rhs.columns()
    }

    /// Element (i, j) of the product, skipping terms that the operands'
    /// structure makes zero.
    fn get(&self, i: usize, j: usize) -> L::Elem {
        debug_assert!(i < self.rows() && j < self.columns());
        let (ls, rs) = (self.lhs.structure(), self.rhs.structure());

        if i == j && Structure::product(ls, rs).has_unit_diagonal() {
            return L::Elem::one();
        }
        if ls.is_diagonal() {
            return self.lhs.get(i, i) * self.rhs.get(i, j);
        }
        if rs.is_diagonal() {
            return self.lhs.get(i, j) * self.rhs.get(j, j);
        }

        let column = self.rhs.column(j);
        let range = if ls.is_triangular() || rs.is_triangular() {
            let inner = self.lhs.columns();
            let row = row_span(ls, i, inner);
            let col = column_span(rs, j, inner);
            let (begin, end) = (row.start.max(col.start), row.end.min(col.end));
            if begin >= end {
                return L::Elem::zero();
            }
            column.lower_bound(begin)..column.lower_bound(end)
        } else {
            0..column.len()
        };

        column
            .entries(range)
            .fold(L::Elem::zero(), |acc, (k, v)| acc + self.lhs.get(i, k) * v)
    }

    fn structure(&self) -> Structure {
        Structure::product(self.lhs.structure(), self.rhs.structure())
    }

    fn is_aliased(&self, alias: AliasId) -> bool {
        self.can_alias(alias)
    }

    /// Only the left operand's layout matters for the product's access
    /// pattern.
    fn is_aligned(&self) -> bool {
        self.lhs.is_aligned()
    }

    fn smp_assignable(&self) -> bool {
        !requires_evaluation(&self.lhs)
            && self.lhs.smp_assignable()
            && !requires_evaluation(&self.rhs)
            && self.rhs.smp_assignable()
    }

    fn is_computation(&self) -> bool {
        true
    }
}
