//! Routing of product assignments to kernels.
//!
//! Every call analyzes the operands once, materializes the ones that need
//! it, picks one [`AssignPath`] and runs it to completion. Nothing is kept
//! between calls.

use log::{debug, trace};
use spx_matrix::{
    CompressedMatrix, DenseViewMut, DynamicMatrix, Element, Matrix, Shape, SparseMatrix,
};

use crate::analysis::{Decision, KernelKind, SymmetricOperand};
use crate::error::{ProductError, Result};
use crate::expr::DMatTSMatMultExpr;
use crate::kernels::{default, optimized, symmetric, Add, Sub};
use crate::operand::Operand;
use crate::smp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    /// `C = A * B`
    Assign,
    /// `C += A * B`
    AddAssign,
    /// `C -= A * B`
    SubAssign,
    /// `C = C * (A * B)`
    MulAssign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Dense,
    Sparse,
}

/// The one path an assignment takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignPath {
    /// Traversal that exploits a symmetric left or right operand. Writes
    /// straight into a dense target, otherwise through a dense temporary.
    SymmetryRewrite,
    /// Selected kernel writing straight into a dense target.
    SerialDense,
    /// Selected kernel into a dense temporary, then folded into the target.
    /// Used for sparse targets and for multiply-assignment.
    SerialViaDense,
    /// Selected kernel on disjoint bands of a dense target.
    ParallelDense,
    /// Parallel kernel into a dense temporary, then folded into the target.
    ParallelViaDense,
}

/// Pick the assignment path.
///
/// `decision` must describe the operands as the kernel will read them, i.e.
/// after any materialization. `parallel` is true for the `smp_*` entry points.
pub fn select_path(
    op: AssignOp,
    target: TargetKind,
    decision: &Decision,
    parallel: bool,
) -> AssignPath {
    if decision.exploit_symmetry.is_some() {
        return AssignPath::SymmetryRewrite;
    }
    let in_parallel = parallel && decision.smp_eligible();
    let direct = target == TargetKind::Dense && op != AssignOp::MulAssign;
    match (direct, in_parallel) {
        (true, false) => AssignPath::SerialDense,
        (true, true) => AssignPath::ParallelDense,
        (false, false) => AssignPath::SerialViaDense,
        (false, true) => AssignPath::ParallelViaDense,
    }
}

/// A container a product can be assigned into.
pub trait AssignTarget {
    type Elem: Element;

    const KIND: TargetKind;

    fn target_shape(&self) -> Shape;

    /// Mutable access for kernels writing in place; `None` for targets that
    /// are always assigned through a dense temporary.
    fn dense_view(&mut self) -> Option<DenseViewMut<'_, Self::Elem>>;

    /// `self = result`
    fn assign_dense(&mut self, result: &DynamicMatrix<Self::Elem>);

    /// `self += result`
    fn add_dense(&mut self, result: &DynamicMatrix<Self::Elem>);

    /// `self -= result`
    fn sub_dense(&mut self, result: &DynamicMatrix<Self::Elem>);

    /// `self = self * result`
    fn mul_dense(&mut self, result: &DynamicMatrix<Self::Elem>) -> Result<()>;

    /// Drop any declared structure once the values have been overwritten.
    fn clear_structure(&mut self);
}

impl<T: Element> AssignTarget for DynamicMatrix<T> {
    type Elem = T;

    const KIND: TargetKind = TargetKind::Dense;

    fn target_shape(&self) -> Shape {
        self.shape()
    }

    fn dense_view(&mut self) -> Option<DenseViewMut<'_, T>> {
        Some(self.view_mut())
    }

    fn assign_dense(&mut self, result: &DynamicMatrix<T>) {
        assert_eq!(self.shape(), result.shape(), "invalid dense assignment shape");
        *self = result.to_order(self.order());
    }

    fn add_dense(&mut self, result: &DynamicMatrix<T>) {
        assert_eq!(self.shape(), result.shape(), "invalid dense addition shape");
        for i in 0..result.rows() {
            for j in 0..result.columns() {
                self[(i, j)] += result.get(i, j);
            }
        }
    }

    fn sub_dense(&mut self, result: &DynamicMatrix<T>) {
        assert_eq!(self.shape(), result.shape(), "invalid dense subtraction shape");
        for i in 0..result.rows() {
            for j in 0..result.columns() {
                self[(i, j)] -= result.get(i, j);
            }
        }
    }

    fn mul_dense(&mut self, result: &DynamicMatrix<T>) -> Result<()> {
        *self = self.matmul(result)?.to_order(self.order());
        Ok(())
    }

    fn clear_structure(&mut self) {
        DynamicMatrix::clear_structure(self);
    }
}

impl<T: Element> AssignTarget for CompressedMatrix<T> {
    type Elem = T;

    const KIND: TargetKind = TargetKind::Sparse;

    fn target_shape(&self) -> Shape {
        self.shape()
    }

    fn dense_view(&mut self) -> Option<DenseViewMut<'_, T>> {
        None
    }

    fn assign_dense(&mut self, result: &DynamicMatrix<T>) {
        CompressedMatrix::assign_dense(self, result);
    }

    fn add_dense(&mut self, result: &DynamicMatrix<T>) {
        self.add_assign_sparse(&CompressedMatrix::from_dense(result));
    }

    fn sub_dense(&mut self, result: &DynamicMatrix<T>) {
        self.sub_assign_sparse(&CompressedMatrix::from_dense(result));
    }

    fn mul_dense(&mut self, result: &DynamicMatrix<T>) -> Result<()> {
        let product = self.to_dense().matmul(result)?;
        CompressedMatrix::assign_dense(self, &product);
        Ok(())
    }

    fn clear_structure(&mut self) {
        CompressedMatrix::clear_structure(self);
    }
}

/// `target = expr`
///
/// # Panics
/// Panics if the target's shape differs from the product's.
pub fn assign<C, L, R>(target: &mut C, expr: &DMatTSMatMultExpr<L, R>)
where
    C: AssignTarget<Elem = L::Elem>,
    L: Matrix + Sync,
    R: SparseMatrix<Elem = L::Elem> + Sync,
{
    update_target(target, expr, AssignOp::Assign, false);
}

/// `target += expr`
///
/// # Panics
/// Panics if the target's shape differs from the product's.
pub fn add_assign<C, L, R>(target: &mut C, expr: &DMatTSMatMultExpr<L, R>)
where
    C: AssignTarget<Elem = L::Elem>,
    L: Matrix + Sync,
    R: SparseMatrix<Elem = L::Elem> + Sync,
{
    update_target(target, expr, AssignOp::AddAssign, false);
}

/// `target -= expr`
///
/// # Panics
/// Panics if the target's shape differs from the product's.
pub fn sub_assign<C, L, R>(target: &mut C, expr: &DMatTSMatMultExpr<L, R>)
where
    C: AssignTarget<Elem = L::Elem>,
    L: Matrix + Sync,
    R: SparseMatrix<Elem = L::Elem> + Sync,
{
    update_target(target, expr, AssignOp::SubAssign, false);
}

/// `target = target * expr`
///
/// # Errors
/// Returns `ProductError::MultiplyAssignShape` unless the product is square
/// with as many rows as the target has columns.
pub fn mul_assign<C, L, R>(target: &mut C, expr: &DMatTSMatMultExpr<L, R>) -> Result<()>
where
    C: AssignTarget<Elem = L::Elem>,
    L: Matrix + Sync,
    R: SparseMatrix<Elem = L::Elem> + Sync,
{
    multiply_target(target, expr, false)
}

/// Parallel `target = expr`.
///
/// Runs on the rayon thread pool if the product is eligible once its
/// operands are materialized, serially otherwise.
pub fn smp_assign<C, L, R>(target: &mut C, expr: &DMatTSMatMultExpr<L, R>)
where
    C: AssignTarget<Elem = L::Elem>,
    L: Matrix + Sync,
    R: SparseMatrix<Elem = L::Elem> + Sync,
{
    update_target(target, expr, AssignOp::Assign, true);
}

/// Parallel `target += expr`.
pub fn smp_add_assign<C, L, R>(target: &mut C, expr: &DMatTSMatMultExpr<L, R>)
where
    C: AssignTarget<Elem = L::Elem>,
    L: Matrix + Sync,
    R: SparseMatrix<Elem = L::Elem> + Sync,
{
    update_target(target, expr, AssignOp::AddAssign, true);
}

/// Parallel `target -= expr`.
pub fn smp_sub_assign<C, L, R>(target: &mut C, expr: &DMatTSMatMultExpr<L, R>)
where
    C: AssignTarget<Elem = L::Elem>,
    L: Matrix + Sync,
    R: SparseMatrix<Elem = L::Elem> + Sync,
{
    update_target(target, expr, AssignOp::SubAssign, true);
}

/// Parallel `target = target * expr`; only the product is realized in
/// parallel.
pub fn smp_mul_assign<C, L, R>(target: &mut C, expr: &DMatTSMatMultExpr<L, R>) -> Result<()>
where
    C: AssignTarget<Elem = L::Elem>,
    L: Matrix + Sync,
    R: SparseMatrix<Elem = L::Elem> + Sync,
{
    multiply_target(target, expr, true)
}

fn update_target<C, L, R>(
    target: &mut C,
    expr: &DMatTSMatMultExpr<L, R>,
    op: AssignOp,
    parallel: bool,
) where
    C: AssignTarget<Elem = L::Elem>,
    L: Matrix + Sync,
    R: SparseMatrix<Elem = L::Elem> + Sync,
{
    debug_assert!(op != AssignOp::MulAssign);
    assert_eq!(
        target.target_shape(),
        expr.shape(),
        "invalid target shape for {:?}",
        op
    );

    let (lhs, rhs, config) = (expr.left_operand(), expr.right_operand(), expr.config());
    let decision = Decision::analyze(lhs, rhs, config);
    if decision.evaluation_required() {
        debug!(
            "materializing operands (left: {}, right: {})",
            decision.evaluate_left, decision.evaluate_right
        );
        let left = Operand::dense(lhs);
        let right = Operand::sparse(rhs);
        let decision = Decision::analyze(&left, &right, config);
        run(target, &left, &right, &decision, op, parallel);
    } else {
        run(target, lhs, rhs, &decision, op, parallel);
    }
    target.clear_structure();
}

fn multiply_target<C, L, R>(
    target: &mut C,
    expr: &DMatTSMatMultExpr<L, R>,
    parallel: bool,
) -> Result<()>
where
    C: AssignTarget<Elem = L::Elem>,
    L: Matrix + Sync,
    R: SparseMatrix<Elem = L::Elem> + Sync,
{
    let target_columns = target.target_shape().columns();
    if target_columns != expr.rows() || !expr.shape().is_square() {
        return Err(ProductError::MultiplyAssignShape {
            rows: expr.rows(),
            columns: expr.columns(),
            target_columns,
        });
    }

    let mut result = DynamicMatrix::zeros(expr.rows(), expr.columns());
    update_target(&mut result, expr, AssignOp::Assign, parallel);
    debug!(
        "multiply-assign into {:?} target through a {} temporary",
        C::KIND,
        result.shape()
    );
    target.mul_dense(&result)?;
    target.clear_structure();
    Ok(())
}

/// How a kernel writes its cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Write {
    Assign,
    Add,
    Sub,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kernel {
    /// Symmetric right operand.
    SymmetricRows,
    /// Symmetric left operand.
    SymmetricColumns,
    Default,
    Optimized,
}

fn run<C, L, R>(
    target: &mut C,
    left: &L,
    right: &R,
    decision: &Decision,
    op: AssignOp,
    parallel: bool,
) where
    C: AssignTarget<Elem = L::Elem>,
    L: Matrix + Sync + ?Sized,
    R: SparseMatrix<Elem = L::Elem> + Sync + ?Sized,
{
    let path = select_path(op, C::KIND, decision, parallel);
    let kernel = match (decision.exploit_symmetry, decision.kernel) {
        (Some(SymmetricOperand::Left), _) => Kernel::SymmetricColumns,
        (Some(SymmetricOperand::Right), _) => Kernel::SymmetricRows,
        (None, KernelKind::Optimized) => Kernel::Optimized,
        (None, KernelKind::Default) => Kernel::Default,
    };
    let in_parallel = match path {
        AssignPath::ParallelDense | AssignPath::ParallelViaDense => true,
        AssignPath::SymmetryRewrite => parallel && decision.smp_eligible(),
        AssignPath::SerialDense | AssignPath::SerialViaDense => false,
    };
    let write = match op {
        AssignOp::AddAssign => Write::Add,
        AssignOp::SubAssign => Write::Sub,
        AssignOp::Assign | AssignOp::MulAssign => Write::Assign,
    };
    debug!(
        "{:?} of {}x{} product into {:?} target: {:?}, {:?} kernel, parallel={}",
        op,
        left.rows(),
        right.columns(),
        C::KIND,
        path,
        kernel,
        in_parallel
    );

    let direct = !matches!(path, AssignPath::SerialViaDense | AssignPath::ParallelViaDense);
    if direct {
        if let Some(view) = target.dense_view() {
            fill(view, left, right, kernel, write, in_parallel);
            return;
        }
    }

    let mut temp = DynamicMatrix::zeros(left.rows(), right.columns());
    fill(temp.view_mut(), left, right, kernel, Write::Assign, in_parallel);
    match write {
        Write::Assign => target.assign_dense(&temp),
        Write::Add => target.add_dense(&temp),
        Write::Sub => target.sub_dense(&temp),
    }
}

fn fill<T, L, R>(
    view: DenseViewMut<'_, T>,
    left: &L,
    right: &R,
    kernel: Kernel,
    write: Write,
    in_parallel: bool,
) where
    T: Element,
    L: Matrix<Elem = T> + Sync + ?Sized,
    R: SparseMatrix<Elem = T> + Sync + ?Sized,
{
    if in_parallel {
        smp::for_each_band(view, |band| apply_kernel(band, left, right, kernel, write));
    } else {
        let mut view = view;
        apply_kernel(&mut view, left, right, kernel, write);
    }
}

fn apply_kernel<T, L, R>(
    view: &mut DenseViewMut<'_, T>,
    left: &L,
    right: &R,
    kernel: Kernel,
    write: Write,
) where
    T: Element,
    L: Matrix<Elem = T> + ?Sized,
    R: SparseMatrix<Elem = T> + ?Sized,
{
    trace!(
        "{:?} kernel ({:?}) on rows {:?}, columns {:?}",
        kernel,
        write,
        view.rows(),
        view.columns()
    );
    match (kernel, write) {
        (Kernel::SymmetricRows, Write::Assign) => symmetric::assign_by_rows(view, left, right),
        (Kernel::SymmetricRows, Write::Add) => {
            symmetric::update_by_rows::<Add, _, _, _>(view, left, right)
        }
        (Kernel::SymmetricRows, Write::Sub) => {
            symmetric::update_by_rows::<Sub, _, _, _>(view, left, right)
        }
        (Kernel::SymmetricColumns, Write::Assign) => {
            symmetric::assign_by_columns(view, left, right)
        }
        (Kernel::SymmetricColumns, Write::Add) => {
            symmetric::update_by_columns::<Add, _, _, _>(view, left, right)
        }
        (Kernel::SymmetricColumns, Write::Sub) => {
            symmetric::update_by_columns::<Sub, _, _, _>(view, left, right)
        }
        (Kernel::Default, Write::Assign) => default::assign(view, left, right),
        (Kernel::Default, Write::Add) => default::update::<Add, _, _, _>(view, left, right),
        (Kernel::Default, Write::Sub) => default::update::<Sub, _, _, _>(view, left, right),
        (Kernel::Optimized, Write::Assign) => optimized::assign(view, left, right),
        (Kernel::Optimized, Write::Add) => optimized::update::<Add, _, _, _>(view, left, right),
        (Kernel::Optimized, Write::Sub) => optimized::update::<Sub, _, _, _>(view, left, right),
    }
}
