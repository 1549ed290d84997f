//! Per-assignment analysis of a dense x sparse product.
//!
//! Everything the dispatcher needs to know about the operands is computed
//! once into a [`Decision`] before any kernel runs.

use log::trace;
use spx_matrix::{Element, Matrix, SparseMatrix, Structure};

use crate::config::ProductConfig;

/// Returns true if `m` must be copied into a temporary before a kernel reads
/// it: it is a pending computation, or re-reading it element-wise is
/// expensive.
pub fn requires_evaluation<M: Matrix + ?Sized>(m: &M) -> bool {
    m.is_computation() || m.requires_evaluation()
}

/// The operand whose symmetry a product assignment exploits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymmetricOperand {
    /// `A == transpose(A)`: the product is evaluated as `transpose(A) * B`,
    /// reading row k of `A` in place of its column k.
    Left,
    /// `B == transpose(B)`: column k of `B` is read as its row k.
    Right,
}

/// Which operand, if any, lets the product run through a symmetric
/// traversal. A symmetric left operand takes precedence.
pub fn can_exploit_symmetry(left: Structure, right: Structure) -> Option<SymmetricOperand> {
    if left.is_symmetric() {
        Some(SymmetricOperand::Left)
    } else if right.is_symmetric() {
        Some(SymmetricOperand::Right)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelKind {
    /// Seeded accumulation with an empty-range reset; legal for every input.
    Default,
    /// Reset then accumulate four nonzeros per step.
    Optimized,
}

/// Choose between the default and the loop-unrolled kernel.
///
/// The unrolled kernel needs fixed-size element arithmetic and is never used
/// for a diagonal right operand, where each column holds at most one entry.
pub fn select_kernel(
    config: &ProductConfig,
    right: Structure,
    left_resizable: bool,
    right_resizable: bool,
) -> KernelKind {
    let fixed_size = !left_resizable && !right_resizable;
    if config.use_optimized_kernels && !right.is_diagonal() && fixed_size {
        KernelKind::Optimized
    } else {
        KernelKind::Default
    }
}

/// Everything decided about one assignment before it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub evaluate_left: bool,
    pub evaluate_right: bool,
    pub exploit_symmetry: Option<SymmetricOperand>,
    /// Both operands can be read from several threads at once.
    pub operands_smp_assignable: bool,
    /// The product has more rows than the configured threshold.
    pub above_threshold: bool,
    pub kernel: KernelKind,
}

impl Decision {
    pub fn analyze<L, R>(left: &L, right: &R, config: &ProductConfig) -> Decision
    where
        L: Matrix + ?Sized,
        R: SparseMatrix<Elem = L::Elem> + ?Sized,
    {
        let decision = Decision {
            evaluate_left: requires_evaluation(left),
            evaluate_right: requires_evaluation(right),
            exploit_symmetry: can_exploit_symmetry(left.structure(), right.structure()),
            operands_smp_assignable: left.smp_assignable() && right.smp_assignable(),
            above_threshold: left.rows() > config.smp_threshold,
            kernel: select_kernel(
                config,
                right.structure(),
                <L::Elem as Element>::RESIZABLE,
                <R::Elem as Element>::RESIZABLE,
            ),
        };
        trace!(
            "analyzed {}x{} * {}x{}: {:?}",
            left.rows(),
            left.columns(),
            right.rows(),
            right.columns(),
            decision
        );
        decision
    }

    /// Returns true if either operand has to be materialized first.
    pub fn evaluation_required(&self) -> bool {
        self.evaluate_left || self.evaluate_right
    }

    /// Returns true if the product may be assigned in parallel as it stands.
    pub fn smp_eligible(&self) -> bool {
        self.operands_smp_assignable && !self.evaluation_required() && self.above_threshold
    }
}
