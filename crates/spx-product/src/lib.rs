//! `spx-product` - Lazy dense x column-major sparse matrix product.
//!
//! This crate provides:
//! - `DMatTSMatMultExpr`, the deferred product built by `product()`
//! - Assignment into dense and sparse targets (`assign`, `add_assign`,
//!   `sub_assign`, `mul_assign` and their `smp_*` parallel counterparts)
//! - Default, loop-unrolled and symmetric kernels, chosen once per assignment
//! - `ProductConfig` for kernel and parallelism tuning

pub mod analysis;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod expr;
pub mod kernels;
pub mod operand;
pub mod smp;

// Re-export primary types at the crate root for convenience.
pub use analysis::{Decision, KernelKind, SymmetricOperand};
pub use config::ProductConfig;
pub use dispatch::{
    add_assign, assign, mul_assign, select_path, smp_add_assign, smp_assign, smp_mul_assign,
    smp_sub_assign, sub_assign, AssignOp, AssignPath, AssignTarget, TargetKind,
};
pub use error::{ProductError, Result};
pub use expr::{product, DMatTSMatMultExpr};
pub use operand::Operand;
