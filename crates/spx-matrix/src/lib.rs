//! `spx-matrix` - Matrix operands for the spx lazy product.
//!
//! This crate provides:
//! - The `Matrix` / `SparseMatrix` operand traits and `SparseColumn` cursors
//! - `DynamicMatrix`, a dense matrix in row-major or column-major order
//! - `CompressedMatrix`, a compressed sparse column matrix
//! - `Scaled`, a lazily evaluated scalar multiple
//! - `Transposed`, a transposed view of a sparse matrix
//! - `Structure` flags (diagonal, triangular, symmetric) and the `Element` scalar trait

pub mod cursor;
pub mod dense;
pub mod element;
pub mod error;
pub mod matrix;
pub mod scaled;
pub mod shape;
pub mod sparse;
pub mod storage;
pub mod structure;
pub mod transpose;

// Re-export primary types at the crate root for convenience.
pub use cursor::SparseColumn;
pub use dense::{DenseViewMut, DynamicMatrix};
pub use element::Element;
pub use error::{MatrixError, Result};
pub use matrix::{AliasId, Matrix, SparseMatrix};
pub use scaled::Scaled;
pub use shape::Shape;
pub use sparse::CompressedMatrix;
pub use storage::StorageOrder;
pub use structure::Structure;
pub use transpose::Transposed;
