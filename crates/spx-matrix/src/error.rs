use thiserror::Error;

use crate::structure::Structure;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatrixError {
    #[error("shape mismatch: expected {expected_rows}x{expected_columns}, got {rows}x{columns}")]
    ShapeMismatch {
        expected_rows: usize,
        expected_columns: usize,
        rows: usize,
        columns: usize,
    },
    #[error("matrix sizes do not match: [{m}x{k}] * [{k2}x{n}]")]
    ProductMismatch {
        m: usize,
        k: usize,
        k2: usize,
        n: usize,
    },
    #[error("invalid access index ({row}, {column}) for a {rows}x{columns} matrix")]
    IndexOutOfRange {
        row: usize,
        column: usize,
        rows: usize,
        columns: usize,
    },
    #[error("element ({row}, {column}) violates the declared {structure} structure")]
    StructureViolation {
        structure: Structure,
        row: usize,
        column: usize,
    },
    #[error("{structure} structure requires a square matrix, got {rows}x{columns}")]
    NotSquare {
        structure: Structure,
        rows: usize,
        columns: usize,
    },
    #[error("invalid compressed matrix: {0}")]
    InvalidSparse(String),
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, MatrixError>;
