use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProductError {
    #[error("matrix error: {0}")]
    Matrix(#[from] spx_matrix::MatrixError),
    #[error("vector length mismatch: expected {expected}, got {got}")]
    VectorLength { expected: usize, got: usize },
    #[error("multiply assignment of a {rows}x{columns} product into a target with {target_columns} columns")]
    MultiplyAssignShape {
        rows: usize,
        columns: usize,
        target_columns: usize,
    },
    #[error("invalid value {value:?} for {key}: {reason}")]
    Config {
        key: String,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, ProductError>;
