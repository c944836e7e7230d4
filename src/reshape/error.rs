use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReshapeError {
    #[error("Column '{column}' has {rows} populated cells but none parse as a number")]
    ColumnNotNumeric { column: String, rows: usize },

    #[error("Column '{column}' has {rows} populated cells but none parse as a date")]
    ColumnNotDate { column: String, rows: usize },

    #[error("Column '{0}' not found in table")]
    ColumnNotFound(String, #[source] PolarsError),

    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),

    #[error("Scattered interpolation needs at least 3 valid points, found {0}")]
    InsufficientData(usize),

    #[error("Interpolation target grid must have at least one point per axis")]
    EmptyTargetGrid,
}
