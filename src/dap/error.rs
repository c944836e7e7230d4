use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DapError {
    // Range/field validation, performed against the catalog before any
    // request is issued.
    #[error("Field '{field}' is not part of dataset '{dataset_id}'")]
    UnknownField { dataset_id: String, field: String },

    #[error("Dimension '{axis}' is not an axis of dataset '{dataset_id}'")]
    UnknownAxis { dataset_id: String, axis: String },

    #[error(
        "Range [{requested_min}, {requested_max}] for axis '{axis}' of dataset '{dataset_id}' \
         is outside the dataset bounds [{bound_min}, {bound_max}]"
    )]
    RangeOutOfBounds {
        dataset_id: String,
        axis: String,
        requested_min: f64,
        requested_max: f64,
        bound_min: f64,
        bound_max: f64,
    },

    #[error("Cannot resolve the earliest time step: dataset '{0}' reports no time coverage")]
    UnresolvedEarliest(String),

    #[error("Axis '{axis}' of dataset '{dataset_id}' has no recorded bounds to span")]
    UnboundedAxis { dataset_id: String, axis: String },

    // Transport.
    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to read response body for {0}")]
    ResponseBody(String, #[source] reqwest::Error),

    // CSV ingestion.
    #[error("I/O error spooling CSV response for dataset '{dataset_id}' to '{path}'")]
    CsvSpoolIo {
        dataset_id: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parsing error reading CSV response for dataset '{dataset_id}'")]
    CsvReadPolars {
        dataset_id: String,
        #[source]
        source: PolarsError,
    },

    #[error("Required column '{column}' missing from response for dataset '{dataset_id}'")]
    MissingColumn { dataset_id: String, column: String },

    // Grid assembly.
    #[error(
        "Gridded response for dataset '{dataset_id}' has {rows} rows but the \
         coordinate axes imply {expected} cells"
    )]
    ShapeMismatch {
        dataset_id: String,
        rows: usize,
        expected: usize,
    },

    #[error(
        "Gridded response for dataset '{dataset_id}' is not in row-major raster \
         order at row {row}: expected raster position {expected}"
    )]
    RasterOrder {
        dataset_id: String,
        row: usize,
        expected: usize,
    },

    #[error("Unreadable coordinate '{value}' for axis '{axis}' in dataset '{dataset_id}'")]
    AxisCoordinate {
        dataset_id: String,
        axis: String,
        value: String,
    },
}
