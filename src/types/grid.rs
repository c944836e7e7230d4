//! Dense gridded results assembled from long-format griddap CSV responses.

use crate::dap::error::DapError;
use chrono::DateTime;
use ndarray::{ArrayD, IxDyn};
use polars::frame::DataFrame;
use std::collections::HashMap;

/// One coordinate axis of a [`Grid`], with its coordinate values in server
/// order. Time coordinates are epoch seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct GridAxis {
    pub name: String,
    pub values: Vec<f64>,
}

/// One measured field of a [`Grid`]. Missing cells are `f64::NAN`.
#[derive(Debug, Clone)]
pub struct GridField {
    pub name: String,
    pub values: ArrayD<f64>,
}

/// A dense multi-dimensional result: coordinate axes plus one array per
/// requested field, all sharing the same shape.
///
/// Invariant: for every field, `values.shape()[i] == axes[i].values.len()`.
/// Arrays are row-major with the last axis varying fastest, which is asserted
/// per row during assembly rather than assumed.
#[derive(Debug, Clone)]
pub struct Grid {
    pub axes: Vec<GridAxis>,
    pub fields: Vec<GridField>,
}

impl Grid {
    pub fn axis(&self, name: &str) -> Option<&GridAxis> {
        self.axes.iter().find(|a| a.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&GridField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Axis lengths, equal to every field array's shape.
    pub fn shape(&self) -> Vec<usize> {
        self.axes.iter().map(|a| a.values.len()).collect()
    }

    /// Assembles a grid from a long-format table whose leading columns are
    /// the dataset's axes (in dataset order) and whose remaining columns are
    /// measured fields. All columns are text, as the loader delivers them.
    ///
    /// Coordinate cells must parse (as a number, or as an ISO 8601 instant
    /// for the time axis). Field cells that are empty or unparseable become
    /// `NAN`. The row count must equal the product of the axis lengths, and
    /// each row must sit at its row-major raster position.
    pub(crate) fn from_long_format(
        df: &DataFrame,
        axis_names: &[String],
        dataset_id: &str,
    ) -> Result<Grid, DapError> {
        let n_rows = df.height();

        // Parse coordinate columns and collect unique values in order of
        // first appearance.
        let mut axes = Vec::with_capacity(axis_names.len());
        let mut positions: Vec<HashMap<u64, usize>> = Vec::with_capacity(axis_names.len());
        let mut coord_rows: Vec<Vec<f64>> = Vec::with_capacity(axis_names.len());
        for name in axis_names {
            let column = df
                .column(name)
                .map_err(|_| DapError::MissingColumn {
                    dataset_id: dataset_id.to_string(),
                    column: name.clone(),
                })?
                .str()
                .map_err(|e| DapError::CsvReadPolars {
                    dataset_id: dataset_id.to_string(),
                    source: e,
                })?;

            let mut parsed = Vec::with_capacity(n_rows);
            let mut unique = Vec::new();
            let mut index = HashMap::new();
            for cell in column.into_iter() {
                let raw = cell.ok_or_else(|| DapError::AxisCoordinate {
                    dataset_id: dataset_id.to_string(),
                    axis: name.clone(),
                    value: String::new(),
                })?;
                let value = parse_coordinate(raw).ok_or_else(|| DapError::AxisCoordinate {
                    dataset_id: dataset_id.to_string(),
                    axis: name.clone(),
                    value: raw.to_string(),
                })?;
                if !index.contains_key(&value.to_bits()) {
                    index.insert(value.to_bits(), unique.len());
                    unique.push(value);
                }
                parsed.push(value);
            }
            axes.push(GridAxis {
                name: name.clone(),
                values: unique,
            });
            positions.push(index);
            coord_rows.push(parsed);
        }

        let shape: Vec<usize> = axes.iter().map(|a| a.values.len()).collect();
        let expected: usize = shape.iter().product();
        if n_rows != expected && !axis_names.is_empty() {
            return Err(DapError::ShapeMismatch {
                dataset_id: dataset_id.to_string(),
                rows: n_rows,
                expected,
            });
        }

        // Row-major strides, last axis fastest.
        let mut strides = vec![1usize; shape.len()];
        for i in (0..shape.len().saturating_sub(1)).rev() {
            strides[i] = strides[i + 1] * shape[i + 1];
        }

        // Assert the server's raster traversal order instead of assuming it:
        // every row must land exactly at its row-major linear index.
        for row in 0..n_rows {
            let mut linear = 0usize;
            for (axis_idx, stride) in strides.iter().enumerate() {
                let pos = positions[axis_idx][&coord_rows[axis_idx][row].to_bits()];
                linear += pos * stride;
            }
            if linear != row {
                return Err(DapError::RasterOrder {
                    dataset_id: dataset_id.to_string(),
                    row,
                    expected: linear,
                });
            }
        }

        let mut fields = Vec::new();
        for column in df.get_columns() {
            let name = column.name().to_string();
            if axis_names.iter().any(|a| a == &name) {
                continue;
            }
            let ca = column.str().map_err(|e| DapError::CsvReadPolars {
                dataset_id: dataset_id.to_string(),
                source: e,
            })?;
            let cells: Vec<f64> = ca
                .into_iter()
                .map(|cell| {
                    cell.and_then(|raw| raw.trim().parse::<f64>().ok())
                        .unwrap_or(f64::NAN)
                })
                .collect();
            let values = ArrayD::from_shape_vec(IxDyn(&shape), cells).map_err(|_| {
                DapError::ShapeMismatch {
                    dataset_id: dataset_id.to_string(),
                    rows: n_rows,
                    expected,
                }
            })?;
            fields.push(GridField { name, values });
        }

        Ok(Grid { axes, fields })
    }
}

/// Coordinates come as plain numbers, or as ISO 8601 instants on time axes.
fn parse_coordinate(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if let Ok(v) = raw.parse::<f64>() {
        return Some(v);
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.timestamp() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn long_format_df() -> DataFrame {
        // 2 times x 2 latitudes x 2 longitudes, row-major, longitude fastest.
        df!(
            "time" => &[
                "2010-01-16T00:00:00Z", "2010-01-16T00:00:00Z",
                "2010-01-16T00:00:00Z", "2010-01-16T00:00:00Z",
                "2010-02-16T00:00:00Z", "2010-02-16T00:00:00Z",
                "2010-02-16T00:00:00Z", "2010-02-16T00:00:00Z",
            ],
            "latitude" => &["30.0", "30.0", "31.0", "31.0", "30.0", "30.0", "31.0", "31.0"],
            "longitude" => &["-120.0", "-119.0", "-120.0", "-119.0", "-120.0", "-119.0", "-120.0", "-119.0"],
            "sst" => &["14.2", "14.6", "13.9", "NaN", "15.1", "15.3", "14.8", "14.5"],
        )
        .unwrap()
    }

    fn axis_names() -> Vec<String> {
        vec!["time".to_string(), "latitude".to_string(), "longitude".to_string()]
    }

    #[test]
    fn axis_lengths_match_field_shape() {
        let grid = Grid::from_long_format(&long_format_df(), &axis_names(), "test").unwrap();
        assert_eq!(grid.shape(), vec![2, 2, 2]);
        let sst = grid.field("sst").unwrap();
        assert_eq!(sst.values.shape(), &[2, 2, 2]);
        for (axis, len) in grid.axes.iter().zip(sst.values.shape()) {
            assert_eq!(axis.values.len(), *len);
        }
    }

    #[test]
    fn time_axis_is_decoded_to_epoch_seconds() {
        let grid = Grid::from_long_format(&long_format_df(), &axis_names(), "test").unwrap();
        let time = grid.axis("time").unwrap();
        assert_eq!(time.values[0], 1263600000.0); // 2010-01-16T00:00:00Z
        assert!(time.values[1] > time.values[0]);
    }

    #[test]
    fn missing_cells_become_nan() {
        let grid = Grid::from_long_format(&long_format_df(), &axis_names(), "test").unwrap();
        let sst = grid.field("sst").unwrap();
        assert!(sst.values[[0, 1, 1]].is_nan());
        assert_eq!(sst.values[[1, 0, 0]], 15.1);
    }

    #[test]
    fn out_of_order_rows_are_rejected() {
        let df = df!(
            "latitude" => &["31.0", "30.0", "31.0", "30.0"],
            "longitude" => &["-120.0", "-120.0", "-119.0", "-119.0"],
            "sst" => &["1.0", "2.0", "3.0", "4.0"],
        )
        .unwrap();
        let names = vec!["latitude".to_string(), "longitude".to_string()];
        let err = Grid::from_long_format(&df, &names, "test").unwrap_err();
        assert!(matches!(err, DapError::RasterOrder { .. }));
    }

    #[test]
    fn row_count_must_fill_the_grid() {
        let df = df!(
            "latitude" => &["30.0", "30.0", "31.0"],
            "longitude" => &["-120.0", "-119.0", "-120.0"],
            "sst" => &["1.0", "2.0", "3.0"],
        )
        .unwrap();
        let names = vec!["latitude".to_string(), "longitude".to_string()];
        let err = Grid::from_long_format(&df, &names, "test").unwrap_err();
        assert!(matches!(
            err,
            DapError::ShapeMismatch { rows: 3, expected: 4, .. }
        ));
    }

    #[test]
    fn unreadable_coordinate_is_an_error() {
        let df = df!(
            "latitude" => &["thirty"],
            "sst" => &["1.0"],
        )
        .unwrap();
        let err = Grid::from_long_format(&df, &["latitude".to_string()], "test").unwrap_err();
        assert!(matches!(err, DapError::AxisCoordinate { value, .. } if value == "thirty"));
    }
}
