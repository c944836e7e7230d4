//! Dataset catalog lookup against an ERDDAP server's `info` endpoint.
//!
//! ERDDAP publishes dataset metadata as a five-column table
//! (`Row Type, Variable Name, Attribute Name, Data Type, Value`) serialized
//! as JSON. This module fetches that document and folds it into a
//! [`DatasetInfo`] describing the dataset's axes and data variables, which
//! the query builders use for validation and time-sentinel resolution.

use crate::catalog::error::CatalogError;
use log::info;
use reqwest::blocking::Client;
use serde::Deserialize;

/// A coordinate axis of a gridded dataset (time, altitude/depth, latitude,
/// longitude), in the order the server lists them.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisVariable {
    pub name: String,
    /// Number of coordinate values along this axis, when the server reports it.
    pub n_values: Option<usize>,
    pub units: Option<String>,
    /// Inclusive `[min, max]` of the axis coordinates. For the time axis this
    /// is in seconds since 1970-01-01T00:00:00Z.
    pub actual_range: Option<(f64, f64)>,
}

/// A measured quantity of a dataset (e.g. `analysed_sst`, `chlorophyll`).
#[derive(Debug, Clone, PartialEq)]
pub struct DataVariable {
    pub name: String,
    pub data_type: String,
    pub units: Option<String>,
    pub actual_range: Option<(f64, f64)>,
}

/// Structured description of one ERDDAP dataset, as reported by the server.
///
/// Gridded datasets carry both axes and data variables; tabular datasets
/// have an empty axis list and describe every column as a data variable.
#[derive(Debug, Clone)]
pub struct DatasetInfo {
    pub dataset_id: String,
    pub axes: Vec<AxisVariable>,
    pub variables: Vec<DataVariable>,
}

impl DatasetInfo {
    pub fn axis(&self, name: &str) -> Option<&AxisVariable> {
        self.axes.iter().find(|a| a.name == name)
    }

    pub fn variable(&self, name: &str) -> Option<&DataVariable> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// True when `name` is either an axis or a data variable of this dataset.
    pub fn has_field(&self, name: &str) -> bool {
        self.axis(name).is_some() || self.variable(name).is_some()
    }

    /// The dataset's time coverage in epoch seconds, when the catalog
    /// reports a time axis or time column with an `actual_range`.
    pub fn time_range(&self) -> Option<(f64, f64)> {
        self.axis("time")
            .and_then(|a| a.actual_range)
            .or_else(|| self.variable("time").and_then(|v| v.actual_range))
    }
}

#[derive(Deserialize)]
struct IndexDoc {
    table: IndexTable,
}

#[derive(Deserialize)]
pub(crate) struct IndexTable {
    #[serde(rename = "columnNames")]
    column_names: Vec<String>,
    rows: Vec<Vec<serde_json::Value>>,
}

/// Fetches `{base}/info/{dataset_id}/index.json` and parses it.
///
/// Single attempt; an HTTP 404 maps to [`CatalogError::DatasetNotFound`] and
/// any other failure surfaces unchanged.
pub fn fetch_dataset_info(
    http: &Client,
    base_url: &str,
    dataset_id: &str,
) -> Result<DatasetInfo, CatalogError> {
    let url = format!(
        "{}/info/{}/index.json",
        base_url.trim_end_matches('/'),
        dataset_id
    );
    info!("Fetching dataset metadata from {}", url);

    let response = http
        .get(&url)
        .send()
        .map_err(|e| CatalogError::NetworkRequest(url.clone(), e))?;

    let response = match response.error_for_status() {
        Ok(resp) => resp,
        Err(e) => {
            return Err(match e.status() {
                Some(reqwest::StatusCode::NOT_FOUND) => {
                    CatalogError::DatasetNotFound(dataset_id.to_string())
                }
                Some(status) => CatalogError::HttpStatus {
                    url,
                    status,
                    source: e,
                },
                None => CatalogError::NetworkRequest(url, e),
            });
        }
    };

    let bytes = response
        .bytes()
        .map_err(|e| CatalogError::NetworkRequest(url.clone(), e))?;
    let doc: IndexDoc = serde_json::from_slice(&bytes)
        .map_err(|e| CatalogError::MetadataJson(dataset_id.to_string(), e))?;

    parse_info_table(dataset_id, &doc.table)
}

/// Folds the row-typed metadata table into a [`DatasetInfo`].
pub(crate) fn parse_info_table(
    dataset_id: &str,
    table: &IndexTable,
) -> Result<DatasetInfo, CatalogError> {
    if table.column_names.len() < 5 {
        return Err(CatalogError::MetadataShape {
            dataset_id: dataset_id.to_string(),
            message: format!(
                "expected 5 metadata columns, server sent {}",
                table.column_names.len()
            ),
        });
    }

    let mut dataset = DatasetInfo {
        dataset_id: dataset_id.to_string(),
        axes: Vec::new(),
        variables: Vec::new(),
    };

    for row in &table.rows {
        if row.len() < 5 {
            return Err(CatalogError::MetadataShape {
                dataset_id: dataset_id.to_string(),
                message: format!("metadata row has {} cells, expected 5", row.len()),
            });
        }
        let row_type = cell_str(&row[0]);
        let var_name = cell_str(&row[1]);
        let attr_name = cell_str(&row[2]);
        let data_type = cell_str(&row[3]);
        let value = cell_str(&row[4]);

        match row_type.as_str() {
            "dimension" => dataset.axes.push(AxisVariable {
                name: var_name,
                n_values: parse_n_values(&value),
                units: None,
                actual_range: None,
            }),
            "variable" => dataset.variables.push(DataVariable {
                name: var_name,
                data_type,
                units: None,
                actual_range: None,
            }),
            "attribute" if var_name != "NC_GLOBAL" => {
                apply_attribute(&mut dataset, &var_name, &attr_name, &value);
            }
            _ => {}
        }
    }

    Ok(dataset)
}

fn cell_str(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Extracts the point count from a dimension description like
/// `"nValues=477, evenlySpaced=false, averageSpacing=30 days"`.
fn parse_n_values(value: &str) -> Option<usize> {
    value.split(',').find_map(|part| {
        part.trim()
            .strip_prefix("nValues=")
            .and_then(|n| n.parse().ok())
    })
}

/// Parses an `actual_range` attribute value like `"1.1896632E9, 1.3351824E9"`.
fn parse_range(value: &str) -> Option<(f64, f64)> {
    let mut parts = value.split(',').map(str::trim);
    let min = parts.next()?.parse().ok()?;
    let max = parts.next()?.parse().ok()?;
    Some((min, max))
}

fn apply_attribute(dataset: &mut DatasetInfo, var_name: &str, attr_name: &str, value: &str) {
    let (units, actual_range) = match attr_name {
        "units" => (Some(value.to_string()), None),
        "actual_range" => (None, parse_range(value)),
        _ => return,
    };
    if let Some(axis) = dataset.axes.iter_mut().find(|a| a.name == var_name) {
        if units.is_some() {
            axis.units = units;
        } else if actual_range.is_some() {
            axis.actual_range = actual_range;
        }
    } else if let Some(var) = dataset.variables.iter_mut().find(|v| v.name == var_name) {
        if units.is_some() {
            var.units = units;
        } else if actual_range.is_some() {
            var.actual_range = actual_range;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> IndexTable {
        let json = r#"{
            "columnNames": ["Row Type", "Variable Name", "Attribute Name", "Data Type", "Value"],
            "rows": [
                ["attribute", "NC_GLOBAL", "cdm_data_type", "String", "Grid"],
                ["dimension", "time", "", "double", "nValues=477, evenlySpaced=false, averageSpacing=30 days 10h 25m 26s"],
                ["attribute", "time", "units", "String", "seconds since 1970-01-01T00:00:00Z"],
                ["attribute", "time", "actual_range", "double", "1.1896632E9, 1.3351824E9"],
                ["dimension", "latitude", "", "float", "nValues=4320, evenlySpaced=true, averageSpacing=0.0416"],
                ["attribute", "latitude", "actual_range", "float", "-89.97916, 89.97918"],
                ["dimension", "longitude", "", "float", "nValues=8640, evenlySpaced=true, averageSpacing=0.0416"],
                ["attribute", "longitude", "actual_range", "float", "-179.9792, 179.9792"],
                ["variable", "sst", "", "float", "time, latitude, longitude"],
                ["attribute", "sst", "units", "String", "degree_C"]
            ]
        }"#;
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn parses_axes_and_variables() {
        let info = parse_info_table("erdMH1sstdmday", &sample_table()).unwrap();

        assert_eq!(info.axes.len(), 3);
        assert_eq!(info.variables.len(), 1);

        let time = info.axis("time").unwrap();
        assert_eq!(time.n_values, Some(477));
        assert_eq!(time.units.as_deref(), Some("seconds since 1970-01-01T00:00:00Z"));
        assert_eq!(time.actual_range, Some((1.1896632e9, 1.3351824e9)));

        let sst = info.variable("sst").unwrap();
        assert_eq!(sst.data_type, "float");
        assert_eq!(sst.units.as_deref(), Some("degree_C"));
    }

    #[test]
    fn has_field_covers_axes_and_variables() {
        let info = parse_info_table("erdMH1sstdmday", &sample_table()).unwrap();
        assert!(info.has_field("latitude"));
        assert!(info.has_field("sst"));
        assert!(!info.has_field("chlorophyll"));
    }

    #[test]
    fn time_range_comes_from_time_axis() {
        let info = parse_info_table("erdMH1sstdmday", &sample_table()).unwrap();
        assert_eq!(info.time_range(), Some((1.1896632e9, 1.3351824e9)));
    }

    #[test]
    fn short_rows_are_a_shape_error() {
        let mut table = sample_table();
        table.rows.push(vec![serde_json::Value::String("dimension".into())]);
        let err = parse_info_table("bad", &table).unwrap_err();
        assert!(matches!(err, CatalogError::MetadataShape { .. }));
    }
}
