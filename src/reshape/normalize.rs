//! Response normalization: assigning semantic types to textual columns.
//!
//! Everything a DAP server returns as CSV arrives as text. A caller states
//! the intended type per column; conversion then follows the crate's
//! missing-value convention: an individual unparseable cell becomes "no
//! data", and only a column with populated cells and *zero* parseable ones
//! is a fatal error.

use crate::reshape::error::ReshapeError;
use crate::types::tabular_frame::TabularFrame;
use chrono::{DateTime, NaiveDate};
use polars::prelude::*;

/// Target semantic type for one textual column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Floating-point measurements.
    Numeric,
    /// Calendar dates, decoded from epoch seconds (1970-01-01, UTC) or
    /// ISO 8601 text. No timezone offset is applied.
    Date,
    /// Free text, kept as-is (species names, cruise identifiers).
    Categorical,
}

impl TabularFrame {
    /// Produces a new frame with the named columns converted to their
    /// target types. The receiver is not modified.
    pub fn normalize(&self, mapping: &[(&str, ColumnKind)]) -> Result<TabularFrame, ReshapeError> {
        let mut df = self.collect()?;

        for (name, kind) in mapping {
            match kind {
                ColumnKind::Numeric => {
                    let series = numeric_series(&df, name)?;
                    df.with_column(series)?;
                }
                ColumnKind::Date => {
                    let series = date_series(&df, name)?;
                    df.with_column(series)?;
                }
                ColumnKind::Categorical => {}
            }
        }

        Ok(TabularFrame::from_dataframe(df))
    }
}

fn text_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a StringChunked, ReshapeError> {
    df.column(name)
        .map_err(|e| ReshapeError::ColumnNotFound(name.to_string(), e))?
        .str()
        .map_err(ReshapeError::DataFrameProcessing)
}

fn numeric_series(df: &DataFrame, name: &str) -> Result<Series, ReshapeError> {
    let column = df
        .column(name)
        .map_err(|e| ReshapeError::ColumnNotFound(name.to_string(), e))?;
    // Already typed columns only need widening to f64.
    if column.dtype().is_primitive_numeric() {
        return Ok(column
            .as_materialized_series()
            .cast(&DataType::Float64)
            .map_err(ReshapeError::DataFrameProcessing)?);
    }

    let ca = text_column(df, name)?;
    let mut populated = 0usize;
    let mut parsed = 0usize;
    let values: Vec<Option<f64>> = ca
        .into_iter()
        .map(|cell| {
            let raw = cell?.trim();
            if raw.is_empty() {
                return None;
            }
            populated += 1;
            let value = raw.parse::<f64>().ok();
            if value.is_some() {
                parsed += 1;
            }
            value
        })
        .collect();

    if populated > 0 && parsed == 0 {
        return Err(ReshapeError::ColumnNotNumeric {
            column: name.to_string(),
            rows: populated,
        });
    }

    Ok(Series::new(name.into(), values))
}

fn date_series(df: &DataFrame, name: &str) -> Result<Series, ReshapeError> {
    let ca = text_column(df, name)?;
    let mut populated = 0usize;
    let mut parsed = 0usize;
    let millis: Vec<Option<i64>> = ca
        .into_iter()
        .map(|cell| {
            let raw = cell?.trim();
            if raw.is_empty() {
                return None;
            }
            populated += 1;
            let value = parse_instant_millis(raw);
            if value.is_some() {
                parsed += 1;
            }
            value
        })
        .collect();

    if populated > 0 && parsed == 0 {
        return Err(ReshapeError::ColumnNotDate {
            column: name.to_string(),
            rows: populated,
        });
    }

    let series = Series::new(name.into(), millis)
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
        .and_then(|s| s.cast(&DataType::Date))
        .map_err(ReshapeError::DataFrameProcessing)?;
    Ok(series)
}

/// Decodes a cell to milliseconds since the epoch. Accepts seconds since
/// 1970-01-01T00:00:00Z (the DAP time encoding), ISO 8601 instants, and
/// plain `YYYY-MM-DD` dates.
fn parse_instant_millis(raw: &str) -> Option<i64> {
    if let Ok(seconds) = raw.parse::<f64>() {
        return Some((seconds * 1000.0) as i64);
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.timestamp_millis());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_frame() -> TabularFrame {
        let df = df!(
            "cruise" => &["200301", "200301", "200402"],
            "time" => &["2003-06-01T12:00:00Z", "1054468800", "bad-date"],
            "bottom_temperature" => &["6.4", "not-a-number", "7.1"],
        )
        .unwrap();
        TabularFrame::from_dataframe(df)
    }

    #[test]
    fn unparseable_numeric_cells_become_missing() {
        let typed = raw_frame()
            .normalize(&[("bottom_temperature", ColumnKind::Numeric)])
            .unwrap();
        let df = typed.collect().unwrap();
        let temp = df.column("bottom_temperature").unwrap().f64().unwrap();
        assert_eq!(temp.get(0), Some(6.4));
        assert_eq!(temp.get(1), None);
        assert_eq!(temp.get(2), Some(7.1));
    }

    #[test]
    fn fully_unparseable_numeric_column_is_fatal() {
        let df = df!("depth" => &["shallow", "deep"]).unwrap();
        let err = TabularFrame::from_dataframe(df)
            .normalize(&[("depth", ColumnKind::Numeric)])
            .err();
        assert!(matches!(
            err,
            Some(ReshapeError::ColumnNotNumeric { rows: 2, .. })
        ));
    }

    #[test]
    fn dates_decode_from_iso_and_epoch_seconds() {
        let typed = raw_frame().normalize(&[("time", ColumnKind::Date)]).unwrap();
        let df = typed.collect().unwrap();
        let time = df.column("time").unwrap().date().unwrap();
        // 2003-06-01 is 12204 days after 1970-01-01; both encodings land on it.
        assert_eq!(time.get(0), Some(12204));
        assert_eq!(time.get(1), Some(12204));
        assert_eq!(time.get(2), None);
    }

    #[test]
    fn categorical_columns_are_untouched() {
        let typed = raw_frame()
            .normalize(&[("cruise", ColumnKind::Categorical)])
            .unwrap();
        let df = typed.collect().unwrap();
        assert_eq!(df.column("cruise").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn empty_column_is_not_an_error() {
        let df = df!("v" => &[None::<&str>, None::<&str>]).unwrap();
        let typed = TabularFrame::from_dataframe(df)
            .normalize(&[("v", ColumnKind::Numeric)])
            .unwrap();
        let df = typed.collect().unwrap();
        assert_eq!(df.column("v").unwrap().f64().unwrap().null_count(), 2);
    }
}
