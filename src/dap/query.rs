//! Bounded query construction for the griddap and tabledap protocols.
//!
//! A query is validated against the dataset's catalog description before it
//! is rendered: unknown fields or dimensions and out-of-bounds ranges are
//! rejected here, so an invalid request never reaches the server.

use crate::catalog::dataset_info::DatasetInfo;
use crate::dap::error::DapError;
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use std::fmt;

/// One bound of a time range.
///
/// `Latest` renders as ERDDAP's `last` keyword. `Earliest` has no server-side
/// keyword and is resolved against the catalog's reported time coverage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeBound {
    Instant(DateTime<Utc>),
    Earliest,
    Latest,
}

/// An inclusive time interval for gridded queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    pub start: TimeBound,
    pub end: TimeBound,
}

impl TimeRange {
    pub fn new(start: TimeBound, end: TimeBound) -> Self {
        Self { start, end }
    }

    /// The single most recent time step the server has.
    pub fn latest() -> Self {
        Self::new(TimeBound::Latest, TimeBound::Latest)
    }

    /// The dataset's full time coverage.
    pub fn full() -> Self {
        Self::new(TimeBound::Earliest, TimeBound::Latest)
    }

    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::new(TimeBound::Instant(start), TimeBound::Instant(end))
    }
}

/// Comparison operator of a tabledap filter predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOp {
    Eq,
    Ge,
    Le,
}

impl ConstraintOp {
    fn as_str(&self) -> &'static str {
        match self {
            ConstraintOp::Eq => "=",
            ConstraintOp::Ge => ">=",
            ConstraintOp::Le => "<=",
        }
    }
}

/// Literal value of a tabledap filter predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintValue {
    Number(f64),
    Text(String),
    Time(DateTime<Utc>),
}

impl From<f64> for ConstraintValue {
    fn from(v: f64) -> Self {
        ConstraintValue::Number(v)
    }
}

impl From<&str> for ConstraintValue {
    fn from(v: &str) -> Self {
        ConstraintValue::Text(v.to_string())
    }
}

impl From<String> for ConstraintValue {
    fn from(v: String) -> Self {
        ConstraintValue::Text(v)
    }
}

impl From<DateTime<Utc>> for ConstraintValue {
    fn from(v: DateTime<Utc>) -> Self {
        ConstraintValue::Time(v)
    }
}

impl fmt::Display for ConstraintValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintValue::Number(n) => write!(f, "{}", n),
            // Tabledap string literals are double-quoted.
            ConstraintValue::Text(s) => write!(f, "\"{}\"", s),
            ConstraintValue::Time(t) => write!(f, "{}", iso_instant(*t)),
        }
    }
}

/// A tabledap filter predicate of the form `field operator literal`.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub field: String,
    pub op: ConstraintOp,
    pub value: ConstraintValue,
}

impl Constraint {
    pub fn new(field: &str, op: ConstraintOp, value: impl Into<ConstraintValue>) -> Self {
        Self {
            field: field.to_string(),
            op,
            value: value.into(),
        }
    }

    pub fn equals(field: &str, value: impl Into<ConstraintValue>) -> Self {
        Self::new(field, ConstraintOp::Eq, value)
    }

    pub fn at_least(field: &str, value: impl Into<ConstraintValue>) -> Self {
        Self::new(field, ConstraintOp::Ge, value)
    }

    pub fn at_most(field: &str, value: impl Into<ConstraintValue>) -> Self {
        Self::new(field, ConstraintOp::Le, value)
    }

    fn render(&self) -> String {
        format!("{}{}{}", self.field, self.op.as_str(), self.value)
    }
}

/// A named inclusive interval over a non-time grid axis.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionRange {
    pub axis: String,
    pub min: f64,
    pub max: f64,
}

impl DimensionRange {
    pub fn new(axis: &str, min: f64, max: f64) -> Self {
        Self {
            axis: axis.to_string(),
            min,
            max,
        }
    }
}

fn iso_instant(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn iso_epoch_seconds(secs: f64) -> String {
    let instant = Utc
        .timestamp_opt(secs as i64, 0)
        .single()
        .unwrap_or_else(|| Utc.timestamp_opt(0, 0).unwrap());
    iso_instant(instant)
}

/// Renders a griddap request URL, validating fields and ranges against the
/// catalog description first.
///
/// Every axis the dataset declares gets a bracket selector, in the dataset's
/// axis order. Unconstrained axes span their full reported coverage; an axis
/// with no reported coverage cannot be spanned and is an error.
pub(crate) fn render_gridded_url(
    base_url: &str,
    info: &DatasetInfo,
    fields: &[String],
    time: Option<&TimeRange>,
    ranges: &[DimensionRange],
) -> Result<String, DapError> {
    for field in fields {
        if info.variable(field).is_none() {
            return Err(DapError::UnknownField {
                dataset_id: info.dataset_id.clone(),
                field: field.clone(),
            });
        }
    }
    if time.is_some() && info.axis("time").is_none() {
        return Err(DapError::UnknownAxis {
            dataset_id: info.dataset_id.clone(),
            axis: "time".to_string(),
        });
    }
    for range in ranges {
        let axis = info.axis(&range.axis).ok_or_else(|| DapError::UnknownAxis {
            dataset_id: info.dataset_id.clone(),
            axis: range.axis.clone(),
        })?;
        if let Some((lo, hi)) = axis.actual_range {
            if range.min < lo || range.max > hi {
                return Err(DapError::RangeOutOfBounds {
                    dataset_id: info.dataset_id.clone(),
                    axis: range.axis.clone(),
                    requested_min: range.min,
                    requested_max: range.max,
                    bound_min: lo,
                    bound_max: hi,
                });
            }
        }
    }

    let mut brackets = String::new();
    for axis in &info.axes {
        let selector = if axis.name == "time" {
            render_time_selector(info, time)?
        } else if let Some(range) = ranges.iter().find(|r| r.axis == axis.name) {
            format!("({}):({})", range.min, range.max)
        } else {
            let (lo, hi) = axis.actual_range.ok_or_else(|| DapError::UnboundedAxis {
                dataset_id: info.dataset_id.clone(),
                axis: axis.name.clone(),
            })?;
            format!("({}):({})", lo, hi)
        };
        brackets.push('[');
        brackets.push_str(&selector);
        brackets.push(']');
    }

    let projection = fields
        .iter()
        .map(|f| format!("{}{}", f, brackets))
        .collect::<Vec<_>>()
        .join(",");

    Ok(format!(
        "{}/griddap/{}.csv?{}",
        base_url.trim_end_matches('/'),
        info.dataset_id,
        projection
    ))
}

fn render_time_selector(info: &DatasetInfo, time: Option<&TimeRange>) -> Result<String, DapError> {
    let range = time.copied().unwrap_or_else(TimeRange::full);
    let start = render_time_bound(info, range.start)?;
    let end = render_time_bound(info, range.end)?;
    Ok(format!("({}):({})", start, end))
}

fn render_time_bound(info: &DatasetInfo, bound: TimeBound) -> Result<String, DapError> {
    match bound {
        TimeBound::Instant(t) => Ok(iso_instant(t)),
        TimeBound::Latest => Ok("last".to_string()),
        TimeBound::Earliest => {
            let (earliest, _) = info
                .time_range()
                .ok_or_else(|| DapError::UnresolvedEarliest(info.dataset_id.clone()))?;
            Ok(iso_epoch_seconds(earliest))
        }
    }
}

/// Renders a tabledap request URL, validating the projected fields and the
/// constrained fields against the catalog description.
pub(crate) fn render_tabular_url(
    base_url: &str,
    info: &DatasetInfo,
    fields: &[String],
    constraints: &[Constraint],
) -> Result<String, DapError> {
    for field in fields {
        if !info.has_field(field) {
            return Err(DapError::UnknownField {
                dataset_id: info.dataset_id.clone(),
                field: field.clone(),
            });
        }
    }
    for constraint in constraints {
        if !info.has_field(&constraint.field) {
            return Err(DapError::UnknownField {
                dataset_id: info.dataset_id.clone(),
                field: constraint.field.clone(),
            });
        }
    }

    let mut query = fields.join(",");
    for constraint in constraints {
        query.push('&');
        query.push_str(&constraint.render());
    }

    Ok(format!(
        "{}/tabledap/{}.csv?{}",
        base_url.trim_end_matches('/'),
        info.dataset_id,
        query
    ))
}
