mod catalog;
mod clients;
mod dap;
mod erddap;
mod error;
mod reshape;
mod types;

pub use erddap::*;
pub use error::ErddapError;

pub use clients::griddap_client::*;
pub use clients::tabledap_client::*;

pub use catalog::dataset_info::{AxisVariable, DatasetInfo, DataVariable};
pub use dap::query::{
    Constraint, ConstraintOp, ConstraintValue, DimensionRange, TimeBound, TimeRange,
};

pub use types::grid::{Grid, GridAxis, GridField};
pub use types::tabular_frame::TabularFrame;

pub use reshape::aggregate::{anomalies, climatology, group_means, rollup};
pub use reshape::normalize::ColumnKind;
pub use reshape::regrid::{even_axis, interpolate_scattered};

pub use catalog::error::CatalogError;
pub use dap::error::DapError;
pub use reshape::error::ReshapeError;
