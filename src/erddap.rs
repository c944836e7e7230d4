//! The main entry point for talking to an ERDDAP server. An [`Erddap`]
//! value holds the server base URL and the HTTP machinery; per-protocol
//! request builders are obtained from it via [`Erddap::griddap`] and
//! [`Erddap::tabledap`], and raw metadata via [`Erddap::dataset_info`].

use crate::catalog::dataset_info::{fetch_dataset_info, DatasetInfo};
use crate::clients::griddap_client::GriddapClient;
use crate::clients::tabledap_client::TabledapClient;
use crate::dap::loader::DapLoader;
use crate::dap::query::{
    render_gridded_url, render_tabular_url, Constraint, DimensionRange, TimeRange,
};
use crate::error::ErddapError;
use crate::types::grid::Grid;
use crate::types::tabular_frame::TabularFrame;

/// The NOAA CoastWatch ERDDAP, a stable public server carrying the usual
/// satellite SST/chlorophyll products and fisheries survey tables.
pub const DEFAULT_SERVER_URL: &str = "https://coastwatch.pfeg.noaa.gov/erddap";

/// A client for one ERDDAP server.
///
/// Every operation is a single synchronous round trip: no retries, no
/// caching, no shared state between calls. A pipeline run that needs a
/// deadline should wrap the call on the caller's side.
///
/// # Example
///
/// ```no_run
/// use erddap_client::{Erddap, ErddapError};
///
/// fn main() -> Result<(), ErddapError> {
///     let client = Erddap::new();
///     let info = client.dataset_info("jplMURSST41")?;
///     println!(
///         "{} axes, {} variables",
///         info.axes.len(),
///         info.variables.len()
///     );
///     Ok(())
/// }
/// ```
pub struct Erddap {
    server_url: String,
    loader: DapLoader,
}

impl Erddap {
    /// A client against the default server, [`DEFAULT_SERVER_URL`].
    pub fn new() -> Self {
        Self::with_server_url(DEFAULT_SERVER_URL)
    }

    /// A client against a specific ERDDAP installation, e.g.
    /// `https://upwell.pfeg.noaa.gov/erddap`. A trailing slash is fine.
    pub fn with_server_url(server_url: &str) -> Self {
        Self {
            server_url: server_url.trim_end_matches('/').to_string(),
            loader: DapLoader::new(),
        }
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Fetches the catalog description of one dataset: its axes, variables,
    /// units, and coordinate ranges. Fails with
    /// [`CatalogError::DatasetNotFound`](crate::CatalogError::DatasetNotFound)
    /// when the identifier is unknown to the server.
    pub fn dataset_info(&self, dataset_id: &str) -> Result<DatasetInfo, ErddapError> {
        Ok(fetch_dataset_info(
            self.loader.http(),
            &self.server_url,
            dataset_id,
        )?)
    }

    /// A request builder for gridded (griddap) data.
    pub fn griddap(&self) -> GriddapClient<'_> {
        GriddapClient::new(self)
    }

    /// A request builder for tabular (tabledap) data.
    pub fn tabledap(&self) -> TabledapClient<'_> {
        TabledapClient::new(self)
    }

    /// Catalog lookup, validation, one round trip, grid assembly.
    pub(crate) fn fetch_gridded(
        &self,
        dataset_id: &str,
        fields: &[String],
        time: Option<&TimeRange>,
        ranges: &[DimensionRange],
    ) -> Result<Grid, ErddapError> {
        let info = self.dataset_info(dataset_id)?;
        let url = render_gridded_url(&self.server_url, &info, fields, time, ranges)?;
        let df = self.loader.fetch_table(&url, dataset_id)?;
        let axis_names: Vec<String> = info.axes.iter().map(|a| a.name.clone()).collect();
        Ok(Grid::from_long_format(&df, &axis_names, dataset_id)?)
    }

    /// Catalog lookup, validation, one round trip, all-text table.
    pub(crate) fn fetch_tabular(
        &self,
        dataset_id: &str,
        fields: &[String],
        constraints: &[Constraint],
    ) -> Result<TabularFrame, ErddapError> {
        let info = self.dataset_info(dataset_id)?;
        let url = render_tabular_url(&self.server_url, &info, fields, constraints)?;
        let df = self.loader.fetch_table(&url, dataset_id)?;
        Ok(TabularFrame::from_dataframe(df))
    }
}

impl Default for Erddap {
    fn default() -> Self {
        Self::new()
    }
}
