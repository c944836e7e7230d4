//! Provides the `GriddapClient` for requesting gridded (multi-dimensional
//! array) data.
//!
//! Obtained via [`Erddap::griddap()`]; the builder collects the requested
//! fields and per-dimension inclusive ranges, then `.call()` performs the
//! catalog lookup, validation, one blocking round trip, and grid assembly.

use crate::dap::query::{DimensionRange, TimeRange};
use crate::erddap::Erddap;
use crate::error::ErddapError;
use crate::types::grid::Grid;
use bon::bon;

/// A request builder for gridded data.
///
/// # Example
///
/// ```no_run
/// use erddap_client::{Erddap, ErddapError, TimeRange};
///
/// fn main() -> Result<(), ErddapError> {
///     let client = Erddap::new();
///     let grid = client
///         .griddap()
///         .dataset("jplMURSST41")
///         .fields(vec!["analysed_sst".to_string()])
///         .time(TimeRange::latest())
///         .latitude((31.0, 33.0))
///         .longitude((-120.0, -118.0))
///         .call()?;
///     println!("shape {:?}", grid.shape());
///     Ok(())
/// }
/// ```
pub struct GriddapClient<'a> {
    client: &'a Erddap,
}

#[bon]
impl<'a> GriddapClient<'a> {
    pub(crate) fn new(client: &'a Erddap) -> Self {
        Self { client }
    }

    /// Initiates a gridded request against one dataset.
    ///
    /// Required: `.fields(...)`, the measured quantities to retrieve.
    /// Optional: `.time(TimeRange)` plus `.latitude`, `.longitude`,
    /// `.depth`, `.altitude` inclusive `(min, max)` pairs; any other axis
    /// the dataset declares can be bounded through `.ranges(...)` with
    /// explicit [`DimensionRange`] values. Dimensions the caller leaves
    /// unconstrained span their full reported coverage. The request is
    /// all-or-nothing: validation, transport, or assembly failures surface
    /// with no partial [`Grid`].
    #[builder(start_fn = dataset)]
    #[doc(hidden)]
    pub fn build_dataset(
        &self,
        #[builder(start_fn)] dataset_id: &str,
        fields: Vec<String>,
        time: Option<TimeRange>,
        latitude: Option<(f64, f64)>,
        longitude: Option<(f64, f64)>,
        depth: Option<(f64, f64)>,
        altitude: Option<(f64, f64)>,
        ranges: Option<Vec<DimensionRange>>,
    ) -> Result<Grid, ErddapError> {
        let ranges = collect_ranges(latitude, longitude, depth, altitude, ranges);
        self.client
            .fetch_gridded(dataset_id, &fields, time.as_ref(), &ranges)
    }
}

fn collect_ranges(
    latitude: Option<(f64, f64)>,
    longitude: Option<(f64, f64)>,
    depth: Option<(f64, f64)>,
    altitude: Option<(f64, f64)>,
    extra: Option<Vec<DimensionRange>>,
) -> Vec<DimensionRange> {
    let mut ranges = Vec::new();
    for (axis, range) in [
        ("latitude", latitude),
        ("longitude", longitude),
        ("depth", depth),
        ("altitude", altitude),
    ] {
        if let Some((min, max)) = range {
            ranges.push(DimensionRange::new(axis, min, max));
        }
    }
    ranges.extend(extra.unwrap_or_default());
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dap::query::TimeRange;

    #[test]
    fn named_bounds_and_extra_axis_ranges_merge_in_order() {
        let ranges = collect_ranges(
            Some((30.0, 32.0)),
            None,
            Some((0.0, 100.0)),
            None,
            Some(vec![crate::DimensionRange::new("wavelength", 412.0, 443.0)]),
        );
        assert_eq!(
            ranges,
            vec![
                DimensionRange::new("latitude", 30.0, 32.0),
                DimensionRange::new("depth", 0.0, 100.0),
                DimensionRange::new("wavelength", 412.0, 443.0),
            ]
        );
    }

    // Live round trip against the default server; run explicitly with
    // `cargo test -- --ignored` when online.
    #[test]
    #[ignore = "requires network access to the public ERDDAP server"]
    fn sst_bounding_box_is_plausible() -> Result<(), ErddapError> {
        let client = Erddap::new();
        let grid = client
            .griddap()
            .dataset("jplMURSST41")
            .fields(vec!["analysed_sst".to_string()])
            .time(TimeRange::latest())
            .latitude((31.0, 33.0))
            .longitude((-120.0, -118.0))
            .call()?;

        let latitude = grid.axis("latitude").expect("latitude axis");
        assert!(!latitude.values.is_empty());
        // The MUR grid is 0.01 degrees; returned coordinates stay within the
        // requested bound plus one grid step.
        for &lat in &latitude.values {
            assert!((30.99..=33.01).contains(&lat));
        }

        let sst = grid.field("analysed_sst").expect("sst field");
        for &cell in sst.values.iter().filter(|v| !v.is_nan()) {
            // Kelvin on this dataset; anything outside this band means we
            // mis-assembled the grid.
            assert!((260.0..=320.0).contains(&cell));
        }
        Ok(())
    }

    #[test]
    #[ignore = "requires network access to the public ERDDAP server"]
    fn catalog_dimensions_cover_a_successful_query() -> Result<(), ErddapError> {
        let client = Erddap::new();
        let info = client.dataset_info("jplMURSST41")?;
        for axis in ["time", "latitude", "longitude"] {
            assert!(info.axis(axis).is_some(), "missing axis {axis}");
        }
        assert!(info.variable("analysed_sst").is_some());
        Ok(())
    }
}
