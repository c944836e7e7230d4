//! Provides the `TabledapClient` for requesting row-oriented data with
//! filter predicates.

use crate::dap::query::Constraint;
use crate::erddap::Erddap;
use crate::error::ErddapError;
use crate::types::tabular_frame::TabularFrame;
use bon::bon;

/// A request builder for tabular data, obtained via [`Erddap::tabledap()`].
///
/// # Example
///
/// ```no_run
/// use erddap_client::{Constraint, Erddap};
/// use chrono::{TimeZone, Utc};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = Erddap::new();
///     let catch = client
///         .tabledap()
///         .dataset("erdCalCOFIlrvcntSBtoSC")
///         .fields(vec![
///             "scientific_name".to_string(),
///             "time".to_string(),
///             "larvae_10m2".to_string(),
///         ])
///         .constraints(vec![
///             Constraint::equals("scientific_name", "Sardinops sagax"),
///             Constraint::at_least("time", Utc.with_ymd_and_hms(2010, 1, 1, 0, 0, 0).unwrap()),
///         ])
///         .call()?;
///     println!("{}", catch.collect()?);
///     Ok(())
/// }
/// ```
pub struct TabledapClient<'a> {
    client: &'a Erddap,
}

#[bon]
impl<'a> TabledapClient<'a> {
    pub(crate) fn new(client: &'a Erddap) -> Self {
        Self { client }
    }

    /// Initiates a tabular request against one dataset: `.fields(...)` to
    /// project, optional `.constraints(...)` of the form
    /// `field operator literal`. Every returned column is text until
    /// [`TabularFrame::normalize`] assigns types.
    #[builder(start_fn = dataset)]
    #[doc(hidden)]
    pub fn build_dataset(
        &self,
        #[builder(start_fn)] dataset_id: &str,
        fields: Vec<String>,
        constraints: Option<Vec<Constraint>>,
    ) -> Result<TabularFrame, ErddapError> {
        self.client
            .fetch_tabular(dataset_id, &fields, constraints.as_deref().unwrap_or(&[]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reshape::normalize::ColumnKind;
    use chrono::{TimeZone, Utc};

    #[test]
    #[ignore = "requires network access to the public ERDDAP server"]
    fn species_filter_holds_for_every_returned_row() -> Result<(), ErddapError> {
        let client = Erddap::new();
        let start = Utc.with_ymd_and_hms(2005, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2010, 12, 31, 0, 0, 0).unwrap();
        let frame = client
            .tabledap()
            .dataset("erdCalCOFIlrvcntSBtoSC")
            .fields(vec![
                "scientific_name".to_string(),
                "time".to_string(),
                "larvae_10m2".to_string(),
            ])
            .constraints(vec![
                Constraint::equals("scientific_name", "Sardinops sagax"),
                Constraint::at_least("time", start),
                Constraint::at_most("time", end),
            ])
            .call()?;

        let typed = frame.normalize(&[
            ("time", ColumnKind::Date),
            ("larvae_10m2", ColumnKind::Numeric),
        ])?;
        let df = typed.collect().map_err(crate::ReshapeError::from)?;
        assert!(df.height() > 0, "expected some larval catch rows");

        let species = df.column("scientific_name").unwrap().str().unwrap();
        for row in species.into_iter().flatten() {
            assert_eq!(row, "Sardinops sagax");
        }

        let days = df.column("time").unwrap().date().unwrap();
        let lo = (start.timestamp() / 86_400) as i32;
        let hi = (end.timestamp() / 86_400) as i32;
        for day in days.into_iter().flatten() {
            assert!((lo..=hi).contains(&day));
        }
        Ok(())
    }
}
