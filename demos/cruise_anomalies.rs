//! The full reshaping pipeline on a survey table: per-cruise means, a
//! monthly climatology, anomalies against it, and an annual rollup.

use chrono::{TimeZone, Utc};
use erddap_client::{
    anomalies, climatology, group_means, rollup, ColumnKind, Constraint, Erddap, ErddapError,
    ReshapeError,
};
use polars::prelude::*;

fn main() -> Result<(), ErddapError> {
    env_logger::init();

    let client = Erddap::new();

    let frame = client
        .tabledap()
        .dataset("erdCalCOFIlrvcntSBtoSC")
        .fields(vec![
            "cruise".to_string(),
            "time".to_string(),
            "larvae_10m2".to_string(),
        ])
        .constraints(vec![Constraint::at_least(
            "time",
            Utc.with_ymd_and_hms(1990, 1, 1, 0, 0, 0).unwrap(),
        )])
        .call()?;

    let typed = frame.normalize(&[
        ("cruise", ColumnKind::Categorical),
        ("time", ColumnKind::Date),
        ("larvae_10m2", ColumnKind::Numeric),
    ])?;

    // Derive month and year keys from the observation date.
    let keyed = erddap_client::TabularFrame::new(
        typed
            .frame
            .clone()
            .with_column(col("time").dt().month().cast(DataType::Int32).alias("month"))
            .with_column(col("time").dt().year().cast(DataType::Int32).alias("year")),
    );

    let per_cruise = group_means(&keyed, &["cruise"], &["larvae_10m2"], &["month", "year"]);
    // The carried medians come back as floats; restore integer keys so the
    // climatology join lines up.
    let per_cruise = erddap_client::TabularFrame::new(
        per_cruise
            .frame
            .clone()
            .with_column(col("month").cast(DataType::Int32))
            .with_column(col("year").cast(DataType::Int32)),
    );
    let monthly = climatology(&keyed, "month", &["larvae_10m2"]);
    let with_anomalies = anomalies(&per_cruise, &monthly, "month", &["larvae_10m2"]);
    let annual = rollup(&with_anomalies, "year", &["larvae_10m2_anom"]);

    let df = annual.collect().map_err(ReshapeError::from)?;
    println!("annual larval-abundance anomalies:\n{}", df);

    Ok(())
}
