//! Grouped summaries, climatologies, and anomaly derivation.
//!
//! All reductions share one missing-value rule: NaN and null cells are
//! ignored, and a group with zero valid cells yields a missing mean rather
//! than an error. Group order follows first appearance in the input, so
//! results are deterministic for a given server response.

use crate::reshape::error::ReshapeError;
use crate::types::tabular_frame::TabularFrame;
use polars::prelude::*;

fn mean_ignoring_missing(column: &str) -> Expr {
    col(column).fill_nan(lit(NULL)).mean().alias(column)
}

/// One summary row per distinct key combination: the arithmetic mean of
/// each value column, plus the median of each carried-along column (a
/// representative year or month for the group).
pub fn group_means(
    frame: &TabularFrame,
    keys: &[&str],
    values: &[&str],
    carry: &[&str],
) -> TabularFrame {
    let mut aggs: Vec<Expr> = values.iter().map(|v| mean_ignoring_missing(v)).collect();
    aggs.extend(carry.iter().map(|c| col(*c).median().alias(*c)));

    let key_exprs: Vec<Expr> = keys.iter().map(|k| col(*k)).collect();
    TabularFrame::new(frame.frame.clone().group_by_stable(key_exprs).agg(aggs))
}

/// Long-run mean of each value column per period (e.g. per calendar month).
/// Output columns are suffixed `_clim` so the table can be joined back
/// against the summaries it baselines.
pub fn climatology(frame: &TabularFrame, period_key: &str, values: &[&str]) -> TabularFrame {
    let aggs: Vec<Expr> = values
        .iter()
        .map(|v| {
            col(*v)
                .fill_nan(lit(NULL))
                .mean()
                .alias(format!("{v}_clim").as_str())
        })
        .collect();
    TabularFrame::new(
        frame
            .frame
            .clone()
            .group_by_stable([col(period_key)])
            .agg(aggs),
    )
}

/// Joins group summaries against a climatology on the period key and derives
/// `{v}_anom = v - {v}_clim` per value column. A period key absent from the
/// climatology leaves that row's anomaly missing; it is not an error.
pub fn anomalies(
    summary: &TabularFrame,
    climatology: &TabularFrame,
    period_key: &str,
    values: &[&str],
) -> TabularFrame {
    let mut joined = summary.frame.clone().join(
        climatology.frame.clone(),
        [col(period_key)],
        [col(period_key)],
        JoinArgs::new(JoinType::Left),
    );
    for v in values {
        let clim = format!("{v}_clim");
        let anom = format!("{v}_anom");
        joined = joined.with_column((col(*v) - col(clim.as_str())).alias(anom.as_str()));
    }
    TabularFrame::new(joined)
}

/// Re-applies the mean-ignoring-missing rule at a coarser key (e.g. per
/// year), typically over anomaly columns.
pub fn rollup(frame: &TabularFrame, key: &str, values: &[&str]) -> TabularFrame {
    let aggs: Vec<Expr> = values.iter().map(|v| mean_ignoring_missing(v)).collect();
    TabularFrame::new(frame.frame.clone().group_by_stable([col(key)]).agg(aggs))
}

/// Convenience: collects a lazy pipeline stage, mapping polars failures into
/// the reshaping error type.
pub fn collect(frame: &TabularFrame) -> Result<DataFrame, ReshapeError> {
    frame.collect().map_err(ReshapeError::DataFrameProcessing)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cruise_frame() -> TabularFrame {
        let df = df!(
            "cruise" => &["c1", "c1", "c1", "c2", "c2", "c3"],
            "month" => &[6i32, 6, 6, 7, 7, 6],
            "year" => &[2003i32, 2003, 2003, 2003, 2003, 2004],
            "temperature" => &[3.0, f64::NAN, 5.0, f64::NAN, f64::NAN, 6.5],
        )
        .unwrap();
        TabularFrame::from_dataframe(df)
    }

    #[test]
    fn mean_ignores_nan_cells() {
        let summary = group_means(&cruise_frame(), &["cruise"], &["temperature"], &["month"]);
        let df = collect(&summary).unwrap();
        let temp = df.column("temperature").unwrap().f64().unwrap();
        assert_eq!(temp.get(0), Some(4.0)); // mean of {3, NaN, 5}
    }

    #[test]
    fn all_missing_group_yields_missing_mean() {
        let summary = group_means(&cruise_frame(), &["cruise"], &["temperature"], &[]);
        let df = collect(&summary).unwrap();
        let temp = df.column("temperature").unwrap().f64().unwrap();
        assert_eq!(temp.get(1), None); // c2 has only NaN cells
    }

    #[test]
    fn carried_columns_take_the_group_median() {
        let summary = group_means(&cruise_frame(), &["cruise"], &["temperature"], &["year"]);
        let df = collect(&summary).unwrap();
        let year = df.column("year").unwrap().f64().unwrap();
        assert_eq!(year.get(0), Some(2003.0));
        assert_eq!(year.get(2), Some(2004.0));
    }

    #[test]
    fn composite_keys_group_jointly() {
        let summary = group_means(&cruise_frame(), &["cruise", "month"], &["temperature"], &[]);
        let df = collect(&summary).unwrap();
        assert_eq!(df.height(), 3);
    }

    #[test]
    fn climatology_is_a_per_period_mean() {
        let clim = climatology(&cruise_frame(), "month", &["temperature"]);
        let df = collect(&clim).unwrap();
        let month = df.column("month").unwrap().i32().unwrap();
        let mean = df.column("temperature_clim").unwrap().f64().unwrap();
        assert_eq!(month.get(0), Some(6));
        // June cells: {3, NaN, 5, 6.5} -> 14.5 / 3
        assert!((mean.get(0).unwrap() - 14.5 / 3.0).abs() < 1e-12);
        assert_eq!(month.get(1), Some(7));
        assert_eq!(mean.get(1), None); // July is all-NaN
    }

    #[test]
    fn anomaly_is_value_minus_climatology() {
        let summary = TabularFrame::from_dataframe(
            df!(
                "cruise" => &["c1", "c2"],
                "month" => &[6i32, 12],
                "temperature" => &[5.0, 4.0],
            )
            .unwrap(),
        );
        let clim = TabularFrame::from_dataframe(
            df!(
                "month" => &[6i32],
                "temperature_clim" => &[3.0],
            )
            .unwrap(),
        );
        let df = collect(&anomalies(&summary, &clim, "month", &["temperature"])).unwrap();
        let anom = df.column("temperature_anom").unwrap().f64().unwrap();
        assert_eq!(anom.get(0), Some(2.0));
        // December is absent from the climatology: missing, not a crash.
        assert_eq!(anom.get(1), None);
    }

    #[test]
    fn rollup_reapplies_the_missing_rule_at_the_coarser_key() {
        let per_cruise = TabularFrame::from_dataframe(
            df!(
                "year" => &[2003i32, 2003, 2004],
                "temperature_anom" => &[1.0, f64::NAN, -0.5],
            )
            .unwrap(),
        );
        let df = collect(&rollup(&per_cruise, "year", &["temperature_anom"])).unwrap();
        let anom = df.column("temperature_anom").unwrap().f64().unwrap();
        assert_eq!(anom.get(0), Some(1.0));
        assert_eq!(anom.get(1), Some(-0.5));
    }
}
