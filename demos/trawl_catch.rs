use chrono::{TimeZone, Utc};
use erddap_client::{ColumnKind, Constraint, Erddap, ErddapError};

fn main() -> Result<(), ErddapError> {
    env_logger::init();

    let client = Erddap::new();

    // CalCOFI larval counts for Pacific sardine, 2005 onward.
    let frame = client
        .tabledap()
        .dataset("erdCalCOFIlrvcntSBtoSC")
        .fields(vec![
            "scientific_name".to_string(),
            "time".to_string(),
            "latitude".to_string(),
            "longitude".to_string(),
            "larvae_10m2".to_string(),
        ])
        .constraints(vec![
            Constraint::equals("scientific_name", "Sardinops sagax"),
            Constraint::at_least("time", Utc.with_ymd_and_hms(2005, 1, 1, 0, 0, 0).unwrap()),
        ])
        .call()?;

    let typed = frame.normalize(&[
        ("scientific_name", ColumnKind::Categorical),
        ("time", ColumnKind::Date),
        ("latitude", ColumnKind::Numeric),
        ("longitude", ColumnKind::Numeric),
        ("larvae_10m2", ColumnKind::Numeric),
    ])?;

    let df = typed.collect().map_err(erddap_client::ReshapeError::from)?;
    println!("{} rows", df.height());
    println!("{}", df.head(Some(10)));

    Ok(())
}
