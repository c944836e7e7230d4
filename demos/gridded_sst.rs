use erddap_client::{Erddap, ErddapError, TimeRange};

fn main() -> Result<(), ErddapError> {
    env_logger::init();

    let client = Erddap::new();

    // One time step of MUR SST over the Southern California Bight.
    let grid = client
        .griddap()
        .dataset("jplMURSST41")
        .fields(vec!["analysed_sst".to_string()])
        .time(TimeRange::latest())
        .latitude((31.0, 33.0))
        .longitude((-120.0, -118.0))
        .call()?;

    println!("grid shape: {:?}", grid.shape());
    for axis in &grid.axes {
        println!(
            "axis {}: {} points, [{:.3}, {:.3}]",
            axis.name,
            axis.values.len(),
            axis.values.first().copied().unwrap_or(f64::NAN),
            axis.values.last().copied().unwrap_or(f64::NAN),
        );
    }

    let sst = grid.field("analysed_sst").expect("requested field");
    let valid: Vec<f64> = sst.values.iter().copied().filter(|v| !v.is_nan()).collect();
    let mean = valid.iter().sum::<f64>() / valid.len() as f64;
    println!(
        "{} valid cells, mean analysed_sst = {:.2}",
        valid.len(),
        mean
    );

    // Relabel the nominally even satellite grid onto exact even axes before
    // handing it to a renderer.
    let even = grid.with_even_axes();
    println!(
        "even latitude step: {:.6}",
        even.axis("latitude").unwrap().values[1] - even.axis("latitude").unwrap().values[0]
    );

    Ok(())
}
