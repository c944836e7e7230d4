//! Re-expressing values on evenly spaced coordinate grids.
//!
//! Two independent strategies, chosen by the caller from the data's shape:
//! axis relabeling for grids whose spacing is nominally even but recorded
//! with floating-point jitter, and scattered interpolation for genuinely
//! irregular coordinates.

use crate::reshape::error::ReshapeError;
use crate::types::grid::{Grid, GridAxis, GridField};
use ndarray::Array2;

/// Builds an evenly spaced sequence spanning the same endpoints as `values`,
/// with the same point count and the same orientation (ascending axes stay
/// ascending, descending stay descending). Idempotent on an already even
/// axis, up to floating-point tolerance.
pub fn even_axis(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    if n < 2 {
        return values.to_vec();
    }
    let first = values[0];
    let last = values[n - 1];
    let step = (last - first) / (n - 1) as f64;
    (0..n).map(|i| first + step * i as f64).collect()
}

impl Grid {
    /// Relabels every coordinate axis with an evenly spaced sequence over
    /// the same span and point count. Cell values are untouched; this
    /// corrects recorded jitter in a nominally regular grid, and is safe
    /// precisely because grid assembly already asserted row-major raster
    /// order against the original axis labels.
    pub fn with_even_axes(&self) -> Grid {
        Grid {
            axes: self
                .axes
                .iter()
                .map(|a| GridAxis {
                    name: a.name.clone(),
                    values: even_axis(&a.values),
                })
                .collect(),
            fields: self.fields.clone(),
        }
    }
}

/// Interpolates scattered `(x, y, value)` samples onto a regular target grid
/// spanning the samples' bounding box, `nx` by `ny` points, by deterministic
/// inverse-distance weighting. Samples with a non-finite coordinate or value
/// are dropped first; fewer than 3 surviving samples is an error, never a
/// degenerate grid.
///
/// The result's axes are named `y` and `x` (row-major, `x` fastest) and the
/// single field carries `field_name`.
pub fn interpolate_scattered(
    xs: &[f64],
    ys: &[f64],
    values: &[f64],
    nx: usize,
    ny: usize,
    field_name: &str,
) -> Result<Grid, ReshapeError> {
    if nx == 0 || ny == 0 {
        return Err(ReshapeError::EmptyTargetGrid);
    }

    let samples: Vec<(f64, f64, f64)> = xs
        .iter()
        .zip(ys)
        .zip(values)
        .map(|((&x, &y), &v)| (x, y, v))
        .filter(|(x, y, v)| x.is_finite() && y.is_finite() && v.is_finite())
        .collect();
    if samples.len() < 3 {
        return Err(ReshapeError::InsufficientData(samples.len()));
    }

    let (x_min, x_max) = bounds(samples.iter().map(|s| s.0));
    let (y_min, y_max) = bounds(samples.iter().map(|s| s.1));
    let target_x = linspace(x_min, x_max, nx);
    let target_y = linspace(y_min, y_max, ny);

    let mut cells = Vec::with_capacity(nx * ny);
    for &gy in &target_y {
        for &gx in &target_x {
            cells.push(idw_at(gx, gy, &samples));
        }
    }
    let array = Array2::from_shape_vec((ny, nx), cells)
        .expect("target cell count matches ny * nx")
        .into_dyn();

    Ok(Grid {
        axes: vec![
            GridAxis {
                name: "y".to_string(),
                values: target_y,
            },
            GridAxis {
                name: "x".to_string(),
                values: target_x,
            },
        ],
        fields: vec![GridField {
            name: field_name.to_string(),
            values: array,
        }],
    })
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

fn linspace(min: f64, max: f64, n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![min];
    }
    let step = (max - min) / (n - 1) as f64;
    (0..n).map(|i| min + step * i as f64).collect()
}

/// Inverse-distance weight with power 2. A sample closer than `EXACT_EPS`
/// wins outright so grid nodes that coincide with a sample reproduce it.
fn idw_at(gx: f64, gy: f64, samples: &[(f64, f64, f64)]) -> f64 {
    const EXACT_EPS: f64 = 1e-12;

    let mut weight_sum = 0.0;
    let mut weighted_value = 0.0;
    for &(x, y, v) in samples {
        let d2 = (x - gx).powi(2) + (y - gy).powi(2);
        if d2 < EXACT_EPS {
            return v;
        }
        let w = 1.0 / d2;
        weight_sum += w;
        weighted_value += w * v;
    }
    weighted_value / weight_sum
}
