//! Terrain derivatives used by the CS-map pipeline
//!
//! - Slope: steepness from the elevation gradient
//! - Gaussian filter: smoothing before curvature
//! - Curvature: general (default), plan and profile curvature

mod curvature;
mod slope;
mod smoothing;

pub use curvature::{curvature, Curvature, CurvatureParams, CurvatureType};
pub use slope::{slope, Slope};
pub use smoothing::{gaussian_filter, gaussian_kernel, GaussianFilter, GaussianParams};

use csmap_core::{Error, Result};
use ndarray::ArrayView2;

/// Fail unless `grid` has room for at least one cell after shrinking `radius` per side
pub(crate) fn require_interior(grid: &ArrayView2<'_, f64>, radius: usize) -> Result<()> {
    let (rows, cols) = grid.dim();
    if rows <= 2 * radius || cols <= 2 * radius {
        return Err(Error::InvalidDimensions {
            width: cols,
            height: rows,
        });
    }
    Ok(())
}
