//! Surface curvature from a smoothed DEM
//!
//! Second-order derivatives from the 9-parameter quadratic fit over a 3x3
//! neighborhood (Zevenbergen & Thorne 1987). Neighbors are sampled `k`
//! cells away from the center, with `k` the curvature cell size, and the
//! grid spacing of the finite differences is `k`:
//!
//! ```text
//! z1 z2 z3        r = ((z2 + z8) / 2 - z5) / k²        north-south
//! z4 z5 z6        t = ((z4 + z6) / 2 - z5) / k²        east-west
//! z7 z8 z9        s = (-z1 + z3 + z7 - z9) / (4k²)
//!                 p = (z6 - z4) / (2k),  q = (z2 - z8) / (2k)
//! ```
//!
//! Curvatures:
//!   General  = -2 (r + t)
//!   Plan     =  2 (t q² + r p² - s p q) / (p² + q²)
//!   Profile  = -2 (t p² + r q² + s p q) / (p² + q²)
//!
//! General curvature is negative in valleys (concave up) and positive on
//! ridges. The output loses `k` rows/columns on every side.

use super::require_interior;
use crate::maybe_rayon::*;
use csmap_core::raster::Raster;
use csmap_core::{Algorithm, Error, Result};
use ndarray::{Array2, ArrayView2};

/// Below this gradient magnitude plan/profile curvature are reported as 0
const FLAT_GRADIENT_SQ: f64 = 1e-20;

/// Which curvature to compute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CurvatureType {
    /// General curvature: -2 (r + t)
    #[default]
    General,
    /// Plan curvature: perpendicular to the slope direction
    Plan,
    /// Profile curvature: along the direction of maximum slope
    Profile,
}

impl CurvatureType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Plan => "plan",
            Self::Profile => "profile",
        }
    }
}

/// Parameters for curvature calculation
#[derive(Debug, Clone, Copy)]
pub struct CurvatureParams {
    /// Stencil offset and grid spacing in cells (>= 1)
    pub cell_size: usize,
    pub curvature_type: CurvatureType,
}

impl Default for CurvatureParams {
    fn default() -> Self {
        Self {
            cell_size: 1,
            curvature_type: CurvatureType::General,
        }
    }
}

/// Curvature algorithm over georeferenced rasters
#[derive(Debug, Clone, Default)]
pub struct Curvature;

impl Algorithm for Curvature {
    type Input = Raster<f64>;
    type Output = Raster<f64>;
    type Params = CurvatureParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Curvature"
    }

    fn description(&self) -> &'static str {
        "Surface curvature from a 3x3 quadratic fit (Zevenbergen & Thorne 1987)"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        let field = curvature(input.view(), params.cell_size, params.curvature_type)?;
        let k = params.cell_size;
        let mut output = input.with_data(field);
        output.set_transform(input.transform().shifted(k, k));
        Ok(output)
    }
}

/// Calculate curvature of every cell at least `cell_size` cells from the border.
///
/// # Returns
/// Array of shape `(rows - 2k, cols - 2k)`; element `(i, j)` belongs to input
/// cell `(i + k, j + k)`.
pub fn curvature(
    dem: ArrayView2<'_, f64>,
    cell_size: usize,
    curvature_type: CurvatureType,
) -> Result<Array2<f64>> {
    if cell_size == 0 {
        return Err(Error::InvalidParameter {
            name: "cvt_size",
            value: cell_size.to_string(),
            reason: "must be at least 1".into(),
        });
    }
    require_interior(&dem, cell_size)?;

    let k = cell_size;
    let (rows, cols) = dem.dim();
    let (out_rows, out_cols) = (rows - 2 * k, cols - 2 * k);
    let spacing = k as f64;
    let spacing_sq = spacing * spacing;

    let output_data: Vec<f64> = (0..out_rows)
        .into_par_iter()
        .flat_map(|i| {
            let row = i + k;
            let mut row_data = Vec::with_capacity(out_cols);
            for col in k..cols - k {
                let z2 = dem[(row - k, col)];
                let z4 = dem[(row, col - k)];
                let z5 = dem[(row, col)];
                let z6 = dem[(row, col + k)];
                let z8 = dem[(row + k, col)];

                let r = ((z2 + z8) / 2.0 - z5) / spacing_sq;
                let t = ((z4 + z6) / 2.0 - z5) / spacing_sq;

                let value = match curvature_type {
                    CurvatureType::General => -2.0 * (r + t),
                    directional => {
                        let z1 = dem[(row - k, col - k)];
                        let z3 = dem[(row - k, col + k)];
                        let z7 = dem[(row + k, col - k)];
                        let z9 = dem[(row + k, col + k)];

                        let s = (-z1 + z3 + z7 - z9) / (4.0 * spacing_sq);
                        let p = (z6 - z4) / (2.0 * spacing);
                        let q = (z2 - z8) / (2.0 * spacing);
                        let p2q2 = p * p + q * q;

                        if p2q2 < FLAT_GRADIENT_SQ {
                            0.0
                        } else if directional == CurvatureType::Plan {
                            2.0 * (t * q * q + r * p * p - s * p * q) / p2q2
                        } else {
                            -2.0 * (t * p * p + r * q * q + s * p * q) / p2q2
                        }
                    }
                };
                row_data.push(value);
            }
            row_data
        })
        .collect();

    Array2::from_shape_vec((out_rows, out_cols), output_data)
        .map_err(|e| Error::Other(e.to_string()))
}
