//! Slope calculation from DEMs
//!
//! Central differences over the 4-neighborhood of each interior cell:
//!
//! ```text
//!      n
//!   w  c  e       p = (z_east - z_west) / 2
//!      s          q = (z_north - z_south) / 2
//!                 slope = atan(sqrt(p² + q²))
//! ```
//!
//! Differences are taken in pixel units; the result is in radians. The output
//! loses one row/column on every side.

use super::require_interior;
use crate::maybe_rayon::*;
use csmap_core::raster::Raster;
use csmap_core::{Algorithm, Error, Result};
use ndarray::{Array2, ArrayView2};

/// Slope algorithm over georeferenced rasters
#[derive(Debug, Clone, Default)]
pub struct Slope;

impl Algorithm for Slope {
    type Input = Raster<f64>;
    type Output = Raster<f64>;
    type Params = ();
    type Error = Error;

    fn name(&self) -> &'static str {
        "Slope"
    }

    fn description(&self) -> &'static str {
        "Terrain slope in radians from central differences of the 4-neighborhood"
    }

    fn execute(&self, input: Self::Input, _params: Self::Params) -> Result<Self::Output> {
        let field = slope(input.view())?;
        let mut output = input.with_data(field);
        output.set_transform(input.transform().shifted(1, 1));
        Ok(output)
    }
}

/// Calculate slope (radians) of every interior cell.
///
/// # Returns
/// Array of shape `(rows - 2, cols - 2)`; element `(i, j)` is the slope at
/// input cell `(i + 1, j + 1)`.
pub fn slope(dem: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
    require_interior(&dem, 1)?;
    let (rows, cols) = dem.dim();
    let (out_rows, out_cols) = (rows - 2, cols - 2);

    let output_data: Vec<f64> = (0..out_rows)
        .into_par_iter()
        .flat_map(|i| {
            let row = i + 1;
            let mut row_data = Vec::with_capacity(out_cols);
            for col in 1..cols - 1 {
                let p = (dem[(row, col + 1)] - dem[(row, col - 1)]) / 2.0;
                let q = (dem[(row - 1, col)] - dem[(row + 1, col)]) / 2.0;
                row_data.push((p * p + q * q).sqrt().atan());
            }
            row_data
        })
        .collect();

    Array2::from_shape_vec((out_rows, out_cols), output_data)
        .map_err(|e| Error::Other(e.to_string()))
}
