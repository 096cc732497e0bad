//! Gaussian smoothing of the height grid
//!
//! Isotropic kernel `exp(-(x²+y²)/(2σ²))` over a `(2r+1)²` window with
//! `r = size / 2`, normalized to sum to 1 and applied with zero padding.
//! Cells within `r` of the border are therefore biased toward zero; callers
//! keep a margin of at least `r` and never consume them.

use crate::maybe_rayon::*;
use csmap_core::raster::Raster;
use csmap_core::{Algorithm, Error, Result};
use ndarray::{Array2, ArrayView2};

/// Parameters for Gaussian smoothing
#[derive(Debug, Clone, Copy)]
pub struct GaussianParams {
    /// Kernel width; the kernel radius is `size / 2`
    pub size: usize,
    /// Standard deviation in cell units
    pub sigma: f64,
}

impl Default for GaussianParams {
    fn default() -> Self {
        Self {
            size: 12,
            sigma: 3.0,
        }
    }
}

impl GaussianParams {
    /// Kernel radius in cells
    pub fn radius(&self) -> usize {
        self.size / 2
    }
}

/// Gaussian filter algorithm over georeferenced rasters
#[derive(Debug, Clone, Default)]
pub struct GaussianFilter;

impl Algorithm for GaussianFilter {
    type Input = Raster<f64>;
    type Output = Raster<f64>;
    type Params = GaussianParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Gaussian filter"
    }

    fn description(&self) -> &'static str {
        "Zero-padded Gaussian smoothing with a normalized (2r+1)x(2r+1) kernel"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        let smoothed = gaussian_filter(input.view(), params.size, params.sigma)?;
        Ok(input.with_data(smoothed))
    }
}

/// Build the normalized Gaussian kernel, row-major, `(2 * (size / 2) + 1)²` weights
pub fn gaussian_kernel(size: usize, sigma: f64) -> Result<Vec<f64>> {
    if !(sigma.is_finite() && sigma > 0.0) {
        return Err(Error::InvalidParameter {
            name: "gf_sigma",
            value: sigma.to_string(),
            reason: "must be a positive number".into(),
        });
    }

    let r = (size / 2) as isize;
    let two_sigma_sq = 2.0 * sigma * sigma;
    let mut kernel = Vec::with_capacity(((2 * r + 1) * (2 * r + 1)) as usize);
    for dy in -r..=r {
        for dx in -r..=r {
            let dist_sq = (dx * dx + dy * dy) as f64;
            kernel.push((-dist_sq / two_sigma_sq).exp());
        }
    }

    let sum: f64 = kernel.iter().sum();
    for w in kernel.iter_mut() {
        *w /= sum;
    }
    Ok(kernel)
}

/// Smooth `dem` with a Gaussian kernel; output has the same shape as the input.
///
/// Each output cell is the kernel-weighted sum of its neighborhood in fixed
/// row-major kernel order; samples outside the grid count as zero.
pub fn gaussian_filter(dem: ArrayView2<'_, f64>, size: usize, sigma: f64) -> Result<Array2<f64>> {
    let kernel = gaussian_kernel(size, sigma)?;
    let (rows, cols) = dem.dim();
    let r = (size / 2) as isize;
    let k = (2 * r + 1) as usize;

    let output_data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![0.0; cols];
            for (col, out) in row_data.iter_mut().enumerate() {
                let mut sum = 0.0;
                for dy in -r..=r {
                    let nr = row as isize + dy;
                    if nr < 0 || nr as usize >= rows {
                        continue;
                    }
                    let krow = (dy + r) as usize * k;
                    for dx in -r..=r {
                        let nc = col as isize + dx;
                        if nc < 0 || nc as usize >= cols {
                            continue;
                        }
                        sum += dem[(nr as usize, nc as usize)] * kernel[krow + (dx + r) as usize];
                    }
                }
                *out = sum;
            }
            row_data
        })
        .collect();

    Array2::from_shape_vec((rows, cols), output_data).map_err(|e| Error::Other(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_kernel_shape_and_normalization() {
        let kernel = gaussian_kernel(12, 3.0).unwrap();
        assert_eq!(kernel.len(), 13 * 13);
        assert_relative_eq!(kernel.iter().sum::<f64>(), 1.0, epsilon = 1e-12);

        // Peak in the center, symmetric corners
        let center = kernel[6 * 13 + 6];
        assert!(kernel.iter().all(|&w| w <= center));
        assert_relative_eq!(kernel[0], kernel[13 * 13 - 1]);
    }

    #[test]
    fn test_odd_and_even_sizes_share_radius() {
        assert_eq!(gaussian_kernel(4, 1.0).unwrap().len(), 25);
        assert_eq!(gaussian_kernel(5, 1.0).unwrap().len(), 25);
        assert_eq!(gaussian_kernel(0, 1.0).unwrap(), vec![1.0]);
    }

    #[test]
    fn test_invalid_sigma() {
        assert!(gaussian_kernel(12, 0.0).is_err());
        assert!(gaussian_kernel(12, f64::NAN).is_err());
    }

    #[test]
    fn test_preserves_flat_interior() {
        let dem = Array2::from_elem((20, 20), 50.0);
        let result = gaussian_filter(dem.view(), 4, 1.0).unwrap();

        assert_eq!(result.dim(), (20, 20));
        assert_relative_eq!(result[(10, 10)], 50.0, epsilon = 1e-10);
    }

    #[test]
    fn test_zero_padding_darkens_border() {
        let dem = Array2::from_elem((20, 20), 50.0);
        let result = gaussian_filter(dem.view(), 4, 1.0).unwrap();

        // Corner sees only a quarter of the kernel plus the center lines
        assert!(result[(0, 0)] < 50.0);
        assert!(result[(0, 0)] > 0.0);
        // Exactly radius cells in from the edge the full kernel fits again
        assert_relative_eq!(result[(2, 2)], 50.0, epsilon = 1e-10);
    }

    #[test]
    fn test_reduces_noise() {
        let dem = Array2::from_shape_fn((30, 30), |(r, c)| {
            100.0 + ((r * 7 + c * 13) % 11) as f64 - 5.0
        });
        let result = gaussian_filter(dem.view(), 6, 1.5).unwrap();

        let spread = |a: &Array2<f64>| {
            let inner = a.slice(ndarray::s![5..25, 5..25]);
            let mean = inner.mean().unwrap();
            inner.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
        };
        assert!(spread(&result) < spread(&dem));
    }

    #[test]
    fn test_interior_depends_only_on_neighborhood() {
        // The same 13x13 neighborhood produces the same value wherever it sits
        let dem = Array2::from_shape_fn((40, 40), |(r, c)| ((r * 31 + c * 17) % 23) as f64);
        let full = gaussian_filter(dem.view(), 12, 3.0).unwrap();
        let sub = gaussian_filter(dem.slice(ndarray::s![10..30, 5..35]), 12, 3.0).unwrap();

        assert_eq!(full[(20, 20)], sub[(10, 15)]);
    }
}
