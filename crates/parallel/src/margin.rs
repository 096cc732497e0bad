//! Border bookkeeping shared by trimming, output sizing and georeferencing.
//!
//! The Gaussian and curvature stencils make pixels near a chunk edge depend on
//! samples outside the chunk. Each chunk result therefore loses `trim` pixels
//! per side, on top of the `shrink` the pipeline itself loses to its
//! finite differences.

use csmap_core::{Error, GeoTransform, Result};

use crate::params::CsmapParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Margin {
    /// `gf_size + gf_sigma`
    pub margin: usize,
    /// Pixels dropped from each side of a chunk result: `margin / 2`
    pub trim: usize,
    /// Pixels the pipeline loses per side: `cvt_size`
    pub shrink: usize,
}

impl Margin {
    pub fn from_params(params: &CsmapParams) -> Self {
        let margin = params.gf_size + params.gf_sigma;
        Self {
            margin,
            trim: margin / 2,
            shrink: params.cvt_size,
        }
    }

    /// Total input pixels per side with no output: `trim + shrink`
    pub fn border(&self) -> usize {
        self.trim + self.shrink
    }

    /// Output (rows, cols) for an input of (rows, cols)
    pub fn output_size(&self, rows: usize, cols: usize) -> Result<(usize, usize)> {
        let lost = 2 * self.border();
        if rows <= lost || cols <= lost {
            return Err(Error::InvalidDimensions {
                width: cols,
                height: rows,
            });
        }
        Ok((rows - lost, cols - lost))
    }

    /// Output pixels produced by one full chunk; the tile stride
    pub fn chunk_step(&self, chunk_size: usize) -> Result<usize> {
        let required = 2 * self.border() + 1;
        if chunk_size < required {
            return Err(Error::ChunkTooSmall {
                chunk_size,
                required,
            });
        }
        Ok(chunk_size - 2 * self.border())
    }

    /// Output georeferencing: the input origin moved by `border()` pixels on both axes
    pub fn output_transform(&self, input: &GeoTransform) -> GeoTransform {
        input.shifted(self.border(), self.border())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_margin() {
        let m = CsmapParams::default().margin();
        assert_eq!(m.margin, 15);
        assert_eq!(m.trim, 7);
        assert_eq!(m.shrink, 1);
        assert_eq!(m.border(), 8);
    }

    #[test]
    fn output_size_matches_formula() {
        let m = CsmapParams::default().margin();
        // input - 2 * (margin / 2) - 2
        assert_eq!(m.output_size(100, 120).unwrap(), (84, 104));
        assert!(m.output_size(16, 100).is_err());
        assert_eq!(m.output_size(17, 17).unwrap(), (1, 1));
    }

    #[test]
    fn chunk_step() {
        let m = CsmapParams::default().margin();
        assert_eq!(m.chunk_step(1024).unwrap(), 1008);
        assert_eq!(m.chunk_step(17).unwrap(), 1);
        assert!(matches!(
            m.chunk_step(16),
            Err(Error::ChunkTooSmall { chunk_size: 16, required: 17 })
        ));
    }

    #[test]
    fn larger_cvt_size_grows_border() {
        let m = CsmapParams::default().with_cvt_size(3).margin();
        assert_eq!(m.border(), 10);
        assert_eq!(m.output_size(50, 50).unwrap(), (30, 30));
    }

    #[test]
    fn trim_covers_gaussian_radius() {
        for size in 1..40 {
            for sigma in 1..10 {
                let m = CsmapParams::default().with_gaussian(size, sigma).margin();
                assert!(m.trim >= size / 2);
            }
        }
    }

    #[test]
    fn transform_shift() {
        let m = CsmapParams::default().margin();
        let t = GeoTransform::new(1000.0, 2000.0, 0.5, -0.5);
        let out = m.output_transform(&t);
        assert_relative_eq!(out.origin_x, 1004.0);
        assert_relative_eq!(out.origin_y, 1996.0);
        assert_relative_eq!(out.pixel_width, 0.5);
    }
}
