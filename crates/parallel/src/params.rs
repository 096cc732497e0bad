//! CS-map run configuration

use csmap_algorithms::terrain::CurvatureType;
use csmap_colormap::{BlendWeights, ScaleRange};
use csmap_core::{Error, Result};

use crate::margin::Margin;

/// Parameters of one CS-map run.
///
/// Built once and passed by reference; the `with_*` methods return modified
/// copies.
#[derive(Debug, Clone, PartialEq)]
pub struct CsmapParams {
    /// Gaussian kernel width
    pub gf_size: usize,
    /// Gaussian standard deviation in cells
    pub gf_sigma: usize,
    /// Curvature stencil offset in cells
    pub cvt_size: usize,
    pub height_scale: ScaleRange,
    pub slope_scale: ScaleRange,
    pub curvature_scale: ScaleRange,
    pub curvature_type: CurvatureType,
    pub blend_weights: BlendWeights,
}

impl Default for CsmapParams {
    fn default() -> Self {
        Self {
            gf_size: 12,
            gf_sigma: 3,
            cvt_size: 1,
            height_scale: ScaleRange { min: 0.0, max: 1000.0 },
            slope_scale: ScaleRange { min: 0.0, max: 1.5 },
            curvature_scale: ScaleRange { min: -0.1, max: 0.1 },
            curvature_type: CurvatureType::General,
            blend_weights: BlendWeights::default(),
        }
    }
}

impl CsmapParams {
    /// Check every field; called before any tile is read.
    pub fn validate(&self) -> Result<()> {
        positive("gf_size", self.gf_size)?;
        positive("gf_sigma", self.gf_sigma)?;
        positive("cvt_size", self.cvt_size)?;
        self.height_scale.validate("height_scale")?;
        self.slope_scale.validate("slope_scale")?;
        self.curvature_scale.validate("curvature_scale")?;
        self.blend_weights.validate()
    }

    /// Border bookkeeping derived from these parameters
    pub fn margin(&self) -> Margin {
        Margin::from_params(self)
    }

    pub fn with_gaussian(mut self, size: usize, sigma: usize) -> Self {
        self.gf_size = size;
        self.gf_sigma = sigma;
        self
    }

    pub fn with_cvt_size(mut self, cvt_size: usize) -> Self {
        self.cvt_size = cvt_size;
        self
    }

    pub fn with_height_scale(mut self, scale: ScaleRange) -> Self {
        self.height_scale = scale;
        self
    }

    pub fn with_slope_scale(mut self, scale: ScaleRange) -> Self {
        self.slope_scale = scale;
        self
    }

    pub fn with_curvature_scale(mut self, scale: ScaleRange) -> Self {
        self.curvature_scale = scale;
        self
    }

    pub fn with_curvature_type(mut self, curvature_type: CurvatureType) -> Self {
        self.curvature_type = curvature_type;
        self
    }

    pub fn with_blend_weights(mut self, weights: BlendWeights) -> Self {
        self.blend_weights = weights;
        self
    }
}

fn positive(name: &'static str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(Error::InvalidParameter {
            name,
            value: value.to_string(),
            reason: "must be at least 1".into(),
        });
    }
    Ok(())
}
