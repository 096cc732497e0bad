//! The per-grid CS-map pipeline: derivatives, colorization, blend.

use csmap_algorithms::terrain::{curvature, gaussian_filter, slope};
use csmap_colormap::{blend, rgbify, CsmapLayers, Palette};
use csmap_core::{Result, RgbaLayer};
use ndarray::{s, ArrayView2};

use crate::params::CsmapParams;

/// Render a CS-map for one height grid.
///
/// The result is `cvt_size` pixels smaller than `dem` on every side. Pixels
/// within the Gaussian radius of the grid edge see zero padding; callers that
/// stitch chunks must trim them (see [`single_pass`]).
pub fn csmap(dem: ArrayView2<'_, f64>, params: &CsmapParams) -> Result<RgbaLayer> {
    let k = params.cvt_size;

    let slope = slope(dem)?;
    let smoothed = gaussian_filter(dem, params.gf_size, params.gf_sigma as f64)?;
    let curvature = curvature(smoothed.view(), k, params.curvature_type)?;

    // align height and slope on the curvature extent
    let (rows, cols) = curvature.dim();
    let height = dem.slice(s![k..k + rows, k..k + cols]);
    let slope = slope.slice(s![k - 1..k - 1 + rows, k - 1..k - 1 + cols]);

    let dem_rgb = rgbify(height, Palette::HeightBlackWhite, params.height_scale)?;
    let slope_red = rgbify(slope, Palette::SlopeRed, params.slope_scale)?;
    let slope_bw = rgbify(slope, Palette::SlopeBlackWhite, params.slope_scale)?;
    let curvature_blue = rgbify(curvature.view(), Palette::CurvatureBlue, params.curvature_scale)?;
    let curvature_ryb = rgbify(
        curvature.view(),
        Palette::CurvatureRedYellowBlue,
        params.curvature_scale,
    )?;

    blend(
        CsmapLayers {
            dem: &dem_rgb,
            slope_red: &slope_red,
            slope_bw: &slope_bw,
            curvature_blue: &curvature_blue,
            curvature_ryb: &curvature_ryb,
        },
        &params.blend_weights,
    )
}

/// Whole-grid CS-map with the margin removed.
///
/// This is the reference a chunked run must reproduce byte for byte. Output
/// shape follows [`Margin::output_size`](crate::Margin::output_size).
pub fn single_pass(dem: ArrayView2<'_, f64>, params: &CsmapParams) -> Result<RgbaLayer> {
    params.validate()?;
    let margin = params.margin();
    let (rows, cols) = dem.dim();
    margin.output_size(rows, cols)?;
    csmap(dem, params)?.trim(margin.trim)
}
