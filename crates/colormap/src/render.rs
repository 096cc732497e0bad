//! Field to RGBA rendering.

use csmap_core::{Error, Result, RgbaLayer};
use ndarray::ArrayView2;

use crate::scheme::{evaluate, Palette};

/// Linear value range mapped onto [0, 1] before a palette is applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleRange {
    pub min: f64,
    pub max: f64,
}

impl ScaleRange {
    /// Validated range. Fails when `max <= min` or either bound is not finite.
    pub fn new(min: f64, max: f64) -> Result<Self> {
        let range = Self { min, max };
        range.validate("scale")?;
        Ok(range)
    }

    /// Check the range, reporting errors under `name`.
    pub fn validate(&self, name: &'static str) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() || self.max <= self.min {
            return Err(Error::DegenerateScale {
                name,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    /// `(value - min) / (max - min)` clamped to [0, 1]. NaN maps to 0.
    #[inline]
    pub fn normalize(&self, value: f64) -> f64 {
        let t = (value - self.min) / (self.max - self.min);
        if t.is_nan() {
            0.0
        } else {
            t.clamp(0.0, 1.0)
        }
    }
}

/// Render a scalar field through a palette.
///
/// The output has the same rows/cols as `field` and 4 bands.
pub fn rgbify(
    field: ArrayView2<'_, f64>,
    palette: Palette,
    scale: ScaleRange,
) -> Result<RgbaLayer> {
    scale.validate("scale")?;
    let (rows, cols) = field.dim();
    Ok(RgbaLayer::from_fn(rows, cols, |row, col| {
        evaluate(palette, scale.normalize(field[[row, col]])).to_array()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn normalize_clamps() {
        let s = ScaleRange::new(0.0, 10.0).unwrap();
        assert_eq!(s.normalize(-5.0), 0.0);
        assert_eq!(s.normalize(5.0), 0.5);
        assert_eq!(s.normalize(50.0), 1.0);
        assert_eq!(s.normalize(f64::NAN), 0.0);
        assert_eq!(s.normalize(f64::INFINITY), 1.0);
    }

    #[test]
    fn degenerate_scale_rejected() {
        assert!(matches!(
            ScaleRange::new(1.0, 1.0),
            Err(Error::DegenerateScale { .. })
        ));
        assert!(ScaleRange::new(2.0, 1.0).is_err());
        assert!(ScaleRange::new(0.0, f64::NAN).is_err());
    }

    #[test]
    fn rgbify_rejects_degenerate_scale() {
        let field = array![[0.0, 1.0]];
        let scale = ScaleRange { min: 3.0, max: 3.0 };
        let err = rgbify(field.view(), Palette::SlopeRed, scale).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn rgbify_shape_and_values() {
        let field = array![[0.0, 1000.0, 500.0], [-10.0, 2000.0, 0.0]];
        let scale = ScaleRange::new(0.0, 1000.0).unwrap();
        let layer = rgbify(field.view(), Palette::HeightBlackWhite, scale).unwrap();
        assert_eq!(layer.shape(), (2, 3));
        assert_eq!(layer.pixel(0, 0), [255, 255, 255, 255]);
        assert_eq!(layer.pixel(0, 1), [0, 0, 0, 255]);
        // 127.5 rounds away from zero
        assert_eq!(layer.pixel(0, 2), [128, 128, 128, 255]);
        // out-of-range values clamp to the palette ends
        assert_eq!(layer.pixel(1, 0), [255, 255, 255, 255]);
        assert_eq!(layer.pixel(1, 1), [0, 0, 0, 255]);
    }

    #[test]
    fn rgbify_curvature_ends() {
        let field = array![[-0.5, 0.5]];
        let scale = ScaleRange::new(-0.1, 0.1).unwrap();
        let layer = rgbify(field.view(), Palette::CurvatureRedYellowBlue, scale).unwrap();
        assert_eq!(layer.pixel(0, 0), [255, 0, 30, 255]);
        assert_eq!(layer.pixel(0, 1), [0, 0, 255, 255]);
    }
}
