//! Weighted composition of the five CS-map layers.

use csmap_core::{Error, Result, RgbaLayer};
use ndarray::{Array3, Zip};

/// Per-layer blend weights.
///
/// Weights are applied to every band including alpha, so with the defaults
/// (sum 1.0) an all-opaque input stays opaque.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendWeights {
    pub dem: f64,
    pub slope_red: f64,
    pub slope_bw: f64,
    pub curvature_blue: f64,
    pub curvature_ryb: f64,
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self {
            dem: 0.20,
            slope_red: 0.15,
            slope_bw: 0.35,
            curvature_blue: 0.10,
            curvature_ryb: 0.20,
        }
    }
}

impl BlendWeights {
    pub fn as_array(&self) -> [f64; 5] {
        [
            self.dem,
            self.slope_red,
            self.slope_bw,
            self.curvature_blue,
            self.curvature_ryb,
        ]
    }

    pub fn sum(&self) -> f64 {
        self.as_array().iter().sum()
    }

    /// Every weight must be finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        const NAMES: [&str; 5] =
            ["dem", "slope_red", "slope_bw", "curvature_blue", "curvature_ryb"];
        for (name, w) in NAMES.iter().zip(self.as_array()) {
            if !w.is_finite() || w < 0.0 {
                return Err(Error::InvalidParameter {
                    name: "blend_weights",
                    value: format!("{}={}", name, w),
                    reason: "weights must be finite and non-negative".into(),
                });
            }
        }
        Ok(())
    }
}

/// The five rendered layers of a CS-map, in blend order.
#[derive(Debug, Clone, Copy)]
pub struct CsmapLayers<'a> {
    pub dem: &'a RgbaLayer,
    pub slope_red: &'a RgbaLayer,
    pub slope_bw: &'a RgbaLayer,
    pub curvature_blue: &'a RgbaLayer,
    pub curvature_ryb: &'a RgbaLayer,
}

/// Blend five equally shaped layers.
///
/// Each output byte is `round(Σ layer_i * w_i)` clamped to 0..=255.
pub fn blend(layers: CsmapLayers<'_>, weights: &BlendWeights) -> Result<RgbaLayer> {
    weights.validate()?;

    let (rows, cols) = layers.dem.shape();
    for other in [
        layers.slope_red,
        layers.slope_bw,
        layers.curvature_blue,
        layers.curvature_ryb,
    ] {
        if other.shape() != (rows, cols) {
            return Err(Error::SizeMismatch {
                er: rows,
                ec: cols,
                ar: other.rows(),
                ac: other.cols(),
            });
        }
    }

    let [w0, w1, w2, w3, w4] = weights.as_array();
    let mut out = Array3::<u8>::zeros(layers.dem.view().raw_dim());
    Zip::from(&mut out)
        .and(layers.dem.view())
        .and(layers.slope_red.view())
        .and(layers.slope_bw.view())
        .and(layers.curvature_blue.view())
        .and(layers.curvature_ryb.view())
        .for_each(|o, &a, &b, &c, &d, &e| {
            let v = a as f64 * w0 + b as f64 * w1 + c as f64 * w2 + d as f64 * w3 + e as f64 * w4;
            *o = v.round().clamp(0.0, 255.0) as u8;
        });

    RgbaLayer::from_array(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(rows: usize, cols: usize, px: [u8; 4]) -> RgbaLayer {
        RgbaLayer::from_fn(rows, cols, |_, _| px)
    }

    fn layers<'a>(l: &'a [RgbaLayer; 5]) -> CsmapLayers<'a> {
        CsmapLayers {
            dem: &l[0],
            slope_red: &l[1],
            slope_bw: &l[2],
            curvature_blue: &l[3],
            curvature_ryb: &l[4],
        }
    }

    #[test]
    fn default_weights_sum_to_one() {
        let w = BlendWeights::default();
        assert!((w.sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn identical_layers_pass_through() {
        let l: [RgbaLayer; 5] = std::array::from_fn(|_| solid(3, 4, [10, 200, 255, 255]));
        let out = blend(layers(&l), &BlendWeights::default()).unwrap();
        assert_eq!(out.shape(), (3, 4));
        assert_eq!(out.pixel(2, 3), [10, 200, 255, 255]);
    }

    #[test]
    fn weighted_sum_within_one() {
        let px = [
            [255, 0, 0, 255],
            [0, 255, 0, 255],
            [0, 0, 255, 255],
            [100, 100, 100, 255],
            [50, 60, 70, 255],
        ];
        let l: [RgbaLayer; 5] = std::array::from_fn(|i| solid(2, 2, px[i]));
        let w = BlendWeights::default();
        let out = blend(layers(&l), &w).unwrap();
        let ws = w.as_array();
        for band in 0..4 {
            let expected: f64 = (0..5).map(|i| px[i][band] as f64 * ws[i]).sum();
            let got = out.pixel(1, 1)[band] as f64;
            assert!((got - expected).abs() <= 1.0, "band {}: {} vs {}", band, got, expected);
        }
    }

    #[test]
    fn heavy_weights_saturate() {
        let l: [RgbaLayer; 5] = std::array::from_fn(|_| solid(1, 1, [200, 200, 200, 255]));
        let w = BlendWeights {
            dem: 1.0,
            slope_red: 1.0,
            slope_bw: 1.0,
            curvature_blue: 1.0,
            curvature_ryb: 1.0,
        };
        assert_eq!(blend(layers(&l), &w).unwrap().pixel(0, 0), [255, 255, 255, 255]);
    }

    #[test]
    fn mismatched_shapes_rejected() {
        let mut l: [RgbaLayer; 5] = std::array::from_fn(|_| solid(2, 2, [0, 0, 0, 255]));
        l[3] = solid(2, 3, [0, 0, 0, 255]);
        assert!(matches!(
            blend(layers(&l), &BlendWeights::default()),
            Err(Error::SizeMismatch { .. })
        ));
    }

    #[test]
    fn negative_weight_rejected() {
        let l: [RgbaLayer; 5] = std::array::from_fn(|_| solid(1, 1, [0, 0, 0, 255]));
        let w = BlendWeights {
            dem: -0.1,
            ..Default::default()
        };
        assert!(blend(layers(&l), &w).unwrap_err().is_configuration());
    }
}
