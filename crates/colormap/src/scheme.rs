//! The five CS-map palettes.
//!
//! Each palette maps a normalized value `v` in [0, 1] to RGBA. Channels are
//! computed as fractions of full intensity and converted with
//! `round(clamp01(x) * 255)`.

/// RGBA color with values in 0..=255.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from channel fractions
    fn opaque(r: f64, g: f64, b: f64) -> Self {
        Self::new(channel(r), channel(g), channel(b), 255)
    }

    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Palettes used to build a CS-map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Palette {
    /// White (low) -> black (high) for elevation
    HeightBlackWhite,
    /// White (flat) -> red (steep)
    SlopeRed,
    /// White (flat) -> black (steep)
    SlopeBlackWhite,
    /// Blue-white: white (convex end) -> blue
    CurvatureBlue,
    /// Diverging red -> yellow -> blue
    CurvatureRedYellowBlue,
}

impl Palette {
    pub const ALL: &'static [Palette] = &[
        Self::HeightBlackWhite,
        Self::SlopeRed,
        Self::SlopeBlackWhite,
        Self::CurvatureBlue,
        Self::CurvatureRedYellowBlue,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::HeightBlackWhite => "height_blackwhite",
            Self::SlopeRed => "slope_red",
            Self::SlopeBlackWhite => "slope_blackwhite",
            Self::CurvatureBlue => "curvature_blue",
            Self::CurvatureRedYellowBlue => "curvature_redyellowblue",
        }
    }

    /// Color for a normalized value
    pub fn color(&self, v: f64) -> Rgba {
        evaluate(*self, v)
    }
}

/// Blue channel floor of the diverging ramp, as a fraction
const RYB_BLUE_BASE: f64 = 30.0 / 255.0;
/// Blue channel span of the diverging ramp, as a fraction
const RYB_BLUE_SPAN: f64 = 225.0 / 255.0;

fn channel(x: f64) -> u8 {
    (x.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Evaluate a palette at normalized position `v` ∈ [0, 1].
pub fn evaluate(palette: Palette, v: f64) -> Rgba {
    match palette {
        Palette::HeightBlackWhite | Palette::SlopeBlackWhite => {
            let g = 1.0 - v;
            Rgba::opaque(g, g, g)
        }
        Palette::SlopeRed => Rgba::opaque(1.0, 1.0 - v, 1.0 - v),
        Palette::CurvatureBlue => Rgba::opaque(1.0 - v, 1.0 - v, 1.0),
        Palette::CurvatureRedYellowBlue => {
            if v < 0.5 {
                // red -> yellow
                Rgba::opaque(1.0, v * 2.0, RYB_BLUE_BASE + v * 2.0 * RYB_BLUE_SPAN)
            } else {
                // yellow -> blue
                let u = v * 2.0 - 1.0;
                Rgba::opaque(1.0 - u, 1.0 - u, RYB_BLUE_BASE + u * RYB_BLUE_SPAN)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn height_endpoints() {
        assert_eq!(evaluate(Palette::HeightBlackWhite, 0.0), Rgba::new(255, 255, 255, 255));
        assert_eq!(evaluate(Palette::HeightBlackWhite, 1.0), Rgba::new(0, 0, 0, 255));
    }

    #[test]
    fn slope_endpoints() {
        assert_eq!(evaluate(Palette::SlopeRed, 0.0), Rgba::new(255, 255, 255, 255));
        assert_eq!(evaluate(Palette::SlopeRed, 1.0), Rgba::new(255, 0, 0, 255));
        assert_eq!(evaluate(Palette::SlopeBlackWhite, 1.0), Rgba::new(0, 0, 0, 255));
    }

    #[test]
    fn curvature_blue_endpoints() {
        assert_eq!(evaluate(Palette::CurvatureBlue, 0.0), Rgba::new(255, 255, 255, 255));
        assert_eq!(evaluate(Palette::CurvatureBlue, 1.0), Rgba::new(0, 0, 255, 255));
    }

    #[test]
    fn red_yellow_blue_breakpoints() {
        assert_eq!(evaluate(Palette::CurvatureRedYellowBlue, 0.0), Rgba::new(255, 0, 30, 255));
        assert_eq!(evaluate(Palette::CurvatureRedYellowBlue, 0.5), Rgba::new(255, 255, 30, 255));
        assert_eq!(evaluate(Palette::CurvatureRedYellowBlue, 1.0), Rgba::new(0, 0, 255, 255));
    }

    #[test]
    fn red_yellow_blue_is_continuous_in_red_and_green() {
        let below = evaluate(Palette::CurvatureRedYellowBlue, 0.4999);
        let above = evaluate(Palette::CurvatureRedYellowBlue, 0.5);
        assert_eq!(below.r, above.r);
        assert_eq!(below.g, above.g);
    }

    #[test]
    fn quarter_gray_rounds() {
        // 0.75 * 255 = 191.25
        assert_eq!(evaluate(Palette::SlopeBlackWhite, 0.25).r, 191);
    }

    #[test]
    fn all_palettes_opaque() {
        assert_eq!(Palette::ALL.len(), 5);
        for &palette in Palette::ALL {
            for v in [0.0, 0.3, 0.5, 0.7, 1.0] {
                assert_eq!(palette.color(v).a, 255, "{}", palette.name());
            }
        }
    }
}
