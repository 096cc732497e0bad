//! Four-band 8-bit color layers

use crate::error::{Error, Result};
use crate::raster::Window;
use ndarray::{s, Array3, ArrayView2, ArrayView3};

/// Number of bands in an RGBA layer (R, G, B, A)
pub const RGBA_BANDS: usize = 4;

/// An RGBA image stored band-first: shape `(4, rows, cols)`.
///
/// This is the layout produced by every palette, consumed by the blender and
/// written band by band to the output raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaLayer {
    data: Array3<u8>,
}

impl RgbaLayer {
    /// Transparent black layer of `rows x cols`
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            data: Array3::zeros((RGBA_BANDS, rows, cols)),
        }
    }

    /// Wrap a band-first array; fails unless the first axis has exactly 4 bands
    pub fn from_array(data: Array3<u8>) -> Result<Self> {
        let (bands, rows, cols) = data.dim();
        if bands != RGBA_BANDS {
            return Err(Error::UnsupportedDataType(format!(
                "RGBA layer needs {} bands, got {} ({}x{})",
                RGBA_BANDS, bands, cols, rows
            )));
        }
        Ok(Self { data })
    }

    /// Build a layer by evaluating `f(row, col)` for every pixel
    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> [u8; 4],
    {
        let mut layer = Self::new(rows, cols);
        for row in 0..rows {
            for col in 0..cols {
                layer.set_pixel(row, col, f(row, col));
            }
        }
        layer
    }

    pub fn rows(&self) -> usize {
        self.data.dim().1
    }

    pub fn cols(&self) -> usize {
        self.data.dim().2
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        let (_, rows, cols) = self.data.dim();
        (rows, cols)
    }

    /// Pixel value as `[r, g, b, a]`; panics when out of bounds
    pub fn pixel(&self, row: usize, col: usize) -> [u8; 4] {
        [
            self.data[(0, row, col)],
            self.data[(1, row, col)],
            self.data[(2, row, col)],
            self.data[(3, row, col)],
        ]
    }

    pub fn set_pixel(&mut self, row: usize, col: usize, rgba: [u8; 4]) {
        for (band, value) in rgba.into_iter().enumerate() {
            self.data[(band, row, col)] = value;
        }
    }

    /// A single band as a 2D view
    pub fn band(&self, band: usize) -> ArrayView2<'_, u8> {
        self.data.slice(s![band, .., ..])
    }

    pub fn view(&self) -> ArrayView3<'_, u8> {
        self.data.view()
    }

    /// Copy of the sub-region `window` of this layer
    pub fn crop(&self, window: Window) -> Result<Self> {
        let (rows, cols) = self.shape();
        if window.row_end() > rows || window.col_end() > cols {
            return Err(Error::IndexOutOfBounds {
                row: window.row_end(),
                col: window.col_end(),
                rows,
                cols,
            });
        }
        let data = self
            .data
            .slice(s![
                ..,
                window.row_off..window.row_end(),
                window.col_off..window.col_end()
            ])
            .to_owned();
        Ok(Self { data })
    }

    /// Drop `n` pixels from every side
    pub fn trim(&self, n: usize) -> Result<Self> {
        let (rows, cols) = self.shape();
        if rows < 2 * n || cols < 2 * n {
            return Err(Error::InvalidDimensions {
                width: cols,
                height: rows,
            });
        }
        self.crop(Window::new(n, n, cols - 2 * n, rows - 2 * n))
    }

    /// Copy `block` into this layer with its top-left corner at `(window.col_off, window.row_off)`.
    ///
    /// `window` must match the block's shape exactly.
    pub fn paste(&mut self, window: Window, block: &RgbaLayer) -> Result<()> {
        let (rows, cols) = self.shape();
        if block.shape() != (window.height, window.width) {
            return Err(Error::SizeMismatch {
                er: window.height,
                ec: window.width,
                ar: block.rows(),
                ac: block.cols(),
            });
        }
        if window.row_end() > rows || window.col_end() > cols {
            return Err(Error::IndexOutOfBounds {
                row: window.row_end(),
                col: window.col_end(),
                rows,
                cols,
            });
        }
        self.data
            .slice_mut(s![
                ..,
                window.row_off..window.row_end(),
                window.col_off..window.col_end()
            ])
            .assign(&block.data);
        Ok(())
    }

    /// Interleaved `RGBARGBA...` bytes in row-major order
    pub fn to_interleaved(&self) -> Vec<u8> {
        let (rows, cols) = self.shape();
        let mut out = Vec::with_capacity(rows * cols * RGBA_BANDS);
        for row in 0..rows {
            for col in 0..cols {
                out.extend_from_slice(&self.pixel(row, col));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(rows: usize, cols: usize) -> RgbaLayer {
        RgbaLayer::from_fn(rows, cols, |r, c| [r as u8, c as u8, (r + c) as u8, 255])
    }

    #[test]
    fn from_array_rejects_wrong_band_count() {
        assert!(RgbaLayer::from_array(Array3::zeros((3, 2, 2))).is_err());
        assert!(RgbaLayer::from_array(Array3::zeros((4, 2, 2))).is_ok());
    }

    #[test]
    fn trim_removes_border() {
        let layer = gradient(10, 12);
        let inner = layer.trim(3).unwrap();
        assert_eq!(inner.shape(), (4, 6));
        assert_eq!(inner.pixel(0, 0), layer.pixel(3, 3));
        assert_eq!(inner.pixel(3, 5), layer.pixel(6, 8));
    }

    #[test]
    fn trim_too_much_fails() {
        assert!(gradient(4, 4).trim(3).is_err());
    }

    #[test]
    fn paste_places_block() {
        let mut out = RgbaLayer::new(8, 8);
        let block = gradient(3, 2);
        out.paste(Window::new(5, 4, 2, 3), &block).unwrap();
        assert_eq!(out.pixel(4, 5), block.pixel(0, 0));
        assert_eq!(out.pixel(6, 6), block.pixel(2, 1));
        assert_eq!(out.pixel(0, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn paste_checks_shape_and_bounds() {
        let mut out = RgbaLayer::new(8, 8);
        let block = gradient(3, 3);
        assert!(matches!(
            out.paste(Window::new(0, 0, 2, 3), &block),
            Err(Error::SizeMismatch { .. })
        ));
        assert!(matches!(
            out.paste(Window::new(6, 6, 3, 3), &block),
            Err(Error::IndexOutOfBounds { .. })
        ));
    }

    #[test]
    fn interleaved_is_row_major() {
        let layer = gradient(2, 2);
        let bytes = layer.to_interleaved();
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[4..8], &[0, 1, 1, 255]);
        assert_eq!(&bytes[8..12], &[1, 0, 1, 255]);
    }
}
