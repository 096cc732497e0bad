//! In-memory sources and sinks

use crate::crs::CRS;
use crate::error::Result;
use crate::io::{RasterSource, RgbaSink};
use crate::raster::{GeoTransform, Raster, RasterElement, RgbaLayer, Window};
use ndarray::Array2;

impl<T: RasterElement> RasterSource for Raster<T> {
    fn shape(&self) -> (usize, usize) {
        Raster::shape(self)
    }

    fn transform(&self) -> GeoTransform {
        *Raster::transform(self)
    }

    fn crs(&self) -> Option<CRS> {
        Raster::crs(self).cloned()
    }

    fn read_window(&self, window: Window) -> Result<Array2<f64>> {
        Ok(self.window(window).mapv(|v| v.to_f64().unwrap_or(f64::NAN)))
    }
}

/// A georeferenced RGBA raster held in memory.
///
/// Used as the output sink when the whole CS-map fits in memory, which is
/// the native GeoTIFF path and every test.
#[derive(Debug, Clone)]
pub struct RgbaRaster {
    layer: RgbaLayer,
    transform: GeoTransform,
    crs: Option<CRS>,
}

impl RgbaRaster {
    /// Transparent raster of `rows x cols` with a default transform
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::from_layer(RgbaLayer::new(rows, cols))
    }

    pub fn from_layer(layer: RgbaLayer) -> Self {
        Self {
            layer,
            transform: GeoTransform::default(),
            crs: None,
        }
    }

    pub fn with_georef(mut self, transform: GeoTransform, crs: Option<CRS>) -> Self {
        self.transform = transform;
        self.crs = crs;
        self
    }

    pub fn rows(&self) -> usize {
        self.layer.rows()
    }

    pub fn cols(&self) -> usize {
        self.layer.cols()
    }

    pub fn layer(&self) -> &RgbaLayer {
        &self.layer
    }

    pub fn into_layer(self) -> RgbaLayer {
        self.layer
    }

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    pub fn crs(&self) -> Option<&CRS> {
        self.crs.as_ref()
    }
}

impl RgbaSink for RgbaRaster {
    fn write_window(&mut self, window: Window, block: &RgbaLayer) -> Result<()> {
        self.layer.paste(window, block)
    }
}
