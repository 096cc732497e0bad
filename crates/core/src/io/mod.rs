//! Raster I/O collaborators.
//!
//! The CS-map pipeline only needs two capabilities from storage: windowed
//! reads of the height grid ([`RasterSource`]) and windowed writes of RGBA
//! blocks into the output ([`RgbaSink`]). In-memory implementations live in
//! [`memory`]; GeoTIFF files are handled natively through the `tiff` crate, or
//! through GDAL with real windowed I/O when the `gdal` feature is enabled.

#[cfg(feature = "gdal")]
mod gdal_io;
mod memory;
#[cfg_attr(feature = "gdal", allow(dead_code))]
mod native;

use crate::crs::CRS;
use crate::error::Result;
use crate::raster::{GeoTransform, RgbaLayer, Window};
use ndarray::Array2;

pub use memory::RgbaRaster;

#[cfg(feature = "gdal")]
pub use gdal_io::{read_geotiff, write_rgba_geotiff, GdalRgbaSink, GdalSource};

#[cfg(not(feature = "gdal"))]
pub use native::{read_geotiff, write_rgba_geotiff};

/// A single-band elevation grid readable by window.
///
/// Implementations must be safe to read from several workers at once; the
/// scheduler calls [`read_window`](RasterSource::read_window) concurrently.
pub trait RasterSource {
    /// Dimensions as (rows, cols)
    fn shape(&self) -> (usize, usize);

    /// Georeferencing of pixel (0, 0)
    fn transform(&self) -> GeoTransform;

    fn crs(&self) -> Option<CRS>;

    /// Read `window` as `f64`, clipped at the right and bottom grid edges
    fn read_window(&self, window: Window) -> Result<Array2<f64>>;
}

/// A four-band u8 output raster writable by window.
pub trait RgbaSink {
    /// Write `block` so that its top-left pixel lands at the window origin.
    /// `window` has exactly the block's shape.
    fn write_window(&mut self, window: Window, block: &RgbaLayer) -> Result<()>;
}
