//! Raster data structures

mod element;
mod geotransform;
mod grid;
mod rgba;
mod window;

pub use element::RasterElement;
pub use geotransform::GeoTransform;
pub use grid::{Raster, RasterStatistics};
pub use rgba::{RgbaLayer, RGBA_BANDS};
pub use window::Window;
