//! # csmap Core
//!
//! Core types, traits and I/O for CS-map generation.
//!
//! This crate provides:
//! - `Raster<T>`: Generic georeferenced grid (the height grid input)
//! - `RgbaLayer`: Four-band 8-bit color layer
//! - `Window`: Rectangular read/write regions of a grid
//! - `GeoTransform` and `CRS` for georeferencing
//! - Windowed raster sources and RGBA sinks (native TIFF, optional GDAL)

pub mod crs;
pub mod error;
pub mod io;
pub mod raster;

pub use crs::CRS;
pub use error::{Error, Result};
pub use raster::{GeoTransform, Raster, RasterElement, RgbaLayer, Window};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::crs::CRS;
    pub use crate::error::{Error, Result};
    pub use crate::io::{RasterSource, RgbaSink};
    pub use crate::raster::{GeoTransform, Raster, RasterElement, RgbaLayer, Window};
    pub use crate::Algorithm;
}

/// Core trait for raster algorithms.
///
/// Algorithms are pure functions that transform input data according to parameters.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(
        &self,
        input: Self::Input,
        params: Self::Params,
    ) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(
        &self,
        input: Self::Input,
    ) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
