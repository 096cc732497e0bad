//! # csmap Algorithms
//!
//! Terrain derivative kernels for CS-map generation:
//!
//! - **slope**: gradient magnitude from the 4-neighborhood, in radians
//! - **gaussian_filter**: zero-padded Gaussian smoothing of the height grid
//! - **curvature**: second-derivative measures from a 3x3 quadratic fit
//!
//! Every kernel is a pure function of its input array. Kernels that need a
//! full neighborhood return a field that is smaller than their input by the
//! stencil radius on every side; nothing is extrapolated at the borders.

mod maybe_rayon;
pub mod terrain;

/// Whether the kernels iterate rows through rayon
pub const PARALLEL: bool = cfg!(feature = "parallel");

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::terrain::{
        curvature, gaussian_filter, gaussian_kernel, slope, Curvature, CurvatureParams,
        CurvatureType, GaussianFilter, GaussianParams, Slope,
    };
    pub use csmap_core::prelude::*;
}
