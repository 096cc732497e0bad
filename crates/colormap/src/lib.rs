//! # csmap Colormap
//!
//! Turns derived terrain fields into RGBA layers and composites them into a
//! CS-map.
//!
//! - [`Palette`]: the five fixed color ramps of a CS-map
//! - [`rgbify`]: normalize a field by a [`ScaleRange`] and apply a palette
//! - [`blend`]: weighted sum of the five layers with [`BlendWeights`]
//!
//! ## Usage
//!
//! ```ignore
//! use csmap_colormap::{rgbify, Palette, ScaleRange};
//!
//! let layer = rgbify(slope.view(), Palette::SlopeRed, ScaleRange::new(0.0, 1.5)?)?;
//! ```

mod blend;
mod render;
mod scheme;

pub use blend::{blend, BlendWeights, CsmapLayers};
pub use render::{rgbify, ScaleRange};
pub use scheme::{evaluate, Palette, Rgba};
