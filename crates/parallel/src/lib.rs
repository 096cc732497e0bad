//! # csmap Parallel
//!
//! Chunked CS-map generation over grids of any size.
//!
//! This crate provides:
//! - [`CsmapParams`]: run configuration and validation
//! - [`Margin`]: the single source of border sizes, output size and output georeferencing
//! - [`csmap`] / [`single_pass`]: the pipeline on one in-memory grid
//! - [`ChunkPlan`]: overlapping read windows with disjoint output windows
//! - [`ChunkScheduler`]: parallel tile rendering with a single writer
//!
//! A chunked run writes exactly the bytes [`single_pass`] produces for the
//! whole grid, independent of chunk size and worker count.

pub mod margin;
pub mod params;
pub mod pipeline;
pub mod scheduler;
pub mod strategy;
pub mod tiled;

pub use margin::Margin;
pub use params::CsmapParams;
pub use pipeline::{csmap, single_pass};
pub use scheduler::{ChunkScheduler, RunSummary, DEFAULT_CHUNK_SIZE};
pub use strategy::{num_cpus, ProcessingMode};
pub use tiled::{ChunkPlan, ChunkTile, TileIterator};
