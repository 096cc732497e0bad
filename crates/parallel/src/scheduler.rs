//! Chunked CS-map runs.
//!
//! Tiles are rendered on a worker pool and handed over a bounded channel to
//! a single writer on the calling thread, which owns the sink. Each tile is
//! pure: it reads its own window and never looks at another tile's output,
//! so the result does not depend on worker count or completion order.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::bounded;
use csmap_core::io::{RasterSource, RgbaRaster, RgbaSink};
use csmap_core::{Error, Result, RgbaLayer, Window};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::margin::Margin;
use crate::params::CsmapParams;
use crate::pipeline::csmap;
use crate::strategy::ProcessingMode;
use crate::tiled::{ChunkPlan, ChunkTile};

/// Default edge length of a read chunk in pixels
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub tiles: usize,
    /// Output (rows, cols)
    pub output_shape: (usize, usize),
    pub margin: Margin,
    pub workers: usize,
    pub elapsed: Duration,
}

/// Drives the CS-map pipeline chunk by chunk.
#[derive(Debug, Clone)]
pub struct ChunkScheduler {
    params: CsmapParams,
    margin: Margin,
    chunk_size: usize,
    mode: ProcessingMode,
    cancel: Option<Arc<AtomicBool>>,
}

impl ChunkScheduler {
    /// Validates `params` and that `chunk_size` leaves a non-empty interior.
    pub fn new(params: CsmapParams, chunk_size: usize) -> Result<Self> {
        params.validate()?;
        let margin = params.margin();
        margin.chunk_step(chunk_size)?;
        Ok(Self {
            params,
            margin,
            chunk_size,
            mode: ProcessingMode::default(),
            cancel: None,
        })
    }

    pub fn with_mode(mut self, mode: ProcessingMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_workers(self, workers: Option<usize>) -> Self {
        self.with_mode(ProcessingMode::from_workers(workers))
    }

    /// Abort the run when `flag` becomes true. Tiles already written stay written.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn params(&self) -> &CsmapParams {
        &self.params
    }

    pub fn margin(&self) -> Margin {
        self.margin
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn mode(&self) -> ProcessingMode {
        self.mode
    }

    /// Tiles for an input of `(rows, cols)`
    pub fn plan(&self, input_shape: (usize, usize)) -> Result<ChunkPlan> {
        ChunkPlan::new(input_shape, self.chunk_size, self.margin)
    }

    /// An in-memory output sized and georeferenced for `source`
    pub fn memory_sink<S: RasterSource + ?Sized>(&self, source: &S) -> Result<RgbaRaster> {
        let (rows, cols) = source.shape();
        let (out_rows, out_cols) = self.margin.output_size(rows, cols)?;
        Ok(RgbaRaster::new(out_rows, out_cols)
            .with_georef(self.margin.output_transform(&source.transform()), source.crs()))
    }

    /// Read, render and trim one tile. The block has the shape of `tile.dest`.
    pub fn render_tile<S>(&self, source: &S, tile: &ChunkTile) -> Result<RgbaLayer>
    where
        S: RasterSource + ?Sized,
    {
        let chunk = source.read_window(tile.read)?;
        let block = csmap(chunk.view(), &self.params)?;
        block
            .trim(self.margin.trim)?
            .crop(Window::new(0, 0, tile.dest.width, tile.dest.height))
    }

    pub fn run<S, K>(&self, source: &S, sink: &mut K) -> Result<RunSummary>
    where
        S: RasterSource + Sync + ?Sized,
        K: RgbaSink + ?Sized,
    {
        self.run_with_progress(source, sink, |_, _| {})
    }

    /// Run every tile and write it to `sink`.
    ///
    /// `progress(done, total)` is called on the calling thread after each
    /// write. The first failure stops outstanding tiles and is returned
    /// wrapped in [`Error::Tile`]; nothing is written after it.
    pub fn run_with_progress<S, K, F>(
        &self,
        source: &S,
        sink: &mut K,
        mut progress: F,
    ) -> Result<RunSummary>
    where
        S: RasterSource + Sync + ?Sized,
        K: RgbaSink + ?Sized,
        F: FnMut(usize, usize),
    {
        let start = Instant::now();
        let plan = self.plan(source.shape())?;
        let total = plan.len();
        let pool = self.mode.build_pool()?;
        let workers = pool.current_num_threads();
        let cancel = self.cancel.clone().unwrap_or_default();

        info!(
            tiles = total,
            chunk_size = self.chunk_size,
            step = plan.step(),
            trim = self.margin.trim,
            workers,
            "starting chunked run"
        );

        let (tx, rx) = bounded::<(ChunkTile, Result<RgbaLayer>)>(workers * 2);
        let mut first_error: Option<Error> = None;
        let mut written = 0usize;

        std::thread::scope(|scope| {
            let tiles = plan.tiles();
            let cancel = &cancel;
            scope.spawn(move || {
                pool.install(|| {
                    tiles.par_iter().for_each_with(tx, |tx, tile| {
                        if cancel.load(Ordering::Relaxed) {
                            return;
                        }
                        let result = self.render_tile(source, tile);
                        if result.is_err() {
                            cancel.store(true, Ordering::Relaxed);
                        }
                        // the writer drains until every sender is gone
                        let _ = tx.send((*tile, result));
                    });
                });
            });

            for (tile, result) in rx {
                if first_error.is_some() {
                    continue;
                }
                match result.and_then(|block| sink.write_window(tile.dest, &block)) {
                    Ok(()) => {
                        written += 1;
                        debug!(
                            index = tile.index,
                            col = tile.dest.col_off,
                            row = tile.dest.row_off,
                            "tile written"
                        );
                        progress(written, total);
                    }
                    Err(e) => {
                        cancel.store(true, Ordering::Relaxed);
                        let (col, row) = (tile.dest.col_off, tile.dest.row_off);
                        warn!(col, row, "tile failed: {}", e);
                        first_error = Some(Error::Tile {
                            col,
                            row,
                            source: Box::new(e),
                        });
                    }
                }
            }
        });

        if let Some(e) = first_error {
            return Err(e);
        }
        if written < total {
            warn!(written, total, "run cancelled");
            return Err(Error::Cancelled);
        }

        let summary = RunSummary {
            tiles: total,
            output_shape: plan.output_shape(),
            margin: self.margin,
            workers,
            elapsed: start.elapsed(),
        };
        info!(
            tiles = summary.tiles,
            rows = summary.output_shape.0,
            cols = summary.output_shape.1,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "chunked run finished"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use csmap_core::Raster;

    fn ramp(rows: usize, cols: usize) -> Raster<f64> {
        let data: Vec<f64> = (0..rows * cols)
            .map(|i| {
                let (r, c) = ((i / cols) as f64, (i % cols) as f64);
                100.0 + 3.0 * r + 0.5 * c + (r * 0.3).sin() * 8.0
            })
            .collect();
        Raster::from_vec(data, rows, cols).unwrap()
    }

    #[test]
    fn new_rejects_small_chunk() {
        let err = ChunkScheduler::new(CsmapParams::default(), 16).unwrap_err();
        assert!(matches!(err, Error::ChunkTooSmall { .. }));
    }

    #[test]
    fn new_rejects_bad_params() {
        let p = CsmapParams::default().with_cvt_size(0);
        assert!(ChunkScheduler::new(p, 1024).unwrap_err().is_configuration());
    }

    #[test]
    fn run_reports_summary_and_progress() {
        let dem = ramp(60, 50);
        let scheduler = ChunkScheduler::new(CsmapParams::default(), 30)
            .unwrap()
            .with_workers(Some(2));
        let mut sink = scheduler.memory_sink(&dem).unwrap();
        let mut calls = Vec::new();
        let summary = scheduler
            .run_with_progress(&dem, &mut sink, |done, total| calls.push((done, total)))
            .unwrap();

        // step 14 over 44 rows and 34 cols -> 4 x 3 tiles
        assert_eq!(summary.tiles, 12);
        assert_eq!(summary.output_shape, (44, 34));
        assert_eq!(summary.workers, 2);
        assert_eq!(calls.len(), 12);
        assert_eq!(calls.last(), Some(&(12, 12)));
        assert_eq!(sink.layer().shape(), (44, 34));
    }

    #[test]
    fn pre_cancelled_run_fails() {
        let dem = ramp(40, 40);
        let flag = Arc::new(AtomicBool::new(true));
        let scheduler = ChunkScheduler::new(CsmapParams::default(), 24)
            .unwrap()
            .with_cancel_flag(flag);
        let mut sink = scheduler.memory_sink(&dem).unwrap();
        assert!(matches!(scheduler.run(&dem, &mut sink), Err(Error::Cancelled)));
    }

    #[test]
    fn input_without_interior_fails_before_work() {
        let dem = ramp(10, 10);
        let scheduler = ChunkScheduler::new(CsmapParams::default(), 64).unwrap();
        let mut sink = RgbaRaster::new(1, 1);
        assert!(matches!(
            scheduler.run(&dem, &mut sink),
            Err(Error::InvalidDimensions { .. })
        ));
    }
}
