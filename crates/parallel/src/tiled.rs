//! Chunk planning over the output extent

use csmap_core::{Result, Window};

use crate::margin::Margin;

/// One unit of chunked work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkTile {
    /// Position in plan order (row-major)
    pub index: usize,
    /// Input region to read, clipped to the input grid
    pub read: Window,
    /// Output region this tile owns after trimming
    pub dest: Window,
}

/// Iterator over chunk tiles in row-major order.
///
/// Tile origins step over the output extent; the tile at output `(x, y)`
/// reads the input window starting at `(x, y)`, because output pixel `o`
/// sits over input pixel `o + border`.
pub struct TileIterator {
    input: (usize, usize),
    output: (usize, usize),
    chunk_size: usize,
    step: usize,
    current_row: usize,
    current_col: usize,
    index: usize,
}

impl TileIterator {
    pub fn new(
        input: (usize, usize),
        output: (usize, usize),
        chunk_size: usize,
        step: usize,
    ) -> Self {
        Self {
            input,
            output,
            chunk_size,
            step: step.max(1),
            current_row: 0,
            current_col: 0,
            index: 0,
        }
    }
}

impl Iterator for TileIterator {
    type Item = ChunkTile;

    fn next(&mut self) -> Option<Self::Item> {
        let (in_rows, in_cols) = self.input;
        let (out_rows, out_cols) = self.output;
        if self.current_row >= out_rows || out_cols == 0 {
            return None;
        }

        let (x, y) = (self.current_col, self.current_row);
        let read = Window::new(x, y, self.chunk_size, self.chunk_size).clip(in_rows, in_cols);
        let dest = Window::new(
            x,
            y,
            self.step.min(out_cols - x),
            self.step.min(out_rows - y),
        );
        let tile = ChunkTile {
            index: self.index,
            read,
            dest,
        };

        self.index += 1;
        self.current_col += self.step;
        if self.current_col >= out_cols {
            self.current_col = 0;
            self.current_row += self.step;
        }

        Some(tile)
    }
}

/// The full set of tiles for one run.
#[derive(Debug, Clone)]
pub struct ChunkPlan {
    tiles: Vec<ChunkTile>,
    input: (usize, usize),
    output: (usize, usize),
    chunk_size: usize,
    step: usize,
    margin: Margin,
}

impl ChunkPlan {
    /// Plan a run over an input of `(rows, cols)`.
    ///
    /// Fails with `ChunkTooSmall` when a chunk cannot keep any interior and
    /// with `InvalidDimensions` when the input has no output pixels.
    pub fn new(input: (usize, usize), chunk_size: usize, margin: Margin) -> Result<Self> {
        let step = margin.chunk_step(chunk_size)?;
        let output = margin.output_size(input.0, input.1)?;
        let tiles = TileIterator::new(input, output, chunk_size, step).collect();
        Ok(Self {
            tiles,
            input,
            output,
            chunk_size,
            step,
            margin,
        })
    }

    pub fn tiles(&self) -> &[ChunkTile] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Input (rows, cols)
    pub fn input_shape(&self) -> (usize, usize) {
        self.input
    }

    /// Output (rows, cols)
    pub fn output_shape(&self) -> (usize, usize) {
        self.output
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Output pixels per full tile along each axis
    pub fn step(&self) -> usize {
        self.step
    }

    pub fn margin(&self) -> Margin {
        self.margin
    }
}
