//! Rectangular regions of a grid

use std::fmt;

/// A rectangle `(col_off, row_off, width, height)` in pixel space.
///
/// Windows address both read regions of the height grid and destination
/// regions of the output raster. Column/row order follows the GDAL window
/// convention (x first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Window {
    pub col_off: usize,
    pub row_off: usize,
    pub width: usize,
    pub height: usize,
}

impl Window {
    pub fn new(col_off: usize, row_off: usize, width: usize, height: usize) -> Self {
        Self {
            col_off,
            row_off,
            width,
            height,
        }
    }

    /// Exclusive end column
    pub fn col_end(&self) -> usize {
        self.col_off + self.width
    }

    /// Exclusive end row
    pub fn row_end(&self) -> usize {
        self.row_off + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Clip this window to a grid of `rows x cols`.
    ///
    /// A window that starts outside the grid clips to an empty window at the edge.
    pub fn clip(&self, rows: usize, cols: usize) -> Self {
        let col_off = self.col_off.min(cols);
        let row_off = self.row_off.min(rows);
        Self {
            col_off,
            row_off,
            width: self.col_end().min(cols) - col_off,
            height: self.row_end().min(rows) - row_off,
        }
    }

    /// Whether the two windows share at least one cell
    pub fn intersects(&self, other: &Window) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.col_off < other.col_end()
            && other.col_off < self.col_end()
            && self.row_off < other.row_end()
            && other.row_off < self.row_end()
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}+{}, {}+{}]",
            self.col_off, self.width, self.row_off, self.height
        )
    }
}
