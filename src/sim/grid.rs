//! The level matrix
//!
//! Authoritative cell-occupancy map for the current stage. The grid never owns
//! entities: it stores typed handles (entity ids) that the state resolves.

use serde::{Deserialize, Serialize};

use super::rect::{Direction, Rect};
use crate::cell_to_pixel;
use crate::consts::{COLS, ROWS, SIZE, Y_OFFSET};

/// Entity handle shared by all entity collections
pub type EntityId = u32;

/// What occupies a single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    /// Permanent barrier (border or skeleton pillar)
    Hard,
    /// Destructible block
    Soft(EntityId),
    /// Planted bomb
    Bomb(EntityId),
    /// Revealed power-up
    Special(EntityId),
}

impl Cell {
    #[inline]
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    #[inline]
    pub fn is_hard(self) -> bool {
        self == Cell::Hard
    }
}

/// 2D cell matrix, row-major
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    rows: i32,
    cols: i32,
    cells: Vec<Cell>,
}

impl Default for Grid {
    fn default() -> Self {
        Self::with_skeleton(ROWS + 1, COLS + 1)
    }
}

impl Grid {
    /// An all-empty grid
    pub fn new(rows: i32, cols: i32) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        Self {
            rows,
            cols,
            cells: vec![Cell::Empty; (rows * cols) as usize],
        }
    }

    /// A grid with the border ring and even/even pillars filled with hard blocks
    pub fn with_skeleton(rows: i32, cols: i32) -> Self {
        let mut grid = Self::new(rows, cols);
        for row in 0..grid.rows {
            for col in 0..grid.cols {
                if grid.is_skeleton(row, col) {
                    grid.set(row, col, Cell::Hard);
                }
            }
        }
        grid
    }

    #[inline]
    pub fn rows(&self) -> i32 {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> i32 {
        self.cols
    }

    /// Width of the whole level in pixels
    pub fn width_px(&self) -> i32 {
        self.cols * SIZE
    }

    #[inline]
    pub fn in_bounds(&self, row: i32, col: i32) -> bool {
        row >= 0 && row < self.rows && col >= 0 && col < self.cols
    }

    /// Border ring or even/even pillar
    pub fn is_skeleton(&self, row: i32, col: i32) -> bool {
        row == 0
            || row == self.rows - 1
            || col == 0
            || col == self.cols - 1
            || (row % 2 == 0 && col % 2 == 0)
    }

    /// Junction cells (odd row and odd column) open onto four corridors
    #[inline]
    pub fn is_junction(row: i32, col: i32) -> bool {
        row % 2 != 0 && col % 2 != 0
    }

    /// Checked lookup; off-grid is `None`
    pub fn get(&self, row: i32, col: i32) -> Option<Cell> {
        if self.in_bounds(row, col) {
            Some(self.cells[self.index(row, col)])
        } else {
            None
        }
    }

    /// Occupant of a cell. Callers must stay in bounds.
    pub fn cell(&self, row: i32, col: i32) -> Cell {
        self.cells[self.clamped_index(row, col)]
    }

    pub fn set(&mut self, row: i32, col: i32, cell: Cell) {
        let idx = self.clamped_index(row, col);
        self.cells[idx] = cell;
    }

    pub fn clear(&mut self, row: i32, col: i32) {
        self.set(row, col, Cell::Empty);
    }

    /// Neighbour of a cell one step in `dir` (None if off-grid)
    pub fn neighbor(&self, row: i32, col: i32, dir: Direction) -> Option<Cell> {
        let (dr, dc) = dir.cell_delta();
        self.get(row + dr, col + dc)
    }

    /// Pixel box of a cell
    pub fn cell_rect(row: i32, col: i32) -> Rect {
        Rect::cell_at(cell_to_pixel(row, col))
    }

    /// Cells whose boxes overlap `rect` (row-major order)
    pub fn cells_overlapping(&self, rect: Rect) -> impl Iterator<Item = (i32, i32, Cell)> + '_ {
        self.cells_in_span(rect.left(), rect.right() - 1, rect.top(), rect.bottom() - 1)
    }

    /// Cells covering the pixel span `[x0, x1] x [y0, y1]` (inclusive)
    pub fn cells_in_span(
        &self,
        x0: i32,
        x1: i32,
        y0: i32,
        y1: i32,
    ) -> impl Iterator<Item = (i32, i32, Cell)> + '_ {
        let row_lo = ((y0.min(y1) - Y_OFFSET).div_euclid(SIZE)).max(0);
        let row_hi = ((y0.max(y1) - Y_OFFSET).div_euclid(SIZE)).min(self.rows - 1);
        let col_lo = (x0.min(x1).div_euclid(SIZE)).max(0);
        let col_hi = (x0.max(x1).div_euclid(SIZE)).min(self.cols - 1);
        (row_lo..=row_hi).flat_map(move |row| {
            (col_lo..=col_hi).map(move |col| (row, col, self.cells[self.index(row, col)]))
        })
    }

    /// Every cell in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32, Cell)> + '_ {
        self.cells.iter().enumerate().map(move |(i, cell)| {
            let i = i as i32;
            (i / self.cols, i % self.cols, *cell)
        })
    }

    #[inline]
    fn index(&self, row: i32, col: i32) -> usize {
        (row * self.cols + col) as usize
    }

    /// Fail fast in debug; clamp in release. Never wraps to another row.
    fn clamped_index(&self, row: i32, col: i32) -> usize {
        debug_assert!(
            self.in_bounds(row, col),
            "grid index ({row}, {col}) out of bounds for {}x{}",
            self.rows,
            self.cols
        );
        let row = row.clamp(0, self.rows - 1);
        let col = col.clamp(0, self.cols - 1);
        self.index(row, col)
    }
}
