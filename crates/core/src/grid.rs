//! Playfield grid - locked cells only
//!
//! The grid is a 10x20 array of cells stored flat for cache locality.
//! Coordinates: (col, row) where col ranges 0..9 (left to right) and row
//! ranges 0..19 (**bottom to top**). The falling piece is never stored here;
//! its cells are written only when it locks.
//!
//! Boundary rules for occupancy queries:
//! - columns outside `0..width` are walls (blocked)
//! - rows below 0 are the floor (blocked)
//! - rows at or above `height` are open sky (free)

use crate::types::{Cell, PieceKind, GRID_HEIGHT, GRID_WIDTH};

/// Total number of cells on the grid
const GRID_SIZE: usize = (GRID_WIDTH as usize) * (GRID_HEIGHT as usize);

#[derive(Debug, Clone, PartialEq)]
pub struct PlayfieldGrid {
    /// Flat array of cells, row-major order (row * WIDTH + col)
    cells: [Cell; GRID_SIZE],
}

impl PlayfieldGrid {
    pub fn new() -> Self {
        Self {
            cells: [None; GRID_SIZE],
        }
    }

    #[inline(always)]
    fn index(col: i8, row: i8) -> Option<usize> {
        if col < 0 || col >= GRID_WIDTH as i8 || row < 0 || row >= GRID_HEIGHT as i8 {
            return None;
        }
        Some((row as usize) * (GRID_WIDTH as usize) + (col as usize))
    }

    pub fn width(&self) -> u8 {
        GRID_WIDTH
    }

    pub fn height(&self) -> u8 {
        GRID_HEIGHT
    }

    /// Cell at (col, row), or None outside the grid
    pub fn get(&self, col: i8, row: i8) -> Option<Cell> {
        Self::index(col, row).map(|idx| self.cells[idx])
    }

    /// Occupancy with the wall/floor/sky rules applied
    pub fn is_occupied(&self, col: i8, row: i8) -> bool {
        if row >= GRID_HEIGHT as i8 {
            return false;
        }
        match Self::index(col, row) {
            Some(idx) => self.cells[idx].is_some(),
            None => true,
        }
    }

    /// Fill one cell.
    ///
    /// Returns false (and writes nothing) if the target is outside the grid,
    /// including at or above the top row, or already occupied.
    pub fn occupy(&mut self, col: i8, row: i8, kind: PieceKind) -> bool {
        match Self::index(col, row) {
            Some(idx) if self.cells[idx].is_none() => {
                self.cells[idx] = Some(kind);
                true
            }
            _ => false,
        }
    }

    /// Lock a set of board cells, all or nothing.
    ///
    /// Every target is validated before the first write, so a rejected lock
    /// leaves the grid untouched.
    pub fn lock_cells(&mut self, cells: &[(i8, i8)], kind: PieceKind) -> bool {
        let all_free = cells
            .iter()
            .all(|&(col, row)| matches!(self.get(col, row), Some(None)));
        if !all_free {
            return false;
        }
        for &(col, row) in cells {
            self.occupy(col, row, kind);
        }
        true
    }

    pub fn is_row_complete(&self, row: usize) -> bool {
        if row >= GRID_HEIGHT as usize {
            return false;
        }
        let start = row * GRID_WIDTH as usize;
        let end = start + GRID_WIDTH as usize;
        self.cells[start..end].iter().all(|cell| cell.is_some())
    }

    /// Remove one row, shifting every row above it down by one.
    /// The top row becomes empty.
    fn remove_row(&mut self, row: usize) {
        let width = GRID_WIDTH as usize;
        let start = row * width;
        // copy_within handles the overlapping ranges
        self.cells.copy_within(start + width.., start);
        let top = (GRID_HEIGHT as usize - 1) * width;
        self.cells[top..].fill(None);
    }

    /// Clear completed rows in `min..=max`, scanning from `max` down to `min`.
    ///
    /// The range is clamped to the grid. Returns the number of rows cleared.
    pub fn clear_completed_rows(&mut self, min: i8, max: i8) -> usize {
        let min = min.max(0);
        let max = max.min(GRID_HEIGHT as i8 - 1);
        if min > max {
            return 0;
        }

        let mut cleared = 0;
        for row in (min as usize..=max as usize).rev() {
            if self.is_row_complete(row) {
                self.remove_row(row);
                cleared += 1;
            }
        }
        cleared
    }

    /// Every locked cell as (col, row, token), bottom row first
    pub fn occupied_cells(&self) -> impl Iterator<Item = (i8, i8, PieceKind)> + '_ {
        let width = GRID_WIDTH as usize;
        self.cells.iter().enumerate().filter_map(move |(idx, cell)| {
            cell.map(|kind| ((idx % width) as i8, (idx / width) as i8, kind))
        })
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_none())
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Write piece codes into a `u8` grid (0 = empty), indexed `[row][col]`
    pub fn write_u8_grid(&self, out: &mut [[u8; GRID_WIDTH as usize]; GRID_HEIGHT as usize]) {
        let width = GRID_WIDTH as usize;
        for (row, line) in out.iter_mut().enumerate() {
            for (col, code) in line.iter_mut().enumerate() {
                *code = self.cells[row * width + col].map_or(0, |kind| kind.code());
            }
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(None);
    }
}

impl Default for PlayfieldGrid {
    fn default() -> Self {
        Self::new()
    }
}
