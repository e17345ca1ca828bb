//! Piece catalog - immutable shape templates
//!
//! Each template is a square occupancy grid (3x3 for the small pieces, 4x4
//! for the long and square pieces) in its default orientation plus the
//! visual token its locked cells carry. Local coordinates are `(col, row)`
//! with row 0 at the bottom, matching the playfield.
//!
//! Templates are parsed from text patterns at construction time so a
//! malformed catalog is rejected before any game starts.

use crate::error::CatalogError;
use crate::types::{PieceKind, MAX_SHAPE_SIZE};

/// Occupancy grid of a piece in one orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeGrid {
    size: u8,
    /// Flat storage, `col + row * MAX_SHAPE_SIZE`
    cells: [bool; MAX_SHAPE_SIZE * MAX_SHAPE_SIZE],
}

impl ShapeGrid {
    /// Create an empty grid. `size` must be 3 or 4.
    fn empty(size: u8) -> Self {
        Self {
            size,
            cells: [false; MAX_SHAPE_SIZE * MAX_SHAPE_SIZE],
        }
    }

    /// Parse rows listed top-down, `#` = occupied, `.` = empty.
    pub fn parse(kind: PieceKind, rows: &[&str]) -> Result<Self, CatalogError> {
        let size = rows.len();
        if size != 3 && size != 4 {
            return Err(CatalogError::UnsupportedSize { kind, size });
        }

        let mut grid = Self::empty(size as u8);
        for (r, line) in rows.iter().enumerate() {
            let len = line.chars().count();
            if len != size {
                return Err(CatalogError::RaggedRow {
                    kind,
                    row: r,
                    len,
                    expected: size,
                });
            }
            let row = size - 1 - r;
            for (col, glyph) in line.chars().enumerate() {
                match glyph {
                    '#' => grid.cells[col + row * MAX_SHAPE_SIZE] = true,
                    '.' => {}
                    _ => return Err(CatalogError::InvalidGlyph { kind, glyph }),
                }
            }
        }

        if grid.count() == 0 {
            return Err(CatalogError::EmptyShape { kind });
        }
        Ok(grid)
    }

    /// Side length of the square grid (3 or 4)
    pub fn size(&self) -> u8 {
        self.size
    }

    /// Occupancy of local cell `(col, row)`; outside the grid is empty
    pub fn get(&self, col: i8, row: i8) -> bool {
        let size = self.size as i8;
        if col < 0 || row < 0 || col >= size || row >= size {
            return false;
        }
        self.cells[col as usize + row as usize * MAX_SHAPE_SIZE]
    }

    /// Occupied local cells as `(col, row)`, bottom row first
    pub fn cells(&self) -> impl Iterator<Item = (i8, i8)> + '_ {
        let size = self.size as i8;
        (0..size)
            .flat_map(move |row| (0..size).map(move |col| (col, row)))
            .filter(move |&(col, row)| self.get(col, row))
    }

    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// The next orientation, a quarter turn clockwise.
    ///
    /// `out[i, j] = in[size - 1 - j, i]` over the square grid.
    pub fn rotated_cw(&self) -> Self {
        let size = self.size as i8;
        let mut out = Self::empty(self.size);
        for j in 0..size {
            for i in 0..size {
                out.cells[i as usize + j as usize * MAX_SHAPE_SIZE] = self.get(size - 1 - j, i);
            }
        }
        out
    }
}

/// Immutable template for one piece type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceTemplate {
    pub kind: PieceKind,
    pub shape: ShapeGrid,
}

/// Standard seven pieces, default orientations
const STANDARD_PATTERNS: [(PieceKind, &[&str]); 7] = [
    (PieceKind::I, &["....", "####", "....", "...."]),
    (PieceKind::O, &["....", ".##.", ".##.", "...."]),
    (PieceKind::T, &[".#.", "###", "..."]),
    (PieceKind::S, &[".##", "##.", "..."]),
    (PieceKind::Z, &["##.", ".##", "..."]),
    (PieceKind::J, &["#..", "###", "..."]),
    (PieceKind::L, &["..#", "###", "..."]),
];

/// The set of playable shapes, addressed by 0-based index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceCatalog {
    templates: Vec<PieceTemplate>,
}

impl PieceCatalog {
    /// The seven standard tetrominoes (I and O on 4x4 grids, the rest 3x3)
    pub fn standard() -> Self {
        Self::from_patterns(&STANDARD_PATTERNS).expect("standard piece patterns are well formed")
    }

    /// Build a catalog from text patterns, rejecting any malformed entry.
    pub fn from_patterns(patterns: &[(PieceKind, &[&str])]) -> Result<Self, CatalogError> {
        if patterns.is_empty() {
            return Err(CatalogError::Empty);
        }
        let templates = patterns
            .iter()
            .map(|&(kind, rows)| {
                ShapeGrid::parse(kind, rows).map(|shape| PieceTemplate { kind, shape })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { templates })
    }

    /// Number of distinct shapes
    pub fn count(&self) -> usize {
        self.templates.len()
    }

    /// Template for a 0-based index.
    ///
    /// Indices come from a sequencer built with this catalog's `count()`.
    pub fn shape_at(&self, index: usize) -> &PieceTemplate {
        &self.templates[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &PieceTemplate> {
        self.templates.iter()
    }
}

impl Default for PieceCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
