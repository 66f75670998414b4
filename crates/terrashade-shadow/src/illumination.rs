//! Rendered illumination masks.

use serde::{Deserialize, Serialize};

/// A `size` x `size` lit/shadowed mask, row 0 south.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IlluminationGrid {
    size: usize,
    /// Row-major, `cells[row * size + col]`.
    cells: Vec<bool>,
}

impl IlluminationGrid {
    /// Assemble a grid from rows, south first.
    pub(crate) fn from_rows(size: usize, rows: impl IntoIterator<Item = Vec<bool>>) -> Self {
        let mut cells = Vec::with_capacity(size * size);
        for row in rows {
            debug_assert_eq!(row.len(), size);
            cells.extend(row);
        }
        debug_assert_eq!(cells.len(), size * size);
        Self { size, cells }
    }

    /// Cells per side.
    pub fn size(&self) -> usize {
        self.size
    }

    /// # Panics
    /// Panics if the cell lies outside the grid.
    pub fn is_lit(&self, col: usize, row: usize) -> bool {
        assert!(col < self.size && row < self.size, "cell ({col}, {row}) outside {}", self.size);
        self.cells[row * self.size + col]
    }

    /// Row-major cells, south row first.
    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    /// Iterate `(col, row)` of every lit cell.
    pub fn lit_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let size = self.size;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &lit)| lit)
            .map(move |(i, _)| (i % size, i / size))
    }

    pub fn lit_count(&self) -> usize {
        self.cells.iter().filter(|&&lit| lit).count()
    }

    /// Fraction of lit cells, 0 for an empty grid.
    pub fn lit_fraction(&self) -> f64 {
        if self.cells.is_empty() {
            0.0
        } else {
            self.lit_count() as f64 / self.cells.len() as f64
        }
    }
}
