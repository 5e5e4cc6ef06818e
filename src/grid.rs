//! The level's enemy grid and shooter selection.

use crate::entities::{EnemyId, Roster};

/// Row-major grid of enemy handles. Row 0 is the top row; the bottom row is
/// closest to the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnemyGrid {
    rows: usize,
    cols: usize,
    cells: Vec<Option<EnemyId>>,
}

impl EnemyGrid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![None; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Out-of-range cells read as empty
    pub fn get(&self, row: usize, col: usize) -> Option<EnemyId> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, enemy: Option<EnemyId>) {
        assert!(
            row < self.rows && col < self.cols,
            "cell ({row}, {col}) outside {}x{} grid",
            self.rows,
            self.cols
        );
        self.cells[row * self.cols + col] = enemy;
    }

    /// Occupants of a column from the bottom row up
    pub fn column_bottom_up(&self, col: usize) -> impl Iterator<Item = EnemyId> + '_ {
        (0..self.rows).rev().filter_map(move |row| self.get(row, col))
    }

    pub fn occupied(&self) -> impl Iterator<Item = EnemyId> + '_ {
        self.cells.iter().flatten().copied()
    }

    /// Empties every cell, returning what was there
    pub fn clear(&mut self) -> Vec<EnemyId> {
        self.cells.iter_mut().filter_map(Option::take).collect()
    }

    /// The lowest live enemy in `col`, skipping empty cells and the dead
    pub fn select_shooter(&self, col: usize, roster: &Roster) -> Option<EnemyId> {
        self.column_bottom_up(col)
            .find(|id| roster.get(id).is_some_and(|enemy| !enemy.is_dead()))
    }
}
