//! Level tables: one grid of enemy types per level.

use color_eyre::eyre::{Result, bail};

use crate::entities::EnemyType;

pub const GRID_ROWS: usize = 7;
pub const GRID_COLS: usize = 7;

type BuiltinGrid = [[u8; GRID_COLS]; GRID_ROWS];

// 0 = empty, 1 = octopus, 2 = crab, 3 = squid. Row 0 is the top row.
const BUILTIN_LEVELS: [BuiltinGrid; 5] = [
    [
        [0, 0, 0, 0, 0, 0, 0],
        [0, 0, 0, 0, 0, 0, 0],
        [0, 3, 3, 3, 3, 3, 0],
        [0, 2, 2, 2, 2, 2, 0],
        [0, 1, 1, 1, 1, 1, 0],
        [0, 0, 0, 0, 0, 0, 0],
        [0, 0, 0, 0, 0, 0, 0],
    ],
    [
        [0, 0, 0, 0, 0, 0, 0],
        [0, 0, 0, 3, 0, 0, 0],
        [0, 0, 3, 2, 3, 0, 0],
        [0, 2, 2, 1, 2, 2, 0],
        [1, 1, 1, 1, 1, 1, 1],
        [0, 0, 0, 0, 0, 0, 0],
        [0, 0, 0, 0, 0, 0, 0],
    ],
    [
        [0, 0, 0, 0, 0, 0, 0],
        [3, 3, 3, 3, 3, 3, 3],
        [2, 2, 2, 2, 2, 2, 2],
        [2, 2, 2, 2, 2, 2, 2],
        [1, 1, 1, 1, 1, 1, 1],
        [1, 1, 1, 1, 1, 1, 1],
        [0, 0, 0, 0, 0, 0, 0],
    ],
    [
        [3, 0, 3, 0, 3, 0, 3],
        [0, 3, 0, 3, 0, 3, 0],
        [2, 0, 2, 0, 2, 0, 2],
        [0, 2, 0, 2, 0, 2, 0],
        [1, 1, 1, 1, 1, 1, 1],
        [1, 1, 1, 1, 1, 1, 1],
        [0, 0, 0, 0, 0, 0, 0],
    ],
    [
        [3, 3, 3, 3, 3, 3, 3],
        [3, 3, 3, 3, 3, 3, 3],
        [2, 2, 2, 2, 2, 2, 2],
        [2, 2, 2, 2, 2, 2, 2],
        [1, 1, 1, 1, 1, 1, 1],
        [1, 1, 1, 1, 1, 1, 1],
        [1, 1, 1, 1, 1, 1, 1],
    ],
];

/// One level's enemy layout, stored row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelDefinition {
    rows: usize,
    cols: usize,
    cells: Vec<u8>,
}

impl LevelDefinition {
    fn from_builtin(grid: &BuiltinGrid) -> Self {
        Self {
            rows: GRID_ROWS,
            cols: GRID_COLS,
            cells: grid.iter().flatten().copied().collect(),
        }
    }

    /// Builds a level from rows of cell values, rejecting ragged rows,
    /// values above 3 and levels without a single enemy.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self> {
        let Some(first) = rows.first() else {
            bail!("level has no rows");
        };
        let cols = first.as_ref().len();
        if cols == 0 {
            bail!("level has no columns");
        }

        let mut cells = Vec::with_capacity(rows.len() * cols);
        for (row, values) in rows.iter().enumerate() {
            let values = values.as_ref();
            if values.len() != cols {
                bail!(
                    "row {} has {} cells, expected {}",
                    row,
                    values.len(),
                    cols
                );
            }
            if let Some(bad) = values.iter().find(|v| **v > 3) {
                bail!("row {} holds cell value {}, expected 0..=3", row, bad);
            }
            cells.extend_from_slice(values);
        }

        let level = Self {
            rows: rows.len(),
            cols,
            cells,
        };
        if level.enemy_count() == 0 {
            bail!("level has no enemies");
        }
        Ok(level)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.cells[row * self.cols + col]
    }

    /// `(row, column, type)` of every occupied cell, top row first
    pub fn enemies(&self) -> impl Iterator<Item = (usize, usize, EnemyType)> + '_ {
        self.cells.iter().enumerate().filter_map(|(i, value)| {
            EnemyType::from_level_value(*value).map(|t| (i / self.cols, i % self.cols, t))
        })
    }

    pub fn enemy_count(&self) -> usize {
        self.enemies().count()
    }
}

/// Ordered levels that all share one grid size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelSet {
    levels: Vec<LevelDefinition>,
}

impl Default for LevelSet {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LevelSet {
    pub fn builtin() -> Self {
        Self {
            levels: BUILTIN_LEVELS.iter().map(LevelDefinition::from_builtin).collect(),
        }
    }

    pub fn new(levels: Vec<LevelDefinition>) -> Result<Self> {
        let Some(first) = levels.first() else {
            bail!("level set is empty");
        };
        let (rows, cols) = (first.rows(), first.cols());
        for (i, level) in levels.iter().enumerate() {
            if level.rows() != rows || level.cols() != cols {
                bail!(
                    "level {} is {}x{}, expected {}x{}",
                    i + 1,
                    level.rows(),
                    level.cols(),
                    rows,
                    cols
                );
            }
        }
        Ok(Self { levels })
    }

    /// Parses raw grids, e.g. from a config file
    pub fn from_grids(grids: &[Vec<Vec<u8>>]) -> Result<Self> {
        let levels = grids
            .iter()
            .map(|grid| LevelDefinition::from_rows(grid))
            .collect::<Result<Vec<_>>>()?;
        Self::new(levels)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Level by 1-based number
    pub fn get(&self, level: usize) -> Option<&LevelDefinition> {
        level.checked_sub(1).and_then(|i| self.levels.get(i))
    }

    pub fn is_last(&self, level: usize) -> bool {
        level >= self.levels.len()
    }

    pub fn rows(&self) -> usize {
        self.levels.first().map_or(GRID_ROWS, |l| l.rows())
    }

    pub fn cols(&self) -> usize {
        self.levels.first().map_or(GRID_COLS, |l| l.cols())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_levels_are_valid() {
        let set = LevelSet::builtin();
        assert_eq!(set.len(), 5);
        assert_eq!(set.rows(), 7);
        assert_eq!(set.cols(), 7);
        for level in 1..=set.len() {
            let definition = set.get(level).unwrap();
            assert!(definition.enemy_count() > 0);
        }
    }

    #[test]
    fn test_level_numbers_are_one_based() {
        let set = LevelSet::builtin();
        assert!(set.get(0).is_none());
        assert!(set.get(1).is_some());
        assert!(set.get(6).is_none());
        assert!(!set.is_last(4));
        assert!(set.is_last(5));
    }

    #[test]
    fn test_enemies_iterates_occupied_cells() {
        let level = LevelDefinition::from_rows(&[vec![0u8, 1, 0], vec![2, 0, 3]]).unwrap();
        let enemies: Vec<_> = level.enemies().collect();
        assert_eq!(
            enemies,
            vec![
                (0, 1, EnemyType::Octopus),
                (1, 0, EnemyType::Crab),
                (1, 2, EnemyType::Squid),
            ]
        );
        assert_eq!(level.get(1, 2), 3);
    }

    #[test]
    fn test_rejects_bad_levels() {
        assert!(LevelDefinition::from_rows::<Vec<u8>>(&[]).is_err());
        assert!(LevelDefinition::from_rows(&[vec![1u8, 1], vec![1]]).is_err());
        assert!(LevelDefinition::from_rows(&[vec![1u8, 4]]).is_err());
        assert!(LevelDefinition::from_rows(&[vec![0u8, 0]]).is_err());
    }

    #[test]
    fn test_rejects_mismatched_sizes() {
        let grids = vec![vec![vec![1, 1]], vec![vec![1, 1, 1]]];
        assert!(LevelSet::from_grids(&grids).is_err());
        assert!(LevelSet::from_grids(&[]).is_err());
    }

    #[test]
    fn test_custom_grid_size() {
        let grids = vec![vec![vec![1, 2, 3, 1], vec![0, 0, 0, 1]]];
        let set = LevelSet::from_grids(&grids).unwrap();
        assert_eq!(set.rows(), 2);
        assert_eq!(set.cols(), 4);
    }
}
