use std::fmt;

use thiserror::Error;

use crate::Age;
use crate::Coord;

/// Generation number of a freshly created [`Grid`].
pub const FIRST_GENERATION: u64 = 1;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("Invalid grid dimensions {rows}x{cols}, both must be at least 1 and the grid must fit in memory")]
    InvalidDimension { rows: usize, cols: usize },

    #[error("Cell ({row}, {col}) is outside the {rows}x{cols} grid")]
    OutOfBounds {
        row: Coord,
        col: Coord,
        rows: usize,
        cols: usize,
    },
}

/// A bounded, non-toroidal Life universe.
///
/// Cells hold their age: `0` is dead, anything above is the number of consecutive generations the
/// cell has been alive. Two buffers are kept so that the next generation is always computed from
/// a fully materialized previous one.
pub struct Grid {
    rows: usize,
    cols: usize,

    /// Row-major ages of the current generation
    current: Vec<Age>,

    /// Row-major ages of the generation before `current`
    previous: Vec<Age>,

    alive: usize,
    generation: u64,
}

impl Grid {
    /// Create an empty grid of `rows` by `cols` cells.
    pub fn new(rows: usize, cols: usize) -> Result<Self, GridError> {
        if rows == 0 || cols == 0 {
            return Err(GridError::InvalidDimension { rows, cols });
        }

        // the two buffers must be addressable
        let Some(n) = rows
            .checked_mul(cols)
            .filter(|&n| n <= isize::MAX as usize / std::mem::size_of::<Age>())
        else {
            return Err(GridError::InvalidDimension { rows, cols });
        };

        Ok(Self {
            rows,
            cols,
            current: vec![0; n],
            previous: vec![0; n],
            alive: 0,
            generation: FIRST_GENERATION,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn alive_count(&self) -> usize {
        self.alive
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Age of the cell at `(row, col)` in the current generation, `None` if outside the grid.
    pub fn age(&self, row: usize, col: usize) -> Option<Age> {
        self.snapshot().age(row, col)
    }

    /// Whether `(row, col)` is inside the grid.
    pub fn contains(&self, row: Coord, col: Coord) -> bool {
        self.index(row, col).is_some()
    }

    /// Bring the cell at `(row, col)` to life with age `1`.
    pub fn set_alive(&mut self, row: Coord, col: Coord) -> Result<(), GridError> {
        self.set_age(row, col, 1)
    }

    /// Set the age of the cell at `(row, col)`, keeping the alive count in sync.
    ///
    /// Out of range coordinates are an error, never silently ignored: a seed that does not fit
    /// means the grid is too small for it.
    pub fn set_age(&mut self, row: Coord, col: Coord, age: Age) -> Result<(), GridError> {
        let Some(i) = self.index(row, col) else {
            return Err(GridError::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        };

        match (self.current[i] > 0, age > 0) {
            (false, true) => self.alive += 1,
            (true, false) => self.alive -= 1,
            _ => {}
        }

        self.current[i] = age;

        Ok(())
    }

    /// Bring every `(row, col)` cell to life, or none of them if any falls outside the grid.
    pub fn set_all_alive(&mut self, cells: &[(Coord, Coord)]) -> Result<(), GridError> {
        if let Some(&(row, col)) = cells.iter().find(|&&(r, c)| !self.contains(r, c)) {
            return Err(GridError::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }

        for &(row, col) in cells {
            self.set_alive(row, col)?;
        }

        Ok(())
    }

    /// Number of live cells in the Moore neighborhood of `(row, col)` in the previous
    /// generation. Neighbors outside the grid do not exist, there is no wraparound.
    pub fn neighbor_count(&self, row: usize, col: usize) -> u8 {
        let mut n = 0;

        let rows = row.saturating_sub(1)..=(row + 1).min(self.rows - 1);

        for r in rows {
            let cols = col.saturating_sub(1)..=(col + 1).min(self.cols - 1);

            for c in cols {
                if (r, c) == (row, col) {
                    continue;
                }

                if self.previous[self.xy_from(r, c)] > 0 {
                    n += 1;
                }
            }
        }

        n
    }

    /// Advance the grid by one generation using the B3/S23 rule.
    ///
    /// Survivors age by one, births start at age `1`, everything else is dead.
    pub fn step(&mut self) {
        std::mem::swap(&mut self.current, &mut self.previous);
        self.current.fill(0);

        let mut alive = 0;

        for row in 0..self.rows {
            for col in 0..self.cols {
                let n = self.neighbor_count(row, col);
                let i = self.xy_from(row, col);
                let age = self.previous[i];

                let next = match (age > 0, n) {
                    (true, 2 | 3) => age.saturating_add(1),
                    (false, 3) => 1,
                    _ => 0,
                };

                if next > 0 {
                    alive += 1;
                }

                self.current[i] = next;
            }
        }

        self.alive = alive;
        self.generation += 1;
    }

    /// Read-only view of the current generation.
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            rows: self.rows,
            cols: self.cols,
            cells: &self.current,
            generation: self.generation,
            alive: self.alive,
        }
    }

    /// Replace the current generation wholesale. `cells` must be row-major and exactly
    /// `rows * cols` long.
    pub(crate) fn replace_cells(&mut self, cells: Vec<Age>) {
        assert_eq!(cells.len(), self.current.len(), "cell buffer has the wrong size");

        self.alive = cells.iter().filter(|&&age| age > 0).count();
        self.current = cells;
    }

    fn index(&self, row: Coord, col: Coord) -> Option<usize> {
        let row = usize::try_from(row).ok().filter(|&r| r < self.rows)?;
        let col = usize::try_from(col).ok().filter(|&c| c < self.cols)?;

        Some(self.xy_from(row, col))
    }

    fn xy_from(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }
}

/// Borrowed view of one generation, handed to renderers.
#[derive(Clone, Copy)]
pub struct Snapshot<'a> {
    rows: usize,
    cols: usize,
    cells: &'a [Age],
    generation: u64,
    alive: usize,
}

impl<'a> Snapshot<'a> {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn alive_count(&self) -> usize {
        self.alive
    }

    /// Row-major ages
    pub fn cells(&self) -> &'a [Age] {
        self.cells
    }

    /// Age of the cell at `(row, col)`, `None` if outside the snapshot.
    pub fn age(&self, row: usize, col: usize) -> Option<Age> {
        if row >= self.rows || col >= self.cols {
            return None;
        }

        self.cells.get(row * self.cols + col).copied()
    }

    /// Iterate over the rows of the snapshot, top to bottom.
    pub fn lines(&self) -> impl Iterator<Item = &'a [Age]> + 'a {
        self.cells.chunks(self.cols)
    }
}

impl fmt::Display for Snapshot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }

            for &age in line {
                f.write_str(if age > 0 { "*" } else { "." })?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::Grid;
    use super::GridError;

    fn grid_with(rows: usize, cols: usize, cells: &[(i64, i64)]) -> Grid {
        let mut grid = Grid::new(rows, cols).unwrap();
        for &(r, c) in cells {
            grid.set_alive(r, c).unwrap();
        }

        grid
    }

    #[test]
    fn zero_rows_is_invalid() {
        let err = Grid::new(0, 10).err();

        assert_eq!(err, Some(GridError::InvalidDimension { rows: 0, cols: 10 }));
    }

    #[test]
    fn zero_cols_is_invalid() {
        assert!(Grid::new(3, 0).is_err());
    }

    #[test]
    fn huge_dimensions_are_invalid() {
        let err = Grid::new(usize::MAX, 2).err();
        assert_eq!(
            err,
            Some(GridError::InvalidDimension {
                rows: usize::MAX,
                cols: 2
            })
        );

        // no overflow, but far too many cells to allocate
        assert!(Grid::new(usize::MAX / 2, 1).is_err());
    }

    #[test]
    fn set_alive_out_of_bounds() {
        let mut grid = Grid::new(4, 4).unwrap();

        assert!(grid.set_alive(4, 0).is_err());
        assert!(grid.set_alive(0, -1).is_err());
        assert_eq!(grid.alive_count(), 0);
    }

    #[test]
    fn set_alive_counts_transitions_once() {
        let mut grid = Grid::new(4, 4).unwrap();

        grid.set_alive(1, 1).unwrap();
        grid.set_alive(1, 1).unwrap();
        grid.set_age(2, 2, 7).unwrap();

        assert_eq!(grid.alive_count(), 2);
        assert_eq!(grid.age(2, 2), Some(7));

        grid.set_age(1, 1, 0).unwrap();
        assert_eq!(grid.alive_count(), 1);
    }

    #[test]
    fn age_outside_the_grid_is_none() {
        let grid = grid_with(2, 3, &[(1, 2)]);
        let snapshot = grid.snapshot();

        assert_eq!(snapshot.age(1, 2), Some(1));
        assert_eq!(snapshot.age(2, 0), None);
        assert_eq!(snapshot.age(0, 3), None);
        assert_eq!(grid.age(0, 3), None);
    }

    #[test]
    fn set_all_alive_is_all_or_nothing() {
        let mut grid = Grid::new(3, 3).unwrap();

        let err = grid.set_all_alive(&[(0, 0), (1, 1), (3, 1)]).unwrap_err();

        assert_eq!(
            err,
            GridError::OutOfBounds {
                row: 3,
                col: 1,
                rows: 3,
                cols: 3
            }
        );
        assert_eq!(grid.alive_count(), 0);
        assert_eq!(grid.age(0, 0), Some(0));
    }

    #[test]
    fn corner_has_three_neighbors_at_most() {
        let mut grid = Grid::new(5, 5).unwrap();
        for r in 0..5 {
            for c in 0..5 {
                grid.set_alive(r, c).unwrap();
            }
        }

        // neighbors are counted against the previous generation
        grid.step();

        assert_eq!(grid.neighbor_count(0, 0), 3);
        assert_eq!(grid.neighbor_count(4, 4), 3);
        assert_eq!(grid.neighbor_count(0, 2), 5);
        assert_eq!(grid.neighbor_count(2, 2), 8);
    }

    #[test]
    fn block_is_still_life() {
        let mut grid = grid_with(6, 6, &[(2, 2), (2, 3), (3, 2), (3, 3)]);

        grid.step();

        assert_eq!(grid.alive_count(), 4);
        for (r, c) in [(2, 2), (2, 3), (3, 2), (3, 3)] {
            assert_eq!(grid.age(r, c), Some(2));
        }
        assert_eq!(grid.generation(), 2);
    }

    #[test]
    fn birth_resets_age() {
        // an L of three cells: the missing corner is born
        let mut grid = grid_with(4, 4, &[(1, 1), (1, 2), (2, 1)]);

        grid.step();

        assert_eq!(grid.age(2, 2), Some(1));
        assert_eq!(grid.age(1, 1), Some(2));
    }

    #[test]
    fn lonely_cell_dies() {
        let mut grid = grid_with(3, 3, &[(1, 1)]);

        grid.step();

        assert_eq!(grid.age(1, 1), Some(0));
        assert_eq!(grid.alive_count(), 0);
    }

    #[test]
    fn blinker_oscillates() {
        let mut grid = grid_with(5, 5, &[(2, 1), (2, 2), (2, 3)]);

        grid.step();
        insta::assert_snapshot!(grid.snapshot(), @r"
        .....
        ..*..
        ..*..
        ..*..
        .....
        ");

        grid.step();
        insta::assert_snapshot!(grid.snapshot(), @r"
        .....
        .....
        .***.
        .....
        .....
        ");

        // the center survived both steps, the ends were reborn
        assert_eq!(grid.age(2, 2), Some(3));
        assert_eq!(grid.age(2, 1), Some(1));
    }

    #[test]
    fn glider_dies_at_the_edge() {
        // heading down-right into the corner of a small universe
        let mut grid = grid_with(5, 5, &[(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)]);

        for _ in 0..20 {
            grid.step();
        }

        insta::assert_snapshot!(grid.snapshot(), @r"
        .....
        .....
        .....
        ...**
        ...**
        ");
    }
}
