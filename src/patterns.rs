use crate::Coord;
use crate::grid::Grid;
use crate::grid::GridError;

/// The R-pentomino as `(row, col)` offsets from the grid center.
///
/// ```notrust
///  .**
///  **.
///  .*.
/// ```
pub const R_PENTOMINO: [(Coord, Coord); 5] = [(0, 0), (1, 0), (2, 0), (0, 1), (1, -1)];

/// Seed `grid` with the R-pentomino anchored at `(rows/2, cols/2)`.
pub fn seed_r_pentomino(grid: &mut Grid) -> Result<(), GridError> {
    let (row, col) = (grid.rows() as Coord / 2, grid.cols() as Coord / 2);

    let cells = R_PENTOMINO.map(|(dr, dc)| (row + dr, col + dc));

    grid.set_all_alive(&cells)
}
