use tracing::debug;

use crate::Coord;
use crate::grid::Grid;
use crate::grid::GridError;
use crate::parse_lif::Shape;

/// Smallest axis-aligned box containing every live cell of a grid. `x` is the column, `y` the
/// row, both bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub min_x: usize,
    pub min_y: usize,
    pub max_x: usize,
    pub max_y: usize,
}

impl BoundingBox {
    /// A box around a single cell.
    pub fn at(x: usize, y: usize) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    /// Grow the box to contain `(x, y)`.
    pub fn add(&mut self, x: usize, y: usize) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    /// Center of the box, rounded towards the top left.
    pub fn center(&self) -> (usize, usize) {
        ((self.min_x + self.max_x) / 2, (self.min_y + self.max_y) / 2)
    }

    pub fn width(&self) -> usize {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> usize {
        self.max_y - self.min_y + 1
    }
}

/// Where a loaded shape should end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    /// Move the shape's bounding box center onto the grid center
    #[default]
    Auto,

    /// Move the shape by exactly `(dx, dy)`
    Offset { dx: Coord, dy: Coord },
}

impl Placement {
    /// A zero offset on both axes means auto-centering.
    pub fn from_deltas(dx: Coord, dy: Coord) -> Self {
        if dx == 0 && dy == 0 {
            Placement::Auto
        } else {
            Placement::Offset { dx, dy }
        }
    }
}

/// Grid center as `(x, y)`: `(cols/2 - 1, rows/2 - 1)`.
pub fn grid_center(grid: &Grid) -> (Coord, Coord) {
    (grid.cols() as Coord / 2 - 1, grid.rows() as Coord / 2 - 1)
}

/// Bounding box of the live cells on `grid`, `None` if there are none.
pub fn bounding_box(grid: &Grid) -> Option<BoundingBox> {
    let mut bbox: Option<BoundingBox> = None;

    for (y, line) in grid.snapshot().lines().enumerate() {
        for (x, &age) in line.iter().enumerate() {
            if age == 0 {
                continue;
            }

            match bbox.as_mut() {
                Some(b) => b.add(x, y),
                None => bbox = Some(BoundingBox::at(x, y)),
            }
        }
    }

    bbox
}

/// Write the cells of `shape` onto `grid`, with the pattern origin on the grid center.
///
/// Nothing is written if any cell falls outside the grid.
pub fn place_shape(grid: &mut Grid, shape: &Shape) -> Result<(), GridError> {
    let (cx, cy) = grid_center(grid);

    let mut cells = Vec::with_capacity(shape.cells.len());

    for &(x, y) in &shape.cells {
        let (Some(row), Some(col)) = (cy.checked_add(y), cx.checked_add(x)) else {
            // no grid reaches that far
            return Err(GridError::OutOfBounds {
                row: cy.saturating_add(y),
                col: cx.saturating_add(x),
                rows: grid.rows(),
                cols: grid.cols(),
            });
        };

        cells.push((row, col));
    }

    grid.set_all_alive(&cells)?;

    debug!(cells = cells.len(), alive = grid.alive_count(), "Placed shape");

    Ok(())
}

/// Move every live cell inside `bbox` according to `placement`, keeping its age.
///
/// Cells pushed off the grid are dropped. Returns how many were.
pub fn translate(grid: &mut Grid, bbox: &BoundingBox, placement: Placement) -> usize {
    let (dx, dy) = match placement {
        Placement::Offset { dx, dy } => (dx, dy),
        Placement::Auto => {
            let (cx, cy) = grid_center(grid);
            let (bx, by) = bbox.center();

            (cx - bx as Coord, cy - by as Coord)
        }
    };

    let (rows, cols) = (grid.rows(), grid.cols());
    let mut cells = vec![0; rows * cols];
    let mut dropped = 0;

    let snapshot = grid.snapshot();

    for y in bbox.min_y..=bbox.max_y {
        for x in bbox.min_x..=bbox.max_x {
            let Some(age) = snapshot.age(y, x).filter(|&age| age > 0) else {
                continue;
            };

            let moved = (x as Coord)
                .checked_add(dx)
                .zip((y as Coord).checked_add(dy))
                .and_then(|(nx, ny)| Some((usize::try_from(nx).ok()?, usize::try_from(ny).ok()?)))
                .filter(|&(nx, ny)| nx < cols && ny < rows);

            let Some((nx, ny)) = moved else {
                dropped += 1;
                continue;
            };

            cells[ny * cols + nx] = age;
        }
    }

    grid.replace_cells(cells);

    debug!(dx, dy, dropped, "Translated shape");

    dropped
}

/// Place `shape` on the grid center, then move it into its final position.
///
/// Returns how many cells fell off the grid while moving.
pub fn load_shape(grid: &mut Grid, shape: &Shape, placement: Placement) -> Result<usize, GridError> {
    place_shape(grid, shape)?;

    let Some(bbox) = bounding_box(grid) else {
        return Ok(0);
    };

    Ok(translate(grid, &bbox, placement))
}

#[cfg(test)]
mod test {
    use super::BoundingBox;
    use super::Placement;
    use super::bounding_box;
    use super::load_shape;
    use super::translate;
    use crate::grid::Grid;
    use crate::grid::GridError;
    use crate::parse_lif::read_lif;

    #[test]
    fn empty_grid_has_no_box() {
        let grid = Grid::new(4, 7).unwrap();

        assert_eq!(bounding_box(&grid), None);
    }

    #[test]
    fn box_around_cells() {
        let mut grid = Grid::new(10, 10).unwrap();
        grid.set_alive(2, 7).unwrap();
        grid.set_alive(5, 3).unwrap();
        grid.set_alive(4, 4).unwrap();

        let bbox = bounding_box(&grid).unwrap();

        assert_eq!(
            bbox,
            BoundingBox {
                min_x: 3,
                min_y: 2,
                max_x: 7,
                max_y: 5
            }
        );
        assert_eq!((bbox.width(), bbox.height()), (5, 4));
        assert_eq!(bbox.center(), (5, 3));
    }

    #[test]
    fn zero_deltas_mean_auto() {
        assert_eq!(Placement::from_deltas(0, 0), Placement::Auto);
        assert_eq!(
            Placement::from_deltas(0, -2),
            Placement::Offset { dx: 0, dy: -2 }
        );
    }

    #[test]
    fn row_of_three_is_centered() {
        let shape = read_lif("#Life 1.06\n0 0\n1 0\n-1 0\n").unwrap();
        let mut grid = Grid::new(10, 10).unwrap();

        let dropped = load_shape(&mut grid, &shape, Placement::Auto).unwrap();

        assert_eq!(dropped, 0);
        assert_eq!(grid.alive_count(), 3);
        for col in [3, 4, 5] {
            assert_eq!(grid.age(4, col), Some(1));
        }
    }

    #[test]
    fn auto_centers_the_box() {
        // an off-center shape: its box center is (3, 2) relative to the origin
        let shape = read_lif("#Life 1.05\n*.....*\n.......\n.......\n.......\n*\n").unwrap();
        let mut grid = Grid::new(20, 30).unwrap();

        load_shape(&mut grid, &shape, Placement::Auto).unwrap();

        let bbox = bounding_box(&grid).unwrap();
        assert_eq!(bbox.center(), (30 / 2 - 1, 20 / 2 - 1));
        assert_eq!(grid.alive_count(), 3);
    }

    #[test]
    fn explicit_offset_is_used_verbatim() {
        let shape = read_lif("#Life 1.06\n0 0\n").unwrap();
        let mut grid = Grid::new(10, 10).unwrap();

        load_shape(&mut grid, &shape, Placement::Offset { dx: -4, dy: 2 }).unwrap();

        assert_eq!(grid.age(6, 0), Some(1));
    }

    #[test]
    fn translate_keeps_ages() {
        let mut grid = Grid::new(6, 6).unwrap();
        grid.set_age(0, 0, 5).unwrap();
        grid.set_age(1, 1, 2).unwrap();

        let bbox = bounding_box(&grid).unwrap();
        let dropped = translate(&mut grid, &bbox, Placement::Offset { dx: 2, dy: 3 });

        assert_eq!(dropped, 0);
        assert_eq!(grid.age(3, 2), Some(5));
        assert_eq!(grid.age(4, 3), Some(2));
        assert_eq!(grid.age(0, 0), Some(0));
        assert_eq!(grid.alive_count(), 2);
    }

    #[test]
    fn translate_drops_cells_off_the_edge() {
        let mut grid = Grid::new(5, 5).unwrap();
        grid.set_alive(2, 2).unwrap();
        grid.set_alive(2, 4).unwrap();

        let bbox = bounding_box(&grid).unwrap();
        let dropped = translate(&mut grid, &bbox, Placement::Offset { dx: 1, dy: 0 });

        assert_eq!(dropped, 1);
        assert_eq!(grid.alive_count(), 1);
        assert_eq!(grid.age(2, 3), Some(1));
    }

    #[test]
    fn shape_too_big_for_grid() {
        let shape = read_lif("#Life 1.06\n0 0\n5 0\n").unwrap();
        let mut grid = Grid::new(4, 4).unwrap();

        let err = load_shape(&mut grid, &shape, Placement::Auto).unwrap_err();

        assert!(matches!(err, GridError::OutOfBounds { row: 1, col: 6, .. }));
        assert_eq!(grid.alive_count(), 0);
    }

    #[test]
    fn far_away_cells_are_out_of_bounds() {
        let mut grid = Grid::new(10, 10).unwrap();

        let shape = read_lif("#Life 1.06\n0 0\n9223372036854775807 0\n").unwrap();
        let err = load_shape(&mut grid, &shape, Placement::Auto).unwrap_err();
        assert!(
            matches!(err, GridError::OutOfBounds { row: 4, col: i64::MAX, .. }),
            "{err}"
        );

        let shape = read_lif("#Life 1.06\n0 -9223372036854775808\n").unwrap();
        let err = load_shape(&mut grid, &shape, Placement::Auto).unwrap_err();
        assert!(matches!(err, GridError::OutOfBounds { .. }), "{err}");

        assert_eq!(grid.alive_count(), 0);
    }

    #[test]
    fn huge_offsets_drop_everything() {
        let shape = read_lif("#Life 1.06\n0 0\n1 0\n").unwrap();

        for (dx, dy) in [(i64::MAX, 0), (0, i64::MAX), (i64::MIN, i64::MIN)] {
            let mut grid = Grid::new(10, 10).unwrap();

            let dropped = load_shape(&mut grid, &shape, Placement::Offset { dx, dy }).unwrap();

            assert_eq!(dropped, 2);
            assert_eq!(grid.alive_count(), 0);
        }
    }
}
