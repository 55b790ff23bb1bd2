use std::error::Error;
use std::fmt;

/// Map construction failures, plus the traversal-time signal that the
/// solid-border invariant was broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapError {
    /// A row's length differs from the first row's.
    Ragged {
        row: usize,
        expected: usize,
        got: usize,
    },
    /// The grid is too small to have a border around at least one cell.
    TooSmall { width: usize, height: usize },
    /// A cell on the outer ring is empty.
    OpenBorder { x: usize, y: usize },
    /// A ray left the grid without hitting a wall.
    UnboundedRay { column: usize },
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MapError::Ragged { row, expected, got } => {
                write!(f, "map row {row} has {got} cells, expected {expected}")
            }
            MapError::TooSmall { width, height } => {
                write!(f, "map is {width}x{height}, minimum is 3x3")
            }
            MapError::OpenBorder { x, y } => {
                write!(f, "map border is open at ({x}, {y})")
            }
            MapError::UnboundedRay { column } => {
                write!(f, "ray for column {column} escaped the grid (border not solid)")
            }
        }
    }
}

impl Error for MapError {}

/// Rectangular tile grid. Code 0 is passable, anything else is a wall.
///
/// The outer ring is guaranteed solid by construction, so traversal never
/// needs per-cell bounds checks to stay inside the grid.
pub struct GridMap {
    width: usize,
    height: usize,
    cell_size: f32,
    tiles: Vec<u8>,
}

impl GridMap {
    /// Builds a map from rows of tile codes. `cell_size` is the edge length
    /// of one cell in world units.
    pub fn new(rows: &[Vec<u8>], cell_size: f32) -> Result<Self, MapError> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if width < 3 || height < 3 {
            return Err(MapError::TooSmall { width, height });
        }
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != width {
                return Err(MapError::Ragged {
                    row,
                    expected: width,
                    got: cells.len(),
                });
            }
        }

        let mut tiles = Vec::with_capacity(width * height);
        for cells in rows {
            tiles.extend_from_slice(cells);
        }

        let map = Self {
            width,
            height,
            cell_size,
            tiles,
        };
        for y in 0..height {
            for x in 0..width {
                let on_ring = x == 0 || y == 0 || x == width - 1 || y == height - 1;
                if on_ring && map.tile_at(x, y) == 0 {
                    return Err(MapError::OpenBorder { x, y });
                }
            }
        }
        Ok(map)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Tile code at a cell. Valid for any cell a border-respecting
    /// traversal can reach; no bounds check in the hot path.
    #[inline]
    pub fn tile_at(&self, x: usize, y: usize) -> u8 {
        self.tiles[y * self.width + x]
    }

    /// Bypasses border validation, for exercising traversal failure paths.
    #[cfg(test)]
    pub(crate) fn from_tiles_unchecked(
        width: usize,
        height: usize,
        cell_size: f32,
        tiles: Vec<u8>,
    ) -> Self {
        Self {
            width,
            height,
            cell_size,
            tiles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bordered_rows() -> Vec<Vec<u8>> {
        vec![
            vec![1, 1, 1, 1],
            vec![1, 0, 0, 1],
            vec![1, 0, 2, 1],
            vec![1, 1, 1, 1],
        ]
    }

    #[test]
    fn builds_a_valid_map() {
        let map = GridMap::new(&bordered_rows(), 1.0).unwrap();
        assert_eq!(map.width(), 4);
        assert_eq!(map.height(), 4);
        assert_eq!(map.tile_at(0, 0), 1);
        assert_eq!(map.tile_at(1, 1), 0);
        assert_eq!(map.tile_at(2, 2), 2);
    }

    #[test]
    fn rejects_ragged_rows() {
        let mut rows = bordered_rows();
        rows[2].push(1);
        let err = GridMap::new(&rows, 1.0).err().unwrap();
        assert_eq!(
            err,
            MapError::Ragged {
                row: 2,
                expected: 4,
                got: 5
            }
        );
    }

    #[test]
    fn rejects_open_border() {
        let mut rows = bordered_rows();
        rows[0][2] = 0;
        let err = GridMap::new(&rows, 1.0).err().unwrap();
        assert_eq!(err, MapError::OpenBorder { x: 2, y: 0 });
    }

    #[test]
    fn rejects_too_small_grids() {
        let rows = vec![vec![1, 1], vec![1, 1]];
        let err = GridMap::new(&rows, 1.0).err().unwrap();
        assert_eq!(
            err,
            MapError::TooSmall {
                width: 2,
                height: 2
            }
        );
    }
}
