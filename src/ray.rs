//! Ray-grid intersection by DDA grid-line stepping, one ray per screen
//! column.

use crate::camera::Player;
use crate::map::{GridMap, MapError};

/// Which family of grid lines the ray crossed last: `X` means a vertical
/// line (an east/west-facing wall), `Y` a horizontal one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    X,
    Y,
}

/// Result of casting one column's ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Perpendicular distance from the view plane to the wall, world units.
    pub distance: f32,
    /// Axis of the crossed grid line.
    pub side: Side,
    /// Tile code of the cell that stopped the ray.
    pub tile: u8,
    /// Where along the wall face the ray struck, in [0, 1).
    pub wall_x: f32,
}

/// Distance the ray travels to cross one full cell along one axis.
/// A zero component never crosses a line on that axis, hence infinity
/// rather than a division fault.
#[inline]
fn delta_dist(along: f32, other: f32, cell: f32) -> f32 {
    if along == 0.0 {
        f32::INFINITY
    } else {
        let ratio = other / along;
        (1.0 + ratio * ratio).sqrt() * cell
    }
}

/// Step direction and distance to the first grid line on one axis, scaled
/// by that axis's delta.
#[inline]
fn initial_side(grid: f32, cell: i32, dir: f32, delta: f32) -> (i32, f32) {
    if delta.is_infinite() {
        // never advances on this axis; keep the accumulator out of the
        // 0 * inf = NaN trap
        return (1, f32::INFINITY);
    }
    if dir < 0.0 {
        (-1, (grid - cell as f32) * delta)
    } else {
        (1, (cell as f32 + 1.0 - grid) * delta)
    }
}

/// Casts the ray for `column` of a `screen_w`-wide frame and walks the grid
/// until it meets a wall tile.
///
/// The returned distance is the side distance accumulated *before* the hit
/// step, which is what the projection wants (no fisheye). A ray that leaves
/// the grid, or fails to advance within a bounded step count, reports the
/// broken border as [`MapError::UnboundedRay`].
pub fn cast_ray(
    column: usize,
    screen_w: usize,
    player: &Player,
    map: &GridMap,
) -> Result<RayHit, MapError> {
    let cell = map.cell_size();

    // leftmost column maps to -1, rightmost to +1
    let camera_x = 2.0 * column as f32 / (screen_w - 1) as f32 - 1.0;
    let ray_dir = [
        player.dir[0] + player.plane[0] * camera_x,
        player.dir[1] + player.plane[1] * camera_x,
    ];

    // player position in cell units
    let grid_x = player.pos[0] / cell;
    let grid_y = player.pos[1] / cell;
    let mut cell_x = grid_x.floor() as i32;
    let mut cell_y = grid_y.floor() as i32;

    let delta_x = delta_dist(ray_dir[0], ray_dir[1], cell);
    let delta_y = delta_dist(ray_dir[1], ray_dir[0], cell);
    let (step_x, mut side_x) = initial_side(grid_x, cell_x, ray_dir[0], delta_x);
    let (step_y, mut side_y) = initial_side(grid_y, cell_y, ray_dir[1], delta_y);

    let width = map.width() as i32;
    let height = map.height() as i32;
    let max_steps = 4 * (map.width() + map.height());

    for _ in 0..max_steps {
        // advance whichever grid line is nearer; the pre-increment value
        // is the distance to the boundary just crossed
        let (distance, side) = if side_x < side_y {
            let d = side_x;
            side_x += delta_x;
            cell_x += step_x;
            (d, Side::X)
        } else {
            let d = side_y;
            side_y += delta_y;
            cell_y += step_y;
            (d, Side::Y)
        };

        if cell_x < 0 || cell_x >= width || cell_y < 0 || cell_y >= height {
            return Err(MapError::UnboundedRay { column });
        }
        let tile = map.tile_at(cell_x as usize, cell_y as usize);
        if tile > 0 {
            let wall_x = hit_fraction(player.pos, ray_dir, distance, cell, side);
            return Ok(RayHit {
                distance,
                side,
                tile,
                wall_x,
            });
        }
    }
    Err(MapError::UnboundedRay { column })
}

/// Projects the hit point onto the wall face and normalizes it to [0, 1),
/// mirrored for the two ray/side combinations that would otherwise read
/// the texture right-to-left.
fn hit_fraction(pos: [f32; 2], ray_dir: [f32; 2], distance: f32, cell: f32, side: Side) -> f32 {
    let ray_len = (ray_dir[0] * ray_dir[0] + ray_dir[1] * ray_dir[1]).sqrt();
    let along_face = match side {
        Side::X => pos[1] + distance * ray_dir[1] / ray_len,
        Side::Y => pos[0] + distance * ray_dir[0] / ray_len,
    };
    let mut wall_x = (along_face / cell).rem_euclid(1.0);

    let mirrored = match side {
        Side::X => ray_dir[0] > 0.0,
        Side::Y => ray_dir[1] < 0.0,
    };
    if mirrored {
        wall_x = 1.0 - wall_x;
        if wall_x >= 1.0 {
            wall_x = 0.0;
        }
    }
    wall_x
}
