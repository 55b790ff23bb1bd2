//! Projects ray hits into vertical wall strips and paints the frame.

use std::error::Error;
use std::fmt;

use crate::appearance::{AppearanceTable, ConfigError, TextureAtlas, WallAppearance};
use crate::camera::Player;
use crate::map::{GridMap, MapError};
use crate::ray::{self, RayHit, Side};

#[inline]
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    // BGRA8 in little-endian memory
    (b as u32) | ((g as u32) << 8) | ((r as u32) << 16)
    // Alpha at 0
}

/// Halves every channel, the binary shading applied to Side::Y hits.
#[inline]
fn darken(color: u32) -> u32 {
    (color >> 1) & 0x007F7F7F
}

/// Anything that can stop a frame mid-render. Both variants are fatal
/// configuration problems that startup validation normally rules out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    Map(MapError),
    Config(ConfigError),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::Map(e) => write!(f, "map invariant violated: {e}"),
            FrameError::Config(e) => write!(f, "appearance configuration: {e}"),
        }
    }
}

impl Error for FrameError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FrameError::Map(e) => Some(e),
            FrameError::Config(e) => Some(e),
        }
    }
}

impl From<MapError> for FrameError {
    fn from(e: MapError) -> Self {
        FrameError::Map(e)
    }
}

impl From<ConfigError> for FrameError {
    fn from(e: ConfigError) -> Self {
        FrameError::Config(e)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RenderParams {
    /// Wall strip half-height is `screen_h * wall_scale / distance`.
    pub wall_scale: f32,
    pub ceiling: u32,
    pub floor: u32,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            wall_scale: 0.5,
            ceiling: pack_rgb(0, 127, 127),
            floor: pack_rgb(96, 96, 127),
        }
    }
}

/// Projected half-height in pixels of the wall strip at a perpendicular
/// distance. Strictly decreasing in distance.
#[inline]
pub fn half_height(screen_h: usize, wall_scale: f32, distance: f32) -> f32 {
    screen_h as f32 * wall_scale / distance
}

/// Renders one full frame: flat ceiling and floor, then one cast-resolve-
/// paint pass per column.
pub fn render_frame(
    buf: &mut [u32],
    width: usize,
    height: usize,
    map: &GridMap,
    player: &Player,
    table: &AppearanceTable,
    atlas: &TextureAtlas,
    params: &RenderParams,
) -> Result<(), FrameError> {
    let horizon = height / 2;
    for y in 0..horizon {
        let row = y * width;
        for x in 0..width {
            buf[row + x] = params.ceiling;
        }
    }
    for y in horizon..height {
        let row = y * width;
        for x in 0..width {
            buf[row + x] = params.floor;
        }
    }

    for x in 0..width {
        let hit = ray::cast_ray(x, width, player, map)?;
        let appearance = table.resolve(hit.tile)?;
        draw_column(buf, width, height, x, &hit, appearance, atlas, params);
    }
    Ok(())
}

/// Paints one 1-pixel-wide wall strip, clamped to the screen.
fn draw_column(
    buf: &mut [u32],
    width: usize,
    height: usize,
    x: usize,
    hit: &RayHit,
    appearance: WallAppearance,
    atlas: &TextureAtlas,
    params: &RenderParams,
) {
    let half = half_height(height, params.wall_scale, hit.distance);
    let mid = height as f32 * 0.5;
    let top = mid - half;
    let bottom = mid + half;

    let y0 = top.max(0.0) as usize;
    let y1 = (bottom.min(height as f32 - 1.0)) as usize;
    let shaded = hit.side == Side::Y;

    match appearance {
        WallAppearance::Flat(color) => {
            let color = if shaded { darken(color) } else { color };
            let mut idx = y0 * width + x;
            for _y in y0..=y1 {
                buf[idx] = color;
                idx += width;
            }
        }
        WallAppearance::Textured(slot) => {
            let size = atlas.tile_size();
            let tex_x = ((hit.wall_x * size as f32) as usize).min(size - 1);
            // map each on-screen pixel back into the unclamped strip
            let span = bottom - top;
            let mut idx = y0 * width + x;
            for y in y0..=y1 {
                let t = (y as f32 + 0.5 - top) / span;
                let tex_y = ((t * size as f32) as usize).min(size - 1);
                let mut color = atlas.sample(slot, tex_x, tex_y);
                if shaded {
                    color = darken(color);
                }
                buf[idx] = color;
                idx += width;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appearance::{AppearanceTable, TextureAtlas, WallAppearance};
    use crate::camera::Player;
    use crate::map::GridMap;
    use crate::ray::{RayHit, Side};

    #[test]
    fn half_height_strictly_decreases_with_distance() {
        let heights: Vec<f32> = [0.5, 1.0, 2.0, 4.0, 16.0]
            .iter()
            .map(|&d| half_height(480, 0.5, d))
            .collect();
        for pair in heights.windows(2) {
            assert!(pair[0] > pair[1], "{} !> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn darken_halves_every_channel() {
        assert_eq!(darken(pack_rgb(200, 100, 50)), pack_rgb(100, 50, 25));
        assert_eq!(darken(pack_rgb(255, 255, 255)), pack_rgb(127, 127, 127));
    }

    fn flat_atlas() -> TextureAtlas {
        TextureAtlas::from_strip(vec![pack_rgb(10, 20, 30); 4 * 4], 4, 4).unwrap()
    }

    #[test]
    fn flat_column_paints_a_centered_span() {
        let width = 8;
        let height = 40;
        let mut buf = vec![0u32; width * height];
        let hit = RayHit {
            distance: 2.0,
            side: Side::X,
            tile: 1,
            wall_x: 0.5,
        };
        let color = pack_rgb(196, 196, 0);
        let params = RenderParams::default();
        draw_column(
            &mut buf,
            width,
            height,
            3,
            &hit,
            WallAppearance::Flat(color),
            &flat_atlas(),
            &params,
        );

        // half = 40 * 0.5 / 2 = 10, span rows 10..=30
        assert_eq!(buf[9 * width + 3], 0);
        assert_eq!(buf[10 * width + 3], color);
        assert_eq!(buf[20 * width + 3], color);
        assert_eq!(buf[30 * width + 3], color);
        assert_eq!(buf[31 * width + 3], 0);
        // neighboring columns untouched
        assert_eq!(buf[20 * width + 2], 0);
        assert_eq!(buf[20 * width + 4], 0);
    }

    #[test]
    fn shaded_side_halves_the_flat_color() {
        let width = 4;
        let height = 16;
        let mut buf = vec![0u32; width * height];
        let hit = RayHit {
            distance: 1.0,
            side: Side::Y,
            tile: 1,
            wall_x: 0.0,
        };
        let color = pack_rgb(200, 100, 50);
        draw_column(
            &mut buf,
            width,
            height,
            1,
            &hit,
            WallAppearance::Flat(color),
            &flat_atlas(),
            &RenderParams::default(),
        );
        assert_eq!(buf[8 * width + 1], pack_rgb(100, 50, 25));
    }

    #[test]
    fn near_wall_clamps_to_the_screen() {
        let width = 4;
        let height = 16;
        let mut buf = vec![0u32; width * height];
        let hit = RayHit {
            distance: 0.01,
            side: Side::X,
            tile: 1,
            wall_x: 0.0,
        };
        let color = pack_rgb(50, 50, 50);
        draw_column(
            &mut buf,
            width,
            height,
            0,
            &hit,
            WallAppearance::Flat(color),
            &flat_atlas(),
            &RenderParams::default(),
        );
        assert_eq!(buf[0], color);
        assert_eq!(buf[(height - 1) * width], color);
    }

    #[test]
    fn textured_column_samples_the_wall_x_slice() {
        let width = 2;
        let height = 8;
        // 4x4 single tile, each column of texels its own value
        let mut pixels = vec![0u32; 16];
        for ty in 0..4 {
            for tx in 0..4 {
                pixels[ty * 4 + tx] = (tx as u32 + 1) * 0x111111;
            }
        }
        let atlas = TextureAtlas::from_strip(pixels, 4, 4).unwrap();
        let mut buf = vec![0u32; width * height];
        let hit = RayHit {
            distance: 0.5,
            side: Side::X,
            tile: 2,
            wall_x: 0.6, // texel column floor(0.6 * 4) = 2
        };
        draw_column(
            &mut buf,
            width,
            height,
            0,
            &hit,
            WallAppearance::Textured(0),
            &atlas,
            &RenderParams::default(),
        );
        assert_eq!(buf[4 * width], 3 * 0x111111);
    }

    #[test]
    fn render_frame_fills_ceiling_floor_and_walls() {
        let rows = vec![
            vec![1, 1, 1, 1, 1],
            vec![1, 0, 0, 0, 1],
            vec![1, 0, 0, 0, 1],
            vec![1, 0, 0, 0, 1],
            vec![1, 1, 1, 1, 1],
        ];
        let map = GridMap::new(&rows, 1.0).unwrap();
        let player = Player::new([2.5, 2.5], [0.0, -1.0], 0.66, 2.0, 1.5);
        let table = AppearanceTable::new(&[(1, WallAppearance::Flat(pack_rgb(196, 196, 0)))])
            .unwrap();
        let atlas = flat_atlas();
        let params = RenderParams::default();

        let width = 64;
        let height = 48;
        let mut buf = vec![0u32; width * height];
        render_frame(&mut buf, width, height, &map, &player, &table, &atlas, &params).unwrap();

        // corners stay sky and ground
        assert_eq!(buf[0], params.ceiling);
        assert_eq!(buf[(height - 1) * width], params.floor);
        // every column has wall pixels at the horizon
        for x in 0..width {
            let c = buf[(height / 2) * width + x];
            assert!(c != params.ceiling && c != params.floor, "column {x}");
        }
    }

    #[test]
    fn render_frame_surfaces_traversal_failure() {
        let map = GridMap::from_tiles_unchecked(4, 4, 1.0, vec![0; 16]);
        let player = Player::new([2.0, 2.0], [1.0, 0.0], 0.66, 2.0, 1.5);
        let table = AppearanceTable::new(&[(1, WallAppearance::Flat(0))]).unwrap();
        let atlas = flat_atlas();
        let mut buf = vec![0u32; 32 * 24];
        let err = render_frame(
            &mut buf,
            32,
            24,
            &map,
            &player,
            &table,
            &atlas,
            &RenderParams::default(),
        )
        .unwrap_err();
        assert!(matches!(err, FrameError::Map(MapError::UnboundedRay { .. })));
    }
}
