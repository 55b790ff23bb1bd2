//! Maps tile codes to how their walls look: a flat color or a texture
//! slot. Configured once at startup and validated there, so the render
//! path never meets an unmapped code.

use std::error::Error;
use std::fmt;

use crate::map::GridMap;

/// How a wall paints: one color for the whole face, or a vertical slice
/// of an atlas tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallAppearance {
    Flat(u32),
    Textured(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A wall code present in the map has no configured appearance.
    UnmappedTile { code: u8 },
    /// Code 0 means "empty" and cannot carry an appearance.
    ReservedCode,
    /// The same code was configured twice.
    DuplicateCode { code: u8 },
    /// A configured texture slot is outside the atlas.
    MissingSlot { code: u8, slot: usize, tiles: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ConfigError::UnmappedTile { code } => {
                write!(f, "tile code {code} has no configured appearance")
            }
            ConfigError::ReservedCode => write!(f, "tile code 0 is reserved for empty cells"),
            ConfigError::DuplicateCode { code } => {
                write!(f, "tile code {code} configured more than once")
            }
            ConfigError::MissingSlot { code, slot, tiles } => {
                write!(
                    f,
                    "tile code {code} wants texture slot {slot}, atlas has {tiles}"
                )
            }
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetError {
    /// The strip's width is not an exact multiple of its height.
    StripNotDivisible { width: usize, tile: usize },
    /// Pixel data does not match the declared dimensions.
    PixelCount { expected: usize, got: usize },
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            AssetError::StripNotDivisible { width, tile } => {
                write!(f, "texture strip width {width} is not a multiple of tile size {tile}")
            }
            AssetError::PixelCount { expected, got } => {
                write!(f, "texture strip has {got} pixels, expected {expected}")
            }
        }
    }
}

impl Error for AssetError {}

/// Per-tile-code appearance lookup, dense over the configured code range.
#[derive(Debug)]
pub struct AppearanceTable {
    slots: Vec<Option<WallAppearance>>,
}

impl AppearanceTable {
    pub fn new(entries: &[(u8, WallAppearance)]) -> Result<Self, ConfigError> {
        let max = entries.iter().map(|&(code, _)| code).max().unwrap_or(0);
        let mut slots = vec![None; max as usize + 1];
        for &(code, appearance) in entries {
            if code == 0 {
                return Err(ConfigError::ReservedCode);
            }
            let slot = &mut slots[code as usize];
            if slot.is_some() {
                return Err(ConfigError::DuplicateCode { code });
            }
            *slot = Some(appearance);
        }
        Ok(Self { slots })
    }

    pub fn resolve(&self, code: u8) -> Result<WallAppearance, ConfigError> {
        self.slots
            .get(code as usize)
            .copied()
            .flatten()
            .ok_or(ConfigError::UnmappedTile { code })
    }

    /// Startup check that every wall code the map contains is configured.
    pub fn validate_for(&self, map: &GridMap) -> Result<(), ConfigError> {
        for y in 0..map.height() {
            for x in 0..map.width() {
                let code = map.tile_at(x, y);
                if code > 0 {
                    self.resolve(code)?;
                }
            }
        }
        Ok(())
    }

    /// Startup check that every configured texture slot exists in the atlas.
    pub fn validate_atlas(&self, atlas: &TextureAtlas) -> Result<(), ConfigError> {
        for (code, slot) in self.slots.iter().enumerate() {
            if let Some(WallAppearance::Textured(index)) = *slot {
                if index >= atlas.tile_count() {
                    return Err(ConfigError::MissingSlot {
                        code: code as u8,
                        slot: index,
                        tiles: atlas.tile_count(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Square tiles sliced from one horizontal strip, indexed left to right.
#[derive(Debug)]
pub struct TextureAtlas {
    pixels: Vec<u32>,
    strip_w: usize,
    tile: usize,
}

impl TextureAtlas {
    /// The strip's height is the tile size; its width must divide evenly.
    pub fn from_strip(pixels: Vec<u32>, width: usize, height: usize) -> Result<Self, AssetError> {
        if height == 0 || width == 0 || width % height != 0 {
            return Err(AssetError::StripNotDivisible {
                width,
                tile: height,
            });
        }
        if pixels.len() != width * height {
            return Err(AssetError::PixelCount {
                expected: width * height,
                got: pixels.len(),
            });
        }
        Ok(Self {
            pixels,
            strip_w: width,
            tile: height,
        })
    }

    #[inline]
    pub fn tile_size(&self) -> usize {
        self.tile
    }

    #[inline]
    pub fn tile_count(&self) -> usize {
        self.strip_w / self.tile
    }

    /// Texel at (`tx`, `ty`) inside tile `slot`. Slot and coordinates are
    /// kept in range by the startup validation and the renderer's clamps.
    #[inline]
    pub fn sample(&self, slot: usize, tx: usize, ty: usize) -> u32 {
        self.pixels[ty * self.strip_w + slot * self.tile + tx]
    }
}
