//! Grid raycasting renderer: DDA wall traversal, perspective projection
//! into vertical strips, and the player kinematics driving the view.

pub mod appearance;
pub mod camera;
pub mod input;
pub mod map;
pub mod ray;
pub mod renderer;
pub mod scaler;

pub use appearance::{AppearanceTable, AssetError, ConfigError, TextureAtlas, WallAppearance};
pub use camera::{Intent, MoveIntent, Player, TurnIntent, integrate};
pub use input::Command;
pub use map::{GridMap, MapError};
pub use ray::{RayHit, Side, cast_ray};
pub use renderer::{FrameError, RenderParams, pack_rgb, render_frame};
