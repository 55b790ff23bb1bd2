use std::num::NonZeroU32;
use std::rc::Rc;
use std::time::Instant;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use tilecaster::appearance::{AppearanceTable, AssetError, TextureAtlas, WallAppearance};
use tilecaster::camera::{Intent, Player, integrate};
use tilecaster::input::{self, Command};
use tilecaster::map::{GridMap, MapError};
use tilecaster::renderer::{RenderParams, pack_rgb, render_frame};
use tilecaster::scaler::{ScaleMap, blit_nearest, build_scale_map};

// dt clamp: never integrate from a zero-length first frame, never jump
// after a stall
const DT_MIN: f32 = 0.001;
const DT_MAX: f32 = 0.1;

struct App {
    window: Option<Rc<Window>>,
    surface: Option<softbuffer::Surface<Rc<Window>, Rc<Window>>>,

    map: GridMap,
    atlas: TextureAtlas,
    table: AppearanceTable,
    params: RenderParams,
    player: Player,
    intent: Intent,

    // FPS log
    frame_counter: u32,
    last_fps_log: Instant,

    // Internal fixed-height framebuffer
    fb: Vec<u32>,
    fb_w: usize,
    fb_h: usize,
    scale_map: ScaleMap,

    last_tick: Instant,
}

impl App {
    fn new(map: GridMap, atlas: TextureAtlas, table: AppearanceTable, player: Player) -> Self {
        Self {
            window: None,
            surface: None,
            map,
            atlas,
            table,
            params: RenderParams::default(),
            player,
            intent: Intent::default(),

            frame_counter: 0,
            last_fps_log: Instant::now(),

            fb: vec![0; 640 * 480],
            fb_w: 640,
            fb_h: 480,
            scale_map: ScaleMap::empty(),

            last_tick: Instant::now(),
        }
    }

    fn tick(&mut self) {
        let now = Instant::now();
        let dt = now
            .duration_since(self.last_tick)
            .as_secs_f32()
            .clamp(DT_MIN, DT_MAX);
        self.last_tick = now;

        let before = self.player.pos;
        integrate(&mut self.player, self.intent, dt);
        self.block_on_walls(before);
    }

    /// Same-cell occupancy check, one axis at a time so the player slides
    /// along walls instead of sticking.
    fn block_on_walls(&mut self, before: [f32; 2]) {
        let cell = self.map.cell_size();
        let pos = self.player.pos;
        if self.map.tile_at((pos[0] / cell) as usize, (before[1] / cell) as usize) > 0 {
            self.player.pos[0] = before[0];
        }
        let x = self.player.pos[0];
        if self.map.tile_at((x / cell) as usize, (pos[1] / cell) as usize) > 0 {
            self.player.pos[1] = before[1];
        }
    }

    fn rebuild_internal_fb(&mut self, dst_w: usize, dst_h: usize) {
        // Keep internal height fixed (controls pixel size look)
        let target_h = 480usize;
        let aspect = if dst_h > 0 {
            dst_w as f32 / dst_h as f32
        } else {
            1.0
        };

        let mut target_w = (target_h as f32 * aspect).round() as usize;
        if target_w < 160 {
            target_w = 160;
        }
        if target_w % 2 != 0 {
            target_w += 1;
        }

        if target_w != self.fb_w || target_h != self.fb_h {
            self.fb_w = target_w;
            self.fb_h = target_h;
            self.fb = vec![0u32; self.fb_w * self.fb_h];
        }
        self.scale_map = build_scale_map(dst_w, dst_h, self.fb_w, self.fb_h);
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let attributes = Window::default_attributes()
            .with_title("tilecaster")
            .with_inner_size(LogicalSize::new(800.0, 600.0));

        let window = Rc::new(event_loop.create_window(attributes).expect("create window"));

        let context = softbuffer::Context::new(window.clone()).expect("softbuffer context");
        let surface =
            softbuffer::Surface::new(&context, window.clone()).expect("softbuffer surface");

        let size = window.inner_size();
        self.rebuild_internal_fb(size.width as usize, size.height as usize);

        self.surface = Some(surface);
        self.window = Some(window);

        self.last_tick = Instant::now();
        self.window.as_ref().unwrap().request_redraw();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("close requested, stopping");
                event_loop.exit();
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key,
                        state,
                        repeat,
                        ..
                    },
                ..
            } => {
                if repeat {
                    return;
                }
                if let PhysicalKey::Code(code) = physical_key {
                    if let Some(command) = key_command(code, state) {
                        if input::apply(&mut self.intent, command) {
                            event_loop.exit();
                        }
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                self.tick();

                let (window, surface) = match (&self.window, &mut self.surface) {
                    (Some(w), Some(s)) if w.id() == id => (w, s),
                    _ => return,
                };

                let size = window.inner_size();
                let (dw, dh) = (size.width as usize, size.height as usize);
                if dw == 0 || dh == 0 {
                    return; // Minimized window, skip drawing
                }

                surface
                    .resize(
                        NonZeroU32::new(dw as u32).unwrap(),
                        NonZeroU32::new(dh as u32).unwrap(),
                    )
                    .unwrap();

                if let Err(err) = render_frame(
                    &mut self.fb,
                    self.fb_w,
                    self.fb_h,
                    &self.map,
                    &self.player,
                    &self.table,
                    &self.atlas,
                    &self.params,
                ) {
                    log::error!("frame aborted: {err}");
                    event_loop.exit();
                    return;
                }

                let mut buf = surface.buffer_mut().expect("buffer_mut");
                blit_nearest(&mut buf, dw, &self.fb, &self.scale_map);
                buf.present().unwrap();

                self.frame_counter += 1;
                let now = Instant::now();
                let elapsed = now.duration_since(self.last_fps_log).as_secs_f32();
                if elapsed >= 1.0 {
                    log::info!("fps: {:.1}", self.frame_counter as f32 / elapsed);
                    self.frame_counter = 0;
                    self.last_fps_log = now;
                }

                self.window.as_ref().unwrap().request_redraw();
            }

            WindowEvent::Resized(new_size) => {
                let (dw, dh) = (new_size.width as usize, new_size.height as usize);
                self.rebuild_internal_fb(dw, dh);
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn key_command(code: KeyCode, state: ElementState) -> Option<Command> {
    let command = match (code, state) {
        (KeyCode::KeyW | KeyCode::ArrowUp, ElementState::Pressed) => Command::MoveForward,
        (KeyCode::KeyS | KeyCode::ArrowDown, ElementState::Pressed) => Command::MoveBackward,
        (KeyCode::KeyW | KeyCode::ArrowUp, ElementState::Released)
        | (KeyCode::KeyS | KeyCode::ArrowDown, ElementState::Released) => Command::StopMoving,
        (KeyCode::KeyA | KeyCode::ArrowLeft, ElementState::Pressed) => Command::TurnLeft,
        (KeyCode::KeyD | KeyCode::ArrowRight, ElementState::Pressed) => Command::TurnRight,
        (KeyCode::KeyA | KeyCode::ArrowLeft, ElementState::Released)
        | (KeyCode::KeyD | KeyCode::ArrowRight, ElementState::Released) => Command::StopTurning,
        (KeyCode::Escape, ElementState::Pressed) => Command::Quit,
        _ => return None,
    };
    Some(command)
}

fn demo_map() -> Result<GridMap, MapError> {
    let rows: Vec<Vec<u8>> = vec![
        vec![1, 1, 1, 1, 1, 1, 1, 1, 2, 1, 1, 1, 1, 1, 1, 1],
        vec![2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
        vec![2, 0, 3, 3, 0, 0, 0, 0, 0, 0, 0, 2, 2, 0, 0, 1],
        vec![2, 0, 3, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2, 0, 0, 1],
        vec![2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
        vec![2, 0, 0, 0, 0, 4, 4, 4, 0, 0, 0, 0, 0, 0, 0, 1],
        vec![2, 0, 0, 0, 0, 4, 0, 4, 0, 0, 0, 0, 0, 0, 0, 1],
        vec![2, 0, 0, 0, 0, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
        vec![2, 0, 2, 2, 0, 0, 0, 0, 0, 0, 3, 3, 0, 0, 0, 1],
        vec![2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 3, 0, 0, 0, 1],
        vec![2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
        vec![1, 1, 1, 1, 1, 1, 1, 2, 1, 1, 1, 1, 1, 1, 1, 1],
    ];
    GridMap::new(&rows, 1.0)
}

/// Procedural strip: slot 0 is mortar-lined brick, slot 1 a checker.
/// Real texture files stay an external concern.
fn demo_atlas() -> Result<TextureAtlas, AssetError> {
    const S: usize = 64;
    const TILES: usize = 2;

    let brick = pack_rgb(178, 60, 40);
    let mortar = pack_rgb(160, 160, 160);
    let check_a = pack_rgb(70, 80, 160);
    let check_b = pack_rgb(40, 45, 90);

    let strip_w = S * TILES;
    let mut pixels = vec![0u32; strip_w * S];
    for y in 0..S {
        for x in 0..S {
            let course_shift = (y / 16 % 2) * 8;
            pixels[y * strip_w + x] = if y % 16 == 0 || (x + course_shift) % 16 == 0 {
                mortar
            } else {
                brick
            };
            pixels[y * strip_w + S + x] = if (x / 8 + y / 8) % 2 == 0 {
                check_a
            } else {
                check_b
            };
        }
    }
    TextureAtlas::from_strip(pixels, strip_w, S)
}

fn demo_appearances() -> Result<AppearanceTable, tilecaster::ConfigError> {
    AppearanceTable::new(&[
        (1, WallAppearance::Flat(pack_rgb(196, 196, 0))),
        (2, WallAppearance::Textured(0)),
        (3, WallAppearance::Textured(1)),
        (4, WallAppearance::Flat(pack_rgb(150, 60, 160))),
    ])
}

fn main() -> Result<()> {
    env_logger::init();

    let map = demo_map().context("build demo map")?;
    let atlas = demo_atlas().context("build demo textures")?;
    let table = demo_appearances().context("configure wall appearances")?;
    table.validate_for(&map).context("map/appearance mismatch")?;
    table
        .validate_atlas(&atlas)
        .context("appearance/atlas mismatch")?;

    log::info!(
        "{}x{} map, {} texture tiles of {}px",
        map.width(),
        map.height(),
        atlas.tile_count(),
        atlas.tile_size()
    );

    let player = Player::new([8.0, 9.5], [0.0, -1.0], 0.66, 3.0, std::f32::consts::PI);

    let event_loop = EventLoop::new()?;
    // Continuously runs the event loop even without OS events, which is
    // what a realtime renderer wants.
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(map, atlas, table, player);
    event_loop.run_app(&mut app)?;

    log::info!("bye");
    Ok(())
}
