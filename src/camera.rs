//! Player state: position, facing direction, camera plane, and the
//! movement integration that advances them each frame.

/// Tri-state linear movement intent, set and cleared by input commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoveIntent {
    Backward,
    #[default]
    Idle,
    Forward,
}

impl MoveIntent {
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            MoveIntent::Backward => -1.0,
            MoveIntent::Idle => 0.0,
            MoveIntent::Forward => 1.0,
        }
    }
}

/// Tri-state turn intent. `Right` is a positive rotation in the map's
/// y-down coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnIntent {
    Left,
    #[default]
    Idle,
    Right,
}

impl TurnIntent {
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            TurnIntent::Left => -1.0,
            TurnIntent::Idle => 0.0,
            TurnIntent::Right => 1.0,
        }
    }
}

/// The two independent intents the frame loop integrates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Intent {
    pub movement: MoveIntent,
    pub turn: TurnIntent,
}

pub struct Player {
    pub pos: [f32; 2],   // (x, y) position in world units
    pub dir: [f32; 2],   // unit facing vector
    pub plane: [f32; 2], // perpendicular to dir, |plane| = tan(fov/2)
    pub move_speed: f32, // world units per second
    pub turn_speed: f32, // radians per second
}

impl Player {
    /// `fov_half_tan` sets the camera plane's magnitude; the plane is
    /// derived perpendicular to `dir`, which is normalized here.
    pub fn new(
        pos: [f32; 2],
        dir: [f32; 2],
        fov_half_tan: f32,
        move_speed: f32,
        turn_speed: f32,
    ) -> Self {
        let len = (dir[0] * dir[0] + dir[1] * dir[1]).sqrt();
        let dir = [dir[0] / len, dir[1] / len];
        Self {
            pos,
            dir,
            plane: [-dir[1] * fov_half_tan, dir[0] * fov_half_tan],
            move_speed,
            turn_speed,
        }
    }

    /// Rotates `dir` and `plane` by the same angle in one operation so
    /// they stay perpendicular no matter how many frames pass.
    pub fn rotate(&mut self, angle: f32) {
        let (s, c) = angle.sin_cos();
        let rot = |v: [f32; 2]| [v[0] * c - v[1] * s, v[0] * s + v[1] * c];
        self.dir = rot(self.dir);
        self.plane = rot(self.plane);
    }

    /// Moves along the facing direction by a signed world-unit amount.
    #[inline]
    pub fn advance(&mut self, amount: f32) {
        self.pos[0] += self.dir[0] * amount;
        self.pos[1] += self.dir[1] * amount;
    }
}

/// Advances position and heading from the current intent over `dt` seconds.
pub fn integrate(player: &mut Player, intent: Intent, dt: f32) {
    let amount = intent.movement.sign() * player.move_speed * dt;
    if amount != 0.0 {
        player.advance(amount);
    }
    let angle = intent.turn.sign() * player.turn_speed * dt;
    if angle != 0.0 {
        player.rotate(angle);
    }
}
