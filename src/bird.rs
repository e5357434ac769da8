//! The bird: vertical physics, display rotation, wing animation and trail.

/// Fixed horizontal position (the world scrolls past the bird).
pub const BIRD_X: f64 = 150.0;
/// Vertical position after every reset.
pub const BIRD_START_Y: f64 = 300.0;
pub const BIRD_WIDTH: f64 = 30.0;
pub const BIRD_HEIGHT: f64 = 30.0;

/// Downward acceleration per frame.
pub const GRAVITY: f64 = 0.3;
/// Velocity a flap sets (negative = up). Overwrites, never accumulates.
pub const JUMP_VELOCITY: f64 = -6.0;

const ROTATION_GAIN: f64 = 3.0;
const ROTATION_MIN: f64 = -30.0;
const ROTATION_MAX: f64 = 90.0;
const WING_PHASE_STEP: f64 = 0.3;
/// Frames a trail point stays visible.
pub const TRAIL_LIFE: u32 = 20;

/// One fading point of the bird's trail (centre of the bird at the time it was dropped).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailPoint {
    pub x: f64,
    pub y: f64,
    pub life: u32,
}

impl TrailPoint {
    /// 1.0 when fresh, approaching 0.0 as it ages.
    pub fn alpha(&self) -> f64 {
        f64::from(self.life) / f64::from(TRAIL_LIFE)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bird {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub velocity: f64,
    /// Degrees, display only.
    pub rotation: f64,
    pub wing_phase: f64,
    pub trail: Vec<TrailPoint>,
}

impl Default for Bird {
    fn default() -> Self {
        Self {
            x: BIRD_X,
            y: BIRD_START_Y,
            width: BIRD_WIDTH,
            height: BIRD_HEIGHT,
            velocity: 0.0,
            rotation: 0.0,
            wing_phase: 0.0,
            trail: Vec::new(),
        }
    }
}

impl Bird {
    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn flap(&mut self) {
        self.velocity = JUMP_VELOCITY;
    }

    /// Gravity, position, rotation and wing phase for one frame.
    pub fn integrate(&mut self) {
        self.velocity += GRAVITY;
        self.y += self.velocity;
        self.rotation = (self.velocity * ROTATION_GAIN).clamp(ROTATION_MIN, ROTATION_MAX);
        self.wing_phase += WING_PHASE_STEP;
    }

    /// Drop a fresh trail point at the current centre and age out the old ones.
    pub fn tick_trail(&mut self) {
        let (cx, cy) = self.center();
        self.trail.push(TrailPoint {
            x: cx,
            y: cy,
            life: TRAIL_LIFE,
        });
        self.trail.retain_mut(|p| {
            p.life = p.life.saturating_sub(1);
            p.life > 0
        });
    }

    /// AABB overlap with an arbitrary rectangle.
    pub fn overlaps(&self, x: f64, y: f64, w: f64, h: f64) -> bool {
        self.x < x + w && self.right() > x && self.y < y + h && self.bottom() > y
    }
}
