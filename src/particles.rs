//! Cosmetic state: particles, screen shake, scrolling decor and the day/night clock.

use crate::theme::hsl;
use rand::Rng;
use ratatui::style::Color;

const PARTICLE_GRAVITY: f64 = 0.1;

pub const GOLD: Color = Color::Rgb(0xFF, 0xD7, 0x00);
pub const GREEN: Color = Color::Rgb(0x00, 0xFF, 0x00);
pub const EMBER: Color = Color::Rgb(0xFF, 0x45, 0x00);

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub life: u32,
    pub max_life: u32,
    pub color: Color,
    pub size: f64,
}

impl Particle {
    pub fn alpha(&self) -> f64 {
        f64::from(self.life) / f64::from(self.max_life.max(1))
    }
}

/// Shape of a particle burst: how many, how fast, how long, how big.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Burst {
    pub count: usize,
    /// Velocity on each axis is uniform in `[-spread, spread)`.
    pub spread: f64,
    pub life: u32,
    /// Size is uniform in `[size_min, size_min + size_range)`.
    pub size_min: f64,
    pub size_range: f64,
}

pub const FLAP_BURST: Burst = Burst {
    count: 5,
    spread: 2.0,
    life: 30,
    size_min: 1.0,
    size_range: 3.0,
};
pub const SCORE_BURST: Burst = Burst {
    count: 8,
    spread: 3.0,
    life: 60,
    size_min: 2.0,
    size_range: 4.0,
};
pub const COMBO_BURST: Burst = Burst {
    count: 6,
    spread: 2.0,
    life: 40,
    size_min: 1.0,
    size_range: 2.0,
};
pub const EXPLOSION_BURST: Burst = Burst {
    count: 15,
    spread: 4.0,
    life: 120,
    size_min: 2.0,
    size_range: 5.0,
};
pub const POWER_UP_BURST: Burst = Burst {
    count: 12,
    spread: 4.0,
    life: 80,
    size_min: 1.0,
    size_range: 3.0,
};
pub const SHIELD_BREAK_BURST: Burst = Burst {
    count: 10,
    spread: 3.0,
    life: 60,
    size_min: 1.0,
    size_range: 3.0,
};
pub const MILESTONE_BURST: Burst = Burst {
    count: 20,
    spread: 3.0,
    life: 100,
    size_min: 2.0,
    size_range: 4.0,
};

impl Burst {
    fn particle<R: Rng>(&self, rng: &mut R, x: f64, y: f64, color: Color) -> Particle {
        Particle {
            x,
            y,
            vx: rng.gen_range(-self.spread..self.spread),
            vy: rng.gen_range(-self.spread..self.spread),
            life: self.life,
            max_life: self.life,
            color,
            size: self.size_min + rng.gen_range(0.0..self.size_range),
        }
    }

    /// All particles from one point in one colour.
    pub fn emit<R: Rng>(&self, rng: &mut R, out: &mut Vec<Particle>, x: f64, y: f64, color: Color) {
        out.extend((0..self.count).map(|_| self.particle(rng, x, y, color)));
    }

    /// Particles scattered across the whole world, each with a random hue.
    pub fn emit_confetti<R: Rng>(&self, rng: &mut R, out: &mut Vec<Particle>, width: f64, height: f64) {
        for _ in 0..self.count {
            let x = rng.gen_range(0.0..1.0) * width;
            let y = rng.gen_range(0.0..1.0) * height;
            let color = hsl(rng.gen_range(0.0..360.0), 0.7, 0.6);
            out.push(self.particle(rng, x, y, color));
        }
    }
}

/// Move, age and drop dead particles.
pub fn tick_particles(particles: &mut Vec<Particle>) {
    particles.retain_mut(|p| {
        p.x += p.vx;
        p.y += p.vy;
        p.life = p.life.saturating_sub(1);
        p.vy += PARTICLE_GRAVITY;
        p.life > 0
    });
}

/// Frames the shake falloff is measured against.
const SHAKE_FALLOFF: f64 = 500.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenShake {
    pub x: f64,
    pub y: f64,
    pub intensity: f64,
    pub duration: u32,
}

impl ScreenShake {
    pub fn start(&mut self, intensity: f64, duration: u32) {
        self.intensity = intensity;
        self.duration = duration;
    }

    pub fn tick<R: Rng>(&mut self, rng: &mut R) {
        if self.duration > 0 {
            self.duration -= 1;
            let intensity = self.intensity * (f64::from(self.duration) / SHAKE_FALLOFF);
            self.x = (rng.gen_range(0.0..1.0) - 0.5) * intensity;
            self.y = (rng.gen_range(0.0..1.0) - 0.5) * intensity;
        } else {
            self.x = 0.0;
            self.y = 0.0;
        }
    }

    pub fn offset(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}

const CLOUD_COUNT: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct Cloud {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub speed: f64,
}

fn cloud_y<R: Rng>(rng: &mut R) -> f64 {
    rng.gen_range(0.0..200.0) + 50.0
}

pub fn spawn_clouds<R: Rng>(rng: &mut R, world_width: f64) -> Vec<Cloud> {
    (0..CLOUD_COUNT)
        .map(|_| Cloud {
            x: rng.gen_range(0.0..1.0) * world_width,
            y: cloud_y(rng),
            width: rng.gen_range(40.0..100.0),
            height: rng.gen_range(20.0..50.0),
            speed: rng.gen_range(0.2..0.7),
        })
        .collect()
}

/// Scroll clouds; a cloud leaving on the left re-enters on the right at a new height.
pub fn tick_clouds<R: Rng>(clouds: &mut [Cloud], rng: &mut R, slow_motion: bool, world_width: f64) {
    for cloud in clouds {
        cloud.x -= if slow_motion { cloud.speed * 0.5 } else { cloud.speed };
        if cloud.x + cloud.width < 0.0 {
            cloud.x = world_width;
            cloud.y = cloud_y(rng);
        }
    }
}

const MOUNTAIN_COUNT: usize = 3;
const MOUNTAIN_STRIDE: f64 = 400.0;
const MOUNTAIN_WIDTH: f64 = 500.0;
const MOUNTAIN_HEIGHT: f64 = 100.0;
const MOUNTAIN_SPEED: f64 = 0.3;

#[derive(Debug, Clone, PartialEq)]
pub struct Mountain {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub speed: f64,
}

/// Mountains stand on the ground line.
pub fn spawn_mountains(ground_y: f64) -> Vec<Mountain> {
    (0..MOUNTAIN_COUNT)
        .map(|i| Mountain {
            x: i as f64 * MOUNTAIN_STRIDE,
            y: ground_y - MOUNTAIN_HEIGHT,
            width: MOUNTAIN_WIDTH,
            height: MOUNTAIN_HEIGHT,
            speed: MOUNTAIN_SPEED,
        })
        .collect()
}

pub fn tick_mountains(mountains: &mut [Mountain], slow_motion: bool, world_width: f64) {
    for m in mountains {
        m.x -= if slow_motion { m.speed * 0.5 } else { m.speed };
        if m.x + m.width < 0.0 {
            m.x = world_width;
        }
    }
}

/// Day/night clock advance per frame (one full cycle in about 55 seconds).
const DAY_NIGHT_SPEED: f64 = 0.0003;

/// Advance `t` in `[0, 1)`, wrapping to 0 past the end of the cycle.
pub fn advance_time_of_day(t: f64) -> f64 {
    let next = t + DAY_NIGHT_SPEED;
    if next > 1.0 { 0.0 } else { next }
}

/// 1.0 at noon, 0.0 at midnight.
pub fn daylight(time_of_day: f64) -> f64 {
    (1.0 + (time_of_day * std::f64::consts::TAU).sin()) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_particles_fade_and_die() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut particles = Vec::new();
        FLAP_BURST.emit(&mut rng, &mut particles, 10.0, 10.0, GOLD);
        assert_eq!(particles.len(), 5);
        for _ in 0..29 {
            tick_particles(&mut particles);
        }
        assert_eq!(particles.len(), 5);
        assert!(particles.iter().all(|p| p.life == 1));
        tick_particles(&mut particles);
        assert!(particles.is_empty());
    }

    #[test]
    fn test_particle_gravity_pulls_down() {
        let mut particles = vec![Particle {
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            life: 10,
            max_life: 10,
            color: GREEN,
            size: 1.0,
        }];
        tick_particles(&mut particles);
        tick_particles(&mut particles);
        assert!(particles[0].vy > 0.0);
        assert!(particles[0].y > 0.0);
        assert!((particles[0].alpha() - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_confetti_count() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut particles = Vec::new();
        MILESTONE_BURST.emit_confetti(&mut rng, &mut particles, 800.0, 600.0);
        assert_eq!(particles.len(), 20);
        assert!(particles.iter().all(|p| p.x < 800.0 && p.y < 600.0));
    }

    #[test]
    fn test_shake_settles_to_zero() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut shake = ScreenShake::default();
        shake.start(15.0, 3);
        for _ in 0..3 {
            shake.tick(&mut rng);
        }
        assert_eq!(shake.duration, 0);
        shake.tick(&mut rng);
        assert_eq!(shake.offset(), (0.0, 0.0));
    }

    #[test]
    fn test_clouds_wrap_to_right_edge() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut clouds = vec![Cloud {
            x: -100.0,
            y: 60.0,
            width: 100.0,
            height: 30.0,
            speed: 0.5,
        }];
        tick_clouds(&mut clouds, &mut rng, false, 800.0);
        assert_eq!(clouds[0].x, 800.0);
        assert!((50.0..250.0).contains(&clouds[0].y));
    }

    #[test]
    fn test_slow_motion_halves_decor_speed() {
        let mut mountains = spawn_mountains(550.0);
        tick_mountains(&mut mountains, true, 800.0);
        assert_eq!(mountains[1].x, 400.0 - 0.15);
        assert_eq!(mountains[0].y, 450.0);
    }

    #[test]
    fn test_time_of_day_wraps() {
        assert_eq!(advance_time_of_day(0.99995), 0.0);
        assert!((advance_time_of_day(0.5) - 0.5003).abs() < 1e-12);
        assert!((daylight(0.25) - 1.0).abs() < 1e-12);
        assert!(daylight(0.75).abs() < 1e-12);
    }
}
