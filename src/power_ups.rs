//! Power-ups on screen and the effects ledger they feed (one slot per kind).

use rand::Rng;
use ratatui::style::Color;

pub const POWER_UP_SIZE: f64 = 20.0;
/// Per-frame spawn probability once the score gate is passed.
pub const SPAWN_CHANCE: f64 = 0.002;
/// Power-ups only appear when the score is strictly above this.
pub const SPAWN_MIN_SCORE: u32 = 3;
/// Vertical spawn band: `margin .. playable - 2 * margin`.
const SPAWN_MARGIN: f64 = 50.0;
const PULSE_STEP: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerUpKind {
    SlowMotion,
    Shield,
    DoublePoints,
}

impl PowerUpKind {
    pub const ALL: [Self; 3] = [Self::SlowMotion, Self::Shield, Self::DoublePoints];

    /// Full effect duration in frames (60 Hz).
    pub const fn duration(self) -> u32 {
        match self {
            Self::SlowMotion => 300,
            Self::Shield => 600,
            Self::DoublePoints => 450,
        }
    }

    /// Colour of the pickup and of its collection burst.
    pub const fn color(self) -> Color {
        match self {
            Self::SlowMotion => Color::Rgb(0x00, 0xFF, 0xFF),
            Self::Shield => Color::Rgb(0xFF, 0xD7, 0x00),
            Self::DoublePoints => Color::Rgb(0xFF, 0x69, 0xB4),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::SlowMotion => "Slow-mo",
            Self::Shield => "Shield",
            Self::DoublePoints => "2x",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub collected: bool,
    pub pulse: f64,
}

impl PowerUp {
    /// A random pickup at the right edge, within the playable band.
    pub fn spawn<R: Rng>(rng: &mut R, world_width: f64, playable_height: f64) -> Self {
        let kind = PowerUpKind::ALL[rng.gen_range(0..PowerUpKind::ALL.len())];
        let band = (playable_height - 2.0 * SPAWN_MARGIN).max(0.0);
        Self {
            kind,
            x: world_width,
            y: rng.gen_range(0.0..1.0) * band + SPAWN_MARGIN,
            width: POWER_UP_SIZE,
            height: POWER_UP_SIZE,
            collected: false,
            pulse: 0.0,
        }
    }

    pub fn advance(&mut self, speed: f64) {
        self.x -= speed;
        self.pulse += PULSE_STEP;
    }

    pub fn off_screen(&self) -> bool {
        self.x + self.width < 0.0
    }
}

/// One timed modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EffectSlot {
    pub active: bool,
    pub remaining: u32,
}

impl EffectSlot {
    fn tick(&mut self) {
        if self.active {
            self.remaining = self.remaining.saturating_sub(1);
            if self.remaining == 0 {
                self.active = false;
            }
        }
    }
}

/// Exactly one slot per effect kind. Re-activating resets to the full duration, never stacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EffectLedger {
    pub slow_motion: EffectSlot,
    pub shield: EffectSlot,
    pub double_points: EffectSlot,
}

impl EffectLedger {
    pub fn slot(&self, kind: PowerUpKind) -> &EffectSlot {
        match kind {
            PowerUpKind::SlowMotion => &self.slow_motion,
            PowerUpKind::Shield => &self.shield,
            PowerUpKind::DoublePoints => &self.double_points,
        }
    }

    fn slot_mut(&mut self, kind: PowerUpKind) -> &mut EffectSlot {
        match kind {
            PowerUpKind::SlowMotion => &mut self.slow_motion,
            PowerUpKind::Shield => &mut self.shield,
            PowerUpKind::DoublePoints => &mut self.double_points,
        }
    }

    pub fn is_active(&self, kind: PowerUpKind) -> bool {
        self.slot(kind).active
    }

    pub fn activate(&mut self, kind: PowerUpKind) {
        *self.slot_mut(kind) = EffectSlot {
            active: true,
            remaining: kind.duration(),
        };
    }

    /// Turn an effect off immediately (a shield absorbing a hit).
    pub fn consume(&mut self, kind: PowerUpKind) {
        *self.slot_mut(kind) = EffectSlot::default();
    }

    /// Count every active effect down by one frame.
    pub fn tick(&mut self) {
        self.slow_motion.tick();
        self.shield.tick();
        self.double_points.tick();
    }

    /// Remaining share of the full duration, 0.0 when inactive.
    pub fn fraction(&self, kind: PowerUpKind) -> f64 {
        let slot = self.slot(kind);
        if slot.active {
            f64::from(slot.remaining) / f64::from(kind.duration())
        } else {
            0.0
        }
    }

    pub fn fractions(&self) -> EffectFractions {
        EffectFractions {
            slow_motion: self.fraction(PowerUpKind::SlowMotion),
            shield: self.fraction(PowerUpKind::Shield),
            double_points: self.fraction(PowerUpKind::DoublePoints),
        }
    }
}

/// Per-kind remaining fractions for the HUD timer bars.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EffectFractions {
    pub slow_motion: f64,
    pub shield: f64,
    pub double_points: f64,
}

impl EffectFractions {
    pub fn get(&self, kind: PowerUpKind) -> f64 {
        match kind {
            PowerUpKind::SlowMotion => self.slow_motion,
            PowerUpKind::Shield => self.shield,
            PowerUpKind::DoublePoints => self.double_points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_effect_expires_after_full_duration() {
        let mut ledger = EffectLedger::default();
        ledger.activate(PowerUpKind::SlowMotion);
        for _ in 0..299 {
            ledger.tick();
        }
        assert!(ledger.is_active(PowerUpKind::SlowMotion));
        assert_eq!(ledger.slow_motion.remaining, 1);
        ledger.tick();
        assert!(!ledger.is_active(PowerUpKind::SlowMotion));
        assert_eq!(ledger.fraction(PowerUpKind::SlowMotion), 0.0);
    }

    #[test]
    fn test_reactivation_resets_instead_of_stacking() {
        let mut ledger = EffectLedger::default();
        ledger.activate(PowerUpKind::Shield);
        for _ in 0..100 {
            ledger.tick();
        }
        ledger.activate(PowerUpKind::Shield);
        assert_eq!(ledger.shield.remaining, PowerUpKind::Shield.duration());
        assert_eq!(ledger.fraction(PowerUpKind::Shield), 1.0);
    }

    #[test]
    fn test_slots_are_independent() {
        let mut ledger = EffectLedger::default();
        ledger.activate(PowerUpKind::DoublePoints);
        ledger.consume(PowerUpKind::Shield);
        assert!(ledger.is_active(PowerUpKind::DoublePoints));
        assert!(!ledger.is_active(PowerUpKind::Shield));
        ledger.consume(PowerUpKind::DoublePoints);
        assert_eq!(ledger, EffectLedger::default());
    }

    #[test]
    fn test_fraction_halfway() {
        let mut ledger = EffectLedger::default();
        ledger.activate(PowerUpKind::DoublePoints);
        for _ in 0..225 {
            ledger.tick();
        }
        assert_eq!(ledger.fractions().get(PowerUpKind::DoublePoints), 0.5);
    }

    #[test]
    fn test_spawn_within_band() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let p = PowerUp::spawn(&mut rng, 800.0, 550.0);
            assert_eq!(p.x, 800.0);
            assert!(p.y >= 50.0 && p.y < 500.0, "y {}", p.y);
            assert!(!p.collected);
        }
    }

    #[test]
    fn test_advance_and_off_screen() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut p = PowerUp::spawn(&mut rng, 10.0, 550.0);
        assert!(!p.off_screen());
        p.advance(31.0);
        assert!(p.off_screen());
        assert!((p.pulse - 0.1).abs() < 1e-12);
    }
}
