//! Pipes: generation against the current difficulty, and the score-driven difficulty ratchet.

use rand::Rng;

pub const BASE_PIPE_WIDTH: f64 = 60.0;
pub const BASE_GAP: f64 = 150.0;
pub const BASE_SPACING: f64 = 250.0;

/// Minimum height of either pipe segment.
pub const MIN_SEGMENT_HEIGHT: f64 = 60.0;
/// Spawn gap is drawn from `[gap - GAP_BELOW, gap + GAP_ABOVE]` (base: 140..=180),
/// never below the floor of the tier the gap has reached.
const GAP_BELOW: f64 = 10.0;
const GAP_ABOVE: f64 = 30.0;
const SPACING_JITTER: f64 = 15.0;
const WIDTH_JITTER: f64 = 5.0;
/// The first pipe of an empty list appears this far past the right edge.
const FIRST_PIPE_OFFSET: f64 = 100.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Pipe {
    pub x: f64,
    pub top_height: f64,
    pub bottom_y: f64,
    pub bottom_height: f64,
    pub gap: f64,
    pub width: f64,
    /// Set once the bird is past; a pipe scores exactly once.
    pub passed: bool,
}

impl Pipe {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// True if the box overlaps either the top or the bottom segment.
    pub fn hits(&self, x: f64, y: f64, w: f64, h: f64) -> bool {
        let horizontal = x < self.right() && x + w > self.x;
        horizontal && (y < self.top_height || y + h > self.bottom_y)
    }
}

/// One difficulty tier: per-step decrements applied while the score is in `[from, until)`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Tier {
    from: u32,
    until: u32,
    gap_step: f64,
    gap_floor: f64,
    spacing_step: f64,
    spacing_floor: f64,
}

const TIERS: [Tier; 3] = [
    Tier {
        from: 10,
        until: 20,
        gap_step: 0.1,
        gap_floor: 130.0,
        spacing_step: 0.0,
        spacing_floor: BASE_SPACING,
    },
    Tier {
        from: 20,
        until: 30,
        gap_step: 0.1,
        gap_floor: 120.0,
        spacing_step: 0.2,
        spacing_floor: 200.0,
    },
    Tier {
        from: 30,
        until: u32::MAX,
        gap_step: 0.05,
        gap_floor: 110.0,
        spacing_step: 0.1,
        spacing_floor: 180.0,
    },
];

/// No spawned gap is ever narrower than this.
pub const MIN_GAP: f64 = TIERS[TIERS.len() - 1].gap_floor;

/// Current gap and spacing. Only ever moves down within a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Difficulty {
    pub gap: f64,
    pub spacing: f64,
}

impl Default for Difficulty {
    fn default() -> Self {
        Self {
            gap: BASE_GAP,
            spacing: BASE_SPACING,
        }
    }
}

impl Difficulty {
    /// Apply one step of the tier matching `score`. Never raises a value.
    pub fn tick(&mut self, score: u32) {
        let Some(tier) = TIERS.iter().find(|t| score >= t.from && score < t.until) else {
            return;
        };
        self.gap = (self.gap - tier.gap_step).max(tier.gap_floor).min(self.gap);
        self.spacing = (self.spacing - tier.spacing_step)
            .max(tier.spacing_floor)
            .min(self.spacing);
    }

    /// Floor of the deepest tier the gap has reached; the last tier's floor is the hard minimum.
    pub fn gap_floor(&self) -> f64 {
        TIERS
            .iter()
            .map(|t| t.gap_floor)
            .filter(|&floor| floor <= self.gap)
            .fold(MIN_GAP, f64::max)
    }

    /// Inclusive range a freshly spawned gap is drawn from.
    pub fn gap_bounds(&self) -> (f64, f64) {
        let hi = self.gap + GAP_ABOVE;
        ((self.gap - GAP_BELOW).max(self.gap_floor()).min(hi), hi)
    }
}

/// Build the next pipe after `last` (or the first one if `last` is None).
pub fn spawn_pipe<R: Rng>(
    rng: &mut R,
    difficulty: &Difficulty,
    last: Option<&Pipe>,
    world_width: f64,
    playable_height: f64,
) -> Pipe {
    let (gap_lo, gap_hi) = difficulty.gap_bounds();
    let gap = rng.gen_range(gap_lo..=gap_hi);

    // Keep the interval non-empty on short worlds instead of producing NaN geometry.
    let top_hi = (playable_height - gap - MIN_SEGMENT_HEIGHT).max(MIN_SEGMENT_HEIGHT);
    let top_height = rng.gen_range(MIN_SEGMENT_HEIGHT..=top_hi);

    let jitter = rng.gen_range(-SPACING_JITTER..SPACING_JITTER);
    let x = match last {
        None => world_width + FIRST_PIPE_OFFSET,
        Some(p) => p.x + difficulty.spacing + jitter,
    };
    let width = BASE_PIPE_WIDTH + rng.gen_range(-WIDTH_JITTER..WIDTH_JITTER);

    let bottom_y = top_height + gap;
    Pipe {
        x,
        top_height,
        bottom_y,
        bottom_height: playable_height - bottom_y,
        gap,
        width,
        passed: false,
    }
}

/// Enough pipes to cover the visible width plus a two-span margin.
pub fn initial_pipe_count(world_width: f64, spacing: f64) -> usize {
    (world_width / spacing).ceil() as usize + 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const PLAYABLE: f64 = 550.0;

    #[test]
    fn test_spawned_pipe_invariants() {
        let mut rng = StdRng::seed_from_u64(7);
        let difficulty = Difficulty::default();
        let mut last: Option<Pipe> = None;
        for _ in 0..500 {
            let p = spawn_pipe(&mut rng, &difficulty, last.as_ref(), 800.0, PLAYABLE);
            assert_eq!(p.bottom_y, p.top_height + p.gap);
            assert_eq!(p.bottom_height, PLAYABLE - p.bottom_y);
            assert!((140.0..=180.0).contains(&p.gap), "gap {}", p.gap);
            assert!(p.top_height >= MIN_SEGMENT_HEIGHT);
            assert!(p.bottom_height >= MIN_SEGMENT_HEIGHT - 1e-9);
            assert!((55.0..65.0).contains(&p.width));
            last = Some(p);
        }
    }

    fn min_spawned_gap(difficulty: &Difficulty, seed: u64) -> f64 {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..2000)
            .map(|_| spawn_pipe(&mut rng, difficulty, None, 800.0, PLAYABLE).gap)
            .fold(f64::INFINITY, f64::min)
    }

    #[test]
    fn test_spawned_gap_respects_tier_floor() {
        let last_tier = Difficulty {
            gap: 110.0,
            spacing: 180.0,
        };
        assert_eq!(last_tier.gap_floor(), MIN_GAP);
        assert!(min_spawned_gap(&last_tier, 11) >= 110.0);

        let first_tier = Difficulty {
            gap: 130.0,
            spacing: BASE_SPACING,
        };
        assert_eq!(first_tier.gap_floor(), 130.0);
        assert!(min_spawned_gap(&first_tier, 12) >= 130.0);

        let mid_tier = Difficulty {
            gap: 125.0,
            spacing: 210.0,
        };
        let (lo, hi) = mid_tier.gap_bounds();
        assert_eq!((lo, hi), (120.0, 155.0));
        assert!(min_spawned_gap(&mid_tier, 13) >= 120.0);
    }

    #[test]
    fn test_first_pipe_starts_off_screen() {
        let mut rng = StdRng::seed_from_u64(1);
        let p = spawn_pipe(&mut rng, &Difficulty::default(), None, 800.0, PLAYABLE);
        assert_eq!(p.x, 900.0);
    }

    #[test]
    fn test_following_pipe_is_spaced_with_jitter() {
        let mut rng = StdRng::seed_from_u64(2);
        let d = Difficulty::default();
        let first = spawn_pipe(&mut rng, &d, None, 800.0, PLAYABLE);
        let next = spawn_pipe(&mut rng, &d, Some(&first), 800.0, PLAYABLE);
        let dx = next.x - first.x;
        assert!((235.0..265.0).contains(&dx), "dx {}", dx);
    }

    #[test]
    fn test_short_world_keeps_top_range_non_empty() {
        let mut rng = StdRng::seed_from_u64(3);
        let p = spawn_pipe(&mut rng, &Difficulty::default(), None, 800.0, 150.0);
        assert_eq!(p.top_height, MIN_SEGMENT_HEIGHT);
        assert!(p.gap.is_finite());
    }

    #[test]
    fn test_initial_pipe_count() {
        assert_eq!(initial_pipe_count(800.0, 250.0), 6);
        assert_eq!(initial_pipe_count(500.0, 250.0), 4);
    }

    #[test]
    fn test_no_change_below_first_tier() {
        let mut d = Difficulty::default();
        for score in 0..10 {
            d.tick(score);
        }
        assert_eq!(d, Difficulty::default());
    }

    #[test]
    fn test_tiers_ratchet_down_to_floors() {
        let mut d = Difficulty::default();
        for _ in 0..1000 {
            d.tick(12);
        }
        assert_eq!(d.gap, 130.0);
        assert_eq!(d.spacing, BASE_SPACING);

        for _ in 0..1000 {
            d.tick(25);
        }
        assert_eq!(d.gap, 120.0);
        assert_eq!(d.spacing, 200.0);

        for _ in 0..2000 {
            d.tick(40);
        }
        assert_eq!(d.gap, 110.0);
        assert_eq!(d.spacing, 180.0);
    }

    #[test]
    fn test_ratchet_never_increases() {
        let mut d = Difficulty {
            gap: 115.0,
            spacing: 190.0,
        };
        // Floors of the lower tiers are above the current values.
        d.tick(12);
        d.tick(25);
        assert_eq!(d.gap, 115.0);
        assert_eq!(d.spacing, 190.0);
    }

    #[test]
    fn test_gap_bounds_follow_difficulty() {
        let d = Difficulty {
            gap: 130.0,
            spacing: BASE_SPACING,
        };
        assert_eq!(d.gap_bounds(), (130.0, 160.0));
    }
}
