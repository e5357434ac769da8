//! Game state: phases, queued intents, one simulation step, collisions, scoring and combos.

use crate::bird::{Bird, JUMP_VELOCITY};
use crate::particles::{
    self, COMBO_BURST, Cloud, EMBER, EXPLOSION_BURST, FLAP_BURST, GOLD, GREEN, MILESTONE_BURST,
    Mountain, POWER_UP_BURST, Particle, SCORE_BURST, SHIELD_BREAK_BURST, ScreenShake,
};
use crate::pipes::{self, Difficulty, Pipe};
use crate::power_ups::{
    EffectFractions, EffectLedger, PowerUp, PowerUpKind, SPAWN_CHANCE, SPAWN_MIN_SCORE,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use tracing::{debug, info};

pub const GROUND_HEIGHT: f64 = 50.0;
/// Degenerate sizes are clamped up to these.
pub const MIN_WORLD_WIDTH: f64 = 200.0;
pub const MIN_WORLD_HEIGHT: f64 = 400.0;

/// Forward scroll speed at the start of a run.
pub const BASE_SPEED: f64 = 2.0;
/// Added to the speed every frame; unbounded.
const SPEED_INCREMENT: f64 = 0.0005;

/// Frames a combo survives without a new pass (3 s at 60 Hz).
pub const COMBO_WINDOW: u32 = 180;
/// One bonus point per this many consecutive passes.
const COMBO_BONUS_EVERY: u32 = 5;
const MILESTONE_EVERY: u32 = 10;

const GAME_OVER_SHAKE_INTENSITY: f64 = 15.0;
const GAME_OVER_SHAKE_FRAMES: u32 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Start,
    Playing,
    GameOver,
}

/// Requests from the host, applied at the start of the next step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Flap,
    Start,
    Restart,
}

/// Fire-and-forget feedback for the host (sound cues, flashes, persistence).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Flap,
    Score { points: u32 },
    Collision,
    PowerUpCollected(PowerUpKind),
    ShieldBroken,
    Milestone(u32),
    /// The best score was beaten; the host should persist it.
    NewBest(u32),
    GameOver { score: u32, new_best: bool },
}

/// World dimensions in world units. The bird and pipes live in `0..width` × `0..ground_y()`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct World {
    pub width: f64,
    pub height: f64,
}

impl World {
    /// Non-finite or too-small sizes are clamped to the minimum.
    pub fn new(width: f64, height: f64) -> Self {
        let clamp = |v: f64, min: f64| if v.is_finite() { v.max(min) } else { min };
        Self {
            width: clamp(width, MIN_WORLD_WIDTH),
            height: clamp(height, MIN_WORLD_HEIGHT),
        }
    }

    pub fn ground_y(&self) -> f64 {
        self.height - GROUND_HEIGHT
    }

    /// Vertical band pipes and power-ups occupy.
    pub fn playable_height(&self) -> f64 {
        self.ground_y()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

/// Consecutive passes, best streak this run, and frames left before the streak drops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Combo {
    pub count: u32,
    pub max: u32,
    pub timer: u32,
}

impl Combo {
    /// Register a pass; returns the bonus points it earns.
    fn pass(&mut self) -> u32 {
        self.count += 1;
        self.max = self.max.max(self.count);
        self.timer = COMBO_WINDOW;
        self.count / COMBO_BONUS_EVERY
    }

    /// The streak drops on the frame the timer runs out.
    fn tick(&mut self) {
        if self.timer > 0 {
            self.timer -= 1;
            if self.timer == 0 {
                self.count = 0;
            }
        }
    }

    fn break_streak(&mut self) {
        self.count = 0;
        self.timer = 0;
    }
}

/// Read-only view of everything needed to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct RenderModel<'a> {
    pub phase: Phase,
    pub world: World,
    pub bird: &'a Bird,
    pub pipes: &'a [Pipe],
    pub power_ups: &'a [PowerUp],
    pub particles: &'a [Particle],
    pub clouds: &'a [Cloud],
    pub mountains: &'a [Mountain],
    pub shake: (f64, f64),
    /// Day/night blend: 1.0 = noon, 0.0 = midnight.
    pub daylight: f64,
    pub score: u32,
    pub best: u32,
    pub combo: u32,
    pub max_combo: u32,
    pub effects: EffectFractions,
    /// The run that just ended beat the previous best.
    pub new_best: bool,
}

/// The whole simulation. One owner, mutated only through `step()` and the intent queue.
#[derive(Debug)]
pub struct Game {
    world: World,
    rng: StdRng,
    phase: Phase,
    intents: VecDeque<Intent>,
    events: Vec<GameEvent>,
    bird: Bird,
    pipes: Vec<Pipe>,
    power_ups: Vec<PowerUp>,
    effects: EffectLedger,
    particles: Vec<Particle>,
    shake: ScreenShake,
    clouds: Vec<Cloud>,
    mountains: Vec<Mountain>,
    time_of_day: f64,
    score: u32,
    best: u32,
    new_best: bool,
    combo: Combo,
    difficulty: Difficulty,
    speed: f64,
    milestone_shown: bool,
    power_ups_enabled: bool,
}

impl Game {
    pub fn new(config: &crate::GameConfig, world: World, best: u32) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(world, best, rng, config.power_ups)
    }

    pub fn with_rng(world: World, best: u32, mut rng: StdRng, power_ups_enabled: bool) -> Self {
        let clouds = particles::spawn_clouds(&mut rng, world.width);
        let mountains = particles::spawn_mountains(world.ground_y());
        Self {
            world,
            rng,
            phase: Phase::Start,
            intents: VecDeque::new(),
            events: Vec::new(),
            bird: Bird::default(),
            pipes: Vec::new(),
            power_ups: Vec::new(),
            effects: EffectLedger::default(),
            particles: Vec::new(),
            shake: ScreenShake::default(),
            clouds,
            mountains,
            time_of_day: 0.0,
            score: 0,
            best,
            new_best: false,
            combo: Combo::default(),
            difficulty: Difficulty::default(),
            speed: BASE_SPEED,
            milestone_shown: false,
            power_ups_enabled,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn request_flap(&mut self) {
        self.intents.push_back(Intent::Flap);
    }

    pub fn request_start(&mut self) {
        self.intents.push_back(Intent::Start);
    }

    pub fn request_restart(&mut self) {
        self.intents.push_back(Intent::Restart);
    }

    /// Take all feedback events produced since the last call.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// New world size. Derived bounds follow; entity positions are left alone.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.world = World::new(width, height);
        debug!(width = self.world.width, height = self.world.height, "world resized");
    }

    pub fn render_model(&self) -> RenderModel<'_> {
        RenderModel {
            phase: self.phase,
            world: self.world,
            bird: &self.bird,
            pipes: &self.pipes,
            power_ups: &self.power_ups,
            particles: &self.particles,
            clouds: &self.clouds,
            mountains: &self.mountains,
            shake: self.shake.offset(),
            daylight: particles::daylight(self.time_of_day),
            score: self.score,
            best: self.best,
            combo: self.combo.count,
            max_combo: self.combo.max,
            effects: self.effects.fractions(),
            new_best: self.new_best,
        }
    }

    /// Advance one frame. Only `Playing` runs the simulation; other phases just apply intents.
    pub fn step(&mut self) {
        self.apply_intents();
        if self.phase != Phase::Playing {
            return;
        }

        self.bird.integrate();
        self.bird.tick_trail();

        self.spawn_pipes();
        self.update_pipes();

        let slow = self.effects.is_active(PowerUpKind::SlowMotion);
        particles::tick_clouds(&mut self.clouds, &mut self.rng, slow, self.world.width);
        particles::tick_mountains(&mut self.mountains, slow, self.world.width);

        particles::tick_particles(&mut self.particles);
        self.shake.tick(&mut self.rng);

        self.update_power_ups();
        self.maybe_spawn_power_up();

        self.combo.tick();
        self.time_of_day = particles::advance_time_of_day(self.time_of_day);

        self.check_collisions();
        self.update_difficulty();
        if self.phase != Phase::Playing {
            return;
        }
        self.speed += SPEED_INCREMENT;
    }

    fn apply_intents(&mut self) {
        while let Some(intent) = self.intents.pop_front() {
            match (intent, self.phase) {
                (Intent::Flap, Phase::Playing) => self.flap(),
                (Intent::Start, Phase::Start) | (Intent::Restart, Phase::GameOver) => {
                    self.begin_run();
                }
                _ => {}
            }
        }
    }

    fn begin_run(&mut self) {
        self.reset();
        self.phase = Phase::Playing;
        info!(best = self.best, pipes = self.pipes.len(), "run started");
    }

    fn flap(&mut self) {
        self.bird.flap();
        let (x, y) = (self.bird.x, self.bird.y + self.bird.height / 2.0);
        FLAP_BURST.emit(&mut self.rng, &mut self.particles, x, y, GOLD);
        self.events.push(GameEvent::Flap);
    }

    /// Everything a run owns goes back to its initial value. Decor and the sky clock carry over.
    fn reset(&mut self) {
        self.score = 0;
        self.new_best = false;
        self.bird = Bird::default();
        self.pipes.clear();
        self.power_ups.clear();
        self.particles.clear();
        self.shake = ScreenShake::default();
        self.effects = EffectLedger::default();
        self.combo = Combo::default();
        self.difficulty = Difficulty::default();
        self.speed = BASE_SPEED;
        self.milestone_shown = false;
        self.fill_pipes();
    }

    fn fill_pipes(&mut self) {
        for _ in 0..pipes::initial_pipe_count(self.world.width, self.difficulty.spacing) {
            self.push_pipe();
        }
    }

    fn push_pipe(&mut self) {
        let pipe = pipes::spawn_pipe(
            &mut self.rng,
            &self.difficulty,
            self.pipes.last(),
            self.world.width,
            self.world.playable_height(),
        );
        debug!(x = pipe.x, gap = pipe.gap, top = pipe.top_height, "pipe spawned");
        self.pipes.push(pipe);
    }

    fn spawn_pipes(&mut self) {
        let due = self
            .pipes
            .last()
            .is_none_or(|p| p.x <= self.world.width - self.difficulty.spacing);
        if due {
            self.push_pipe();
        }
    }

    /// Speed applied to everything that scrolls (not to the bird's vertical motion).
    fn effective_speed(&self) -> f64 {
        if self.effects.is_active(PowerUpKind::SlowMotion) {
            self.speed * 0.5
        } else {
            self.speed
        }
    }

    fn update_pipes(&mut self) {
        let speed = self.effective_speed();
        let bird_x = self.bird.x;
        let mut passes = 0;
        for pipe in &mut self.pipes {
            pipe.x -= speed;
            if !pipe.passed && pipe.right() < bird_x {
                pipe.passed = true;
                passes += 1;
            }
        }
        self.pipes.retain(|p| p.right() >= 0.0);
        for _ in 0..passes {
            self.score_pass();
        }
    }

    fn score_pass(&mut self) {
        let bonus = self.combo.pass();
        let base = if self.effects.is_active(PowerUpKind::DoublePoints) {
            2
        } else {
            1
        };
        let points = base + bonus;
        self.score += points;
        self.events.push(GameEvent::Score { points });

        let (cx, cy) = self.bird.center();
        SCORE_BURST.emit(&mut self.rng, &mut self.particles, cx, cy, GREEN);
        if self.combo.count >= COMBO_BONUS_EVERY {
            COMBO_BURST.emit(&mut self.rng, &mut self.particles, cx, cy, GOLD);
        }
    }

    fn update_power_ups(&mut self) {
        self.effects.tick();
        let speed = self.effective_speed();

        // Collected on an earlier frame: the pickup has been seen, now it goes.
        self.power_ups.retain(|p| !p.collected);

        let mut collected = Vec::new();
        for p in &mut self.power_ups {
            p.advance(speed);
            if !p.collected && self.bird.overlaps(p.x, p.y, p.width, p.height) {
                p.collected = true;
                collected.push((p.kind, p.x, p.y));
            }
        }
        self.power_ups.retain(|p| !p.off_screen());

        for (kind, x, y) in collected {
            self.effects.activate(kind);
            POWER_UP_BURST.emit(&mut self.rng, &mut self.particles, x, y, kind.color());
            self.events.push(GameEvent::PowerUpCollected(kind));
            debug!(?kind, "power-up collected");
        }
    }

    fn maybe_spawn_power_up(&mut self) {
        if !self.power_ups_enabled || self.score <= SPAWN_MIN_SCORE {
            return;
        }
        if self.rng.gen_bool(SPAWN_CHANCE) {
            let p = PowerUp::spawn(&mut self.rng, self.world.width, self.world.playable_height());
            self.power_ups.push(p);
        }
    }

    fn check_collisions(&mut self) {
        let ground_y = self.world.ground_y();
        if self.bird.bottom() > ground_y {
            if !self.absorb_hit() {
                self.game_over();
                return;
            }
            self.bird.y = ground_y - self.bird.height;
            self.bird.velocity = JUMP_VELOCITY;
        }

        if self.bird.top() < 0.0 {
            if !self.absorb_hit() {
                self.game_over();
                return;
            }
            self.bird.y = 0.0;
            self.bird.velocity = 0.0;
        }

        let b = &self.bird;
        let pipe_hits = self
            .pipes
            .iter()
            .filter(|p| p.hits(b.x, b.y, b.width, b.height))
            .count();
        for _ in 0..pipe_hits {
            if !self.absorb_hit() {
                self.game_over();
                return;
            }
            self.bird.velocity = JUMP_VELOCITY;
        }
    }

    /// Spend an active shield on a hit. False if there was none.
    fn absorb_hit(&mut self) -> bool {
        if !self.effects.is_active(PowerUpKind::Shield) {
            return false;
        }
        self.effects.consume(PowerUpKind::Shield);
        let (cx, cy) = self.bird.center();
        SHIELD_BREAK_BURST.emit(&mut self.rng, &mut self.particles, cx, cy, GOLD);
        self.events.push(GameEvent::ShieldBroken);
        debug!(score = self.score, "shield absorbed a hit");
        true
    }

    fn game_over(&mut self) {
        self.phase = Phase::GameOver;
        self.events.push(GameEvent::Collision);
        self.shake.start(GAME_OVER_SHAKE_INTENSITY, GAME_OVER_SHAKE_FRAMES);
        let (cx, cy) = self.bird.center();
        EXPLOSION_BURST.emit(&mut self.rng, &mut self.particles, cx, cy, EMBER);
        self.combo.break_streak();

        self.new_best = self.score > self.best;
        if self.new_best {
            self.best = self.score;
            self.events.push(GameEvent::NewBest(self.score));
        }
        self.events.push(GameEvent::GameOver {
            score: self.score,
            new_best: self.new_best,
        });
        info!(
            score = self.score,
            best = self.best,
            max_combo = self.combo.max,
            "game over"
        );
    }

    fn update_difficulty(&mut self) {
        self.difficulty.tick(self.score);

        // Edge-triggered on raw score: a jump over a multiple of ten never fires.
        if self.score > 0 && self.score % MILESTONE_EVERY == 0 && !self.milestone_shown {
            MILESTONE_BURST.emit_confetti(
                &mut self.rng,
                &mut self.particles,
                self.world.width,
                self.world.height,
            );
            self.milestone_shown = true;
            self.events.push(GameEvent::Milestone(self.score));
            debug!(score = self.score, "milestone");
        } else if self.score % MILESTONE_EVERY != 0 {
            self.milestone_shown = false;
        }
    }
}
