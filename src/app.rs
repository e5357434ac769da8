//! App: terminal init, fixed-rate frame loop, key handling and game-event side effects.

use crate::audio::{Audio, Cue};
use crate::game::{Game, GameEvent, Phase, World};
use crate::highscores::ScoreStore;
use crate::input::{Action, key_to_action};
use crate::particles::GOLD;
use crate::theme::Theme;
use crate::{GameConfig, ui};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use ratatui::layout::Rect;
use ratatui::style::Color;
use std::time::{Duration, Instant};
use tachyonfx::Effect;
use tracing::{debug, info, warn};

/// What the loop should do after handling a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

pub struct App {
    config: GameConfig,
    theme: Theme,
    store: ScoreStore,
    audio: Audio,
    game: Game,
    paused: bool,
    /// TachyonFX flash (milestone, shield break), created when the event arrives.
    flash_effect: Option<Effect>,
    /// Last time the flash was processed (for delta).
    flash_process_time: Option<Instant>,
    /// Last terminal size the world was fitted to.
    last_area: Rect,
}

impl App {
    pub fn new(config: GameConfig, theme: Theme, store: ScoreStore) -> Self {
        let best = match store.load() {
            Ok(best) => best,
            Err(e) => {
                warn!(error = %e, path = %store.path().display(), "could not read best score, starting from 0");
                0
            }
        };
        info!(best, path = %store.path().display(), "best score loaded");
        let mut game = Game::new(&config, World::new(800.0, config.world_height), best);
        if config.skip_start {
            game.request_start();
        }
        let audio = Audio::open(config.mute);
        Self {
            config,
            theme,
            store,
            audio,
            game,
            paused: false,
            flash_effect: None,
            flash_process_time: None,
            last_area: Rect::default(),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal = DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;
        terminal.hide_cursor()?;

        let result = self.run_loop(&mut terminal);

        // Restore
        let _ = terminal.show_cursor();
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let frame_duration = Duration::from_secs_f64(1.0 / self.config.frame_rate);
        loop {
            let frame_start = Instant::now();
            let size = terminal.size()?;
            self.fit_world(Rect::new(0, 0, size.width, size.height));

            if !self.paused {
                self.game.step();
            }
            self.handle_events();
            if self.flash_effect.as_ref().is_some_and(Effect::done) {
                self.flash_effect = None;
                self.flash_process_time = None;
            }

            let model = self.game.render_model();
            terminal.draw(|f| {
                ui::draw(
                    f,
                    &model,
                    &self.theme,
                    self.paused,
                    &mut self.flash_effect,
                    &mut self.flash_process_time,
                    frame_start,
                );
            })?;

            let timeout = frame_duration.saturating_sub(frame_start.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    if let Event::Key(key) = event::read()? {
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }
                        if self.apply_action(key_to_action(key)) == Flow::Exit {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    /// Keep the world the shape of the terminal; the engine clamps degenerate sizes.
    fn fit_world(&mut self, area: Rect) {
        if area == self.last_area {
            return;
        }
        self.last_area = area;
        let (width, height) = ui::world_size_for_area(area, self.config.world_height);
        self.game.resize(width, height);
    }

    fn apply_action(&mut self, action: Action) -> Flow {
        if self.paused {
            match action {
                Action::Pause => self.paused = false,
                Action::Quit => return Flow::Exit,
                _ => {}
            }
            return Flow::Continue;
        }
        match action {
            Action::Quit => return Flow::Exit,
            Action::Pause => {
                if self.game.phase() == Phase::Playing {
                    self.paused = true;
                }
            }
            Action::Flap => match self.game.phase() {
                Phase::Start => {
                    self.game.request_start();
                    self.game.request_flap();
                }
                Phase::Playing => self.game.request_flap(),
                Phase::GameOver => {}
            },
            Action::Confirm | Action::Restart => match self.game.phase() {
                Phase::Start if action == Action::Confirm => self.game.request_start(),
                Phase::GameOver => self.game.request_restart(),
                _ => {}
            },
            Action::None => {}
        }
        Flow::Continue
    }

    fn handle_events(&mut self) {
        for event in self.game.drain_events() {
            if let Some(cue) = Cue::from_event(&event) {
                self.audio.play(cue);
            }
            match event {
                GameEvent::NewBest(best) => {
                    if let Err(e) = self.store.save(best) {
                        warn!(error = %e, best, "could not save best score");
                    } else {
                        info!(best, "new best score saved");
                    }
                }
                GameEvent::Milestone(score) => {
                    info!(score, "milestone");
                    self.start_flash(Color::White);
                }
                GameEvent::ShieldBroken => {
                    debug!("shield broken");
                    self.start_flash(GOLD);
                }
                GameEvent::PowerUpCollected(kind) => info!(?kind, "power-up"),
                GameEvent::GameOver { score, new_best } => {
                    debug!(score, new_best, "run ended");
                }
                GameEvent::Score { points } => debug!(points, "pipe passed"),
                GameEvent::Flap | GameEvent::Collision => debug!(?event, "feedback"),
            }
        }
    }

    fn start_flash(&mut self, color: Color) {
        self.flash_effect = Some(ui::flash_effect(color));
        self.flash_process_time = None;
    }
}
