//! Flying Birdie: flap through an endless run of pipes in the terminal.

mod app;
mod audio;
mod bird;
mod game;
mod highscores;
mod input;
mod particles;
mod pipes;
mod power_ups;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Options derived from CLI that affect the simulation and the frame loop.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Fixed RNG seed; entropy when None.
    pub seed: Option<u64>,
    pub power_ups: bool,
    /// World height in world units; the width follows the terminal.
    pub world_height: f64,
    pub frame_rate: f64,
    /// Start the first run immediately.
    pub skip_start: bool,
    pub mute: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    let theme = theme::Theme::load(args.theme.as_deref()).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "bad theme file, using the default theme");
        theme::Theme::default()
    });
    let config = GameConfig {
        seed: args.seed,
        power_ups: !args.no_power_ups,
        world_height: args.world_height.max(game::MIN_WORLD_HEIGHT),
        frame_rate: args.frame_rate.clamp(1.0, 240.0),
        skip_start: args.no_menu,
        mute: args.mute,
    };
    tracing::info!(?config, "starting");

    let store = highscores::ScoreStore::new(args.data_dir.as_deref());
    let mut app = App::new(config, theme, store);
    app.run()?;
    Ok(())
}

/// Log to a file so the TUI stays clean. Filter with RUST_LOG (default: info).
fn init_logging(path: &std::path::Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("could not create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    Ok(())
}

/// Flappy-bird style arcade game in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "flying-birdie",
    version,
    about = "Flappy-bird style arcade game in the terminal. Flap through the gaps, chain passes into combos, grab power-ups.",
    long_about = "Flying Birdie is a terminal arcade game.\n\n\
        Gravity pulls the bird down; each flap kicks it back up. Fly through the gaps between \
        pipes to score. Consecutive passes build a combo worth bonus points, and the gaps narrow \
        as the score climbs. Power-ups: slow motion, a one-hit shield and double points.\n\n\
        CONTROLS:\n  Space / Up / k / w   Flap (also starts a run)\n  Enter                Start / restart\n  \
        R                    Restart after game over\n  P                    Pause\n  Q / Esc              Quit\n\n\
        Use --theme to load a btop-style theme file (theme[pipe]=\"#228B22\") and --mute to silence sound."
)]
pub struct Args {
    /// RNG seed for a reproducible pipe and power-up sequence.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Simulation steps (and frames) per second. Timings are tuned for 60.
    #[arg(long, default_value = "60.0", value_name = "HZ", value_parser = parse_frame_rate)]
    pub frame_rate: f64,

    /// World height in world units (min 400). Larger values zoom out.
    #[arg(long, default_value = "600.0", value_name = "UNITS")]
    pub world_height: f64,

    /// Never spawn power-ups.
    #[arg(long)]
    pub no_power_ups: bool,

    /// Skip the start screen and begin flying immediately.
    #[arg(long)]
    pub no_menu: bool,

    /// No sound effects.
    #[arg(long)]
    pub mute: bool,

    /// Path to theme file (btop-style theme[key]=\"value\"). Classic colours if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Directory for the best score. Defaults to $XDG_CONFIG_HOME/flying-birdie.
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Write tracing logs to this file (filter with RUST_LOG).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

/// Finite and positive; main clamps it to 1..=240.
fn parse_frame_rate(s: &str) -> Result<f64, String> {
    let hz: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if hz.is_finite() && hz > 0.0 {
        Ok(hz)
    } else {
        Err(format!("frame rate must be a positive number, got {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = Args::try_parse_from(["flying-birdie"]).unwrap();
        assert_eq!(args.frame_rate, 60.0);
        assert_eq!(args.world_height, 600.0);
        assert!(args.seed.is_none());
        assert!(!args.no_power_ups);
        assert!(!args.mute);
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from([
            "flying-birdie",
            "--seed",
            "42",
            "--no-power-ups",
            "--no-menu",
            "--mute",
            "--data-dir",
            "/tmp/birdie",
        ])
        .unwrap();
        assert_eq!(args.seed, Some(42));
        assert!(args.no_power_ups);
        assert!(args.no_menu);
        assert!(args.mute);
        assert_eq!(args.data_dir, Some(PathBuf::from("/tmp/birdie")));
    }

    #[test]
    fn test_frame_rate_must_be_finite_and_positive() {
        for bad in ["nan", "NaN", "inf", "-inf", "0", "-30", "fast"] {
            assert!(
                Args::try_parse_from(["flying-birdie", "--frame-rate", bad]).is_err(),
                "accepted {bad}"
            );
        }
        let args = Args::try_parse_from(["flying-birdie", "--frame-rate", "30"]).unwrap();
        assert_eq!(args.frame_rate, 30.0);
    }
}
