//! Audio: short synthesised cues for game feedback. Plays nothing when muted or when no
//! output device can be opened.

use crate::game::GameEvent;
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamHandle};
use tracing::{debug, info, warn};

const SAMPLE_RATE: u32 = 44_100;

/// A sound the host plays in response to a game event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Flap,
    Score,
    Collision,
    PowerUp,
}

/// How a cue's pitch moves over its length.
#[derive(Debug, Clone, Copy)]
enum Pitch {
    /// Exponential glide between two frequencies.
    Glide(f32, f32),
    /// Equal-length notes played in order.
    Steps(&'static [f32]),
}

/// One sine voice: pitch, exponential gain ramp and length in seconds.
#[derive(Debug, Clone, Copy)]
struct Voice {
    pitch: Pitch,
    gain: (f32, f32),
    seconds: f32,
}

impl Cue {
    pub fn from_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Flap => Some(Self::Flap),
            GameEvent::Score { .. } => Some(Self::Score),
            GameEvent::Collision => Some(Self::Collision),
            GameEvent::PowerUpCollected(_) => Some(Self::PowerUp),
            _ => None,
        }
    }

    fn voice(self) -> Voice {
        match self {
            Self::Flap => Voice {
                pitch: Pitch::Glide(300.0, 150.0),
                gain: (0.1, 0.01),
                seconds: 0.1,
            },
            // C5 E5 G5
            Self::Score => Voice {
                pitch: Pitch::Steps(&[523.0, 659.0, 784.0]),
                gain: (0.1, 0.01),
                seconds: 0.3,
            },
            Self::Collision => Voice {
                pitch: Pitch::Glide(150.0, 50.0),
                gain: (0.2, 0.01),
                seconds: 0.5,
            },
            Self::PowerUp => Voice {
                pitch: Pitch::Steps(&[659.0, 880.0, 1047.0, 1319.0]),
                gain: (0.08, 0.01),
                seconds: 0.24,
            },
        }
    }
}

fn exp_ramp(from: f32, to: f32, t: f32) -> f32 {
    from * (to / from).powf(t)
}

/// Mono samples at `SAMPLE_RATE` for one cue.
pub fn synthesize(cue: Cue) -> Vec<f32> {
    let voice = cue.voice();
    let len = (SAMPLE_RATE as f32 * voice.seconds) as usize;
    let mut phase = 0.0_f32;
    (0..len)
        .map(|i| {
            let t = i as f32 / len as f32;
            let freq = match voice.pitch {
                Pitch::Glide(from, to) => exp_ramp(from, to, t),
                Pitch::Steps(notes) => {
                    notes[((t * notes.len() as f32) as usize).min(notes.len() - 1)]
                }
            };
            // Accumulate phase so note changes don't click.
            phase = (phase + freq / SAMPLE_RATE as f32).fract();
            (std::f32::consts::TAU * phase).sin() * exp_ramp(voice.gain.0, voice.gain.1, t)
        })
        .collect()
}

/// Output device handle. The stream must outlive every queued cue.
pub struct Audio {
    output: Option<(OutputStream, OutputStreamHandle)>,
}

impl Audio {
    pub fn open(muted: bool) -> Self {
        if muted {
            info!("audio muted");
            return Self::silent();
        }
        match OutputStream::try_default() {
            Ok(output) => {
                info!("audio output opened");
                Self {
                    output: Some(output),
                }
            }
            Err(e) => {
                warn!(error = %e, "no audio output, playing silently");
                Self::silent()
            }
        }
    }

    pub const fn silent() -> Self {
        Self { output: None }
    }

    pub const fn is_enabled(&self) -> bool {
        self.output.is_some()
    }

    pub fn play(&self, cue: Cue) {
        let Some((_, handle)) = &self.output else {
            return;
        };
        let source = SamplesBuffer::new(1, SAMPLE_RATE, synthesize(cue));
        if let Err(e) = handle.play_raw(source) {
            debug!(error = %e, ?cue, "could not play cue");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::power_ups::PowerUpKind;

    #[test]
    fn test_cue_lengths() {
        assert_eq!(synthesize(Cue::Flap).len(), 4410);
        assert_eq!(synthesize(Cue::Score).len(), 13_230);
        assert_eq!(synthesize(Cue::Collision).len(), 22_050);
    }

    #[test]
    fn test_cues_fade_out_within_gain() {
        for cue in [Cue::Flap, Cue::Score, Cue::Collision, Cue::PowerUp] {
            let samples = synthesize(cue);
            let start_gain = cue.voice().gain.0;
            assert!(samples.iter().all(|s| s.abs() <= start_gain + 1e-6), "{cue:?}");
            let head = samples[..100].iter().fold(0.0_f32, |m, s| m.max(s.abs()));
            let tail = samples[samples.len() - 100..]
                .iter()
                .fold(0.0_f32, |m, s| m.max(s.abs()));
            assert!(tail < head, "{cue:?} does not decay");
        }
    }

    #[test]
    fn test_glide_and_steps() {
        assert!((exp_ramp(300.0, 150.0, 0.0) - 300.0).abs() < 1e-3);
        assert!((exp_ramp(300.0, 150.0, 1.0) - 150.0).abs() < 1e-3);
        assert!((exp_ramp(300.0, 150.0, 0.5) - 212.13).abs() < 0.01);
    }

    #[test]
    fn test_events_map_to_cues() {
        assert_eq!(Cue::from_event(&GameEvent::Flap), Some(Cue::Flap));
        assert_eq!(
            Cue::from_event(&GameEvent::Score { points: 2 }),
            Some(Cue::Score)
        );
        assert_eq!(Cue::from_event(&GameEvent::Collision), Some(Cue::Collision));
        assert_eq!(
            Cue::from_event(&GameEvent::PowerUpCollected(PowerUpKind::Shield)),
            Some(Cue::PowerUp)
        );
        assert_eq!(Cue::from_event(&GameEvent::ShieldBroken), None);
        assert_eq!(Cue::from_event(&GameEvent::Milestone(10)), None);
    }

    #[test]
    fn test_muted_audio_is_silent() {
        let audio = Audio::open(true);
        assert!(!audio.is_enabled());
        audio.play(Cue::Flap);
    }
}
