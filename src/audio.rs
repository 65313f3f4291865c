//! Sound cues for simulation events
//!
//! The simulation only emits [`GameEvent`]s. This module turns them into
//! sound effects with volume and pitch hints and hands them to an
//! [`AudioSink`], which owns the actual synthesis or playback.

use crate::settings::Settings;
use crate::sim::events::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Player fires
    PlayerShoot,
    PlayerJump,
    /// Enemy shot connects with the player
    PlayerHit,
    /// Level-up, wave clear and revive fanfare
    LevelUp,
    /// Player projectile lands
    EnemyHit,
    EnemyShoot,
    EnemyDeath,
    Explosion,
    BarrierBreak,
    /// Heal or soul orb picked up
    OrbCollect,
    GameOver,
}

/// Oscillator shape for a generated voice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
    Noise,
}

/// Recipe for procedurally generating an effect
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Voice {
    /// Single tone, optionally with a linear decay envelope
    Tone {
        freq: f32,
        duration: f32,
        waveform: Waveform,
        decay: bool,
    },
    /// Sine notes cycled every `note_duration`, intervals in semitones
    Arpeggio {
        base_freq: f32,
        intervals: &'static [i32],
        note_duration: f32,
        duration: f32,
    },
}

impl Voice {
    pub fn duration(&self) -> f32 {
        match self {
            Voice::Tone { duration, .. } | Voice::Arpeggio { duration, .. } => *duration,
        }
    }

    /// Frequencies this voice plays, in order
    pub fn note_frequencies(&self) -> Vec<f32> {
        match self {
            Voice::Tone { freq, .. } => vec![*freq],
            Voice::Arpeggio {
                base_freq,
                intervals,
                ..
            } => intervals
                .iter()
                .map(|&semitones| base_freq * 2f32.powf(semitones as f32 / 12.0))
                .collect(),
        }
    }
}

const fn tone(freq: f32, duration: f32, waveform: Waveform) -> Voice {
    Voice::Tone {
        freq,
        duration,
        waveform,
        decay: true,
    }
}

impl SoundEffect {
    /// How to synthesize this effect
    pub fn voice(self) -> Voice {
        match self {
            SoundEffect::PlayerShoot => tone(800.0, 0.1, Waveform::Sawtooth),
            SoundEffect::PlayerJump => tone(400.0, 0.15, Waveform::Sine),
            SoundEffect::PlayerHit => tone(200.0, 0.15, Waveform::Noise),
            SoundEffect::LevelUp => Voice::Arpeggio {
                base_freq: 440.0,
                intervals: &[0, 4, 7, 12],
                note_duration: 0.1,
                duration: 0.5,
            },
            SoundEffect::EnemyHit => tone(150.0, 0.15, Waveform::Noise),
            SoundEffect::EnemyShoot => tone(600.0, 0.1, Waveform::Sawtooth),
            SoundEffect::EnemyDeath => tone(300.0, 0.2, Waveform::Noise),
            SoundEffect::Explosion => Voice::Tone {
                freq: 100.0,
                duration: 0.4,
                waveform: Waveform::Noise,
                decay: false,
            },
            SoundEffect::BarrierBreak => tone(1500.0, 0.2, Waveform::Noise),
            SoundEffect::OrbCollect => tone(1000.0, 0.1, Waveform::Sine),
            SoundEffect::GameOver => Voice::Arpeggio {
                base_freq: 300.0,
                intervals: &[0, -5, -10],
                note_duration: 0.2,
                duration: 0.8,
            },
        }
    }
}

/// One effect request with playback hints
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoundCue {
    pub effect: SoundEffect,
    /// Per-cue gain before the mixer's volume is applied
    pub volume: f32,
    /// Playback rate
    pub pitch: f32,
    /// Random extra playback rate in `[0, pitch_jitter)`
    pub pitch_jitter: f32,
}

impl SoundCue {
    const fn new(effect: SoundEffect, volume: f32) -> Self {
        Self {
            effect,
            volume,
            pitch: 1.0,
            pitch_jitter: 0.0,
        }
    }

    const fn pitched(mut self, pitch: f32, jitter: f32) -> Self {
        self.pitch = pitch;
        self.pitch_jitter = jitter;
        self
    }

    /// Cue for a simulation event. Some events are silent.
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        use SoundEffect as S;
        let cue = match event {
            GameEvent::PlayerShot => Self::new(S::PlayerShoot, 0.6).pitched(1.0, 0.1),
            GameEvent::PlayerJumped => Self::new(S::PlayerJump, 0.5),
            GameEvent::PlayerHit => Self::new(S::PlayerHit, 0.7),
            GameEvent::BarrierBroken => Self::new(S::BarrierBreak, 0.8),
            GameEvent::Revived => Self::new(S::LevelUp, 1.0).pitched(0.7, 0.0),
            GameEvent::LevelUp { .. } => Self::new(S::LevelUp, 0.8),
            GameEvent::EnemyHit => Self::new(S::EnemyHit, 0.5).pitched(1.0, 0.2),
            GameEvent::EnemyShot => Self::new(S::EnemyShoot, 0.4).pitched(0.9, 0.2),
            GameEvent::EnemyDied { .. } => Self::new(S::EnemyDeath, 0.5).pitched(0.8, 0.4),
            GameEvent::Explosion => Self::new(S::Explosion, 0.6),
            GameEvent::OrbCollected { .. } => Self::new(S::OrbCollect, 0.6).pitched(1.0, 0.3),
            GameEvent::WaveCleared { .. } => Self::new(S::LevelUp, 0.7).pitched(0.8, 0.0),
            GameEvent::GameOver { .. } => Self::new(S::GameOver, 1.0),
            GameEvent::WaveStarted { .. } => return None,
        };
        Some(cue)
    }
}

/// Playback backend
pub trait AudioSink {
    /// `volume` already includes the mixer gain; `pitch` is a playback rate
    fn play(&mut self, effect: SoundEffect, volume: f32, pitch: f32);
}

/// Sink for headless runs: every cue becomes a trace line
#[derive(Debug, Default)]
pub struct LogSink {
    pub played: u64,
}

impl AudioSink for LogSink {
    fn play(&mut self, effect: SoundEffect, volume: f32, pitch: f32) {
        self.played += 1;
        log::trace!("sfx {:?} vol={:.2} rate={:.2}", effect, volume, pitch);
    }
}

/// Applies the user's volume settings and forwards cues to a sink
pub struct AudioMixer<S: AudioSink> {
    sink: S,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl<S: AudioSink> AudioMixer<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            master_volume: 0.7,
            sfx_volume: 0.8,
            muted: false,
        }
    }

    pub fn from_settings(settings: &Settings, sink: S) -> Self {
        let mut mixer = Self::new(sink);
        mixer.apply_settings(settings);
        mixer
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.set_master_volume(settings.master_volume);
        self.set_sfx_volume(settings.sfx_volume);
        self.set_muted(settings.muted);
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play one cue. Returns false when it was silenced.
    pub fn play(&mut self, cue: SoundCue) -> bool {
        let vol = self.effective_volume() * cue.volume;
        if vol <= 0.0 {
            return false;
        }
        let pitch = if cue.pitch_jitter > 0.0 {
            cue.pitch + rand::random_range(0.0..cue.pitch_jitter)
        } else {
            cue.pitch
        };
        self.sink.play(cue.effect, vol, pitch);
        true
    }

    /// Play every audible event from a tick. Returns how many cues were played.
    pub fn handle_events(&mut self, events: &[GameEvent]) -> usize {
        events
            .iter()
            .filter_map(SoundCue::for_event)
            .filter(|cue| self.play(*cue))
            .count()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
