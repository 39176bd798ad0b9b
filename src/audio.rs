//! Audio routing
//!
//! The simulation only emits semantic cues. `AudioManager` turns the drained
//! event queue into backend calls, applying the volume settings and keeping
//! track of which music loop is playing.

use crate::settings::Settings;
use crate::sim::{GameEvent, MusicCue, SoundCue};

/// Something that can actually make noise
pub trait AudioBackend {
    /// Fire a one-shot effect
    fn play_sfx(&mut self, cue: SoundCue, volume: f32);
    /// Start a looping track, replacing any current one
    fn start_music(&mut self, cue: MusicCue, volume: f32);
    fn stop_music(&mut self);
}

/// Backend that only logs; used by the headless runner
#[derive(Debug, Default)]
pub struct LogBackend;

impl AudioBackend for LogBackend {
    fn play_sfx(&mut self, cue: SoundCue, volume: f32) {
        log::debug!("sfx {:?} @ {:.2}", cue, volume);
    }

    fn start_music(&mut self, cue: MusicCue, volume: f32) {
        log::debug!("music {:?} @ {:.2}", cue, volume);
    }

    fn stop_music(&mut self) {
        log::debug!("music stopped");
    }
}

/// Audio manager for the game
pub struct AudioManager<B: AudioBackend> {
    backend: B,
    sfx_volume: f32,
    music_volume: f32,
    music: Option<MusicCue>,
}

impl<B: AudioBackend> AudioManager<B> {
    pub fn new(backend: B, settings: &Settings) -> Self {
        let mut manager = Self {
            backend,
            sfx_volume: 0.0,
            music_volume: 0.0,
            music: None,
        };
        manager.apply_settings(settings);
        manager
    }

    /// Pick up changed volume/mute settings
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.sfx_volume = settings.effective_sfx_volume();
        self.music_volume = settings.effective_music_volume();
    }

    /// Currently looping track
    pub fn music(&self) -> Option<MusicCue> {
        self.music
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Route a batch of simulation events
    pub fn dispatch(&mut self, events: &[GameEvent]) {
        for event in events {
            match *event {
                GameEvent::Sound(cue) => {
                    if self.sfx_volume > 0.0 {
                        self.backend.play_sfx(cue, self.sfx_volume);
                    }
                }
                GameEvent::Music(cue) => {
                    if self.music == Some(cue) {
                        continue;
                    }
                    self.music = Some(cue);
                    self.backend.start_music(cue, self.music_volume);
                }
                GameEvent::MusicStop => {
                    if self.music.take().is_some() {
                        self.backend.stop_music();
                    }
                }
                GameEvent::StageStarted { .. } | GameEvent::GameOver { .. } => {}
            }
        }
    }
}
