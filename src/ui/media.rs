//! Stand-in media element for the native viewer: a play head that advances
//! with wall-clock time once its metadata has "loaded".

use std::time::{Duration, Instant};

use crate::playback::MediaElement;

#[derive(Debug, Clone)]
pub struct SimulatedMedia {
    duration: f64,
    loaded_at: Instant,
    position: f64,
    playing: bool,
}

impl SimulatedMedia {
    pub fn new(duration: f64, load_delay: Duration, now: Instant) -> Self {
        Self {
            duration,
            loaded_at: now + load_delay,
            position: 0.0,
            playing: false,
        }
    }

    pub fn is_loaded(&self, now: Instant) -> bool {
        now >= self.loaded_at
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Moves the play head forward by `dt` seconds while playing.
    pub fn advance(&mut self, dt: f64) {
        if !self.playing {
            return;
        }
        self.position = (self.position + dt.max(0.0)).min(self.duration);
        if self.position >= self.duration {
            self.playing = false;
        }
    }
}

impl MediaElement for SimulatedMedia {
    fn duration(&self) -> Option<f64> {
        self.is_loaded(Instant::now()).then_some(self.duration)
    }

    fn current_time(&self) -> f64 {
        self.position
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.position = seconds.clamp(0.0, self.duration);
    }

    fn play(&mut self) {
        self.playing = true;
    }
}
