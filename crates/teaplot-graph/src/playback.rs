//! Start, stop and reset across every graph of a [`GraphSpace`].
//!
//! The controller keeps the bookkeeping of the playback buttons: how long
//! the sweep has played, when the current run is due to finish, and the
//! remainder to wait for after a resume. Each stop adds a small delay to
//! that remainder to absorb the frames lost while pausing.

use crate::space::GraphSpace;
use crate::traits::Animatable;

pub const INITIAL_RESUME_DELAY_MS: f64 = 50.0;
pub const RESUME_DELAY_STEP_MS: f64 = 15.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackController {
    anim_time_ms: f64,
    paused: bool,
    started_at_ms: f64,
    played_ms: f64,
    delay_ms: f64,
    resume_ms: f64,
    deadline_ms: Option<f64>,
}

impl PlaybackController {
    pub fn new(anim_time_ms: f64) -> Self {
        Self {
            anim_time_ms,
            paused: false,
            started_at_ms: 0.0,
            played_ms: 0.0,
            delay_ms: INITIAL_RESUME_DELAY_MS,
            resume_ms: 0.0,
            deadline_ms: None,
        }
    }

    pub fn anim_time_ms(&self) -> f64 {
        self.anim_time_ms
    }

    pub fn set_anim_time_ms(&mut self, anim_time_ms: f64) {
        self.anim_time_ms = anim_time_ms;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Time played before the latest stop, summed over every stop.
    pub fn played_ms(&self) -> f64 {
        self.played_ms
    }

    pub fn delay_ms(&self) -> f64 {
        self.delay_ms
    }

    /// How long a resumed run waits before it counts as finished.
    pub fn resume_ms(&self) -> f64 {
        self.resume_ms
    }

    pub fn deadline_ms(&self) -> Option<f64> {
        self.deadline_ms
    }

    fn clear(&mut self) {
        self.paused = false;
        self.played_ms = 0.0;
        self.delay_ms = INITIAL_RESUME_DELAY_MS;
        self.deadline_ms = None;
    }

    /// Start every idle graph. Returns how many started.
    pub fn start(&mut self, space: &mut GraphSpace, now_ms: f64) -> usize {
        let (graphs, mut ctx) = space.graphs_and_scenes_mut();
        let mut started = 0;
        for graph in graphs.iter_mut().filter(|graph| !graph.is_animating()) {
            graph.start_animation(self.anim_time_ms, now_ms, &mut ctx);
            started += 1;
        }
        if started == 0 {
            return 0;
        }

        let wait = if self.paused {
            self.resume_ms
        } else {
            self.anim_time_ms + INITIAL_RESUME_DELAY_MS
        };
        self.paused = false;
        self.started_at_ms = now_ms;
        self.deadline_ms = Some(now_ms + wait);
        tracing::debug!("Playback started {} graphs, due at {}ms", started, now_ms + wait);
        started
    }

    /// Stop every animating graph. Returns how many stopped.
    pub fn stop(&mut self, space: &mut GraphSpace, now_ms: f64) -> usize {
        let (graphs, _) = space.graphs_and_scenes_mut();
        let stopped = graphs
            .iter_mut()
            .filter(|graph| graph.is_animating())
            .map(|graph| graph.stop_animation())
            .filter(|stopped| *stopped)
            .count();
        if stopped == 0 {
            return 0;
        }

        self.paused = true;
        self.deadline_ms = None;
        self.delay_ms += RESUME_DELAY_STEP_MS;
        self.played_ms += now_ms - self.started_at_ms;
        self.resume_ms = self.anim_time_ms - self.played_ms + self.delay_ms;
        tracing::debug!("Playback stopped after {}ms, {}ms left", self.played_ms, self.resume_ms);
        stopped
    }

    /// Restart every running or paused graph from the beginning.
    pub fn reset(&mut self, space: &mut GraphSpace, now_ms: f64) -> usize {
        let paused = self.paused;
        let (graphs, mut ctx) = space.graphs_and_scenes_mut();
        let mut restarted = 0;
        for graph in graphs.iter_mut() {
            if graph.is_animating() || paused {
                graph.reset_animation(self.anim_time_ms, now_ms, &mut ctx);
                restarted += 1;
            }
        }

        self.clear();
        if restarted > 0 {
            self.started_at_ms = now_ms;
            self.deadline_ms = Some(now_ms + self.anim_time_ms + INITIAL_RESUME_DELAY_MS);
        }
        restarted
    }

    /// Once the current run is due and every graph is idle, clear the
    /// bookkeeping and return `true`.
    pub fn poll_finished(&mut self, now_ms: f64, space: &GraphSpace) -> bool {
        match self.deadline_ms {
            Some(deadline) if now_ms >= deadline && !space.any_animating() => {
                self.clear();
                true
            }
            _ => false,
        }
    }
}
