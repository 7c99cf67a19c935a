//! Frame-stepped reveal sweep.
//!
//! The host steps the machine once per displayed frame with its current
//! clock. Progress is derived from accumulated elapsed time, so a slow frame
//! advances the sweep further rather than stretching the animation.

/// Animation state of a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimationState {
    #[default]
    Idle,
    Animating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// A sweep is already running; nothing changed.
    AlreadyAnimating,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// The machine is idle; nothing happened.
    Idle,
    /// The sweep advanced. `elapsed` is the time used to compute `position`.
    Progress { position: f32, elapsed: f64 },
    /// The sweep reached its end and the machine went idle.
    Finished { position: f32, elapsed: f64 },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RevealAnimation {
    state: AnimationState,
    start: f32,
    end: f32,
    duration_ms: f64,
    elapsed_ms: f64,
    last_step_ms: f64,
    position: f32,
}

impl RevealAnimation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin sweeping from `start` to `end` over `duration_ms`, resuming
    /// at `elapsed_ms`.
    pub fn start(
        &mut self,
        start: f32,
        end: f32,
        duration_ms: f64,
        elapsed_ms: f64,
        now_ms: f64,
    ) -> StartOutcome {
        if self.is_animating() {
            return StartOutcome::AlreadyAnimating;
        }

        self.state = AnimationState::Animating;
        self.start = start;
        self.end = end;
        self.duration_ms = duration_ms;
        self.elapsed_ms = elapsed_ms.max(0.0);
        self.last_step_ms = now_ms;
        self.position = start;
        StartOutcome::Started
    }

    pub fn step(&mut self, now_ms: f64) -> StepOutcome {
        if !self.is_animating() {
            return StepOutcome::Idle;
        }

        let delta = now_ms - self.last_step_ms;
        let progress = if self.duration_ms > 0.0 {
            self.elapsed_ms / self.duration_ms
        } else {
            1.0
        };
        let position = self.start + (self.end - self.start) * progress as f32;
        let elapsed = self.elapsed_ms;
        self.position = position;

        if position < self.end {
            self.elapsed_ms += delta;
            self.last_step_ms = now_ms;
            StepOutcome::Progress { position, elapsed }
        } else {
            self.state = AnimationState::Idle;
            StepOutcome::Finished { position, elapsed }
        }
    }

    /// Halt the sweep where it is. Returns `false` when already idle.
    pub fn stop(&mut self) -> bool {
        if !self.is_animating() {
            return false;
        }
        self.state = AnimationState::Idle;
        true
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn is_animating(&self) -> bool {
        self.state == AnimationState::Animating
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    /// Position reported by the latest step.
    pub fn position(&self) -> f32 {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midpoint_position() {
        let mut animation = RevealAnimation::new();
        animation.start(0.0, 100.0, 1000.0, 500.0, 0.0);

        match animation.step(16.0) {
            StepOutcome::Progress { position, elapsed } => {
                assert!((position - 50.0).abs() < 1e-4);
                assert_eq!(elapsed, 500.0);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(animation.elapsed_ms(), 516.0);
    }

    #[test]
    fn test_elapsed_accumulates_measured_delta() {
        let mut animation = RevealAnimation::new();
        animation.start(0.0, 100.0, 1000.0, 0.0, 1000.0);

        animation.step(1000.0);
        animation.step(1016.0);
        animation.step(1050.0);
        assert_eq!(animation.elapsed_ms(), 50.0);
    }

    #[test]
    fn test_finishes_exactly_once() {
        let mut animation = RevealAnimation::new();
        animation.start(0.0, 100.0, 1000.0, 0.0, 0.0);

        let mut finished = 0;
        let mut now = 0.0;
        for _ in 0..200 {
            now += 16.0;
            if let StepOutcome::Finished { position, .. } = animation.step(now) {
                assert!(position >= 100.0);
                finished += 1;
            }
        }

        assert_eq!(finished, 1);
        assert_eq!(animation.state(), AnimationState::Idle);
        assert_eq!(animation.step(now + 16.0), StepOutcome::Idle);
    }

    #[test]
    fn test_double_start_is_rejected() {
        let mut animation = RevealAnimation::new();
        assert_eq!(animation.start(0.0, 100.0, 1000.0, 0.0, 0.0), StartOutcome::Started);
        animation.step(100.0);
        animation.step(200.0);

        assert_eq!(
            animation.start(0.0, 100.0, 1000.0, 0.0, 200.0),
            StartOutcome::AlreadyAnimating
        );
        // The running sweep keeps its progress.
        assert_eq!(animation.elapsed_ms(), 200.0);
    }

    #[test]
    fn test_stop_keeps_position() {
        let mut animation = RevealAnimation::new();
        animation.start(0.0, 100.0, 1000.0, 400.0, 0.0);
        animation.step(10.0);

        assert!(animation.stop());
        assert!((animation.position() - 40.0).abs() < 1e-4);
        assert_eq!(animation.step(20.0), StepOutcome::Idle);
    }

    #[test]
    fn test_stop_on_idle_is_noop() {
        let mut animation = RevealAnimation::new();
        let before = animation.clone();
        assert!(!animation.stop());
        assert_eq!(animation, before);
    }

    #[test]
    fn test_zero_duration_finishes_immediately() {
        let mut animation = RevealAnimation::new();
        animation.start(5.0, 10.0, 0.0, 0.0, 0.0);
        assert!(matches!(animation.step(1.0), StepOutcome::Finished { position, .. } if position == 10.0));
    }
}
