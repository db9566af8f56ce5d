//! Worker configuration types

use std::path::PathBuf;

/// How this worker executes its tests
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionSettings {
    pub scripts_dir: PathBuf,
    pub headless: bool,
    pub replay_speed: f64,
}

impl ExecutionSettings {
    pub fn new(scripts_dir: impl Into<PathBuf>) -> Self {
        Self {
            scripts_dir: scripts_dir.into(),
            headless: true,
            replay_speed: 1.0,
        }
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_replay_speed(mut self, replay_speed: f64) -> Self {
        self.replay_speed = replay_speed;
        self
    }

    /// Replay speed with non-positive and non-finite values treated as 1.0
    pub fn effective_speed(&self) -> f64 {
        if self.replay_speed.is_finite() && self.replay_speed > 0.0 {
            self.replay_speed
        } else {
            1.0
        }
    }
}
