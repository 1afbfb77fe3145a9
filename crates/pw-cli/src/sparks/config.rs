use std::time::Duration;

/// Smallest arena side that fits the largest ball with room to move.
pub const MIN_SIDE: usize = 16;

/// Configuration for a Sparks run.
#[derive(Debug, Clone)]
pub struct SparksConfig {
    /// Arena width in cells.
    pub width: usize,
    /// Arena height in cells.
    pub height: usize,
    /// Number of balls to spawn.
    pub balls: usize,
    /// RNG seed for ball placement and velocity.
    pub seed: u64,
    /// Frames to render before stopping. `None` runs until interrupted.
    pub frames: Option<u64>,
    /// Pause between rendered frames.
    pub delay: Duration,
    /// Suppress frame output.
    pub quiet: bool,
}

impl Default for SparksConfig {
    fn default() -> Self {
        Self {
            width: 30,
            height: 30,
            balls: 1,
            seed: 42,
            frames: None,
            delay: Duration::from_millis(50),
            quiet: false,
        }
    }
}

impl SparksConfig {
    /// Set the arena size.
    pub fn with_size(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the number of balls.
    pub fn with_balls(mut self, balls: usize) -> Self {
        self.balls = balls;
        self
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Stop after `frames` frames.
    pub fn with_frames(mut self, frames: u64) -> Self {
        self.frames = Some(frames);
        self
    }

    /// Set the pause between frames.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Suppress frame output.
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }
}
