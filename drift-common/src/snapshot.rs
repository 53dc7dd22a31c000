use serde::{Deserialize, Serialize};

/// Summary of the simulation after a tick, used for periodic status logging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameStats {
    /// Ticks completed since the last reinit.
    pub frame: u64,
    /// Noise time offset at the end of the tick.
    pub time_offset: f32,
    pub particle_count: u32,
    /// Mean velocity magnitude over all particles.
    pub mean_speed: f32,
    /// Fastest particle relative to its own speed cap, in [0, 1].
    pub max_speed_ratio: f32,
}
