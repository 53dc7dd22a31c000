use std::time::{Duration, Instant};

/// Paces ticks at a fixed target rate. Waiting happens only between ticks.
#[derive(Debug)]
pub struct FrameClock {
    frame_budget: Duration,
    paced: bool,
    last_frame: Instant,
}

impl FrameClock {
    /// `frame_rate` is clamped to at least 1 frame per second.
    pub fn new(frame_rate: u32, paced: bool) -> Self {
        FrameClock {
            frame_budget: Duration::from_secs_f64(1.0 / frame_rate.max(1) as f64),
            paced,
            last_frame: Instant::now(),
        }
    }

    pub fn frame_budget(&self) -> Duration {
        self.frame_budget
    }

    /// Time left in the current frame budget.
    pub fn remaining(&self) -> Duration {
        self.frame_budget.saturating_sub(self.last_frame.elapsed())
    }

    /// Sleeps out the rest of the frame when pacing, then starts the next
    /// frame. Returns how long the finished frame took before any sleep.
    pub fn wait_for_next_frame(&mut self) -> Duration {
        let work = self.last_frame.elapsed();
        if self.paced {
            let remaining = self.remaining();
            if !remaining.is_zero() {
                std::thread::sleep(remaining);
            }
        }
        self.last_frame = Instant::now();
        work
    }
}
