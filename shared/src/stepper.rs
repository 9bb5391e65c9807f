//! Converts wall-clock time into whole fixed-size ticks.

use log::debug;

/// Fixed-timestep catch-up loop.
///
/// The watermark starts at the first `now` seen, so the first call never
/// ticks. Each later call runs ticks until the watermark passes `now`, at
/// most `max_steps` of them. When the cap is hit the watermark jumps straight
/// to `now` and the missed time is dropped rather than replayed.
#[derive(Debug, Clone)]
pub struct FixedStepper {
    fixed_dt: f64,
    max_steps: u32,
    simulated_time: Option<f64>,
}

impl FixedStepper {
    pub fn new(fixed_dt: f64, max_steps: u32) -> Self {
        Self {
            fixed_dt,
            max_steps,
            simulated_time: None,
        }
    }

    pub fn simulated_time(&self) -> Option<f64> {
        self.simulated_time
    }

    /// Runs `tick(fixed_dt)` as many times as `now` calls for and returns
    /// how many ran.
    pub fn advance<F>(&mut self, now: f64, mut tick: F) -> u32
    where
        F: FnMut(f32),
    {
        let mut simulated = match self.simulated_time {
            Some(simulated) => simulated,
            None => {
                self.simulated_time = Some(now);
                return 0;
            }
        };

        let mut steps = 0;
        while now > simulated {
            if steps == self.max_steps {
                debug!(
                    "Stepper fell {:.3}s behind, skipping ahead",
                    now - simulated
                );
                simulated = now;
                break;
            }
            tick(self.fixed_dt as f32);
            simulated += self.fixed_dt;
            steps += 1;
        }

        self.simulated_time = Some(simulated);
        steps
    }

    /// Forgets the watermark; the next call re-anchors on its `now`.
    pub fn reset(&mut self) {
        self.simulated_time = None;
    }
}
