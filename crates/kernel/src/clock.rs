/// Frame clock for the simulation.
///
/// `frame_time` is the elapsed simulated time at the start of the current
/// frame; `dt` is the time since the previous frame.
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    frame_time: f64,
    dt: f64,
    frame_count: u64,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by `dt` seconds. Negative or non-finite steps count as zero.
    pub fn advance(&mut self, dt: f64) {
        let dt = if dt.is_finite() && dt >= 0.0 {
            dt
        } else {
            tracing::warn!(dt, "ignoring invalid frame step");
            0.0
        };
        self.dt = dt;
        self.frame_time += dt;
        self.frame_count += 1;
    }

    pub fn frame_time(&self) -> f64 {
        self.frame_time
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}
