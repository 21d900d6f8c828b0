use log::{log_enabled, warn, Level};
use std::time::{Duration, Instant};

/// Trace-level timer for one pipeline stage; logs on creation and on drop.
pub struct ScopedTimer<'a> {
    stage: &'a str,
    start: Instant,
}

impl<'a> ScopedTimer<'a> {
    pub fn new(stage: &'a str) -> Self {
        if log_enabled!(Level::Trace) {
            log::trace!("⏱️ {stage}: begin");
        }
        Self {
            stage,
            start: Instant::now(),
        }
    }
}

impl<'a> Drop for ScopedTimer<'a> {
    fn drop(&mut self) {
        if log_enabled!(Level::Trace) {
            log::trace!(
                "⏱️ {}: {} µs",
                self.stage,
                self.start.elapsed().as_micros()
            );
        }
    }
}

/// Warns when a step's wall time exceeds its own timestep, the point at
/// which a fixed-dt simulation can no longer keep up in real time.
pub fn warn_if_step_exceeds_timestep(elapsed: Duration, dt: f32) {
    let elapsed = elapsed.as_secs_f32();
    if elapsed > dt {
        warn!(
            "step took {:.2} ms against a {:.2} ms timestep",
            elapsed * 1000.0,
            dt * 1000.0
        );
    }
}
