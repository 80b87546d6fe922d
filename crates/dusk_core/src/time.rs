//! Fixed-timestep clock.
//!
//! Frames arrive with variable wall-clock deltas; the simulation only ever
//! advances in slices of exactly `fixed_dt`. The caller feeds each frame's
//! delta into `accumulate()` and then drains with `while should_step()`.
//! Leftover time carries into the next frame, and `interpolation_alpha`
//! reports how far between two fixed steps the presentation currently is.

pub const DEFAULT_FIXED_DT: f64 = 1.0 / 60.0;
const DEFAULT_MAX_ACCUMULATOR: f64 = 0.25;

#[derive(Debug, Clone)]
pub struct TimeState {
    pub fixed_dt: f64,
    pub max_accumulator: f64,
    accumulator: f64,
    pub total_time: f64,
    pub fixed_step_count: u64,
    pub frame_count: u64,
    pub steps_this_frame: u32,
    pub real_dt: f64,
    pub interpolation_alpha: f64,
}

impl TimeState {
    pub fn new() -> Self {
        Self::with_fixed_dt(DEFAULT_FIXED_DT)
    }

    pub fn with_fixed_dt(fixed_dt: f64) -> Self {
        let fixed_dt = if fixed_dt > 0.0 {
            fixed_dt
        } else {
            log::warn!("fixed_dt {fixed_dt} is not positive, using {DEFAULT_FIXED_DT}");
            DEFAULT_FIXED_DT
        };
        Self {
            fixed_dt,
            max_accumulator: DEFAULT_MAX_ACCUMULATOR,
            accumulator: 0.0,
            total_time: 0.0,
            fixed_step_count: 0,
            frame_count: 0,
            steps_this_frame: 0,
            real_dt: 0.0,
            interpolation_alpha: 0.0,
        }
    }

    /// Start a frame that took `frame_dt` seconds of wall-clock time.
    pub fn accumulate(&mut self, frame_dt: f64) {
        self.real_dt = frame_dt.max(0.0);

        // Spiral-of-death cap
        if self.real_dt > self.max_accumulator {
            log::warn!(
                "Frame took {:.1}ms, capping accumulator to {}ms",
                self.real_dt * 1000.0,
                self.max_accumulator * 1000.0
            );
            self.real_dt = self.max_accumulator;
        }

        self.accumulator += self.real_dt;
        self.steps_this_frame = 0;
        self.frame_count += 1;
    }

    pub fn should_step(&mut self) -> bool {
        if self.accumulator >= self.fixed_dt {
            self.accumulator -= self.fixed_dt;
            self.total_time += self.fixed_dt;
            self.fixed_step_count += 1;
            self.steps_this_frame += 1;
            true
        } else {
            false
        }
    }

    pub fn end_frame(&mut self) {
        self.interpolation_alpha = self.accumulator / self.fixed_dt;
    }
}

impl Default for TimeState {
    fn default() -> Self {
        Self::new()
    }
}
