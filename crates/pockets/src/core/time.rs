/// Default number of fixed steps a single host frame may trigger.
pub const DEFAULT_MAX_STEPS: u32 = 10;

/// Turns variable host frame deltas into a whole number of fixed update steps.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    step: f32,
    max_steps: u32,
    accumulator: f32,
}

impl FixedTimestep {
    pub fn new(step: f32) -> Self {
        Self {
            step,
            max_steps: DEFAULT_MAX_STEPS,
            accumulator: 0.0,
        }
    }

    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    /// Add a frame's delta; returns how many steps to run now.
    /// Time beyond `max_steps` worth is dropped so a stall cannot snowball.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        if self.step <= 0.0 {
            return 0;
        }
        self.accumulator += frame_dt.max(0.0);
        self.accumulator = self.accumulator.min(self.step * self.max_steps as f32);
        let steps = (self.accumulator / self.step) as u32;
        self.accumulator -= steps as f32 * self.step;
        steps
    }

    /// Fraction of a step left over, in [0, 1).
    pub fn alpha(&self) -> f32 {
        if self.step > 0.0 {
            self.accumulator / self.step
        } else {
            0.0
        }
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
