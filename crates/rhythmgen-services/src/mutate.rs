//! Rate-limited randomized voice configuration
//!
//! Pattern generation itself is deterministic; the "surprise" comes from
//! this control-thread policy, which re-rolls each voice's (steps, pulses)
//! at a bounded rate and publishes the changes through the normal parameter
//! handoff. Tick it from a UI timer or similar; it never touches the audio
//! thread directly.

use rhythmgen_core::MAX_STEPS;
use tracing::debug;

use crate::engine::{EngineError, EngineHandle};

/// Randomizes (steps, pulses) per voice, at most once per interval
#[derive(Debug)]
pub struct MutatePolicy {
    rng: fastrand::Rng,
    step_min: u8,
    step_max: u8,
    interval_ticks: u32,
    ticks_since_mutation: u32,
}

impl MutatePolicy {
    /// Policy firing at most once every `interval_ticks` calls to [`tick`](Self::tick)
    pub fn new(interval_ticks: u32) -> Self {
        Self::with_rng(interval_ticks, fastrand::Rng::new())
    }

    /// Seeded policy, reproducible for tests and replay
    pub fn with_seed(interval_ticks: u32, seed: u64) -> Self {
        Self::with_rng(interval_ticks, fastrand::Rng::with_seed(seed))
    }

    fn with_rng(interval_ticks: u32, rng: fastrand::Rng) -> Self {
        Self {
            rng,
            step_min: 4,
            step_max: MAX_STEPS,
            interval_ticks: interval_ticks.max(1),
            ticks_since_mutation: 0,
        }
    }

    /// Restrict the randomized step count to `min..=max`
    pub fn with_step_range(mut self, min: u8, max: u8) -> Self {
        self.step_min = min.clamp(1, MAX_STEPS);
        self.step_max = max.clamp(self.step_min, MAX_STEPS);
        self
    }

    /// Advance the policy clock; mutate every voice when the interval elapses
    ///
    /// Returns whether a mutation fired.
    pub fn tick(&mut self, handle: &EngineHandle) -> Result<bool, EngineError> {
        self.ticks_since_mutation += 1;
        if self.ticks_since_mutation < self.interval_ticks {
            return Ok(false);
        }
        self.ticks_since_mutation = 0;

        for voice in 0..handle.voice_count() {
            let steps = self.rng.u8(self.step_min..=self.step_max);
            let pulses = self.rng.u8(1..=steps);
            debug!(voice, steps, pulses, "mutating voice");
            handle.set_steps(voice, steps)?;
            handle.set_pulses(voice, pulses)?;
        }
        Ok(true)
    }
}
