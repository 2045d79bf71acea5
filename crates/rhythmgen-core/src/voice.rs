//! Rhythm voice state

use serde::{Deserialize, Serialize};

use crate::pattern::{euclidean, Pattern};

/// Maximum pattern length in steps
pub const MAX_STEPS: u8 = 32;

/// Default velocity for emitted note-ons
pub const DEFAULT_VELOCITY: u8 = 100;

/// MIDI note number for a 1-based octave and scale degree (C1 = 24)
///
/// `note_number(4, 1)` is middle C (60). The result saturates at 127.
pub fn note_number(octave: u8, degree: u8) -> u8 {
    let octave = octave.clamp(1, 8) as u16;
    let degree = degree.clamp(1, 12) as u16;
    (24 + (octave - 1) * 12 + (degree - 1)).min(127) as u8
}

/// Cached pattern together with the (pulses, steps) pair it was built from
#[derive(Debug, Clone, Default)]
struct PatternCache {
    key: (u8, u8),
    pattern: Pattern,
}

/// One independently triggered rhythm generator
///
/// Mutable runtime state (`step_cursor`, pattern cache) is owned by the
/// scheduler and touched only from the real-time thread; it is not
/// serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RhythmVoice {
    pub enabled: bool,
    pub velocity: u8,
    pub channel: u8,
    note: u8,
    steps: u8,
    pulses: u8,
    /// Position in the pattern; -1 before the first step fires
    #[serde(skip, default = "initial_cursor")]
    step_cursor: i32,
    #[serde(skip)]
    cache: PatternCache,
}

fn initial_cursor() -> i32 {
    -1
}

impl Default for RhythmVoice {
    fn default() -> Self {
        Self::new(note_number(4, 1))
    }
}

impl RhythmVoice {
    pub fn new(note: u8) -> Self {
        Self {
            enabled: false,
            velocity: DEFAULT_VELOCITY,
            channel: 0,
            note: note.min(127),
            steps: 16,
            pulses: 4,
            step_cursor: initial_cursor(),
            cache: PatternCache::default(),
        }
    }

    pub fn note(&self) -> u8 {
        self.note
    }

    pub fn set_note(&mut self, note: u8) {
        self.note = note.min(127);
    }

    pub fn steps(&self) -> u8 {
        self.steps
    }

    pub fn set_steps(&mut self, steps: u8) {
        self.steps = steps.clamp(1, MAX_STEPS);
    }

    pub fn pulses(&self) -> u8 {
        self.pulses
    }

    pub fn set_pulses(&mut self, pulses: u8) {
        self.pulses = pulses.min(MAX_STEPS);
    }

    pub fn step_cursor(&self) -> i32 {
        self.step_cursor
    }

    /// Rewind to the pre-roll position, so the next boundary fires step 0
    pub fn reset_cursor(&mut self) {
        self.step_cursor = initial_cursor();
    }

    /// Advance the cursor one step, wrapping to 0 past the end
    ///
    /// Returns the new step index, always in `0..steps`.
    pub fn advance_step(&mut self) -> usize {
        let next = self.step_cursor + 1;
        self.step_cursor = if next >= self.steps as i32 { 0 } else { next };
        self.step_cursor as usize
    }

    /// Current pattern, regenerated if (pulses, steps) changed
    ///
    /// Pulses set above steps are clamped to steps here, before generation.
    pub fn pattern(&mut self) -> &Pattern {
        let key = (self.pulses.min(self.steps), self.steps);
        if self.cache.key != key || self.cache.pattern.is_empty() {
            self.cache = PatternCache { key, pattern: euclidean(key.0, key.1) };
        }
        &self.cache.pattern
    }
}
