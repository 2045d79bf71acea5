//! Host transport snapshot

use serde::{Deserialize, Serialize};

/// Read-only per-block view of the host's musical transport
///
/// Supplied fresh by the host collaborator before each processing call; the
/// core never owns or advances it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransportSnapshot {
    /// Tempo in beats per minute
    pub bpm: f64,
    /// Host sample rate in Hz
    pub sample_rate: f64,
    /// Whether the host transport is rolling
    pub is_playing: bool,
    /// Absolute position of the buffer start in samples
    pub time_in_samples: u64,
    /// Length of the current processing buffer in samples
    pub buffer_len: u32,
}

impl Default for TransportSnapshot {
    fn default() -> Self {
        Self {
            bpm: 120.0,
            sample_rate: 44100.0,
            is_playing: false,
            time_in_samples: 0,
            buffer_len: 512,
        }
    }
}

impl TransportSnapshot {
    /// Samples per beat at the current tempo
    ///
    /// Only meaningful when the snapshot is valid; callers must check
    /// [`is_valid`](Self::is_valid) first to rule out division by zero.
    pub fn samples_per_beat(&self) -> f64 {
        self.sample_rate / (self.bpm / 60.0)
    }

    /// Whether the snapshot carries usable timing values
    pub fn is_valid(&self) -> bool {
        self.bpm > 0.0 && self.sample_rate > 0.0 && self.buffer_len > 0
    }

    /// Playing with valid timing; invalid transport counts as stopped
    pub fn is_active(&self) -> bool {
        self.is_playing && self.is_valid()
    }
}
