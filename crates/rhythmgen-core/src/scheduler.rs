//! Transport-synchronized step scheduling

use serde::{Deserialize, Serialize};

use crate::error::{Result, RhythmError};
use crate::event::MidiEvent;
use crate::transport::TransportSnapshot;
use crate::voice::RhythmVoice;

/// Advance one voice by one processing block
///
/// Decides whether a step boundary falls inside the current buffer and, if
/// so, advances the voice's cursor and appends the step's MIDI event. At most
/// one step fires per block; buffers large enough to span several beat
/// boundaries still advance a single step, a documented precision bound of
/// the one-boundary-per-block policy.
///
/// Disabled voices and stopped or invalid transport (bpm or sample rate at or
/// below zero) are a no-op; the cursor freezes rather than silently drifting.
pub fn advance(
    voice: &mut RhythmVoice,
    transport: &TransportSnapshot,
    events: &mut Vec<MidiEvent>,
) {
    if !voice.enabled || !transport.is_active() {
        return;
    }

    let samples_per_beat = transport.samples_per_beat();
    let beat_len = samples_per_beat as u64;
    if beat_len == 0 {
        // Tempo faster than one beat per sample; nothing sensible to emit
        return;
    }

    // How far into the current beat the buffer starts
    let counter = (transport.time_in_samples % beat_len) as f64;
    if counter + f64::from(transport.buffer_len) < samples_per_beat {
        return;
    }

    let step = voice.advance_step();
    let onset = voice.pattern().is_onset(step);

    // Samples until the boundary, clamped into the buffer
    let offset = (samples_per_beat - counter).max(0.0) as u32;
    let offset = offset.min(transport.buffer_len - 1);

    if onset {
        events.push(MidiEvent::note_on(voice.note(), voice.velocity, voice.channel, offset));
    } else {
        events.push(MidiEvent::note_off(voice.note(), voice.channel, offset));
    }
}

/// Owns the rhythm voices and steps them once per audio block
///
/// Voices are processed in declaration order; each voice's state is
/// independent, so the order only matters for deterministic replay.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sequencer {
    voices: Vec<RhythmVoice>,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequencer with `count` voices sharing the default configuration
    pub fn with_voice_count(count: usize) -> Self {
        Self {
            voices: (0..count).map(|_| RhythmVoice::default()).collect(),
        }
    }

    pub fn voices(&self) -> &[RhythmVoice] {
        &self.voices
    }

    pub fn voice(&self, index: usize) -> Result<&RhythmVoice> {
        self.voices.get(index).ok_or(RhythmError::VoiceNotFound(index))
    }

    pub fn voice_mut(&mut self, index: usize) -> Result<&mut RhythmVoice> {
        self.voices.get_mut(index).ok_or(RhythmError::VoiceNotFound(index))
    }

    pub fn add_voice(&mut self, voice: RhythmVoice) {
        self.voices.push(voice);
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    /// Rewind every voice to the pre-roll position
    pub fn reset_cursors(&mut self) {
        for voice in &mut self.voices {
            voice.reset_cursor();
        }
    }

    /// Process one audio block, appending events for every voice in order
    pub fn process_block(&mut self, transport: &TransportSnapshot, events: &mut Vec<MidiEvent>) {
        for voice in &mut self.voices {
            advance(voice, transport, events);
        }
    }
}
