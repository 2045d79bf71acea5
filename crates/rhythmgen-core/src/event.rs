//! MIDI event output type

/// A MIDI event emitted into the host's outgoing event buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidiEvent {
    pub pitch: u8,
    pub velocity: u8,
    pub channel: u8,
    /// Offset within the current buffer, in samples
    pub sample_offset: u32,
    pub is_note_on: bool,
}

impl MidiEvent {
    pub fn note_on(pitch: u8, velocity: u8, channel: u8, sample_offset: u32) -> Self {
        Self { pitch, velocity, channel, sample_offset, is_note_on: true }
    }

    pub fn note_off(pitch: u8, channel: u8, sample_offset: u32) -> Self {
        Self { pitch, velocity: 0, channel, sample_offset, is_note_on: false }
    }
}
