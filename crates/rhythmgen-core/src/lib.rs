//! rhythmgen-core: Euclidean rhythm generation and transport-synced step sequencing
//!
//! The core is two coupled pieces: a deterministic Euclidean pattern
//! generator ([`euclidean`]) and a per-block [`Sequencer`] that maps host
//! transport time onto pattern-step boundaries, emitting sample-accurate
//! MIDI events. It runs on the host's real-time audio thread and never
//! blocks, locks, or allocates unboundedly.

mod error;
mod event;
mod pattern;
mod scheduler;
mod transport;
mod voice;

pub use error::{Result, RhythmError};
pub use event::MidiEvent;
pub use pattern::{euclidean, Pattern};
pub use scheduler::{advance, Sequencer};
pub use transport::TransportSnapshot;
pub use voice::{note_number, RhythmVoice, DEFAULT_VELOCITY, MAX_STEPS};
