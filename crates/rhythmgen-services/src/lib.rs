//! rhythmgen-services: host adapter, parameter handoff, and mutation policy
//!
//! The collaborators around the rhythmgen core: the real-time engine a host
//! audio callback drives, the lock-free parameter handoff between control
//! and audio threads, the optional randomized voice-mutation policy, and
//! host-state snapshots.

pub mod engine;
pub mod mutate;
pub mod state;

pub use engine::{EngineError, EngineHandle, ParamCommand, RhythmEngine};
pub use mutate::MutatePolicy;
pub use state::{default_voice_configs, EngineSnapshot, StateError, VoiceConfig};
