//! Real-time engine adapter and parameter handoff
//!
//! The host drives [`RhythmEngine::process_block`] from its audio callback;
//! everything else (UI, automation, state restore) talks to the engine
//! through a cloneable [`EngineHandle`]. Parameter changes travel over a
//! bounded channel drained with `try_recv` at the top of each block, so the
//! audio thread never waits on a lock.

use std::sync::{Arc, Mutex};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use rhythmgen_core::{MidiEvent, Sequencer, TransportSnapshot};
use thiserror::Error;
use tracing::{info, warn};

use crate::state::{EngineSnapshot, VoiceConfig};

/// Commands queued ahead of a full block are dropped rather than blocking
const COMMAND_QUEUE_CAPACITY: usize = 256;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Voice index out of range: {0}")]
    VoiceOutOfRange(usize),
    #[error("Command queue full")]
    QueueFull,
    #[error("Engine disconnected")]
    Disconnected,
}

/// A parameter change published from a non-real-time thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamCommand {
    SetEnabled { voice: usize, enabled: bool },
    SetNote { voice: usize, note: u8 },
    SetVelocity { voice: usize, velocity: u8 },
    SetChannel { voice: usize, channel: u8 },
    SetSteps { voice: usize, steps: u8 },
    SetPulses { voice: usize, pulses: u8 },
    /// Rewind every voice to the pre-roll position
    ResetCursors,
}

impl ParamCommand {
    /// Target voice index, if the command addresses one
    pub fn voice_index(&self) -> Option<usize> {
        match *self {
            Self::SetEnabled { voice, .. }
            | Self::SetNote { voice, .. }
            | Self::SetVelocity { voice, .. }
            | Self::SetChannel { voice, .. }
            | Self::SetSteps { voice, .. }
            | Self::SetPulses { voice, .. } => Some(voice),
            Self::ResetCursors => None,
        }
    }

    fn apply_to_sequencer(self, sequencer: &mut Sequencer) {
        if self == Self::ResetCursors {
            sequencer.reset_cursors();
            return;
        }
        let Some(index) = self.voice_index() else { return };
        let Ok(voice) = sequencer.voice_mut(index) else { return };
        match self {
            Self::SetEnabled { enabled, .. } => voice.enabled = enabled,
            Self::SetNote { note, .. } => voice.set_note(note),
            Self::SetVelocity { velocity, .. } => voice.velocity = velocity.min(127),
            Self::SetChannel { channel, .. } => voice.channel = channel,
            Self::SetSteps { steps, .. } => voice.set_steps(steps),
            Self::SetPulses { pulses, .. } => voice.set_pulses(pulses),
            Self::ResetCursors => {}
        }
    }

    fn apply_to_config(self, configs: &mut [VoiceConfig]) {
        let Some(index) = self.voice_index() else { return };
        let Some(config) = configs.get_mut(index) else { return };
        match self {
            Self::SetEnabled { enabled, .. } => config.enabled = enabled,
            Self::SetNote { note, .. } => config.note = note.min(127),
            Self::SetVelocity { velocity, .. } => config.velocity = velocity.min(127),
            Self::SetChannel { channel, .. } => config.channel = channel,
            Self::SetSteps { steps, .. } => config.steps = steps.clamp(1, rhythmgen_core::MAX_STEPS),
            Self::SetPulses { pulses, .. } => config.pulses = pulses.min(rhythmgen_core::MAX_STEPS),
            Self::ResetCursors => {}
        }
    }
}

/// Control-side handle: publishes parameter changes and mirrors the current
/// voice configuration for host-state capture
///
/// The mirror is only ever touched from non-real-time threads; the audio
/// thread sees changes through the command queue alone.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    commands: Sender<ParamCommand>,
    mirror: Arc<Mutex<Vec<VoiceConfig>>>,
    voice_count: usize,
}

impl EngineHandle {
    /// Publish a command to the audio thread
    ///
    /// Validates the voice index up front; a full queue drops the command
    /// and reports it instead of blocking.
    pub fn send(&self, command: ParamCommand) -> Result<(), EngineError> {
        if let Some(index) = command.voice_index() {
            if index >= self.voice_count {
                return Err(EngineError::VoiceOutOfRange(index));
            }
        }

        match self.commands.try_send(command) {
            Ok(()) => {
                if let Ok(mut configs) = self.mirror.lock() {
                    command.apply_to_config(&mut configs);
                }
                Ok(())
            }
            Err(TrySendError::Full(command)) => {
                warn!(?command, "parameter command dropped: queue full");
                Err(EngineError::QueueFull)
            }
            Err(TrySendError::Disconnected(_)) => Err(EngineError::Disconnected),
        }
    }

    pub fn set_enabled(&self, voice: usize, enabled: bool) -> Result<(), EngineError> {
        self.send(ParamCommand::SetEnabled { voice, enabled })
    }

    pub fn set_note(&self, voice: usize, note: u8) -> Result<(), EngineError> {
        self.send(ParamCommand::SetNote { voice, note })
    }

    pub fn set_velocity(&self, voice: usize, velocity: u8) -> Result<(), EngineError> {
        self.send(ParamCommand::SetVelocity { voice, velocity })
    }

    pub fn set_channel(&self, voice: usize, channel: u8) -> Result<(), EngineError> {
        self.send(ParamCommand::SetChannel { voice, channel })
    }

    pub fn set_steps(&self, voice: usize, steps: u8) -> Result<(), EngineError> {
        self.send(ParamCommand::SetSteps { voice, steps })
    }

    pub fn set_pulses(&self, voice: usize, pulses: u8) -> Result<(), EngineError> {
        self.send(ParamCommand::SetPulses { voice, pulses })
    }

    pub fn reset_cursors(&self) -> Result<(), EngineError> {
        self.send(ParamCommand::ResetCursors)
    }

    pub fn voice_count(&self) -> usize {
        self.voice_count
    }

    /// Current voice configuration, for host-side state capture
    pub fn snapshot(&self) -> EngineSnapshot {
        let voices = self
            .mirror
            .lock()
            .map(|configs| configs.clone())
            .unwrap_or_default();
        EngineSnapshot { voices }
    }
}

/// Real-time side of the rhythm generator
///
/// Owned by the host's audio callback; drains pending parameter commands and
/// steps the sequencer once per block.
pub struct RhythmEngine {
    sequencer: Sequencer,
    commands: Receiver<ParamCommand>,
}

impl RhythmEngine {
    /// Engine with `voice_count` default-configured voices
    pub fn new(voice_count: usize) -> (Self, EngineHandle) {
        Self::from_snapshot(&EngineSnapshot::with_voice_count(voice_count))
    }

    /// Engine with the stock four-voice bank
    pub fn with_default_bank() -> (Self, EngineHandle) {
        Self::from_snapshot(&EngineSnapshot {
            voices: crate::state::default_voice_configs(),
        })
    }

    /// Engine restored from a host-state snapshot
    pub fn from_snapshot(snapshot: &EngineSnapshot) -> (Self, EngineHandle) {
        let (tx, rx) = bounded(COMMAND_QUEUE_CAPACITY);

        let mut sequencer = Sequencer::new();
        for config in &snapshot.voices {
            sequencer.add_voice(config.to_voice());
        }

        let handle = EngineHandle {
            commands: tx,
            mirror: Arc::new(Mutex::new(snapshot.voices.clone())),
            voice_count: snapshot.voices.len(),
        };

        info!(voices = snapshot.voices.len(), "rhythm engine created");
        (Self { sequencer, commands: rx }, handle)
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    /// Process one audio block (audio thread)
    ///
    /// Applies pending parameter changes without blocking, then appends this
    /// block's MIDI events in voice order.
    pub fn process_block(&mut self, transport: &TransportSnapshot, events: &mut Vec<MidiEvent>) {
        while let Ok(command) = self.commands.try_recv() {
            command.apply_to_sequencer(&mut self.sequencer);
        }
        self.sequencer.process_block(transport, events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boundary_transport() -> TransportSnapshot {
        // 24000 samples per beat; boundary falls inside this buffer
        TransportSnapshot {
            bpm: 120.0,
            sample_rate: 48000.0,
            is_playing: true,
            time_in_samples: 23800,
            buffer_len: 512,
        }
    }

    #[test]
    fn commands_apply_before_the_block_is_processed() {
        let (mut engine, handle) = RhythmEngine::new(1);
        handle.set_enabled(0, true).unwrap();
        handle.set_note(0, 38).unwrap();
        handle.set_steps(0, 8).unwrap();
        handle.set_pulses(0, 8).unwrap();

        let mut events = Vec::new();
        engine.process_block(&boundary_transport(), &mut events);

        assert_eq!(events.len(), 1);
        assert!(events[0].is_note_on);
        assert_eq!(events[0].pitch, 38);

        let voice = engine.sequencer().voice(0).unwrap();
        assert!(voice.enabled);
        assert_eq!(voice.steps(), 8);
    }

    #[test]
    fn default_bank_starts_silent_with_four_voices() {
        let (mut engine, handle) = RhythmEngine::with_default_bank();
        assert_eq!(handle.voice_count(), 4);

        let mut events = Vec::new();
        engine.process_block(&boundary_transport(), &mut events);
        assert!(events.is_empty());
    }

    #[test]
    fn out_of_range_voice_is_rejected_on_the_control_side() {
        let (_engine, handle) = RhythmEngine::new(4);
        assert!(matches!(
            handle.set_enabled(4, true),
            Err(EngineError::VoiceOutOfRange(4))
        ));
    }

    #[test]
    fn full_queue_drops_instead_of_blocking() {
        let (_engine, handle) = RhythmEngine::new(1);
        for _ in 0..COMMAND_QUEUE_CAPACITY {
            handle.set_note(0, 60).unwrap();
        }
        assert!(matches!(
            handle.set_note(0, 60),
            Err(EngineError::QueueFull)
        ));
    }

    #[test]
    fn dropped_engine_disconnects_the_handle() {
        let (engine, handle) = RhythmEngine::new(1);
        drop(engine);
        assert!(matches!(
            handle.set_note(0, 60),
            Err(EngineError::Disconnected)
        ));
    }

    #[test]
    fn mirror_tracks_sent_commands() {
        let (_engine, handle) = RhythmEngine::new(2);
        handle.set_enabled(1, true).unwrap();
        handle.set_steps(1, 13).unwrap();
        handle.set_pulses(1, 5).unwrap();

        let snapshot = handle.snapshot();
        assert_eq!(snapshot.voices.len(), 2);
        assert!(!snapshot.voices[0].enabled);
        assert!(snapshot.voices[1].enabled);
        assert_eq!(snapshot.voices[1].steps, 13);
        assert_eq!(snapshot.voices[1].pulses, 5);
    }

    #[test]
    fn reset_cursors_command_rewinds_voices() {
        let (mut engine, handle) = RhythmEngine::new(1);
        handle.set_enabled(0, true).unwrap();

        let mut events = Vec::new();
        engine.process_block(&boundary_transport(), &mut events);
        assert_eq!(engine.sequencer().voice(0).unwrap().step_cursor(), 0);

        handle.reset_cursors().unwrap();
        let stopped = TransportSnapshot {
            is_playing: false,
            ..boundary_transport()
        };
        engine.process_block(&stopped, &mut events);
        assert_eq!(engine.sequencer().voice(0).unwrap().step_cursor(), -1);
    }
}
