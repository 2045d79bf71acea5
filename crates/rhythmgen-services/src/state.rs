//! Engine state snapshots for host-side persistence
//!
//! Hosts persist voice parameters through their generic state mechanism; the
//! snapshot is the serialized form handed to them. Cursors and cached
//! patterns are runtime state and are never persisted.

use rhythmgen_core::{RhythmVoice, DEFAULT_VELOCITY};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::{EngineError, EngineHandle};

#[derive(Debug, Error)]
pub enum StateError {
    #[error("Snapshot serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
}

/// Persistable configuration of one voice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceConfig {
    pub enabled: bool,
    pub note: u8,
    pub velocity: u8,
    pub channel: u8,
    pub steps: u8,
    pub pulses: u8,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self::from(&RhythmVoice::default())
    }
}

impl From<&RhythmVoice> for VoiceConfig {
    fn from(voice: &RhythmVoice) -> Self {
        Self {
            enabled: voice.enabled,
            note: voice.note(),
            velocity: voice.velocity,
            channel: voice.channel,
            steps: voice.steps(),
            pulses: voice.pulses(),
        }
    }
}

impl VoiceConfig {
    /// Build a runtime voice from this configuration, clamping as the voice
    /// setters do
    pub fn to_voice(&self) -> RhythmVoice {
        let mut voice = RhythmVoice::new(self.note);
        voice.enabled = self.enabled;
        voice.velocity = self.velocity.min(127);
        voice.channel = self.channel;
        voice.set_steps(self.steps);
        voice.set_pulses(self.pulses);
        voice
    }
}

/// Snapshot of every voice's configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub voices: Vec<VoiceConfig>,
}

impl EngineSnapshot {
    /// Snapshot with `count` default-configured voices
    pub fn with_voice_count(count: usize) -> Self {
        Self {
            voices: vec![VoiceConfig::default(); count],
        }
    }

    pub fn to_json(&self) -> Result<String, StateError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, StateError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Push this snapshot's configuration to a running engine
    ///
    /// Routed through the command queue, so the audio thread never observes
    /// a half-applied snapshot mid-block. Voices beyond the engine's count
    /// are ignored.
    pub fn apply(&self, handle: &EngineHandle) -> Result<(), StateError> {
        for (index, config) in self.voices.iter().enumerate().take(handle.voice_count()) {
            handle.set_enabled(index, config.enabled)?;
            handle.set_note(index, config.note)?;
            handle.set_velocity(index, config.velocity)?;
            handle.set_channel(index, config.channel)?;
            handle.set_steps(index, config.steps)?;
            handle.set_pulses(index, config.pulses)?;
        }
        Ok(())
    }
}

/// Default voice bank matching the original four-rhythm layout
pub fn default_voice_configs() -> Vec<VoiceConfig> {
    (0u8..4)
        .map(|i| VoiceConfig {
            enabled: false,
            note: rhythmgen_core::note_number(3 + (i % 2), 1 + i * 3),
            velocity: DEFAULT_VELOCITY,
            channel: 0,
            steps: 16,
            pulses: 4,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RhythmEngine;
    use rhythmgen_core::TransportSnapshot;

    #[test]
    fn json_round_trip() {
        let snapshot = EngineSnapshot {
            voices: vec![
                VoiceConfig { enabled: true, note: 36, velocity: 90, channel: 0, steps: 8, pulses: 3 },
                VoiceConfig { enabled: false, note: 42, velocity: 100, channel: 1, steps: 16, pulses: 7 },
            ],
        };

        let json = snapshot.to_json().unwrap();
        let restored = EngineSnapshot::from_json(&json).unwrap();
        assert_eq!(restored, snapshot);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            EngineSnapshot::from_json("not json"),
            Err(StateError::Serde(_))
        ));
    }

    #[test]
    fn snapshot_restores_voice_configuration() {
        let snapshot = EngineSnapshot {
            voices: vec![VoiceConfig {
                enabled: true,
                note: 47,
                velocity: 80,
                channel: 2,
                steps: 12,
                pulses: 5,
            }],
        };

        let (engine, _handle) = RhythmEngine::from_snapshot(&snapshot);
        let voice = engine.sequencer().voice(0).unwrap();
        assert!(voice.enabled);
        assert_eq!(voice.note(), 47);
        assert_eq!(voice.velocity, 80);
        assert_eq!(voice.channel, 2);
        assert_eq!(voice.steps(), 12);
        assert_eq!(voice.pulses(), 5);
        // Runtime state starts fresh, not persisted
        assert_eq!(voice.step_cursor(), -1);
    }

    #[test]
    fn apply_reaches_the_audio_thread_through_the_queue() {
        let (mut engine, handle) = RhythmEngine::new(2);
        let snapshot = EngineSnapshot {
            voices: vec![
                VoiceConfig { enabled: true, note: 36, velocity: 100, channel: 0, steps: 8, pulses: 8 },
                VoiceConfig { enabled: true, note: 72, velocity: 100, channel: 0, steps: 8, pulses: 8 },
            ],
        };
        snapshot.apply(&handle).unwrap();

        let transport = TransportSnapshot {
            bpm: 120.0,
            sample_rate: 48000.0,
            is_playing: true,
            time_in_samples: 23800,
            buffer_len: 512,
        };
        let mut events = Vec::new();
        engine.process_block(&transport, &mut events);

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].pitch, 36);
        assert_eq!(events[1].pitch, 72);
        assert_eq!(handle.snapshot(), snapshot);
    }

    #[test]
    fn oversized_snapshot_ignores_extra_voices() {
        let (_engine, handle) = RhythmEngine::new(1);
        let snapshot = EngineSnapshot::with_voice_count(3);
        snapshot.apply(&handle).unwrap();
        assert_eq!(handle.snapshot().voices.len(), 1);
    }

    #[test]
    fn default_bank_has_four_distinct_voices() {
        let configs = default_voice_configs();
        assert_eq!(configs.len(), 4);
        let notes: Vec<u8> = configs.iter().map(|c| c.note).collect();
        let mut deduped = notes.clone();
        deduped.dedup();
        assert_eq!(notes, deduped);
        assert!(configs.iter().all(|c| !c.enabled));
    }
}
