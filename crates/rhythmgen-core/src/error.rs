//! Error types for rhythmgen

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RhythmError {
    #[error("Voice not found: {0}")]
    VoiceNotFound(usize),
}

pub type Result<T> = std::result::Result<T, RhythmError>;
