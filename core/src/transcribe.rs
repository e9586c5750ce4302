//! Seam for an external speech-to-text service
//!
//! The codec never calls a transcriber. Hosts plug one in to offer best-effort
//! transcripts of arbitrary audio next to the sonification round trip.

use serde::Serialize;

/// Outcome of a transcription attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Transcription {
    Text(String),
    /// No transcript could be produced; carries a human-readable reason
    Unavailable(String),
}

impl Transcription {
    pub fn text(&self) -> Option<&str> {
        match self {
            Transcription::Text(text) => Some(text),
            Transcription::Unavailable(_) => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Transcription::Text(_))
    }
}

pub trait Transcriber: Send + Sync {
    /// Best-effort transcript of a mono buffer. Failures are reported as
    /// [`Transcription::Unavailable`], never as errors.
    fn transcribe(&self, samples: &[f32], sample_rate: u32) -> Transcription;
}

/// Transcriber used when no speech-to-text backend is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableTranscriber;

impl Transcriber for UnavailableTranscriber {
    fn transcribe(&self, _samples: &[f32], _sample_rate: u32) -> Transcription {
        Transcription::Unavailable("no transcription backend configured".into())
    }
}
