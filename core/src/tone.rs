use std::f64::consts::PI;

use crate::error::{Result, SonifyError};
use crate::CodecConfig;

/// Linear attack/decay envelope: ramps 0 -> 1 over `fade_len` samples at the start
/// and 1 -> 0 over the same length at the end.
fn linear_fade_window(len: usize, fade_len: usize) -> Vec<f64> {
    let mut window = vec![1.0; len];
    let fade = fade_len.min(len / 2);
    if fade < 2 {
        return window;
    }

    for i in 0..fade {
        let value = i as f64 / (fade - 1) as f64;
        window[i] = value;
        window[len - 1 - i] = value;
    }

    window
}

/// Generates the sample buffers for symbol tones and separators.
///
/// Tones are pure sines with a short linear fade at each end so the tone boundaries
/// do not smear energy across the decoder's frequency bins.
pub struct ToneSynthesizer {
    config: CodecConfig,
}

impl ToneSynthesizer {
    pub fn new() -> Self {
        Self {
            config: CodecConfig::default(),
        }
    }

    pub fn with_config(config: CodecConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// `duration * sample_rate` samples of a faded sine at `frequency`
    pub fn tone(&self, frequency: f64, duration: f64) -> Result<Vec<f32>> {
        if !frequency.is_finite() {
            return Err(SonifyError::NonFiniteFrequency { position: 0 });
        }
        if !(duration.is_finite() && duration > 0.0) {
            return Err(SonifyError::InvalidConfig(format!(
                "tone duration must be positive, got {}",
                duration
            )));
        }

        let sample_rate = self.config.sample_rate as f64;
        let len = (sample_rate * duration).round() as usize;
        let window = linear_fade_window(len, self.config.fade_samples());
        let angular_freq = 2.0 * PI * frequency / sample_rate;

        let samples = window
            .iter()
            .enumerate()
            .map(|(i, &weight)| ((angular_freq * i as f64).sin() * weight * self.config.amplitude) as f32)
            .collect();

        Ok(samples)
    }

    /// One symbol tone of the configured duration
    pub fn symbol_tone(&self, frequency: f64) -> Result<Vec<f32>> {
        self.tone(frequency, self.config.tone_duration)
    }

    /// Short low-amplitude tone at the reserved separator frequency
    pub fn separator(&self) -> Vec<f32> {
        let sample_rate = self.config.sample_rate as f64;
        let angular_freq = 2.0 * PI * self.config.separator_frequency / sample_rate;

        (0..self.config.separator_samples())
            .map(|i| ((angular_freq * i as f64).sin() * self.config.separator_amplitude) as f32)
            .collect()
    }
}

impl Default for ToneSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}
