use log::debug;

use crate::error::{Result, SonifyError};
use crate::mapping::{validate_symbol, FrequencyMap};
use crate::range::FrequencyRange;
use crate::tone::ToneSynthesizer;
use crate::CodecConfig;

/// Encoder producing a tone sequence from text or a raw frequency list
///
/// Output layout: tone, separator, tone, separator, ..., tone. There is no
/// separator after the last tone. The finished buffer is scaled so its peak sits at
/// the configured output level.
pub struct Encoder {
    synth: ToneSynthesizer,
}

impl Encoder {
    pub fn new() -> Self {
        Self {
            synth: ToneSynthesizer::new(),
        }
    }

    pub fn with_config(config: CodecConfig) -> Result<Self> {
        Ok(Self {
            synth: ToneSynthesizer::with_config(config)?,
        })
    }

    pub fn config(&self) -> &CodecConfig {
        self.synth.config()
    }

    /// Encode printable ASCII text.
    ///
    /// Fails without producing any audio if the text is empty, the range is invalid
    /// or any character lies outside 32..=126.
    pub fn encode_text(&self, text: &str, range: &FrequencyRange) -> Result<Vec<f32>> {
        if text.is_empty() {
            return Err(SonifyError::EmptyInput);
        }
        range.validate()?;

        let map = FrequencyMap::text(range);
        let frequencies = text
            .chars()
            .enumerate()
            .map(|(position, ch)| validate_symbol(ch, position).map(|o| map.to_frequency(o as f64)))
            .collect::<Result<Vec<f64>>>()?;

        debug!(
            "Encoding {} characters into {:.0}-{:.0} Hz",
            frequencies.len(),
            range.min,
            range.max
        );
        self.encode_frequencies(&frequencies)
    }

    /// Encode an arbitrary frequency sequence, one tone per entry
    pub fn encode_frequencies(&self, frequencies: &[f64]) -> Result<Vec<f32>> {
        if frequencies.is_empty() {
            return Err(SonifyError::EmptyInput);
        }

        let nyquist = self.config().sample_rate as f64 / 2.0;
        for (position, &freq) in frequencies.iter().enumerate() {
            if !freq.is_finite() {
                return Err(SonifyError::NonFiniteFrequency { position });
            }
            if freq <= 0.0 || freq >= nyquist {
                return Err(SonifyError::InvalidRange(format!(
                    "frequency {} Hz at position {} is outside (0, {}) Hz",
                    freq, position, nyquist
                )));
            }
        }

        let separator = self.synth.separator();
        let slot = self.config().slot_samples();
        let mut samples = Vec::with_capacity(slot * frequencies.len());

        for (i, &freq) in frequencies.iter().enumerate() {
            if i > 0 {
                samples.extend_from_slice(&separator);
            }
            let tone = self.synth.symbol_tone(freq)?;
            samples.extend_from_slice(&tone);
        }

        normalize_peak(&mut samples, self.config().output_peak as f32);

        debug!(
            "Encoded {} tones into {} samples ({:.2}s)",
            frequencies.len(),
            samples.len(),
            samples.len() as f64 / self.config().sample_rate as f64
        );
        Ok(samples)
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Scale `samples` so the largest magnitude equals `target`. Silence is left as is.
pub fn normalize_peak(samples: &mut [f32], target: f32) {
    let peak = samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
    if peak <= 0.0 {
        return;
    }

    let gain = target / peak;
    for sample in samples.iter_mut() {
        *sample *= gain;
    }
}
