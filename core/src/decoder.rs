use std::fmt;

use log::{debug, warn};

use crate::error::Result;
use crate::mapping::frequency_to_symbol;
use crate::pcm::first_channel;
use crate::range::FrequencyRange;
use crate::spectrum::SpectrumAnalyzer;
use crate::{CodecConfig, NOISE_FLOOR, UNKNOWN_SYMBOL};

/// One decoded chunk: a recovered character or the ambiguous marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodedSymbol {
    Symbol(char),
    /// No spectral peak cleared the threshold (silence, noise or separator only)
    Ambiguous,
}

impl DecodedSymbol {
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, DecodedSymbol::Ambiguous)
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            DecodedSymbol::Symbol(ch) => Some(*ch),
            DecodedSymbol::Ambiguous => None,
        }
    }
}

impl fmt::Display for DecodedSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedSymbol::Symbol(ch) => write!(f, "{}", ch),
            DecodedSymbol::Ambiguous => write!(f, "{}", UNKNOWN_SYMBOL),
        }
    }
}

/// Render a decoded sequence as text, ambiguous chunks shown as `?`
pub fn symbols_to_string(symbols: &[DecodedSymbol]) -> String {
    symbols.iter().map(|s| s.to_string()).collect()
}

/// Offline single-pass decoder for buffers produced by [`crate::Encoder`].
///
/// The buffer is walked one slot (tone + separator) at a time. At each slot start
/// a tone-length chunk is analysed on its own; no decision is revisited once made.
pub struct Decoder {
    config: CodecConfig,
}

impl Decoder {
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

    /// Decode a mono buffer into characters.
    ///
    /// Only configuration errors (e.g. a zero sample rate) fail the call; chunks
    /// without a usable peak become [`DecodedSymbol::Ambiguous`].
    pub fn decode_sequence(
        &self,
        samples: &[f32],
        sample_rate: u32,
        range: &FrequencyRange,
    ) -> Result<Vec<DecodedSymbol>> {
        let symbols: Vec<DecodedSymbol> = self
            .decode_frequencies(samples, sample_rate)?
            .into_iter()
            .map(|freq| match freq {
                Some(freq) => DecodedSymbol::Symbol(frequency_to_symbol(freq, range)),
                None => DecodedSymbol::Ambiguous,
            })
            .collect();

        let ambiguous = symbols.iter().filter(|s| s.is_ambiguous()).count();
        if ambiguous > 0 {
            warn!("{} of {} chunks had no clear tone", ambiguous, symbols.len());
        }
        Ok(symbols)
    }

    /// Decode an interleaved multi-channel buffer using its first channel only
    pub fn decode_interleaved(
        &self,
        samples: &[f32],
        channels: usize,
        sample_rate: u32,
        range: &FrequencyRange,
    ) -> Result<Vec<DecodedSymbol>> {
        let mono = first_channel(samples, channels);
        self.decode_sequence(&mono, sample_rate, range)
    }

    /// Dominant frequency of every chunk. `None` where no peak cleared the threshold
    /// or the peak is the separator tone or lies below the noise floor.
    pub fn decode_frequencies(&self, samples: &[f32], sample_rate: u32) -> Result<Vec<Option<f64>>> {
        let config = CodecConfig {
            sample_rate,
            ..self.config
        };
        config.validate()?;

        let chunk_len = config.tone_samples();
        let slot_len = config.slot_samples();
        if chunk_len == 0 || samples.len() < chunk_len {
            debug!("Buffer of {} samples is shorter than one chunk", samples.len());
            return Ok(Vec::new());
        }

        let analyzer = SpectrumAnalyzer::new(chunk_len, sample_rate);
        let mut frequencies = Vec::new();
        let mut start = 0;

        while start < samples.len() {
            let end = (start + chunk_len).min(samples.len());
            let chunk = &samples[start..end];
            if chunk.len() < chunk_len / 2 {
                // Trailing silence, not a symbol
                break;
            }

            let freq = analyzer
                .dominant_frequency(chunk, config.peak_threshold)?
                .filter(|&f| is_symbol_frequency(f, &config, analyzer.bin_width()));
            if freq.is_none() {
                debug!("Chunk {} at sample {} is ambiguous", frequencies.len(), start);
            }
            frequencies.push(freq);
            start += slot_len;
        }

        debug!(
            "Analysed {} chunks of {} samples at {} Hz",
            frequencies.len(),
            chunk_len,
            sample_rate
        );
        Ok(frequencies)
    }
}

/// A peak at the separator tone or below the noise floor carries no symbol.
/// The floor allows one bin of estimation error for tones right at 200 Hz.
fn is_symbol_frequency(freq: f64, config: &CodecConfig, bin_width: f64) -> bool {
    freq >= NOISE_FLOOR - bin_width && (freq - config.separator_frequency).abs() > bin_width
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Encoder, SEPARATOR_FREQUENCY};

    fn range() -> FrequencyRange {
        FrequencyRange::new(800.0, 3000.0).unwrap()
    }

    #[test]
    fn test_round_trip_short_text() {
        let samples = Encoder::new().encode_text("AI", &range()).unwrap();
        let decoded = Decoder::new().decode_sequence(&samples, 44100, &range()).unwrap();
        assert_eq!(
            decoded,
            vec![DecodedSymbol::Symbol('A'), DecodedSymbol::Symbol('I')]
        );
    }

    #[test]
    fn test_silence_chunk_is_ambiguous() {
        let silence = vec![0.0f32; 4410];
        let decoded = Decoder::new().decode_sequence(&silence, 44100, &range()).unwrap();
        assert_eq!(decoded, vec![DecodedSymbol::Ambiguous]);
    }

    #[test]
    fn test_separator_only_chunk_is_ambiguous() {
        let synth = crate::ToneSynthesizer::new();
        let separator = synth.tone(SEPARATOR_FREQUENCY, 0.1).unwrap();
        let decoded = Decoder::new().decode_sequence(&separator, 44100, &range()).unwrap();
        assert_eq!(decoded, vec![DecodedSymbol::Ambiguous]);

        // below the noise floor but away from the separator
        let rumble = synth.tone(150.0, 0.1).unwrap();
        let decoded = Decoder::new().decode_sequence(&rumble, 44100, &range()).unwrap();
        assert_eq!(decoded, vec![DecodedSymbol::Ambiguous]);
    }

    #[test]
    fn test_band_edge_symbol_at_noise_floor() {
        let floor = FrequencyRange::new(200.0, 700.0).unwrap();
        let samples = Encoder::new().encode_text(" ~ ", &floor).unwrap();
        let decoded = Decoder::new().decode_sequence(&samples, 44100, &floor).unwrap();
        assert_eq!(symbols_to_string(&decoded), " ~ ");
    }

    #[test]
    fn test_short_buffer_decodes_to_nothing() {
        let decoded = Decoder::new()
            .decode_sequence(&vec![0.1f32; 4000], 44100, &range())
            .unwrap();
        assert!(decoded.is_empty());
        let decoded = Decoder::new().decode_sequence(&[], 44100, &range()).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_ambiguous_chunk_does_not_stop_decode() {
        let encoder = Encoder::new();
        let mut samples = encoder.encode_text("abc", &range()).unwrap();
        // Silence the middle tone
        let slot = encoder.config().slot_samples();
        let tone = encoder.config().tone_samples();
        for sample in &mut samples[slot..slot + tone] {
            *sample = 0.0;
        }
        let decoded = Decoder::new().decode_sequence(&samples, 44100, &range()).unwrap();
        assert_eq!(symbols_to_string(&decoded), "a?c");
        assert!(decoded[1].is_ambiguous());
        assert_eq!(decoded[2].as_char(), Some('c'));
    }

    #[test]
    fn test_trailing_partial_chunk_dropped() {
        let encoder = Encoder::new();
        let mut samples = encoder.encode_text("xy", &range()).unwrap();
        // separator plus less than half a chunk of silence
        samples.extend(std::iter::repeat(0.0).take(882 + 2000));
        let decoded = Decoder::new().decode_sequence(&samples, 44100, &range()).unwrap();
        assert_eq!(symbols_to_string(&decoded), "xy");

        // separator plus more than half a chunk of silence becomes a sentinel
        samples.extend(std::iter::repeat(0.0).take(500));
        let decoded = Decoder::new().decode_sequence(&samples, 44100, &range()).unwrap();
        assert_eq!(symbols_to_string(&decoded), "xy?");
    }

    #[test]
    fn test_stereo_uses_first_channel() {
        let mono = Encoder::new().encode_text("Hi", &range()).unwrap();
        let mut interleaved = Vec::with_capacity(mono.len() * 2);
        for &sample in &mono {
            interleaved.push(sample);
            interleaved.push(0.0);
        }
        let decoded = Decoder::new()
            .decode_interleaved(&interleaved, 2, 44100, &range())
            .unwrap();
        assert_eq!(symbols_to_string(&decoded), "Hi");
    }

    #[test]
    fn test_zero_sample_rate_is_an_error() {
        assert!(Decoder::new().decode_sequence(&[0.0; 10], 0, &range()).is_err());
    }

    #[test]
    fn test_other_sample_rate() {
        let config = CodecConfig::with_sample_rate(16000);
        let samples = Encoder::with_config(config).unwrap().encode_text("rate", &range()).unwrap();
        let decoded = Decoder::new().decode_sequence(&samples, 16000, &range()).unwrap();
        assert_eq!(symbols_to_string(&decoded), "rate");
    }

    #[test]
    fn test_display() {
        assert_eq!(DecodedSymbol::Symbol('z').to_string(), "z");
        assert_eq!(DecodedSymbol::Ambiguous.to_string(), "?");
    }
}
