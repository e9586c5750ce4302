//! Sonification codec: turns text characters and image intensities into tone
//! sequences and recovers them from the resulting waveform.
//!
//! Each symbol becomes one pure tone whose frequency is an affine function of the
//! symbol's ordinal. Tones are separated by a short low-frequency separator and
//! recovered by FFT peak picking. The frequency band is chosen per payload by a
//! rule-based content analyzer and range optimizer.

pub mod error;
pub mod range;
pub mod profile;
pub mod mapping;
pub mod tone;
pub mod encoder;
pub mod spectrum;
pub mod decoder;
pub mod analyzer;
pub mod optimizer;
pub mod raster;
pub mod pcm;
pub mod visualize;
pub mod transcribe;

pub use analyzer::{ContentAnalysis, ContentAnalyzer, ContentFeatures, FallbackReason};
pub use decoder::{DecodedSymbol, Decoder};
pub use encoder::Encoder;
pub use error::{Result, SonifyError};
pub use mapping::FrequencyMap;
pub use optimizer::{OptimizerConfig, RangeOptimizer, Recommendation};
pub use profile::ContentProfile;
pub use range::FrequencyRange;
pub use raster::{IntensityGrid, Raster, RasterMap};
pub use tone::ToneSynthesizer;
pub use transcribe::{Transcriber, Transcription, UnavailableTranscriber};
pub use visualize::{visualize, VisualizationData};

// Audio configuration
pub const SAMPLE_RATE: u32 = 44100;
pub const TONE_DURATION_SECS: f64 = 0.1;
pub const FADE_DURATION_SECS: f64 = 0.005;
pub const TONE_AMPLITUDE: f64 = 0.7;

// Separator configuration
pub const SEPARATOR_FREQUENCY: f64 = 100.0; // Hz, below the noise floor so it never collides with a symbol
pub const SEPARATOR_DURATION_SECS: f64 = 0.02;
pub const SEPARATOR_AMPLITUDE: f64 = 0.3;

/// Peak amplitude of a finished encode, as a fraction of full scale
pub const OUTPUT_PEAK: f64 = 0.8;

/// Minimum peak height relative to the chunk maximum.
///
/// 0.5 is enough for clean input; 0.3 still finds the symbol tone when the
/// separator bleeds into a chunk.
pub const PEAK_THRESHOLD: f64 = 0.3;

// Frequency range limits
pub const NOISE_FLOOR: f64 = 200.0; // Hz
pub const HARD_CEILING: f64 = 8000.0; // Hz
pub const MIN_BANDWIDTH: f64 = 500.0; // Hz

// Symbol domains
pub const TEXT_ORDINAL_MIN: u32 = 32;
pub const TEXT_ORDINAL_MAX: u32 = 126;
pub const INTENSITY_MAX: u8 = 255;

/// Largest raster edge encoded before downsampling
pub const RASTER_MAX_DIMENSION: usize = 100;

/// Placeholder shown for chunks that could not be decoded
pub const UNKNOWN_SYMBOL: char = '?';

/// Timing and amplitude parameters shared by the encoder and decoder.
///
/// Both sides of a round trip must use the same configuration: the decoder derives
/// its chunk and slot lengths from the tone and separator durations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CodecConfig {
    pub sample_rate: u32,
    pub tone_duration: f64,
    pub fade_duration: f64,
    pub amplitude: f64,
    pub separator_frequency: f64,
    pub separator_duration: f64,
    pub separator_amplitude: f64,
    pub output_peak: f64,
    pub peak_threshold: f64,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            sample_rate: SAMPLE_RATE,
            tone_duration: TONE_DURATION_SECS,
            fade_duration: FADE_DURATION_SECS,
            amplitude: TONE_AMPLITUDE,
            separator_frequency: SEPARATOR_FREQUENCY,
            separator_duration: SEPARATOR_DURATION_SECS,
            separator_amplitude: SEPARATOR_AMPLITUDE,
            output_peak: OUTPUT_PEAK,
            peak_threshold: PEAK_THRESHOLD,
        }
    }
}

impl CodecConfig {
    /// Config identical to the default except for the sample rate
    pub fn with_sample_rate(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(SonifyError::InvalidConfig("sample rate must be positive".into()));
        }
        if !(self.tone_duration.is_finite() && self.tone_duration > 0.0) {
            return Err(SonifyError::InvalidConfig(format!(
                "tone duration must be positive, got {}",
                self.tone_duration
            )));
        }
        if !(self.separator_duration.is_finite() && self.separator_duration >= 0.0) {
            return Err(SonifyError::InvalidConfig(format!(
                "separator duration must not be negative, got {}",
                self.separator_duration
            )));
        }
        if !(self.fade_duration >= 0.0 && self.fade_duration * 2.0 <= self.tone_duration) {
            return Err(SonifyError::InvalidConfig(format!(
                "fade of {}s does not fit in a {}s tone",
                self.fade_duration, self.tone_duration
            )));
        }
        if !(self.amplitude > 0.0 && self.amplitude < 1.0) {
            return Err(SonifyError::InvalidConfig(format!(
                "tone amplitude must be in (0, 1), got {}",
                self.amplitude
            )));
        }
        if !(self.output_peak > 0.0 && self.output_peak <= 1.0) {
            return Err(SonifyError::InvalidConfig(format!(
                "output peak must be in (0, 1], got {}",
                self.output_peak
            )));
        }
        if !(self.peak_threshold > 0.0 && self.peak_threshold < 1.0) {
            return Err(SonifyError::InvalidConfig(format!(
                "peak threshold must be in (0, 1), got {}",
                self.peak_threshold
            )));
        }
        Ok(())
    }

    /// Samples in one symbol tone (also the decoder's chunk length)
    pub fn tone_samples(&self) -> usize {
        (self.sample_rate as f64 * self.tone_duration).round() as usize
    }

    pub fn separator_samples(&self) -> usize {
        (self.sample_rate as f64 * self.separator_duration).round() as usize
    }

    pub fn fade_samples(&self) -> usize {
        (self.sample_rate as f64 * self.fade_duration).round() as usize
    }

    /// Distance between the starts of two consecutive symbol tones
    pub fn slot_samples(&self) -> usize {
        self.tone_samples() + self.separator_samples()
    }
}
