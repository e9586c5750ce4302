//! Plot-ready waveform and spectrum traces for an audio buffer

use log::debug;
use realfft::RealFftPlanner;
use serde::Serialize;

use crate::error::{Result, SonifyError};

/// Upper bound on points per trace
pub const MAX_PLOT_POINTS: usize = 2000;

/// Highest frequency included in the spectrum trace (Hz)
pub const SPECTRUM_LIMIT_HZ: f64 = 5000.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Waveform {
    pub time: Vec<f64>,
    pub amplitude: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Spectrum {
    pub frequency: Vec<f64>,
    pub magnitude: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualizationData {
    pub waveform: Waveform,
    pub spectrum: Spectrum,
    pub sample_rate: u32,
    /// Seconds
    pub duration: f64,
}

/// Stride that keeps `len` points at or under [`MAX_PLOT_POINTS`]
fn decimation_step(len: usize) -> usize {
    if len > MAX_PLOT_POINTS {
        len.div_ceil(MAX_PLOT_POINTS)
    } else {
        1
    }
}

/// Build waveform and spectrum traces for a mono buffer.
///
/// The spectrum is taken over the whole buffer before decimation, so its resolution
/// is `sample_rate / samples.len()`; both traces are then thinned by striding.
pub fn visualize(samples: &[f32], sample_rate: u32) -> Result<VisualizationData> {
    if sample_rate == 0 {
        return Err(SonifyError::InvalidConfig("sample rate must be positive".into()));
    }
    let rate = sample_rate as f64;
    let duration = samples.len() as f64 / rate;

    let step = decimation_step(samples.len());
    let waveform = Waveform {
        time: (0..samples.len()).step_by(step).map(|i| i as f64 / rate).collect(),
        amplitude: samples.iter().step_by(step).copied().collect(),
    };

    let spectrum = if samples.is_empty() {
        Spectrum {
            frequency: Vec::new(),
            magnitude: Vec::new(),
        }
    } else {
        spectrum(samples, rate)?
    };

    debug!(
        "Visualization: {} waveform points, {} spectrum points over {:.2}s",
        waveform.time.len(),
        spectrum.frequency.len(),
        duration
    );

    Ok(VisualizationData {
        waveform,
        spectrum,
        sample_rate,
        duration,
    })
}

fn spectrum(samples: &[f32], rate: f64) -> Result<Spectrum> {
    let mut planner = RealFftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(samples.len());

    let mut input: Vec<f64> = samples.iter().map(|&s| s as f64).collect();
    let mut output = fft.make_output_vec();
    fft.process(&mut input, &mut output)
        .map_err(|e| SonifyError::FftError(format!("spectrum FFT failed: {:?}", e)))?;

    let bin_width = rate / samples.len() as f64;
    let visible = output
        .iter()
        .enumerate()
        .map(|(bin, c)| (bin as f64 * bin_width, c.norm()))
        .take_while(|&(freq, _)| freq <= SPECTRUM_LIMIT_HZ)
        .collect::<Vec<_>>();

    let step = decimation_step(visible.len());
    let (frequency, magnitude) = visible.into_iter().step_by(step).unzip();
    Ok(Spectrum { frequency, magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sine(freq: f64, len: usize, rate: f64) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f64 / rate).sin() as f32)
            .collect()
    }

    #[test]
    fn test_short_buffer_kept_whole() {
        let samples = sine(1000.0, 441, 44100.0);
        let data = visualize(&samples, 44100).unwrap();
        assert_eq!(data.waveform.amplitude.len(), 441);
        assert_eq!(data.waveform.time[1], 1.0 / 44100.0);
        assert!((data.duration - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_long_buffer_is_decimated() {
        let samples = sine(1000.0, 44100, 44100.0);
        let data = visualize(&samples, 44100).unwrap();
        assert!(data.waveform.amplitude.len() <= MAX_PLOT_POINTS);
        assert_eq!(data.waveform.time.len(), data.waveform.amplitude.len());
        assert!(data.spectrum.frequency.len() <= MAX_PLOT_POINTS);
        assert_eq!(data.spectrum.frequency.len(), data.spectrum.magnitude.len());
    }

    #[test]
    fn test_spectrum_limited_and_peaks_at_tone() {
        let samples = sine(1000.0, 4410, 44100.0);
        let data = visualize(&samples, 44100).unwrap();
        let spectrum = &data.spectrum;

        assert!(spectrum.frequency.iter().all(|&f| f <= SPECTRUM_LIMIT_HZ));
        // 10 Hz bins up to 5000 Hz inclusive
        assert_eq!(spectrum.frequency.len(), 501);

        let peak = spectrum
            .magnitude
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| spectrum.frequency[i])
            .unwrap();
        assert!((peak - 1000.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_buffer() {
        let data = visualize(&[], 44100).unwrap();
        assert!(data.waveform.time.is_empty());
        assert!(data.spectrum.magnitude.is_empty());
        assert_eq!(data.duration, 0.0);
    }

    #[test]
    fn test_zero_sample_rate_rejected() {
        assert!(visualize(&[0.0; 16], 0).is_err());
    }

    #[test]
    fn test_serializes_to_json() {
        let data = visualize(&sine(500.0, 100, 8000.0), 8000).unwrap();
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["sample_rate"], 8000);
        assert!(json["waveform"]["amplitude"].is_array());
        assert!(json["spectrum"]["frequency"].is_array());
    }
}
