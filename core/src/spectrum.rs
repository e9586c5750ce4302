//! Per-chunk spectral analysis for the decoder
//!
//! A chunk's magnitude spectrum is computed with a real-input FFT and only the
//! non-negative frequency bins are kept. Peaks are local maxima whose height is at
//! least a fraction of the chunk's largest magnitude. The strongest peak is then
//! refined below bin resolution with a Goertzel scan, because at 100 ms chunks the
//! FFT bins are 10 Hz apart while adjacent symbols in a narrow band can be only a
//! few Hz apart.

use std::f64::consts::PI;
use std::sync::Arc;

use realfft::{RealFftPlanner, RealToComplex};

use crate::error::{Result, SonifyError};

/// Refinement scans +/- this many bins around the FFT peak
const REFINE_SPAN_BINS: f64 = 1.0;

/// Refinement grid step, as a fraction of one FFT bin
const REFINE_STEP_BINS: f64 = 0.01;

/// Chunk magnitudes below this are treated as silence
const SILENCE_FLOOR: f64 = 1e-9;

/// FFT plan for one chunk length, reused across all chunks of a decode
pub struct SpectrumAnalyzer {
    fft: Arc<dyn RealToComplex<f64>>,
    len: usize,
    sample_rate: f64,
}

impl SpectrumAnalyzer {
    pub fn new(len: usize, sample_rate: u32) -> Self {
        let mut planner = RealFftPlanner::<f64>::new();
        Self {
            fft: planner.plan_fft_forward(len),
            len,
            sample_rate: sample_rate as f64,
        }
    }

    /// Frequency spacing between adjacent FFT bins
    pub fn bin_width(&self) -> f64 {
        self.sample_rate / self.len as f64
    }

    /// Magnitudes of bins 0..=len/2. Shorter chunks are zero-padded.
    pub fn magnitude_spectrum(&self, chunk: &[f32]) -> Result<Vec<f64>> {
        let mut input = self.fft.make_input_vec();
        for (slot, &sample) in input.iter_mut().zip(chunk.iter()) {
            *slot = sample as f64;
        }
        let mut output = self.fft.make_output_vec();

        self.fft
            .process(&mut input, &mut output)
            .map_err(|e| SonifyError::FftError(format!("forward FFT failed: {:?}", e)))?;

        Ok(output.iter().map(|c| c.norm()).collect())
    }

    /// Dominant frequency of `chunk`, or `None` when no peak clears the threshold
    pub fn dominant_frequency(&self, chunk: &[f32], threshold_ratio: f64) -> Result<Option<f64>> {
        let magnitudes = self.magnitude_spectrum(chunk)?;
        let peaks = find_peaks(&magnitudes, threshold_ratio);

        let strongest = peaks
            .into_iter()
            .max_by(|&a, &b| magnitudes[a].total_cmp(&magnitudes[b]));

        Ok(strongest.map(|bin| self.refine_peak(chunk, bin)))
    }

    /// Locate the maximum of the DTFT magnitude within one bin of `bin`
    fn refine_peak(&self, chunk: &[f32], bin: usize) -> f64 {
        let bin_width = self.bin_width();
        let steps = (2.0 * REFINE_SPAN_BINS / REFINE_STEP_BINS).round() as usize;

        let mut best_freq = bin as f64 * bin_width;
        let mut best_power = goertzel_power(chunk, best_freq, self.sample_rate);

        for step in 0..=steps {
            let offset = -REFINE_SPAN_BINS + step as f64 * REFINE_STEP_BINS;
            let freq = (bin as f64 + offset) * bin_width;
            if freq <= 0.0 {
                continue;
            }
            let power = goertzel_power(chunk, freq, self.sample_rate);
            if power > best_power {
                best_power = power;
                best_freq = freq;
            }
        }

        best_freq
    }
}

/// Indices of local maxima whose height is at least `threshold_ratio` of the
/// spectrum maximum. The first and last bins are never peaks.
pub fn find_peaks(magnitudes: &[f64], threshold_ratio: f64) -> Vec<usize> {
    let max = magnitudes.iter().copied().fold(0.0f64, f64::max);
    if max <= SILENCE_FLOOR || magnitudes.len() < 3 {
        return Vec::new();
    }

    let height = max * threshold_ratio;
    (1..magnitudes.len() - 1)
        .filter(|&i| {
            let value = magnitudes[i];
            value >= height && value > magnitudes[i - 1] && value >= magnitudes[i + 1]
        })
        .collect()
}

/// Signal power at an arbitrary (not necessarily bin-centered) frequency
pub fn goertzel_power(samples: &[f32], freq: f64, sample_rate: f64) -> f64 {
    let omega = 2.0 * PI * freq / sample_rate;
    let coeff = 2.0 * omega.cos();

    let mut q1 = 0.0;
    let mut q2 = 0.0;
    for &sample in samples {
        let q0 = coeff * q1 - q2 + sample as f64;
        q2 = q1;
        q1 = q0;
    }

    q1 * q1 + q2 * q2 - coeff * q1 * q2
}
