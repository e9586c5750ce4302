//! Sample buffer conversions between the codec's float samples and 16-bit PCM

/// Extract the first channel of an interleaved buffer
///
/// # Arguments
/// * `samples` - Interleaved audio samples [C0, C1, ..., C0, C1, ...]
/// * `channels` - Number of interleaved channels (0 and 1 both mean mono)
///
/// # Returns
/// Samples of channel 0. A trailing incomplete frame is ignored.
pub fn first_channel(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }

    samples
        .chunks_exact(channels)
        .map(|frame| frame[0])
        .collect()
}

/// Convert float samples in [-1.0, 1.0] to 16-bit signed PCM, clamping overflow
pub fn to_pcm16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16)
        .collect()
}

/// Convert 16-bit signed PCM to float samples in [-1.0, 1.0)
pub fn from_pcm16(samples: &[i16]) -> Vec<f32> {
    samples.iter().map(|&s| s as f32 / 32768.0).collect()
}
