use crate::error::{Result, SonifyError};
use crate::range::FrequencyRange;
use crate::{INTENSITY_MAX, TEXT_ORDINAL_MAX, TEXT_ORDINAL_MIN};

/// Affine map between a symbol domain and a frequency band.
///
/// Forward: `freq = range_min + (ordinal - domain_min) / (domain_max - domain_min) * (range_max - range_min)`.
/// The inverse rounds to the nearest ordinal and clamps it into the domain, so any
/// frequency produced by the forward direction maps back to the same ordinal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyMap {
    domain_min: f64,
    domain_max: f64,
    range_min: f64,
    range_max: f64,
}

impl FrequencyMap {
    pub fn new(domain_min: f64, domain_max: f64, range: &FrequencyRange) -> Self {
        Self {
            domain_min,
            domain_max,
            range_min: range.min,
            range_max: range.max,
        }
    }

    /// Printable character codes 32..=126
    pub fn text(range: &FrequencyRange) -> Self {
        Self::new(TEXT_ORDINAL_MIN as f64, TEXT_ORDINAL_MAX as f64, range)
    }

    /// Pixel intensities 0..=255
    pub fn intensity(range: &FrequencyRange) -> Self {
        Self::new(0.0, INTENSITY_MAX as f64, range)
    }

    /// Band frequency for `ordinal`; never leaves `[range_min, range_max]`
    pub fn to_frequency(&self, ordinal: f64) -> f64 {
        let normalized = (ordinal - self.domain_min) / (self.domain_max - self.domain_min);
        // Exact at both ends; interior points can still round one ulp past an edge
        let freq = (1.0 - normalized) * self.range_min + normalized * self.range_max;
        freq.max(self.range_min.min(self.range_max))
            .min(self.range_max.max(self.range_min))
    }

    /// Nearest ordinal for `freq`, clamped into the domain
    pub fn to_ordinal(&self, freq: f64) -> u32 {
        if !freq.is_finite() {
            return self.domain_min as u32;
        }
        let normalized = (freq - self.range_min) / (self.range_max - self.range_min);
        let ordinal = self.domain_min + normalized * (self.domain_max - self.domain_min);
        ordinal.round().clamp(self.domain_min, self.domain_max) as u32
    }

    /// Frequency spacing between two adjacent ordinals
    pub fn step(&self) -> f64 {
        (self.range_max - self.range_min) / (self.domain_max - self.domain_min)
    }
}

/// Check that `ch` lies in the printable domain; `position` is reported on failure
pub fn validate_symbol(ch: char, position: usize) -> Result<u32> {
    let ordinal = ch as u32;
    if (TEXT_ORDINAL_MIN..=TEXT_ORDINAL_MAX).contains(&ordinal) {
        Ok(ordinal)
    } else {
        Err(SonifyError::SymbolOutOfDomain { ch, position })
    }
}

/// Map a printable character to its tone frequency
pub fn symbol_to_frequency(ch: char, range: &FrequencyRange) -> Result<f64> {
    let ordinal = validate_symbol(ch, 0)?;
    Ok(FrequencyMap::text(range).to_frequency(ordinal as f64))
}

/// Map an observed frequency back to the nearest printable character
pub fn frequency_to_symbol(freq: f64, range: &FrequencyRange) -> char {
    let ordinal = FrequencyMap::text(range).to_ordinal(freq);
    // Clamped into 32..=126, always a valid char
    char::from_u32(ordinal).unwrap_or(' ')
}
