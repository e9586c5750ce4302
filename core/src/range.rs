use serde::Serialize;

use crate::error::{Result, SonifyError};
use crate::{HARD_CEILING, MIN_BANDWIDTH, NOISE_FLOOR};

// Absorbs rounding in computed band edges
const BANDWIDTH_TOLERANCE: f64 = 1e-6;

/// Frequency band used for one encode or decode operation.
///
/// `sweet_spot` is informational: the codec only uses `min` and `max`.
/// `separation` is the recommended spacing between adjacent symbol frequencies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrequencyRange {
    pub min: f64,
    pub max: f64,
    pub sweet_spot: f64,
    pub separation: f64,
}

impl FrequencyRange {
    /// Build a range with the sweet spot at the band center and the default separation
    pub fn new(min: f64, max: f64) -> Result<Self> {
        let range = Self {
            min,
            max,
            sweet_spot: (min + max) / 2.0,
            separation: crate::profile::DEFAULT_SEPARATION,
        };
        range.validate()?;
        Ok(range)
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    pub fn center(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    /// Check the hard constraints every encode range must satisfy
    pub fn validate(&self) -> Result<()> {
        let values = [self.min, self.max, self.sweet_spot, self.separation];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(SonifyError::InvalidRange("all bounds must be finite".into()));
        }
        if self.min < NOISE_FLOOR {
            return Err(SonifyError::InvalidRange(format!(
                "min {} Hz is below the {} Hz noise floor",
                self.min, NOISE_FLOOR
            )));
        }
        if self.max > HARD_CEILING {
            return Err(SonifyError::InvalidRange(format!(
                "max {} Hz is above the {} Hz ceiling",
                self.max, HARD_CEILING
            )));
        }
        if self.width() < MIN_BANDWIDTH - BANDWIDTH_TOLERANCE {
            return Err(SonifyError::InvalidRange(format!(
                "band {}-{} Hz is narrower than {} Hz",
                self.min, self.max, MIN_BANDWIDTH
            )));
        }
        if self.sweet_spot < self.min || self.sweet_spot > self.max {
            return Err(SonifyError::InvalidRange(format!(
                "sweet spot {} Hz lies outside {}-{} Hz",
                self.sweet_spot, self.min, self.max
            )));
        }
        Ok(())
    }
}

impl Default for FrequencyRange {
    fn default() -> Self {
        crate::profile::ContentProfile::TextGeneral.default_range()
    }
}
