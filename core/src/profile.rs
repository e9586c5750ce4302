use serde::Serialize;
use std::fmt;

use crate::range::FrequencyRange;

/// Symbol separation used when no target length is known (Hz)
pub const DEFAULT_SEPARATION: f64 = 50.0;

/// Content classification outcome, each bound to a default frequency band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentProfile {
    TextGeneral,
    TextTechnical,
    TextNarrative,
    TextNumeric,
    ImageHighDetail,
    ImageLowDetail,
    ImageGrayscale,
    MixedContent,
}

impl ContentProfile {
    pub const ALL: [ContentProfile; 8] = [
        ContentProfile::TextGeneral,
        ContentProfile::TextTechnical,
        ContentProfile::TextNarrative,
        ContentProfile::TextNumeric,
        ContentProfile::ImageHighDetail,
        ContentProfile::ImageLowDetail,
        ContentProfile::ImageGrayscale,
        ContentProfile::MixedContent,
    ];

    pub fn default_range(self) -> FrequencyRange {
        let (min, max, sweet_spot) = match self {
            ContentProfile::TextGeneral => (800.0, 3000.0, 1800.0),
            ContentProfile::TextTechnical => (1000.0, 4000.0, 2200.0),
            ContentProfile::TextNarrative => (600.0, 2500.0, 1500.0),
            ContentProfile::TextNumeric => (1200.0, 3500.0, 2000.0),
            ContentProfile::ImageHighDetail => (1500.0, 8000.0, 3500.0),
            ContentProfile::ImageLowDetail => (800.0, 4000.0, 2000.0),
            ContentProfile::ImageGrayscale => (1000.0, 5000.0, 2500.0),
            ContentProfile::MixedContent => (900.0, 3500.0, 2000.0),
        };
        FrequencyRange {
            min,
            max,
            sweet_spot,
            separation: DEFAULT_SEPARATION,
        }
    }

    pub fn is_text(self) -> bool {
        matches!(
            self,
            ContentProfile::TextGeneral
                | ContentProfile::TextTechnical
                | ContentProfile::TextNarrative
                | ContentProfile::TextNumeric
        )
    }

    pub fn is_image(self) -> bool {
        matches!(
            self,
            ContentProfile::ImageHighDetail
                | ContentProfile::ImageLowDetail
                | ContentProfile::ImageGrayscale
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContentProfile::TextGeneral => "text_general",
            ContentProfile::TextTechnical => "text_technical",
            ContentProfile::TextNarrative => "text_narrative",
            ContentProfile::TextNumeric => "text_numeric",
            ContentProfile::ImageHighDetail => "image_high_detail",
            ContentProfile::ImageLowDetail => "image_low_detail",
            ContentProfile::ImageGrayscale => "image_grayscale",
            ContentProfile::MixedContent => "mixed_content",
        }
    }

    /// One-line explanation of what the profile's band is tuned for
    pub fn reasoning(self) -> &'static str {
        match self {
            ContentProfile::TextTechnical => {
                "Technical content detected. Using higher frequencies for better clarity."
            }
            ContentProfile::TextNumeric => {
                "Numeric content identified. Optimized for precise character encoding."
            }
            ContentProfile::TextNarrative => {
                "Narrative text detected. Lower frequencies for smoother audio transitions."
            }
            ContentProfile::ImageHighDetail => {
                "High-detail image detected. Wider frequency range for complex pixel encoding."
            }
            ContentProfile::ImageLowDetail => {
                "Simple image detected. Narrower frequency range for efficient encoding."
            }
            ContentProfile::ImageGrayscale => {
                "Grayscale image detected. Optimized for single-channel encoding."
            }
            ContentProfile::TextGeneral | ContentProfile::MixedContent => {
                "General content optimization applied."
            }
        }
    }
}

impl fmt::Display for ContentProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
