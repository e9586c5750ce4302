//! Rule-based content classification
//!
//! Text and raster inputs are reduced to a handful of statistics and matched against
//! an ordered rule list; the first matching rule picks the profile. Analysis is
//! advisory: unusable input yields a default profile with a fallback reason instead
//! of an error.

use std::collections::{BTreeMap, HashSet};

use log::{debug, warn};
use serde::Serialize;

use crate::profile::ContentProfile;
use crate::raster::Raster;

const BASE_CONFIDENCE: f64 = 0.5;
const IMAGE_MAX_CONFIDENCE: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextFeatures {
    pub length: usize,
    pub unique_chars: usize,
    pub word_count: usize,
    pub avg_word_length: f64,
    pub digit_ratio: f64,
    pub punctuation_ratio: f64,
    pub uppercase_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageFeatures {
    pub width: usize,
    pub height: usize,
    pub total_pixels: usize,
    pub is_grayscale: bool,
    pub pixel_variance: f64,
    pub edge_density: f64,
    pub contrast_ratio: f64,
    /// Pixel counts in eight equal-width buckets spanning the image's own
    /// darkest..brightest intensity
    pub brightness_histogram: [usize; 8],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentFeatures {
    Text(TextFeatures),
    Image(ImageFeatures),
    Empty,
}

/// Why an analysis fell back to a default profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    EmptyText,
    EmptyRaster,
    Unreadable(String),
    NoContent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentAnalysis {
    pub profile: ContentProfile,
    pub confidence: f64,
    pub features: ContentFeatures,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<FallbackReason>,
}

impl ContentAnalysis {
    pub fn fallback(profile: ContentProfile, reason: FallbackReason) -> Self {
        Self {
            profile,
            confidence: BASE_CONFIDENCE,
            features: ContentFeatures::Empty,
            fallback: Some(reason),
        }
    }

    /// Analysis used when there is neither text nor a raster to look at
    pub fn mixed() -> Self {
        Self::fallback(ContentProfile::MixedContent, FallbackReason::NoContent)
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Named numeric statistics for reporting
    pub fn feature_map(&self) -> BTreeMap<&'static str, f64> {
        let mut map = BTreeMap::new();
        match &self.features {
            ContentFeatures::Text(text) => {
                map.insert("length", text.length as f64);
                map.insert("unique_chars", text.unique_chars as f64);
                map.insert("word_count", text.word_count as f64);
                map.insert("avg_word_length", text.avg_word_length);
                map.insert("numeric_content", text.digit_ratio);
                map.insert("punctuation_density", text.punctuation_ratio);
                map.insert("uppercase_ratio", text.uppercase_ratio);
            }
            ContentFeatures::Image(image) => {
                map.insert("width", image.width as f64);
                map.insert("height", image.height as f64);
                map.insert("total_pixels", image.total_pixels as f64);
                map.insert("is_grayscale", if image.is_grayscale { 1.0 } else { 0.0 });
                map.insert("pixel_variance", image.pixel_variance);
                map.insert("edge_density", image.edge_density);
                map.insert("contrast_ratio", image.contrast_ratio);
            }
            ContentFeatures::Empty => {}
        }
        map
    }
}

type TextRule = (fn(&TextFeatures) -> bool, ContentProfile);
type ImageRule = (fn(&ImageFeatures) -> bool, ContentProfile);

fn is_technical(f: &TextFeatures) -> bool {
    f.digit_ratio > 0.3 || f.punctuation_ratio > 0.1
}

fn is_numeric(f: &TextFeatures) -> bool {
    f.digit_ratio > 0.15
}

fn is_narrative(f: &TextFeatures) -> bool {
    f.avg_word_length > 5.0 && f.punctuation_ratio < 0.05
}

// The rules overlap; order decides.
const TEXT_RULES: [TextRule; 3] = [
    (is_technical, ContentProfile::TextTechnical),
    (is_numeric, ContentProfile::TextNumeric),
    (is_narrative, ContentProfile::TextNarrative),
];

fn is_high_detail(f: &ImageFeatures) -> bool {
    f.edge_density > 20.0 && f.pixel_variance > 2000.0
}

fn is_grayscale(f: &ImageFeatures) -> bool {
    f.is_grayscale
}

fn is_low_detail(f: &ImageFeatures) -> bool {
    f.edge_density < 10.0
}

const IMAGE_RULES: [ImageRule; 3] = [
    (is_high_detail, ContentProfile::ImageHighDetail),
    (is_grayscale, ContentProfile::ImageGrayscale),
    (is_low_detail, ContentProfile::ImageLowDetail),
];

/// Stateless classifier for text and raster payloads
pub struct ContentAnalyzer;

impl ContentAnalyzer {
    pub fn analyze_text(text: &str) -> ContentAnalysis {
        if text.trim().is_empty() {
            warn!("Text analysis fell back to defaults: empty input");
            return ContentAnalysis::fallback(ContentProfile::TextGeneral, FallbackReason::EmptyText);
        }

        let features = text_features(text);
        let profile = TEXT_RULES
            .iter()
            .find(|(matches, _)| matches(&features))
            .map(|&(_, profile)| profile)
            .unwrap_or(ContentProfile::TextGeneral);
        let confidence = text_confidence(&features);

        debug!("Classified text as {} (confidence {:.2})", profile, confidence);
        ContentAnalysis {
            profile,
            confidence,
            features: ContentFeatures::Text(features),
            fallback: None,
        }
    }

    pub fn analyze_raster(raster: &Raster) -> ContentAnalysis {
        if raster.is_empty() {
            warn!("Image analysis fell back to defaults: empty raster");
            return Self::fallback_image(FallbackReason::EmptyRaster);
        }

        let features = image_features(raster);
        let profile = IMAGE_RULES
            .iter()
            .find(|(matches, _)| matches(&features))
            .map(|&(_, profile)| profile)
            .unwrap_or(ContentProfile::ImageHighDetail);
        let confidence = IMAGE_MAX_CONFIDENCE.min(BASE_CONFIDENCE + features.pixel_variance / 10000.0);

        debug!("Classified image as {} (confidence {:.2})", profile, confidence);
        ContentAnalysis {
            profile,
            confidence,
            features: ContentFeatures::Image(features),
            fallback: None,
        }
    }

    /// Default image analysis for a source that could not be read or decoded
    pub fn fallback_image(reason: FallbackReason) -> ContentAnalysis {
        if let FallbackReason::Unreadable(detail) = &reason {
            warn!("Image analysis fell back to defaults: {}", detail);
        }
        ContentAnalysis::fallback(ContentProfile::ImageHighDetail, reason)
    }
}

fn text_features(text: &str) -> TextFeatures {
    let chars: Vec<char> = text.chars().collect();
    let length = chars.len();
    let unique_chars = chars.iter().collect::<HashSet<_>>().len();

    let words: Vec<&str> = text.split_whitespace().collect();
    let avg_word_length = if words.is_empty() {
        0.0
    } else {
        words.iter().map(|w| w.chars().count()).sum::<usize>() as f64 / words.len() as f64
    };

    let ratio = |pred: fn(&char) -> bool| chars.iter().filter(|c| pred(c)).count() as f64 / length as f64;

    TextFeatures {
        length,
        unique_chars,
        word_count: words.len(),
        avg_word_length,
        digit_ratio: ratio(|c| c.is_numeric()),
        punctuation_ratio: ratio(|c| !(c.is_alphanumeric() || *c == '_' || c.is_whitespace())),
        uppercase_ratio: ratio(|c| c.is_ascii_uppercase()),
    }
}

fn text_confidence(features: &TextFeatures) -> f64 {
    let mut confidence = BASE_CONFIDENCE;
    if features.length > 100 {
        confidence += 0.2;
    }
    if features.unique_chars > 20 {
        confidence += 0.1;
    }
    if features.word_count > 10 {
        confidence += 0.2;
    }
    confidence.min(1.0)
}

fn image_features(raster: &Raster) -> ImageFeatures {
    let grid = raster.to_intensity();
    let values: Vec<f64> = grid.values().iter().map(|&v| v as f64).collect();
    let count = values.len() as f64;

    let mean = values.iter().sum::<f64>() / count;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count;
    let contrast_ratio = if mean > 0.0 { variance.sqrt() / mean } else { 0.0 };

    let brightness_histogram = brightness_histogram(&values);

    ImageFeatures {
        width: grid.width(),
        height: grid.height(),
        total_pixels: values.len(),
        is_grayscale: raster.channels() == 1,
        pixel_variance: variance,
        edge_density: edge_density(&values, grid.width(), grid.height()),
        contrast_ratio,
        brightness_histogram,
    }
}

/// Eight-bin histogram over `[min, max]` of the data, last bin closed. A flat image
/// widens the span by half a level each way, so every pixel lands in the middle bin.
fn brightness_histogram(values: &[f64]) -> [usize; 8] {
    let mut bins = [0usize; 8];
    let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !(lo.is_finite() && hi.is_finite()) {
        return bins;
    }
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = (hi - lo) / bins.len() as f64;
    for &value in values {
        let index = (((value - lo) / width) as usize).min(bins.len() - 1);
        bins[index] += 1;
    }
    bins
}

/// Central-difference gradient along one axis; one-sided at the edges, zero when
/// the axis has a single sample
fn gradient_at(get: impl Fn(usize) -> f64, i: usize, n: usize) -> f64 {
    if n < 2 {
        0.0
    } else if i == 0 {
        get(1) - get(0)
    } else if i == n - 1 {
        get(n - 1) - get(n - 2)
    } else {
        (get(i + 1) - get(i - 1)) / 2.0
    }
}

/// Mean gradient magnitude over the grid
fn edge_density(values: &[f64], width: usize, height: usize) -> f64 {
    let mut total = 0.0;
    for y in 0..height {
        let row = &values[y * width..(y + 1) * width];
        for x in 0..width {
            let gx = gradient_at(|i| row[i], x, width);
            let gy = gradient_at(|j| values[j * width + x], y, height);
            total += (gx * gx + gy * gy).sqrt();
        }
    }
    total / (width * height) as f64
}
