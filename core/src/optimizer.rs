//! Content-adaptive frequency range selection
//!
//! Starting from a profile's default band, the optimizer widens or narrows the band
//! from the analysed features, stretches it around its center by a fixed clarity
//! factor and finally forces it back inside the hard limits. It never fails: a
//! degenerate intermediate band is re-centered rather than reported.

use log::debug;
use serde::Serialize;

use crate::analyzer::{ContentAnalysis, ContentAnalyzer, ContentFeatures};
use crate::profile::DEFAULT_SEPARATION;
use crate::range::FrequencyRange;
use crate::raster::Raster;
use crate::{HARD_CEILING, MIN_BANDWIDTH, NOISE_FLOOR};

/// Tunable factors for [`RangeOptimizer`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OptimizerConfig {
    pub noise_floor: f64,
    pub ceiling: f64,
    pub min_bandwidth: f64,
    /// Width multiplier applied around the band center
    pub clarity_boost: f64,
    /// Text with more unique characters than this gets a wider band
    pub unique_char_threshold: usize,
    pub expansion_per_unique_char: f64,
    pub max_expansion: f64,
    pub min_separation: f64,
    pub max_separation: f64,
    pub default_separation: f64,
    pub high_variance: f64,
    pub low_variance: f64,
    pub image_widen: f64,
    pub image_narrow: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            noise_floor: NOISE_FLOOR,
            ceiling: HARD_CEILING,
            min_bandwidth: MIN_BANDWIDTH,
            clarity_boost: 1.2,
            unique_char_threshold: 50,
            expansion_per_unique_char: 10.0,
            max_expansion: 500.0,
            min_separation: 20.0,
            max_separation: 100.0,
            default_separation: DEFAULT_SEPARATION,
            high_variance: 3000.0,
            low_variance: 1000.0,
            image_widen: 1000.0,
            image_narrow: 500.0,
        }
    }
}

/// Everything a caller needs to pick and explain an encode range
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub analysis: ContentAnalysis,
    pub range: FrequencyRange,
    pub confidence: f64,
    pub reasoning: String,
}

pub struct RangeOptimizer {
    config: OptimizerConfig,
}

impl RangeOptimizer {
    pub fn new() -> Self {
        Self {
            config: OptimizerConfig::default(),
        }
    }

    pub fn with_config(config: OptimizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Derive a tuned range from `base` (normally the profile default).
    ///
    /// `target_symbol_count` enables the separation estimate for text. The result
    /// always satisfies [`FrequencyRange::validate`] with the default limits.
    pub fn optimize(
        &self,
        base: &FrequencyRange,
        analysis: &ContentAnalysis,
        target_symbol_count: Option<usize>,
    ) -> FrequencyRange {
        let c = &self.config;
        let mut range = if [base.min, base.max, base.sweet_spot].iter().all(|v| v.is_finite()) {
            *base
        } else {
            analysis.profile.default_range()
        };
        range.separation = c.default_separation;

        match &analysis.features {
            ContentFeatures::Text(text) => {
                let unique = text.unique_chars;
                if unique > c.unique_char_threshold {
                    let expansion = (unique as f64 * c.expansion_per_unique_char).min(c.max_expansion);
                    range.min = (range.min - expansion / 2.0).max(c.noise_floor);
                    range.max = (range.max + expansion / 2.0).min(c.ceiling);
                }

                if target_symbol_count.is_some_and(|n| n > 0) {
                    let available = range.max - range.min;
                    range.separation =
                        (available / unique.max(1) as f64).clamp(c.min_separation, c.max_separation);
                }
            }
            ContentFeatures::Image(image) => {
                if image.pixel_variance > c.high_variance {
                    range.max = (range.max + c.image_widen).min(c.ceiling);
                } else if image.pixel_variance < c.low_variance {
                    range.max = (range.max - c.image_narrow).max(range.min + c.min_bandwidth);
                }
            }
            ContentFeatures::Empty => {}
        }

        self.apply_clarity_boost(&mut range);
        self.enforce_limits(&mut range);

        debug!(
            "Optimized {} range: {:.1}-{:.1} Hz (sweet spot {:.1}, separation {:.1})",
            analysis.profile, range.min, range.max, range.sweet_spot, range.separation
        );
        range
    }

    fn apply_clarity_boost(&self, range: &mut FrequencyRange) {
        let center = range.center();
        let width = range.width() * self.config.clarity_boost;
        range.min = (center - width / 2.0).max(self.config.noise_floor);
        range.max = (center + width / 2.0).min(self.config.ceiling);
    }

    fn enforce_limits(&self, range: &mut FrequencyRange) {
        let c = &self.config;
        if range.width() < c.min_bandwidth {
            // Keep the band inside the limits rather than shrinking it at an edge
            let lowest = c.noise_floor;
            let highest = (c.ceiling - c.min_bandwidth).max(lowest);
            range.min = (range.center() - c.min_bandwidth / 2.0).clamp(lowest, highest);
            range.max = range.min + c.min_bandwidth;
        }
        range.min = range.min.max(c.noise_floor);
        range.sweet_spot = range.sweet_spot.clamp(range.min, range.max);
    }

    /// Analyse, optimise and explain in one step
    pub fn recommend(&self, analysis: ContentAnalysis, target_symbol_count: Option<usize>) -> Recommendation {
        let range = self.optimize(&analysis.profile.default_range(), &analysis, target_symbol_count);
        let confidence = analysis.confidence;
        let reasoning = format!(
            "{} Confidence: {:.1}%",
            analysis.profile.reasoning(),
            confidence * 100.0
        );

        Recommendation {
            analysis,
            range,
            confidence,
            reasoning,
        }
    }

    pub fn recommend_for_text(&self, text: &str) -> Recommendation {
        let target = text.chars().count();
        self.recommend(ContentAnalyzer::analyze_text(text), Some(target))
    }

    pub fn recommend_for_raster(&self, raster: &Raster) -> Recommendation {
        self.recommend(ContentAnalyzer::analyze_raster(raster), None)
    }

    /// Recommendation when no content is available
    pub fn recommend_default(&self) -> Recommendation {
        self.recommend(ContentAnalysis::mixed(), None)
    }
}

impl Default for RangeOptimizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{FallbackReason, ImageFeatures, TextFeatures};
    use crate::profile::ContentProfile;

    fn text_analysis(profile: ContentProfile, unique_chars: usize) -> ContentAnalysis {
        ContentAnalysis {
            profile,
            confidence: 0.7,
            features: ContentFeatures::Text(TextFeatures {
                length: 200,
                unique_chars,
                word_count: 30,
                avg_word_length: 4.5,
                digit_ratio: 0.0,
                punctuation_ratio: 0.2,
                uppercase_ratio: 0.1,
            }),
            fallback: None,
        }
    }

    fn image_analysis(profile: ContentProfile, pixel_variance: f64) -> ContentAnalysis {
        ContentAnalysis {
            profile,
            confidence: 0.6,
            features: ContentFeatures::Image(ImageFeatures {
                width: 10,
                height: 10,
                total_pixels: 100,
                is_grayscale: false,
                pixel_variance,
                edge_density: 15.0,
                contrast_ratio: 0.3,
                brightness_histogram: [0; 8],
            }),
            fallback: None,
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "expected {}, got {}", expected, actual);
    }

    #[test]
    fn test_text_expansion_then_clarity_boost() {
        let optimizer = RangeOptimizer::new();
        let base = ContentProfile::TextGeneral.default_range();
        let analysis = text_analysis(ContentProfile::TextTechnical, 80);
        let range = optimizer.optimize(&base, &analysis, None);

        // 800-3000 widened by 500 -> 550-3250, then 1.2x around 1900
        assert_close(range.min, 280.0);
        assert_close(range.max, 3520.0);
        assert_close(range.sweet_spot, 1800.0);
        assert_close(range.separation, 50.0);
        assert!(range.validate().is_ok());
    }

    #[test]
    fn test_no_expansion_below_threshold() {
        let optimizer = RangeOptimizer::new();
        let base = ContentProfile::TextGeneral.default_range();
        let range = optimizer.optimize(&base, &text_analysis(ContentProfile::TextGeneral, 30), None);
        // 1.2x of 2200 around 1900
        assert_close(range.min, 580.0);
        assert_close(range.max, 3220.0);
    }

    #[test]
    fn test_separation_with_target_length() {
        let optimizer = RangeOptimizer::new();
        let base = ContentProfile::TextGeneral.default_range();

        let range = optimizer.optimize(&base, &text_analysis(ContentProfile::TextGeneral, 30), Some(100));
        // 2200 / 30 = 73.3
        assert_close(range.separation, 2200.0 / 30.0);

        let range = optimizer.optimize(&base, &text_analysis(ContentProfile::TextGeneral, 10), Some(100));
        assert_close(range.separation, 100.0);

        let range = optimizer.optimize(&base, &text_analysis(ContentProfile::TextGeneral, 90), Some(100));
        // 2700 / 90 = 30
        assert_close(range.separation, 30.0);

        let range = optimizer.optimize(&base, &text_analysis(ContentProfile::TextGeneral, 90), Some(0));
        assert_close(range.separation, 50.0);
    }

    #[test]
    fn test_high_variance_image_widens() {
        let optimizer = RangeOptimizer::new();
        let base = ContentProfile::ImageLowDetail.default_range();
        let range = optimizer.optimize(&base, &image_analysis(ContentProfile::ImageLowDetail, 5000.0), None);
        // 800-5000, then 1.2x around 2900
        assert_close(range.min, 380.0);
        assert_close(range.max, 5420.0);
    }

    #[test]
    fn test_high_variance_respects_ceiling() {
        let optimizer = RangeOptimizer::new();
        let base = ContentProfile::ImageHighDetail.default_range();
        let range = optimizer.optimize(&base, &image_analysis(ContentProfile::ImageHighDetail, 5000.0), None);
        // max stays 8000, then 1.2x of 6500 around 4750
        assert_close(range.min, 850.0);
        assert_close(range.max, 8000.0);
    }

    #[test]
    fn test_low_variance_image_narrows() {
        let optimizer = RangeOptimizer::new();
        let base = ContentProfile::ImageGrayscale.default_range();
        let range = optimizer.optimize(&base, &image_analysis(ContentProfile::ImageGrayscale, 200.0), None);
        // 1000-4500, then 1.2x around 2750
        assert_close(range.min, 650.0);
        assert_close(range.max, 4850.0);

        // narrowing never goes below the minimum bandwidth
        let base = FrequencyRange::new(1000.0, 1600.0).unwrap();
        let range = optimizer.optimize(&base, &image_analysis(ContentProfile::ImageGrayscale, 200.0), None);
        assert_close(range.width(), 600.0);
    }

    #[test]
    fn test_degenerate_band_is_recentered() {
        let optimizer = RangeOptimizer::new();
        let base = FrequencyRange {
            min: 240.0,
            max: 260.0,
            sweet_spot: 250.0,
            separation: 50.0,
        };
        let range = optimizer.optimize(&base, &ContentAnalysis::mixed(), None);
        assert_close(range.min, 200.0);
        assert_close(range.max, 700.0);
        assert_close(range.sweet_spot, 250.0);

        let base = FrequencyRange {
            min: 7950.0,
            max: 8000.0,
            sweet_spot: 7000.0,
            separation: 50.0,
        };
        let range = optimizer.optimize(&base, &ContentAnalysis::mixed(), None);
        assert_close(range.min, 7500.0);
        assert_close(range.max, 8000.0);
        assert_close(range.sweet_spot, 7500.0);
    }

    #[test]
    fn test_non_finite_base_uses_profile_default() {
        let optimizer = RangeOptimizer::new();
        let base = FrequencyRange {
            min: f64::NAN,
            max: 3000.0,
            sweet_spot: 1000.0,
            separation: 50.0,
        };
        let range = optimizer.optimize(&base, &ContentAnalysis::mixed(), None);
        assert!(range.validate().is_ok());
    }

    #[test]
    fn test_recommend_reasoning() {
        let optimizer = RangeOptimizer::new();
        let recommendation = optimizer.recommend(image_analysis(ContentProfile::ImageGrayscale, 1500.0), None);
        assert_eq!(
            recommendation.reasoning,
            "Grayscale image detected. Optimized for single-channel encoding. Confidence: 60.0%"
        );
        assert!(recommendation.range.validate().is_ok());
    }

    #[test]
    fn test_recommend_default_is_mixed_content() {
        let recommendation = RangeOptimizer::new().recommend_default();
        assert_eq!(recommendation.analysis.profile, ContentProfile::MixedContent);
        assert_eq!(recommendation.analysis.fallback, Some(FallbackReason::NoContent));
        // 900-3500, then 1.2x around 2200
        assert_close(recommendation.range.min, 640.0);
        assert_close(recommendation.range.max, 3760.0);
    }

    #[test]
    fn test_recommend_for_text_is_deterministic() {
        let optimizer = RangeOptimizer::new();
        let text = "Determinism: same input, same range. 42 times over!";
        let a = optimizer.recommend_for_text(text);
        let b = optimizer.recommend_for_text(text);
        assert_eq!(a, b);
    }
}
