// ============================================================================
// INTEGRATION TESTS
// ============================================================================
// Full encode/decode round trips run one FFT plus a fine Goertzel scan per
// character, so long random strings are kept short in debug builds.
//
// For faster test execution, run in release mode:
//   cargo test -p sonify-core --test integration_test --release
// ============================================================================

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use sonify_core::decoder::symbols_to_string;
use sonify_core::mapping::{frequency_to_symbol, symbol_to_frequency};
use sonify_core::{
    ContentAnalysis, ContentAnalyzer, ContentProfile, DecodedSymbol, Decoder, Encoder, FrequencyRange,
    IntensityGrid, Raster, RasterMap, RangeOptimizer, SonifyError,
};

const TEST_RANGES: [(f64, f64); 5] = [
    (200.0, 700.0),
    (800.0, 3000.0),
    (4000.0, 4500.0),
    (1500.0, 8000.0),
    (7500.0, 8000.0),
];

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn random_printable(rng: &mut StdRng, len: usize) -> String {
    (0..len).map(|_| rng.gen_range(32u8..=126) as char).collect()
}

#[test]
fn test_round_trip_example() {
    let range = FrequencyRange::new(800.0, 3000.0).unwrap();
    let samples = Encoder::new().encode_text("AI", &range).unwrap();

    // two tones plus one separator, no trailing separator
    assert_eq!(samples.len(), 4410 + 882 + 4410);

    let decoded = Decoder::new().decode_sequence(&samples, 44100, &range).unwrap();
    assert_eq!(symbols_to_string(&decoded), "AI");
}

#[test]
fn test_round_trip_random_text_across_ranges() {
    init_logging();
    let mut rng = StdRng::seed_from_u64(0x50_4E1F);
    let encoder = Encoder::new();
    let decoder = Decoder::new();

    for &(min, max) in &TEST_RANGES {
        let range = FrequencyRange::new(min, max).unwrap();
        for _ in 0..3 {
            let len = rng.gen_range(1..=8);
            let text = random_printable(&mut rng, len);

            let samples = encoder.encode_text(&text, &range).unwrap();
            let decoded = decoder.decode_sequence(&samples, 44100, &range).unwrap();
            assert_eq!(
                symbols_to_string(&decoded),
                text,
                "round trip failed for {:?} in {}-{} Hz",
                text,
                min,
                max
            );
        }
    }
}

#[test]
fn test_round_trip_every_printable_character_narrow_band() {
    let range = FrequencyRange::new(4000.0, 4500.0).unwrap();
    let text: String = (32u8..=126).map(|b| b as char).collect();

    let samples = Encoder::new().encode_text(&text, &range).unwrap();
    let decoded = Decoder::new().decode_sequence(&samples, 44100, &range).unwrap();
    assert!(decoded.iter().all(|s| !s.is_ambiguous()));
    assert_eq!(symbols_to_string(&decoded), text);
}

#[test]
fn test_round_trip_with_gaussian_noise() {
    init_logging();
    let range = FrequencyRange::default();
    let text = "Noise-tolerant 123";
    let mut samples = Encoder::new().encode_text(text, &range).unwrap();

    let mut rng = StdRng::seed_from_u64(99);
    let noise = Normal::new(0.0, 0.05).unwrap();
    for sample in samples.iter_mut() {
        *sample += noise.sample(&mut rng) as f32;
    }

    let decoded = Decoder::new().decode_sequence(&samples, 44100, &range).unwrap();
    assert_eq!(symbols_to_string(&decoded), text);
}

#[test]
fn test_mapping_inverse_property() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..200 {
        let min = rng.gen_range(200.0..7500.0);
        let max = rng.gen_range(min + 500.0..=8000.0);
        let range = FrequencyRange::new(min, max).unwrap();
        for b in 32u8..=126 {
            let ch = b as char;
            let freq = symbol_to_frequency(ch, &range).unwrap();
            assert!(freq >= range.min && freq <= range.max);
            assert_eq!(frequency_to_symbol(freq, &range), ch);
        }
    }
}

#[test]
fn test_out_of_domain_text_rejected() {
    let range = FrequencyRange::default();
    match Encoder::new().encode_text("tab\there", &range) {
        Err(SonifyError::SymbolOutOfDomain { ch, position }) => {
            assert_eq!(ch, '\t');
            assert_eq!(position, 3);
        }
        other => panic!("expected SymbolOutOfDomain, got {:?}", other),
    }
}

#[test]
fn test_silence_decodes_as_ambiguous() {
    let range = FrequencyRange::default();
    let silence = vec![0.0f32; 4410 * 3];
    let decoded = Decoder::new().decode_sequence(&silence, 44100, &range).unwrap();
    assert!(!decoded.is_empty());
    assert!(decoded.iter().all(|s| *s == DecodedSymbol::Ambiguous));
}

#[test]
fn test_optimized_ranges_always_valid() {
    let mut rng = StdRng::seed_from_u64(2024);
    let optimizer = RangeOptimizer::new();

    for _ in 0..100 {
        let len = rng.gen_range(0..300);
        let text = random_printable(&mut rng, len);
        let recommendation = optimizer.recommend_for_text(&text);
        let range = recommendation.range;
        assert!(range.validate().is_ok(), "invalid range {:?} for {:?}", range, text);
        assert!((20.0..=100.0).contains(&range.separation));
    }

    for profile in ContentProfile::ALL {
        let analysis = ContentAnalysis::fallback(profile, sonify_core::FallbackReason::NoContent);
        for _ in 0..20 {
            // arbitrary, possibly degenerate starting bands
            let min = rng.gen_range(0.0..9000.0);
            let max = rng.gen_range(0.0..9000.0);
            let base = FrequencyRange {
                min,
                max,
                sweet_spot: rng.gen_range(0.0..9000.0),
                separation: 50.0,
            };
            let range = optimizer.optimize(&base, &analysis, None);
            assert!(range.min >= 200.0);
            assert!(range.max <= 8000.0);
            assert!(range.width() >= 500.0 - 1e-6);
            assert!(range.sweet_spot >= range.min && range.sweet_spot <= range.max);
        }
    }
}

#[test]
fn test_technical_text_optimization_example() {
    // 80 distinct characters with heavy punctuation
    let text: String = (33u8..113).map(|b| b as char).collect();
    let analysis = ContentAnalyzer::analyze_text(&text);
    assert_eq!(analysis.profile, ContentProfile::TextTechnical);

    let base = ContentProfile::TextGeneral.default_range();
    let range = RangeOptimizer::new().optimize(&base, &analysis, None);
    assert!((range.min - 280.0).abs() < 1e-9);
    assert!((range.max - 3520.0).abs() < 1e-9);
}

#[test]
fn test_classification_idempotent() {
    let text = "Invoice #2231: 14 items @ $3.50 each.";
    let first = ContentAnalyzer::analyze_text(text);
    for _ in 0..5 {
        let again = ContentAnalyzer::analyze_text(text);
        assert_eq!(again.profile, first.profile);
        assert_eq!(again.confidence, first.confidence);
    }
}

#[test]
fn test_raster_bounds() {
    let map = RasterMap::new();
    let range = ContentProfile::ImageLowDetail.default_range();

    for &(w, h) in &[(1usize, 1usize), (100, 100), (101, 3), (640, 480), (3, 900)] {
        let grid = IntensityGrid::new(w, h, vec![128; w * h]).unwrap();
        let frequencies = map.raster_to_frequencies(&grid, &range).unwrap();
        let (ew, eh) = map.encoded_size(&grid);
        assert!(ew <= 100 && eh <= 100);
        assert_eq!(frequencies.len(), ew * eh);
        assert!(frequencies.len() <= 10_000);
        assert!(frequencies.iter().all(|&f| f >= range.min && f <= range.max));
    }
}

#[test]
fn test_image_round_trip_through_audio() {
    let (width, height) = (6, 4);
    let mut data = Vec::with_capacity(width * height * 3);
    for i in 0..width * height {
        let v = (i * 10) as u8;
        data.extend_from_slice(&[v, v, v]);
    }
    let raster = Raster::new(width, height, 3, data).unwrap();
    let grid = raster.to_intensity();

    let range = FrequencyRange::new(1000.0, 5000.0).unwrap();
    let map = RasterMap::new();
    let frequencies = map.raster_to_frequencies(&grid, &range).unwrap();
    let samples = Encoder::new().encode_frequencies(&frequencies).unwrap();

    let recovered: Vec<f64> = Decoder::new()
        .decode_frequencies(&samples, 44100)
        .unwrap()
        .into_iter()
        .map(|f| f.unwrap_or(0.0))
        .collect();
    let back = map.frequencies_to_raster(&recovered, width, height, &range).unwrap();

    assert_eq!(back.width(), width);
    assert_eq!(back.height(), height);
    for (original, decoded) in grid.values().iter().zip(back.values()) {
        assert!(
            (*original as i32 - *decoded as i32).abs() <= 1,
            "intensity {} decoded as {}",
            original,
            decoded
        );
    }
}

#[test]
fn test_analysis_of_unreadable_image_falls_back() {
    let analysis = ContentAnalyzer::fallback_image(sonify_core::FallbackReason::Unreadable("truncated".into()));
    let recommendation = RangeOptimizer::new().recommend(analysis, None);
    assert_eq!(recommendation.analysis.profile, ContentProfile::ImageHighDetail);
    assert_eq!(recommendation.confidence, 0.5);
    assert!(recommendation.range.validate().is_ok());
}
