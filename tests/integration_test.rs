//! Integration tests for the outfit matching pipeline
//!
//! These tests drive the public API end to end on synthetic garment photos:
//! - Image decoding and background isolation
//! - Dominant color extraction and naming
//! - Fuzzy description and outfit style matching
//! - Configuration files and run control
//! - Error handling for edge cases

use image::{Rgb, RgbImage};
use outfit_colors::config::{IsolationMethod, MatchBasis};
use outfit_colors::image_loader::{decode_image, encode_png, load_image};
use outfit_colors::{
    AnalysisError, CancelToken, ColorsResponse, Garment, MatchRequest, Outfit, Pipeline,
    PipelineConfig, RunControl, Temperature, Tone,
};
use std::path::Path;
use std::time::Duration;

/// A garment of one color laid flat on a white surface
fn photo(garment: [u8; 3]) -> RgbImage {
    RgbImage::from_fn(24, 24, |x, y| {
        if (6..18).contains(&x) && (6..18).contains(&y) {
            Rgb(garment)
        } else {
            Rgb([245, 245, 245])
        }
    })
}

/// Border isolation, one reported color per garment
fn single_color_pipeline() -> Pipeline {
    let mut config = PipelineConfig::default();
    config.extraction.cluster_count = 1;
    config.isolation.method = IsolationMethod::border_color();
    Pipeline::new(config).unwrap()
}

fn outfit_of(colors: &[[u8; 3]]) -> Outfit {
    colors
        .iter()
        .map(|&rgb| Garment::from_bytes(&encode_png(&photo(rgb)).unwrap()).unwrap())
        .collect()
}

// ============================================================================
// End-to-End Outfit Analysis
// ============================================================================

#[test]
fn test_warm_contrast_outfit() {
    let pipeline = single_color_pipeline();
    let mut outfit = outfit_of(&[[255, 0, 0], [128, 64, 64]]);

    let report = pipeline.analyze_outfit(&mut outfit, &RunControl::new()).unwrap();

    assert_eq!(report.garments.len(), 2);
    assert_eq!(report.garments[0].colors[0].hex, "#ff0000");
    assert_eq!(report.garments[0].colors[0].name, "red");
    assert!((report.garments[0].colors[0].pct - 1.0).abs() < 1e-12);

    let first = report.garments[0].descriptors[0];
    assert_eq!((first.tone, first.temperature), (Tone::Bright, Temperature::Warm));
    let second = report.garments[1].descriptors[0];
    assert_eq!((second.tone, second.temperature), (Tone::Dark, Temperature::Warm));

    assert_eq!(report.match_names(), vec!["Basic", "Analogous", "Contrast", "Summer"]);
}

#[test]
fn test_clashing_outfit_matches_nothing() {
    let pipeline = single_color_pipeline();
    let mut outfit = outfit_of(&[[255, 0, 0], [0, 0, 255]]);

    let report = pipeline.analyze_outfit(&mut outfit, &RunControl::new()).unwrap();
    assert!(report.matches.is_empty());

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["matches"], serde_json::json!([]));
}

#[test]
fn test_gray_outfit_is_neutral() {
    let pipeline = single_color_pipeline();
    let mut outfit = outfit_of(&[[128, 128, 128], [90, 90, 90]]);

    let report = pipeline.analyze_outfit(&mut outfit, &RunControl::new()).unwrap();
    assert_eq!(report.match_names(), vec!["Basic", "Neutral", "Analogous"]);
}

#[test]
fn test_outfit_matches_agree_with_match_request() {
    let pipeline = single_color_pipeline();
    let mut outfit = outfit_of(&[[255, 0, 0], [128, 64, 64], [0, 0, 255]]);

    let report = pipeline.analyze_outfit(&mut outfit, &RunControl::new()).unwrap();
    let request: MatchRequest = report
        .garments
        .iter()
        .map(|g| ColorsResponse {
            colors: g.colors.clone(),
        })
        .collect();

    let response = pipeline.check_match(&request).unwrap();
    assert_eq!(response.matches, report.match_names());
}

#[test]
fn test_all_colors_basis_reports_every_descriptor() {
    let mut config = PipelineConfig::default();
    config.extraction.cluster_count = 2;
    config.matching.basis = MatchBasis::AllColors;
    let pipeline = Pipeline::new(config).unwrap();

    // Already isolated: red body with a blue trim, black background
    let image = RgbImage::from_fn(10, 10, |x, _| match x {
        0 | 1 => Rgb([0, 0, 0]),
        2..=7 => Rgb([255, 0, 0]),
        _ => Rgb([0, 0, 255]),
    });
    let mut outfit = Outfit::new(vec![Garment::from_foreground(image)]);

    let report = pipeline.analyze_outfit(&mut outfit, &RunControl::new()).unwrap();
    let garment = &report.garments[0];
    assert_eq!(garment.colors.len(), 2);
    assert_eq!(garment.descriptors.len(), 2);
    assert!((garment.colors[0].pct - 0.75).abs() < 1e-12);
    assert!(report.matches.is_empty());
}

// ============================================================================
// Boundary Operations
// ============================================================================

#[test]
fn test_isolate_then_extract() {
    let pipeline = single_color_pipeline();
    let raw = encode_png(&photo([30, 60, 160])).unwrap();

    let isolated = decode_image(&pipeline.isolate_background(&raw).unwrap()).unwrap();
    assert_eq!(isolated.get_pixel(0, 0), &Rgb([0, 0, 0]));

    let colors = pipeline.extract_colors(&isolated).unwrap();
    assert_eq!(colors.len(), 1);
    assert_eq!(colors[0].hex, "#1e3ca0");
    assert!(!colors[0].name.is_empty());
}

#[test]
fn test_solid_garment_reports_no_empty_colors() {
    let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
    let image = RgbImage::from_pixel(10, 10, Rgb([200, 30, 40]));

    let colors = pipeline.extract_colors(&image).unwrap();
    assert_eq!(colors.len(), 1);
    assert_eq!(colors[0].hex, "#c81e28");
    assert!(colors.iter().all(|c| c.pct > 0.0));
}

#[test]
fn test_color_strip_has_configured_size() {
    let mut config = PipelineConfig::default();
    config.extraction.cluster_count = 2;
    config.strip.width = 100;
    config.strip.height = 10;
    let pipeline = Pipeline::new(config).unwrap();

    let mut garment = Garment::from_foreground(RgbImage::from_fn(10, 10, |x, _| {
        if x < 3 {
            Rgb([250, 250, 0])
        } else {
            Rgb([20, 20, 200])
        }
    }));
    let colors = garment.colors(pipeline.isolator(), pipeline.extractor()).unwrap();
    let strip = decode_image(&pipeline.color_strip_png(colors).unwrap()).unwrap();

    assert_eq!(strip.dimensions(), (100, 10));
    assert_eq!(strip.get_pixel(0, 5), &Rgb([20, 20, 200]));
    assert_eq!(strip.get_pixel(99, 5), &Rgb([250, 250, 0]));
}

#[test]
fn test_garment_color_count_override() {
    let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
    let mut garment = Garment::from_foreground(RgbImage::from_fn(16, 16, |x, _| match x % 8 {
        0..=3 => Rgb([30, 60, 160]),
        4 | 5 => Rgb([220, 200, 40]),
        6 => Rgb([240, 240, 240]),
        _ => Rgb([20, 140, 60]),
    }));
    garment.set_color_count(2).unwrap();

    let colors = pipeline.garment_colors(&mut garment).unwrap();
    assert_eq!(colors.len(), 2);
    assert_eq!(colors[0].hex, "#1e3ca0");
    assert!((colors[0].pct - 2.0 / 3.0).abs() < 1e-9);
    let total: f64 = colors.iter().map(|c| c.pct).sum();
    assert!((total - 1.0).abs() < 1e-9);
}

#[cfg(unix)]
#[test]
fn test_command_isolator_round_trip() {
    let mut config = PipelineConfig::default();
    config.extraction.cluster_count = 1;
    config.isolation.method = IsolationMethod::Command {
        program: "cat".into(),
        args: Vec::new(),
    };
    let pipeline = Pipeline::new(config).unwrap();

    let image = RgbImage::from_pixel(6, 6, Rgb([10, 200, 90]));
    let png = pipeline.isolate_background(&encode_png(&image).unwrap()).unwrap();
    assert_eq!(decode_image(&png).unwrap(), image);
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_config_file_drives_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");

    let mut config = PipelineConfig::default();
    config.extraction.cluster_count = 1;
    config.isolation.method = IsolationMethod::border_color();
    config.to_json_file(&path).unwrap();

    let loaded = PipelineConfig::from_json_file(&path).unwrap();
    assert_eq!(loaded, config);

    let pipeline = Pipeline::new(loaded).unwrap();
    let mut outfit = outfit_of(&[[0, 0, 255]]);
    let report = pipeline.analyze_outfit(&mut outfit, &RunControl::new()).unwrap();
    assert_eq!(report.garments[0].colors[0].hex, "#0000ff");
}

#[test]
fn test_partial_config_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("partial.json");
    std::fs::write(&path, r#"{"extraction": {"cluster_count": 6, "denoise": 2}}"#).unwrap();

    let config = PipelineConfig::from_json_file(&path).unwrap();
    assert_eq!(config.extraction.cluster_count, 6);
    assert_eq!(config.extraction.denoise, 2);
    assert_eq!(config.strip, PipelineConfig::default().strip);
}

#[test]
fn test_invalid_config_file_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, r#"{"extraction": {"cluster_count": 3, "denoise": 3}}"#).unwrap();

    assert!(PipelineConfig::from_json_file(&path).is_err());
}

// ============================================================================
// Run Control
// ============================================================================

#[test]
fn test_cancelled_run_produces_no_report() {
    let pipeline = single_color_pipeline();
    let mut outfit = outfit_of(&[[255, 0, 0], [0, 0, 255]]);

    let token = CancelToken::new();
    token.cancel();
    let control = RunControl::new().with_token(token);

    let result = pipeline.analyze_outfit(&mut outfit, &control);
    assert!(matches!(result, Err(AnalysisError::Cancelled)));
}

#[test]
fn test_expired_deadline_aborts_run() {
    let pipeline = single_color_pipeline();
    let mut outfit = outfit_of(&[[255, 0, 0]]);

    let control = RunControl::new().with_deadline(Duration::ZERO);
    std::thread::sleep(Duration::from_millis(2));

    let result = pipeline.analyze_outfit(&mut outfit, &control);
    assert!(matches!(result, Err(AnalysisError::DeadlineExceeded { .. })));
}

// ============================================================================
// Error Handling Tests
// ============================================================================

#[test]
fn test_load_image_file_not_found() {
    let result = load_image(Path::new("nonexistent_file.jpg"));
    assert!(matches!(result, Err(AnalysisError::ImageLoad { .. })));
}

#[test]
fn test_corrupt_garment_bytes() {
    let result = Garment::from_bytes(b"definitely not an image");
    assert!(matches!(result, Err(AnalysisError::ImageLoad { .. })));
}

#[test]
fn test_fully_black_garment_fails_outfit() {
    let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
    let mut outfit = Outfit::new(vec![
        Garment::from_foreground(RgbImage::from_pixel(8, 8, Rgb([200, 0, 0]))),
        Garment::from_foreground(RgbImage::new(8, 8)),
    ]);

    let result = pipeline.analyze_outfit(&mut outfit, &RunControl::new());
    assert!(matches!(result, Err(AnalysisError::EmptyForeground)));
}

#[test]
fn test_invalid_match_request() {
    let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
    let request: MatchRequest = serde_json::from_str(
        r#"{"outfit": [{"colors": [{"r": -1.0, "g": 0.0, "b": 0.0, "pct": 1.0}]}]}"#,
    )
    .unwrap();

    let err = pipeline.check_match(&request).unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidRequest { .. }));
    assert!(!err.is_retryable());
}
