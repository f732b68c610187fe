//! End-to-end pipeline: isolate, extract, describe, match
//!
//! [`Pipeline`] owns the long-lived collaborators (extractor, reference
//! palette, fuzzy describer and background isolator), builds them once from
//! a [`PipelineConfig`] and shares them read-only across garments and
//! threads. The three boundary operations are
//! [`Pipeline::isolate_background`], [`Pipeline::extract_colors`] and
//! [`Pipeline::check_match`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use image::RgbImage;
use rayon::prelude::*;
use tracing::{debug, info, instrument};

use crate::api::{ColorEntry, GarmentReport, MatchRequest, MatchResponse, OutfitReport};
use crate::classify::{match_styles, ColorDescriptor, FuzzyDescriber};
use crate::color::extraction::{color_strip, DominantColorExtractor, WeightedColor};
use crate::color::{Color, HsvColor, ReferencePalette};
use crate::config::{MatchBasis, PipelineConfig};
use crate::detection::background::{build_isolator, run_isolator, BackgroundIsolator};
use crate::garment::{Garment, Outfit};
use crate::image_loader::{decode_image, encode_png};
use crate::{AnalysisError, Result};

/// Shared cancellation flag
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Caller-side control over a pipeline run
///
/// Checked before each garment starts; a garment already clustering runs to
/// completion.
#[derive(Debug, Clone)]
pub struct RunControl {
    token: CancelToken,
    started: Instant,
    deadline: Option<Duration>,
}

impl Default for RunControl {
    fn default() -> Self {
        Self::new()
    }
}

impl RunControl {
    /// No deadline, fresh token
    pub fn new() -> Self {
        Self {
            token: CancelToken::new(),
            started: Instant::now(),
            deadline: None,
        }
    }

    /// Abort once `limit` has elapsed since this control was created
    pub fn with_deadline(mut self, limit: Duration) -> Self {
        self.deadline = Some(limit);
        self
    }

    /// Share an existing cancellation token
    pub fn with_token(mut self, token: CancelToken) -> Self {
        self.token = token;
        self
    }

    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    /// # Errors
    ///
    /// Returns `Cancelled` if the token was tripped and `DeadlineExceeded` if
    /// the deadline has passed.
    pub fn check(&self, operation: &str) -> Result<()> {
        if self.token.is_cancelled() {
            return Err(AnalysisError::Cancelled);
        }
        if let Some(limit) = self.deadline {
            let elapsed = self.started.elapsed();
            if elapsed > limit {
                return Err(AnalysisError::DeadlineExceeded {
                    operation: operation.to_string(),
                    elapsed_ms: elapsed.as_millis() as u64,
                    limit_ms: limit.as_millis() as u64,
                });
            }
        }
        Ok(())
    }
}

/// Configured color extraction and outfit matching pipeline
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    extractor: DominantColorExtractor,
    palette: ReferencePalette,
    describer: FuzzyDescriber,
    isolator: Box<dyn BackgroundIsolator>,
}

impl Pipeline {
    /// Build a pipeline, including the isolator named by the configuration
    ///
    /// # Errors
    ///
    /// Returns the validation error of an out-of-range configuration.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let isolator = build_isolator(&config.isolation.method);
        Self::with_isolator(config, isolator)
    }

    /// Build a pipeline around a caller-supplied isolator
    pub fn with_isolator(
        config: PipelineConfig,
        isolator: Box<dyn BackgroundIsolator>,
    ) -> Result<Self> {
        config.validate()?;
        let extractor = DominantColorExtractor::from_config(&config.extraction)?;
        let palette = ReferencePalette::css3(config.naming.space);
        debug!(
            isolator = isolator.name(),
            clusters = extractor.cluster_count(),
            denoise = extractor.denoise(),
            naming = ?palette.space(),
            "pipeline ready"
        );
        Ok(Self {
            config,
            extractor,
            palette,
            describer: FuzzyDescriber::new(),
            isolator,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn extractor(&self) -> &DominantColorExtractor {
        &self.extractor
    }

    pub fn palette(&self) -> &ReferencePalette {
        &self.palette
    }

    pub fn describer(&self) -> &FuzzyDescriber {
        &self.describer
    }

    pub fn isolator(&self) -> &dyn BackgroundIsolator {
        self.isolator.as_ref()
    }

    /// Remove the background from an encoded image
    ///
    /// # Returns
    ///
    /// PNG bytes of the isolated image, background pixels black
    ///
    /// # Errors
    ///
    /// `ImageLoad` for corrupt input, `UpstreamIsolation` if the isolator
    /// fails or returns an image of the wrong size.
    pub fn isolate_background(&self, raw: &[u8]) -> Result<Vec<u8>> {
        let image = decode_image(raw)?;
        let isolated = run_isolator(self.isolator(), &image)?;
        encode_png(&isolated)
    }

    /// Ranked, named dominant colors of a background-isolated image
    pub fn extract_colors(&self, image: &RgbImage) -> Result<Vec<ColorEntry>> {
        self.extract_colors_with(image, &self.extractor)
    }

    /// Same as [`Pipeline::extract_colors`] with caller-chosen parameters
    pub fn extract_colors_with(
        &self,
        image: &RgbImage,
        extractor: &DominantColorExtractor,
    ) -> Result<Vec<ColorEntry>> {
        let colors = extractor.extract(image)?;
        Ok(self.entries(&colors))
    }

    /// Isolate (once) and extract the colors of a garment
    pub fn garment_colors(&self, garment: &mut Garment) -> Result<Vec<ColorEntry>> {
        let colors = garment.colors(self.isolator(), &self.extractor)?;
        Ok(self.entries(colors))
    }

    fn entries(&self, colors: &[WeightedColor]) -> Vec<ColorEntry> {
        colors
            .iter()
            .map(|wc| ColorEntry::from_weighted(wc, &self.palette))
            .collect()
    }

    pub fn describe(&self, color: Color) -> ColorDescriptor {
        self.describer.describe_color(color)
    }

    /// Match names for one primary color per garment
    pub fn check_match_colors(&self, primaries: &[Color]) -> Vec<&'static str> {
        let descriptors: Vec<ColorDescriptor> = primaries.iter().map(|&c| self.describe(c)).collect();
        self.match_descriptors(&descriptors)
    }

    /// Match names for one primary HSV color (0-360, 0-100, 0-100) per garment
    pub fn check_match_hsv(&self, primaries: &[HsvColor]) -> Vec<&'static str> {
        let descriptors: Vec<ColorDescriptor> =
            primaries.iter().map(|&hsv| self.describer.describe(hsv)).collect();
        self.match_descriptors(&descriptors)
    }

    fn match_descriptors(&self, descriptors: &[ColorDescriptor]) -> Vec<&'static str> {
        let styles = match_styles(descriptors);
        debug!(?descriptors, ?styles, "matched outfit");
        styles.iter().map(|s| s.name()).collect()
    }

    /// Answer a match request
    ///
    /// With the `primary` basis each garment contributes its first listed
    /// color; with `all_colors` every listed color contributes.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` if any garment lists no colors or a channel
    /// is out of range. No partial answer is produced.
    pub fn check_match(&self, request: &MatchRequest) -> Result<MatchResponse> {
        request.validate()?;
        let descriptors: Vec<ColorDescriptor> = request
            .outfit
            .iter()
            .flat_map(|garment| {
                let listed = match self.config.matching.basis {
                    MatchBasis::Primary => &garment.colors[..1],
                    MatchBasis::AllColors => &garment.colors[..],
                };
                listed.iter().map(move |entry| self.describe(entry.color()))
            })
            .collect();

        let styles = match_styles(&descriptors);
        info!(
            garments = request.outfit.len(),
            matches = ?styles,
            "checked outfit match"
        );
        Ok(MatchResponse::from(styles.as_slice()))
    }

    /// Render weighted colors as a PNG strip sized by the configuration
    pub fn color_strip_png(&self, colors: &[WeightedColor]) -> Result<Vec<u8>> {
        let strip = color_strip(colors, self.config.strip.width, self.config.strip.height);
        encode_png(&strip)
    }

    /// Isolate, extract, describe and match a whole outfit
    ///
    /// Garments are processed in parallel on the rayon pool. `control` is
    /// checked before each garment starts. Any garment failure aborts the
    /// whole analysis.
    ///
    /// # Errors
    ///
    /// The first garment error encountered, or `Cancelled` /
    /// `DeadlineExceeded` from `control`.
    #[instrument(skip_all, fields(garments = outfit.len()))]
    pub fn analyze_outfit(&self, outfit: &mut Outfit, control: &RunControl) -> Result<OutfitReport> {
        let garments = outfit
            .garments_mut()
            .par_iter_mut()
            .enumerate()
            .map(|(index, garment)| {
                control.check(&format!("garment {index}"))?;
                self.analyze_garment(garment)
            })
            .collect::<Result<Vec<GarmentReport>>>()?;

        let descriptors: Vec<ColorDescriptor> = garments
            .iter()
            .flat_map(|g| g.descriptors.iter().copied())
            .collect();
        let matches = match_styles(&descriptors);
        info!(matches = ?matches, "analyzed outfit");

        Ok(OutfitReport { garments, matches })
    }

    fn analyze_garment(&self, garment: &mut Garment) -> Result<GarmentReport> {
        let colors = garment.colors(self.isolator(), &self.extractor)?;
        let contributing = match self.config.matching.basis {
            MatchBasis::Primary => &colors[..1.min(colors.len())],
            MatchBasis::AllColors => colors,
        };
        let descriptors = contributing
            .iter()
            .map(|wc| self.describe(wc.color))
            .collect();
        Ok(GarmentReport {
            colors: self.entries(colors),
            descriptors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{Temperature, Tone};
    use crate::config::IsolationMethod;
    use image::Rgb;

    fn solid(rgb: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(8, 8, Rgb(rgb))
    }

    fn two_tone(main: [u8; 3], accent: [u8; 3]) -> RgbImage {
        RgbImage::from_fn(10, 10, |x, _| if x < 7 { Rgb(main) } else { Rgb(accent) })
    }

    fn pipeline() -> Pipeline {
        Pipeline::new(PipelineConfig::default()).unwrap()
    }

    #[test]
    fn test_run_control_cancel() {
        let control = RunControl::new();
        assert!(control.check("start").is_ok());
        control.token().cancel();
        assert!(matches!(control.check("garment 0"), Err(AnalysisError::Cancelled)));
    }

    #[test]
    fn test_run_control_deadline() {
        let control = RunControl::new().with_deadline(Duration::ZERO);
        std::thread::sleep(Duration::from_millis(2));
        match control.check("garment 1") {
            Err(AnalysisError::DeadlineExceeded { operation, limit_ms, .. }) => {
                assert_eq!(operation, "garment 1");
                assert_eq!(limit_ms, 0);
            }
            other => panic!("expected deadline error, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = PipelineConfig::default();
        config.extraction.denoise = 9;
        assert!(Pipeline::new(config).is_err());
    }

    #[test]
    fn test_extract_colors_names_and_hex() {
        let mut config = PipelineConfig::default();
        config.extraction.cluster_count = 2;
        let pipeline = Pipeline::new(config).unwrap();

        let colors = pipeline.extract_colors(&two_tone([255, 0, 0], [255, 255, 255])).unwrap();
        assert_eq!(colors.len(), 2);
        assert_eq!(colors[0].hex, "#ff0000");
        assert_eq!(colors[0].name, "red");
        assert!((colors[0].pct - 0.7).abs() < 1e-12);
        assert_eq!(colors[1].name, "white");
    }

    #[test]
    fn test_isolate_background_returns_png() {
        let mut config = PipelineConfig::default();
        config.isolation.method = IsolationMethod::border_color();
        let pipeline = Pipeline::new(config).unwrap();

        let image = RgbImage::from_fn(16, 16, |x, y| {
            if (5..11).contains(&x) && (5..11).contains(&y) {
                Rgb([20, 120, 40])
            } else {
                Rgb([250, 250, 250])
            }
        });
        let png = pipeline.isolate_background(&encode_png(&image).unwrap()).unwrap();
        let isolated = decode_image(&png).unwrap();
        assert_eq!(isolated.dimensions(), (16, 16));
        assert_eq!(isolated.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(isolated.get_pixel(8, 8), &Rgb([20, 120, 40]));
    }

    #[test]
    fn test_isolate_background_rejects_corrupt_bytes() {
        let result = pipeline().isolate_background(b"\x89PNG garbage");
        assert!(matches!(result, Err(AnalysisError::ImageLoad { .. })));
    }

    #[test]
    fn test_check_match_uses_first_listed_color() {
        let request: MatchRequest = serde_json::from_str(
            r#"{"outfit": [
                {"colors": [{"r": 255.0, "g": 0.0, "b": 0.0, "pct": 0.6},
                            {"r": 0.0, "g": 0.0, "b": 255.0, "pct": 0.4}]},
                {"colors": [{"r": 255.0, "g": 0.0, "b": 0.0, "pct": 1.0}]}
            ]}"#,
        )
        .unwrap();

        let response = pipeline().check_match(&request).unwrap();
        assert_eq!(response.matches, vec!["Analogous", "Summer"]);

        let mut config = PipelineConfig::default();
        config.matching.basis = MatchBasis::AllColors;
        let all = Pipeline::new(config).unwrap().check_match(&request).unwrap();
        // Three bright colors rule out Basic; the blue rules out Analogous
        assert_eq!(all.matches, vec!["Summer"]);
    }

    #[test]
    fn test_check_match_rejects_empty_garment() {
        let request = MatchRequest {
            outfit: vec![Default::default()],
        };
        assert!(matches!(
            pipeline().check_match(&request),
            Err(AnalysisError::InvalidRequest { .. })
        ));
    }

    #[test]
    fn test_check_match_colors_and_hsv_agree() {
        let pipeline = pipeline();
        let colors = [Color::new(128.0, 128.0, 128.0), Color::new(0.0, 0.0, 0.0)];
        let hsv: Vec<HsvColor> = colors.iter().map(|c| c.to_hsv()).collect();
        assert_eq!(pipeline.check_match_colors(&colors), vec!["Basic", "Neutral", "Analogous"]);
        assert_eq!(pipeline.check_match_hsv(&hsv), pipeline.check_match_colors(&colors));
    }

    #[test]
    fn test_analyze_outfit() {
        let pipeline = pipeline();
        let mut outfit = Outfit::new(vec![
            Garment::new(two_tone([128, 64, 64], [250, 250, 250])),
            Garment::new(two_tone([255, 0, 0], [0, 0, 255])),
        ]);
        for garment in outfit.garments_mut() {
            garment.set_color_count(1).unwrap();
        }

        let report = pipeline.analyze_outfit(&mut outfit, &RunControl::new()).unwrap();
        assert_eq!(report.garments.len(), 2);
        assert_eq!(
            report.garments[0].descriptors,
            vec![ColorDescriptor::new(Tone::Dark, Temperature::Warm)]
        );
        assert_eq!(
            report.garments[1].descriptors,
            vec![ColorDescriptor::new(Tone::Bright, Temperature::Warm)]
        );
        assert_eq!(report.match_names(), vec!["Basic", "Analogous", "Contrast", "Summer"]);
    }

    #[test]
    fn test_analyze_outfit_aborts_on_failed_garment() {
        let pipeline = pipeline();
        let mut outfit = Outfit::new(vec![
            Garment::new(solid([200, 30, 30])),
            Garment::new(solid([0, 0, 0])),
        ]);
        let result = pipeline.analyze_outfit(&mut outfit, &RunControl::new());
        assert!(matches!(result, Err(AnalysisError::EmptyForeground)));
    }

    #[test]
    fn test_analyze_outfit_cancelled_before_start() {
        let pipeline = pipeline();
        let mut outfit = Outfit::new(vec![Garment::new(solid([200, 30, 30]))]);
        let control = RunControl::new();
        control.token().cancel();
        let result = pipeline.analyze_outfit(&mut outfit, &control);
        assert!(matches!(result, Err(AnalysisError::Cancelled)));
        assert!(outfit.garments()[0].cached_colors().is_none());
    }

    #[test]
    fn test_color_strip_png() {
        let pipeline = pipeline();
        let colors = [
            WeightedColor { color: Color::new(255.0, 0.0, 0.0), share: 0.5 },
            WeightedColor { color: Color::new(0.0, 0.0, 255.0), share: 0.5 },
        ];
        let png = pipeline.color_strip_png(&colors).unwrap();
        let strip = decode_image(&png).unwrap();
        assert_eq!(strip.dimensions(), (300, 50));
        assert_eq!(strip.get_pixel(0, 0), &Rgb([255, 0, 0]));
        assert_eq!(strip.get_pixel(299, 49), &Rgb([0, 0, 255]));
    }
}
