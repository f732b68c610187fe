//! Dominant color extraction from background-isolated images
//!
//! Reduces the foreground pixel population of a garment image to a ranked
//! list of representative colors:
//! - Background pixels (channel sum of zero) are excluded
//! - Remaining pixels are clustered with seeded k-means
//! - Each non-empty cluster's mean color and share of the foreground are
//!   computed from the labels; clusters no pixel landed in are dropped
//! - Optionally the lowest-share clusters are dropped as noise and the
//!   remaining shares renormalized
//! - Clusters are ranked by share, ties keeping their label order

use std::cmp::Ordering;

use image::{Rgb, RgbImage};
use kmeans_colors::{get_kmeans, Kmeans};
use palette::Srgb;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::conversion::Color;
use crate::config::ExtractionConfig;
use crate::constants::extraction::{
    DEFAULT_CLUSTER_COUNT, DEFAULT_CONVERGENCE, DEFAULT_DENOISE, DEFAULT_MAX_ITERATIONS,
    DEFAULT_RUNS, DEFAULT_SEED, MAX_CLUSTER_COUNT,
};
use crate::{AnalysisError, Result};

/// A representative color and the fraction of foreground pixels it covers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedColor {
    pub color: Color,
    pub share: f64,
}

/// Parameters that fully determine an extraction result for a given image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExtractionKey {
    pub cluster_count: usize,
    pub denoise: usize,
    pub seed: u64,
}

/// Seeded k-means dominant color extractor
#[derive(Debug, Clone)]
pub struct DominantColorExtractor {
    cluster_count: usize,
    denoise: usize,
    seed: u64,
    max_iterations: usize,
    convergence: f64,
    runs: usize,
}

impl Default for DominantColorExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl DominantColorExtractor {
    /// Create an extractor with default parameters (K = 4, no denoise)
    pub fn new() -> Self {
        Self {
            cluster_count: DEFAULT_CLUSTER_COUNT,
            denoise: DEFAULT_DENOISE,
            seed: DEFAULT_SEED,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            convergence: DEFAULT_CONVERGENCE,
            runs: DEFAULT_RUNS,
        }
    }

    /// Create an extractor with a custom cluster count and denoise count
    ///
    /// # Errors
    ///
    /// Returns `InvalidClusterCount` if `cluster_count` is zero or too large
    /// for the label type, and `InvalidParameter` if `denoise` would drop
    /// every cluster.
    pub fn with_params(cluster_count: usize, denoise: usize) -> Result<Self> {
        validate_counts(cluster_count, denoise)?;
        Ok(Self {
            cluster_count,
            denoise,
            ..Self::new()
        })
    }

    /// Create an extractor from a configuration section
    pub fn from_config(config: &ExtractionConfig) -> Result<Self> {
        validate_counts(config.cluster_count, config.denoise)?;
        if config.runs == 0 {
            return Err(AnalysisError::invalid_parameter("runs", config.runs));
        }
        Ok(Self {
            cluster_count: config.cluster_count,
            denoise: config.denoise,
            seed: config.seed,
            max_iterations: config.max_iterations,
            convergence: config.convergence,
            runs: config.runs,
        })
    }

    /// Same parameters, different cluster and denoise counts
    pub fn with_counts(&self, cluster_count: usize, denoise: usize) -> Result<Self> {
        validate_counts(cluster_count, denoise)?;
        Ok(Self {
            cluster_count,
            denoise,
            ..self.clone()
        })
    }

    pub fn cluster_count(&self) -> usize {
        self.cluster_count
    }

    pub fn denoise(&self) -> usize {
        self.denoise
    }

    /// Key identifying results produced by this extractor
    pub fn key(&self) -> ExtractionKey {
        ExtractionKey {
            cluster_count: self.cluster_count,
            denoise: self.denoise,
            seed: self.seed,
        }
    }

    /// Extract ranked dominant colors from a background-isolated image
    ///
    /// # Returns
    ///
    /// At most `cluster_count - denoise` weighted colors (fewer when some
    /// clusters stay empty), most prevalent first, every share positive and
    /// the shares summing to 1
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError` if:
    /// - The image has no foreground pixels (`EmptyForeground`)
    /// - There are fewer foreground pixels than clusters (`InvalidClusterCount`)
    pub fn extract(&self, image: &RgbImage) -> Result<Vec<WeightedColor>> {
        let pixels = foreground_pixels(image);
        self.extract_from_pixels(&pixels)
    }

    /// Extract ranked dominant colors from an already-filtered pixel set
    pub fn extract_from_pixels(&self, pixels: &[[u8; 3]]) -> Result<Vec<WeightedColor>> {
        if pixels.is_empty() {
            return Err(AnalysisError::EmptyForeground);
        }
        if self.cluster_count > pixels.len() {
            return Err(AnalysisError::InvalidClusterCount {
                requested: self.cluster_count,
                available: pixels.len(),
            });
        }

        let points: Vec<Srgb> = pixels
            .iter()
            .map(|p| Srgb::new(p[0], p[1], p[2]).into_format::<f32>())
            .collect();

        let clustering = self.best_run(&points);
        let ranked = rank_clusters(&clustering.indices, pixels, self.cluster_count);
        if ranked.len() < self.cluster_count {
            warn!(
                clusters = self.cluster_count,
                non_empty = ranked.len(),
                "k-means left clusters empty; the foreground has fewer distinct colors than requested"
            );
        }

        let colors = denoise(ranked, self.denoise);
        debug!(
            pixels = pixels.len(),
            clusters = self.cluster_count,
            kept = colors.len(),
            primary_share = colors.first().map(|wc| wc.share),
            "extracted dominant colors"
        );
        Ok(colors)
    }

    /// Run k-means once per configured seed and keep the lowest score.
    /// Equal scores keep the earlier run.
    fn best_run(&self, points: &[Srgb]) -> Kmeans<Srgb> {
        let converge = self.convergence as f32;
        let mut best = get_kmeans(
            self.cluster_count,
            self.max_iterations,
            converge,
            false,
            points,
            self.seed,
        );
        for run in 1..self.runs {
            let candidate = get_kmeans(
                self.cluster_count,
                self.max_iterations,
                converge,
                false,
                points,
                self.seed.wrapping_add(run as u64),
            );
            if candidate.score < best.score {
                best = candidate;
            }
        }
        best
    }
}

fn validate_counts(cluster_count: usize, denoise: usize) -> Result<()> {
    if cluster_count == 0 || cluster_count > MAX_CLUSTER_COUNT {
        return Err(AnalysisError::InvalidClusterCount {
            requested: cluster_count,
            available: MAX_CLUSTER_COUNT,
        });
    }
    if denoise >= cluster_count {
        return Err(AnalysisError::invalid_parameter("denoise", denoise));
    }
    Ok(())
}

/// Collect every pixel whose channel sum is nonzero
pub fn foreground_pixels(image: &RgbImage) -> Vec<[u8; 3]> {
    image
        .pixels()
        .filter(|p| p.0.iter().any(|&c| c != 0))
        .map(|p| p.0)
        .collect()
}

/// Mean color and share of every non-empty label, sorted by share
/// descending. The sort is stable so equal shares keep label order.
fn rank_clusters(indices: &[u8], pixels: &[[u8; 3]], cluster_count: usize) -> Vec<WeightedColor> {
    let mut sums = vec![[0.0f64; 3]; cluster_count];
    let mut counts = vec![0usize; cluster_count];
    for (&label, pixel) in indices.iter().zip(pixels) {
        let sum = &mut sums[label as usize];
        for (acc, &channel) in sum.iter_mut().zip(pixel) {
            *acc += f64::from(channel);
        }
        counts[label as usize] += 1;
    }

    let total = pixels.len() as f64;
    let mut ranked: Vec<WeightedColor> = sums
        .iter()
        .zip(&counts)
        .filter(|(_, count)| **count > 0)
        .map(|(sum, &count)| {
            let n = count as f64;
            WeightedColor {
                color: Color::new(sum[0] / n, sum[1] / n, sum[2] / n),
                share: count as f64 / total,
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.share.partial_cmp(&a.share).unwrap_or(Ordering::Equal));
    ranked
}

/// Drop the `count` lowest-share entries and renormalize the rest.
/// The most prevalent color always survives.
fn denoise(mut ranked: Vec<WeightedColor>, count: usize) -> Vec<WeightedColor> {
    ranked.truncate(ranked.len().saturating_sub(count).max(1));
    let total: f64 = ranked.iter().map(|wc| wc.share).sum();
    if count > 0 && total > 0.0 {
        for wc in &mut ranked {
            wc.share /= total;
        }
    }
    ranked
}

/// Segment widths for a color strip of `width` pixels
///
/// Each segment is `round(share * width)`; the last segment absorbs the
/// rounding slack so the widths always sum to `width`.
pub fn segment_widths(shares: &[f64], width: u32) -> Vec<u32> {
    let Some((_, leading)) = shares.split_last() else {
        return Vec::new();
    };

    let mut widths = Vec::with_capacity(shares.len());
    let mut used = 0u32;
    for share in leading {
        let segment = (share.max(0.0) * f64::from(width)).round() as u32;
        let segment = segment.min(width - used);
        used += segment;
        widths.push(segment);
    }
    widths.push(width - used);
    widths
}

/// Render weighted colors as a horizontal strip, one proportional block per color
pub fn color_strip(colors: &[WeightedColor], width: u32, height: u32) -> RgbImage {
    let shares: Vec<f64> = colors.iter().map(|wc| wc.share).collect();
    let widths = segment_widths(&shares, width);

    let mut strip = RgbImage::new(width, height);
    let mut x0 = 0u32;
    for (wc, segment) in colors.iter().zip(widths) {
        let pixel = Rgb(wc.color.to_rgb8());
        for x in x0..x0 + segment {
            for y in 0..height {
                strip.put_pixel(x, y, pixel);
            }
        }
        x0 += segment;
    }
    strip
}
