//! Configuration structures for the outfit color pipeline.
//!
//! This module defines all tunable parameters, organized into logical
//! groups for extraction, background isolation, naming, visualization and
//! matching. Every section falls back to its defaults when omitted, so a
//! configuration file only needs the fields it changes.
//!
//! # Configuration Loading
//!
//! ```no_run
//! use outfit_colors::PipelineConfig;
//! use std::path::Path;
//!
//! // Load from file
//! let config = PipelineConfig::from_json_file(Path::new("config.json"))?;
//!
//! // Or use defaults
//! let config = PipelineConfig::default();
//! # Ok::<(), outfit_colors::AnalysisError>(())
//! ```
//!
//! # Configuration Sections
//!
//! - [`ExtractionConfig`]: k-means cluster count, denoise count and seeding
//! - [`IsolationConfig`]: how the garment is separated from its backdrop
//! - [`NamingConfig`]: color space of the reference palette index
//! - [`StripConfig`]: color strip visualization size
//! - [`MatchingConfig`]: which colors feed the outfit rules

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::color::NamingSpace;
use crate::constants::{extraction, isolation, strip};
use crate::{AnalysisError, Result};

/// Complete pipeline configuration.
///
/// Can be serialized to/from JSON for reproducible runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Dominant color extraction
    pub extraction: ExtractionConfig,

    /// Background isolation
    pub isolation: IsolationConfig,

    /// Nearest color naming
    pub naming: NamingConfig,

    /// Color strip rendering
    pub strip: StripConfig,

    /// Outfit matching
    pub matching: MatchingConfig,
}

/// Dominant color extraction parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Number of k-means clusters per garment
    pub cluster_count: usize,

    /// Lowest-share clusters dropped as noise (must be < `cluster_count`)
    pub denoise: usize,

    /// Seed of the first k-means run
    pub seed: u64,

    /// Maximum Lloyd iterations per run
    pub max_iterations: usize,

    /// Centroid shift below which a run has converged
    pub convergence: f64,

    /// Seeded runs per extraction; the best-scoring one is kept
    pub runs: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            cluster_count: extraction::DEFAULT_CLUSTER_COUNT,
            denoise: extraction::DEFAULT_DENOISE,
            seed: extraction::DEFAULT_SEED,
            max_iterations: extraction::DEFAULT_MAX_ITERATIONS,
            convergence: extraction::DEFAULT_CONVERGENCE,
            runs: extraction::DEFAULT_RUNS,
        }
    }
}

/// Background isolation parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IsolationConfig {
    pub method: IsolationMethod,
}

/// How the garment is separated from its backdrop.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IsolationMethod {
    /// Input is already background-free (background pixels are black)
    #[default]
    Passthrough,

    /// Clear pixels close to the color of the image border
    BorderColor {
        /// Minimum ΔE from the backdrop for a pixel to be kept
        min_delta_e: f32,
        /// Border band width used to estimate the backdrop (pixels)
        border_width: u32,
    },

    /// Pipe PNG bytes through an external background-removal program
    Command {
        program: PathBuf,
        #[serde(default)]
        args: Vec<String>,
    },
}

impl IsolationMethod {
    /// Border-color isolation with default thresholds
    pub fn border_color() -> Self {
        IsolationMethod::BorderColor {
            min_delta_e: isolation::DEFAULT_MIN_DELTA_E,
            border_width: isolation::DEFAULT_BORDER_WIDTH,
        }
    }
}

/// Nearest color naming parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    pub space: NamingSpace,
}

/// Color strip visualization size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StripConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for StripConfig {
    fn default() -> Self {
        Self {
            width: strip::DEFAULT_WIDTH,
            height: strip::DEFAULT_HEIGHT,
        }
    }
}

/// Outfit matching parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    pub basis: MatchBasis,
}

/// Which colors of each garment contribute descriptors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchBasis {
    /// One descriptor per garment: its most prevalent color
    #[default]
    Primary,
    /// Every extracted color of every garment
    AllColors,
}

impl PipelineConfig {
    /// Check parameter ranges
    ///
    /// # Errors
    ///
    /// Returns `InvalidClusterCount` for a zero or oversized cluster count and
    /// `InvalidParameter` for any other out-of-range value.
    pub fn validate(&self) -> Result<()> {
        let e = &self.extraction;
        if e.cluster_count == 0 || e.cluster_count > extraction::MAX_CLUSTER_COUNT {
            return Err(AnalysisError::InvalidClusterCount {
                requested: e.cluster_count,
                available: extraction::MAX_CLUSTER_COUNT,
            });
        }
        if e.denoise >= e.cluster_count {
            return Err(AnalysisError::invalid_parameter("extraction.denoise", e.denoise));
        }
        if e.runs == 0 {
            return Err(AnalysisError::invalid_parameter("extraction.runs", e.runs));
        }
        if e.max_iterations == 0 {
            return Err(AnalysisError::invalid_parameter(
                "extraction.max_iterations",
                e.max_iterations,
            ));
        }
        if !(e.convergence.is_finite() && e.convergence >= 0.0) {
            return Err(AnalysisError::invalid_parameter(
                "extraction.convergence",
                e.convergence,
            ));
        }
        if self.strip.width == 0 || self.strip.height == 0 {
            return Err(AnalysisError::invalid_parameter(
                "strip",
                format!("{}x{}", self.strip.width, self.strip.height),
            ));
        }
        match &self.isolation.method {
            IsolationMethod::BorderColor {
                min_delta_e,
                border_width,
            } => {
                if !(min_delta_e.is_finite() && *min_delta_e >= 0.0) {
                    return Err(AnalysisError::invalid_parameter(
                        "isolation.min_delta_e",
                        min_delta_e,
                    ));
                }
                if *border_width == 0 {
                    return Err(AnalysisError::invalid_parameter(
                        "isolation.border_width",
                        border_width,
                    ));
                }
            }
            IsolationMethod::Command { program, .. } if program.as_os_str().is_empty() => {
                return Err(AnalysisError::invalid_parameter("isolation.program", "\"\""));
            }
            _ => {}
        }
        Ok(())
    }

    /// Load configuration from JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AnalysisError::config(format!("cannot read {}", path.display()), e)
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            AnalysisError::config(format!("cannot parse {}", path.display()), e)
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to JSON file
    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| AnalysisError::config("cannot serialize configuration", e))?;
        std::fs::write(path, json).map_err(|e| {
            AnalysisError::config(format!("cannot write {}", path.display()), e)
        })?;
        Ok(())
    }
}
