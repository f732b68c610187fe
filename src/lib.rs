//! # Outfit Colors
//!
//! A Rust crate for judging whether the clothes in an outfit go together.
//!
//! This library:
//! - Separates each garment from its photo backdrop
//! - Extracts a small set of ranked dominant colors with k-means
//! - Names colors against the CSS3 reference palette
//! - Describes each color as a fuzzy (tone, temperature) pair
//! - Checks the outfit against six style rules (Basic, Neutral, Analogous,
//!   Contrast, Summer, Winter)
//!
//! ## Example
//!
//! ```rust,no_run
//! use outfit_colors::image_loader::load_image;
//! use outfit_colors::{Garment, Outfit, Pipeline, PipelineConfig, RunControl};
//! use std::path::Path;
//!
//! let pipeline = Pipeline::new(PipelineConfig::default())?;
//! let mut outfit: Outfit = ["shirt.jpg", "trousers.jpg"]
//!     .iter()
//!     .map(|path| load_image(Path::new(path)).map(Garment::new))
//!     .collect::<outfit_colors::Result<_>>()?;
//!
//! let report = pipeline.analyze_outfit(&mut outfit, &RunControl::new())?;
//! println!("Matches: {:?}", report.match_names());
//! # Ok::<(), outfit_colors::AnalysisError>(())
//! ```

pub mod api;
pub mod classify;
pub mod color;
pub mod config;
pub mod constants;
pub mod detection;
pub mod error;
pub mod garment;
pub mod image_loader;
pub mod pipeline;

pub use api::{ColorEntry, ColorsResponse, GarmentReport, MatchRequest, MatchResponse, OutfitReport};
pub use classify::{ColorDescriptor, FuzzyDescriber, OutfitStyle, Temperature, Tone};
pub use color::{Color, DominantColorExtractor, ReferencePalette, WeightedColor};
pub use config::PipelineConfig;
pub use detection::BackgroundIsolator;
pub use error::{AnalysisError, Result};
pub use garment::{Garment, Outfit};
pub use pipeline::{CancelToken, Pipeline, RunControl};
