//! Perceptual color description and outfit style matching
//!
//! - [`membership`]: closed-form fuzzy membership functions
//! - [`descriptor`]: fuzzy (tone, temperature) classification of one color
//! - [`outfit`]: style predicates over a list of descriptors

pub mod descriptor;
pub mod membership;
pub mod outfit;

pub use descriptor::{ColorDescriptor, FuzzyDescriber, Temperature, Tone};
pub use outfit::{match_names, match_styles, OutfitStyle};
