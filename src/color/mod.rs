//! Color math, naming and dominant color extraction
//!
//! This module handles color space conversions, nearest-name lookup against
//! the CSS3 reference palette, and clustering of garment pixels into ranked
//! representative colors.

pub mod conversion;
pub mod extraction;
pub mod naming;

pub use conversion::{Color, HlsColor, HsvColor};
pub use extraction::{color_strip, DominantColorExtractor, ExtractionKey, WeightedColor};
pub use naming::{NamedColor, NamingSpace, ReferencePalette};
