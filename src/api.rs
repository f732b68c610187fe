//! Request and response records exchanged with the UI/HTTP layer
//!
//! Field names match the JSON the front end sends and expects:
//! color entries are `{r, g, b, hex, pct, name}`, a match request is
//! `{outfit: [{colors: [...]}, ...]}` and its response `{matches: [...]}`.

use serde::{Deserialize, Serialize};

use crate::classify::{ColorDescriptor, OutfitStyle};
use crate::color::extraction::WeightedColor;
use crate::color::{Color, ReferencePalette};
use crate::{AnalysisError, Result};

/// One extracted color
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorEntry {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    /// Lowercase `#rrggbb`; optional in requests
    #[serde(default)]
    pub hex: String,
    /// Share of the garment's foreground
    pub pct: f64,
    /// Nearest reference name; optional in requests
    #[serde(default)]
    pub name: String,
}

impl ColorEntry {
    /// Build an entry from an extraction result, naming it against `palette`
    pub fn from_weighted(weighted: &WeightedColor, palette: &ReferencePalette) -> Self {
        let color = weighted.color;
        Self {
            r: color.red,
            g: color.green,
            b: color.blue,
            hex: color.to_hex(),
            pct: weighted.share,
            name: palette.nearest_name(color).to_string(),
        }
    }

    pub fn color(&self) -> Color {
        Color::new(self.r, self.g, self.b)
    }

    fn validate(&self) -> Result<()> {
        for (channel, value) in [("r", self.r), ("g", self.g), ("b", self.b)] {
            if !(0.0..=255.0).contains(&value) {
                return Err(AnalysisError::InvalidRequest {
                    reason: format!("channel {channel} = {value} is outside 0-255"),
                });
            }
        }
        Ok(())
    }
}

/// Colors of one garment, most prevalent first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorsResponse {
    pub colors: Vec<ColorEntry>,
}

impl ColorsResponse {
    /// The first listed color
    pub fn primary(&self) -> Option<&ColorEntry> {
        self.colors.first()
    }
}

/// Match request: one color list per garment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchRequest {
    pub outfit: Vec<ColorsResponse>,
}

impl MatchRequest {
    /// Check that every garment lists at least one valid color
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` naming the first offending garment.
    pub fn validate(&self) -> Result<()> {
        for (index, garment) in self.outfit.iter().enumerate() {
            if garment.colors.is_empty() {
                return Err(AnalysisError::InvalidRequest {
                    reason: format!("garment {index} has no colors"),
                });
            }
            for entry in &garment.colors {
                entry.validate().map_err(|e| AnalysisError::InvalidRequest {
                    reason: format!("garment {index}: {e}"),
                })?;
            }
        }
        Ok(())
    }
}

impl FromIterator<ColorsResponse> for MatchRequest {
    fn from_iter<I: IntoIterator<Item = ColorsResponse>>(iter: I) -> Self {
        Self {
            outfit: iter.into_iter().collect(),
        }
    }
}

/// Names of the satisfied outfit styles
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResponse {
    pub matches: Vec<String>,
}

impl From<&[OutfitStyle]> for MatchResponse {
    fn from(styles: &[OutfitStyle]) -> Self {
        Self {
            matches: styles.iter().map(|s| s.name().to_string()).collect(),
        }
    }
}

/// Per-garment part of an outfit analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GarmentReport {
    pub colors: Vec<ColorEntry>,
    /// Descriptors that entered the match check for this garment
    pub descriptors: Vec<ColorDescriptor>,
}

/// Result of analyzing a whole outfit from images
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutfitReport {
    pub garments: Vec<GarmentReport>,
    pub matches: Vec<OutfitStyle>,
}

impl OutfitReport {
    pub fn match_names(&self) -> Vec<&'static str> {
        self.matches.iter().map(OutfitStyle::name).collect()
    }
}
