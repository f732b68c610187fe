//! Garments and outfits
//!
//! A [`Garment`] owns its decoded source image and memoizes the two derived
//! values the pipeline needs: the background-isolated foreground (computed
//! once) and the ranked dominant colors (recomputed only when the
//! extraction parameters change).

use image::RgbImage;

use crate::color::extraction::{DominantColorExtractor, ExtractionKey, WeightedColor};
use crate::constants::extraction::{HEADROOM_DENOISE, MAX_CLUSTER_COUNT};
use crate::detection::background::{run_isolator, BackgroundIsolator};
use crate::image_loader::decode_image;
use crate::{AnalysisError, Result};

/// One article of clothing
#[derive(Debug, Clone)]
pub struct Garment {
    source: RgbImage,
    foreground: Option<RgbImage>,
    color_count: Option<usize>,
    colors: Option<(ExtractionKey, Vec<WeightedColor>)>,
}

impl Garment {
    /// Wrap an already decoded image
    pub fn new(source: RgbImage) -> Self {
        Self {
            source,
            foreground: None,
            color_count: None,
            colors: None,
        }
    }

    /// Decode raw image bytes
    ///
    /// # Errors
    ///
    /// Returns `ImageLoad` for corrupt or unsupported bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self::new(decode_image(bytes)?))
    }

    /// Wrap an image whose background has already been removed
    pub fn from_foreground(foreground: RgbImage) -> Self {
        Self {
            foreground: Some(foreground.clone()),
            ..Self::new(foreground)
        }
    }

    pub fn source(&self) -> &RgbImage {
        &self.source
    }

    pub fn is_isolated(&self) -> bool {
        self.foreground.is_some()
    }

    /// Background-isolated image, computed on first use
    pub fn foreground(&mut self, isolator: &dyn BackgroundIsolator) -> Result<&RgbImage> {
        memoized_foreground(&mut self.foreground, &self.source, isolator)
    }

    /// Request a specific number of reported colors
    ///
    /// Clustering then runs with `count` plus two extra clusters, and the two
    /// smallest are discarded as noise. Changing the count drops any
    /// memoized colors.
    ///
    /// # Errors
    ///
    /// Returns `InvalidClusterCount` if `count` is zero or leaves no room for
    /// the extra clusters.
    pub fn set_color_count(&mut self, count: usize) -> Result<()> {
        if count == 0 || count + HEADROOM_DENOISE > MAX_CLUSTER_COUNT {
            return Err(AnalysisError::InvalidClusterCount {
                requested: count,
                available: MAX_CLUSTER_COUNT - HEADROOM_DENOISE,
            });
        }
        if self.color_count != Some(count) {
            self.color_count = Some(count);
            self.colors = None;
        }
        Ok(())
    }

    pub fn color_count(&self) -> Option<usize> {
        self.color_count
    }

    /// The extractor this garment would use given the pipeline's default
    pub fn extractor_for(&self, base: &DominantColorExtractor) -> Result<DominantColorExtractor> {
        match self.color_count {
            Some(count) => base.with_counts(count + HEADROOM_DENOISE, HEADROOM_DENOISE),
            None => Ok(base.clone()),
        }
    }

    /// Ranked dominant colors, isolating the background first if needed
    ///
    /// # Errors
    ///
    /// Propagates isolation and extraction failures; nothing is cached for
    /// a failed attempt.
    pub fn colors(
        &mut self,
        isolator: &dyn BackgroundIsolator,
        base: &DominantColorExtractor,
    ) -> Result<&[WeightedColor]> {
        let extractor = self.extractor_for(base)?;
        let key = extractor.key();

        let entry = match self.colors.take() {
            Some((cached, colors)) if cached == key => (cached, colors),
            _ => {
                let foreground = memoized_foreground(&mut self.foreground, &self.source, isolator)?;
                (key, extractor.extract(foreground)?)
            }
        };
        Ok(self.colors.insert(entry).1.as_slice())
    }

    /// Most prevalent color
    pub fn primary_color(
        &mut self,
        isolator: &dyn BackgroundIsolator,
        base: &DominantColorExtractor,
    ) -> Result<WeightedColor> {
        self.colors(isolator, base)?
            .first()
            .copied()
            .ok_or(AnalysisError::EmptyForeground)
    }

    /// Colors memoized by the last successful extraction
    pub fn cached_colors(&self) -> Option<&[WeightedColor]> {
        self.colors.as_ref().map(|(_, colors)| colors.as_slice())
    }
}

fn memoized_foreground<'a>(
    slot: &'a mut Option<RgbImage>,
    source: &RgbImage,
    isolator: &dyn BackgroundIsolator,
) -> Result<&'a RgbImage> {
    let foreground = match slot.take() {
        Some(foreground) => foreground,
        None => run_isolator(isolator, source)?,
    };
    let foreground: &RgbImage = slot.insert(foreground);
    Ok(foreground)
}

/// Ordered collection of garments, built per request
#[derive(Debug, Clone, Default)]
pub struct Outfit {
    garments: Vec<Garment>,
}

impl Outfit {
    pub fn new(garments: Vec<Garment>) -> Self {
        Self { garments }
    }

    pub fn push(&mut self, garment: Garment) {
        self.garments.push(garment);
    }

    pub fn len(&self) -> usize {
        self.garments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.garments.is_empty()
    }

    pub fn garments(&self) -> &[Garment] {
        &self.garments
    }

    pub fn garments_mut(&mut self) -> &mut [Garment] {
        &mut self.garments
    }

    pub fn iter(&self) -> impl Iterator<Item = &Garment> {
        self.garments.iter()
    }
}

impl FromIterator<Garment> for Outfit {
    fn from_iter<I: IntoIterator<Item = Garment>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
