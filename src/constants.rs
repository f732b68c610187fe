//! Default parameters and fixed reference values
//!
//! Clustering defaults, the fuzzy membership parameters used for tone and
//! temperature classification, and visualization sizes.

/// Dominant color extraction defaults
pub mod extraction {
    /// Number of clusters requested when the caller does not override it
    pub const DEFAULT_CLUSTER_COUNT: usize = 4;

    /// Number of lowest-share clusters dropped as noise by default
    pub const DEFAULT_DENOISE: usize = 0;

    /// Clusters dropped as noise when a caller asks for a specific color count
    pub const HEADROOM_DENOISE: usize = 2;

    /// Seed of the first k-means run
    pub const DEFAULT_SEED: u64 = 1;

    /// Maximum Lloyd iterations per k-means run
    pub const DEFAULT_MAX_ITERATIONS: usize = 300;

    /// Largest centroid shift (0-255 RGB units) at which a run counts as converged
    pub const DEFAULT_CONVERGENCE: f64 = 1e-3;

    /// Seeded runs per extraction; the lowest-scoring run is kept
    pub const DEFAULT_RUNS: usize = 3;

    /// Cluster labels are stored as `u8`
    pub const MAX_CLUSTER_COUNT: usize = u8::MAX as usize;
}

/// Fuzzy set parameters for tone and temperature
pub mod fuzzy {
    /// Gaussian width of the hue sets (degrees)
    pub const HUE_SIGMA: f64 = 60.0;

    /// Centers of the WARM, COOL and wrap-around WARM hue sets
    pub const HUE_CENTERS: [f64; 3] = [0.0, 180.0, 360.0];

    /// Centers shared by the five saturation and five value sets
    pub const LEVEL_CENTERS: [f64; 5] = [0.0, 25.0, 50.0, 75.0, 100.0];

    /// Gaussian width of the saturation and value sets
    pub const LEVEL_SIGMA: f64 = 10.0;

    /// Upper bound of the internal tone scale
    pub const TONE_SCALE_MAX: f64 = 11.0;

    /// Sample points used to integrate the aggregated output set
    pub const TONE_SCALE_SAMPLES: usize = 1101;

    /// NEUTRAL output set: trapezoid corners
    pub const NEUTRAL_TRAPEZOID: [f64; 4] = [0.0, 0.0, 1.0, 2.0];

    /// DARK output set: generalized bell (width, slope, center)
    pub const DARK_BELL: [f64; 3] = [2.0, 1.0, 3.0];

    /// BRIGHT output set: generalized bell (width, slope, center)
    pub const BRIGHT_BELL: [f64; 3] = [4.0, 1.0, 9.5];
}

/// Color strip visualization defaults
pub mod strip {
    /// Strip width in pixels
    pub const DEFAULT_WIDTH: u32 = 300;

    /// Strip height in pixels
    pub const DEFAULT_HEIGHT: u32 = 50;
}

/// Background isolation defaults
pub mod isolation {
    /// Minimum ΔE76 from the estimated backdrop for a pixel to count as garment
    pub const DEFAULT_MIN_DELTA_E: f32 = 12.0;

    /// Width of the border band used to estimate the backdrop color (pixels)
    pub const DEFAULT_BORDER_WIDTH: u32 = 4;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_defaults() {
        assert!(extraction::DEFAULT_DENOISE < extraction::DEFAULT_CLUSTER_COUNT);
        assert!(extraction::DEFAULT_CLUSTER_COUNT <= extraction::MAX_CLUSTER_COUNT);
        assert!(extraction::DEFAULT_RUNS > 0);
    }

    #[test]
    fn test_fuzzy_universes() {
        assert_eq!(fuzzy::HUE_CENTERS[2] - fuzzy::HUE_CENTERS[0], 360.0);
        assert!(fuzzy::TONE_SCALE_SAMPLES > 2);
        // Bell centers sit inside the tone scale
        assert!(fuzzy::DARK_BELL[2] < fuzzy::TONE_SCALE_MAX);
        assert!(fuzzy::BRIGHT_BELL[2] < fuzzy::TONE_SCALE_MAX);
    }
}
