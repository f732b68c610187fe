//! Outfit style rules over a list of color descriptors
//!
//! Six independent predicates. Every predicate is evaluated on every call
//! and the names of those that hold are returned in fixed order.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::descriptor::{ColorDescriptor, Temperature, Tone};

/// Named outfit style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutfitStyle {
    Basic,
    Neutral,
    Analogous,
    Contrast,
    Summer,
    Winter,
}

impl OutfitStyle {
    /// All styles in reporting order
    pub const ALL: [OutfitStyle; 6] = [
        OutfitStyle::Basic,
        OutfitStyle::Neutral,
        OutfitStyle::Analogous,
        OutfitStyle::Contrast,
        OutfitStyle::Summer,
        OutfitStyle::Winter,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            OutfitStyle::Basic => "Basic",
            OutfitStyle::Neutral => "Neutral",
            OutfitStyle::Analogous => "Analogous",
            OutfitStyle::Contrast => "Contrast",
            OutfitStyle::Summer => "Summer",
            OutfitStyle::Winter => "Winter",
        }
    }

    /// Human-readable summary of the style's rules
    pub fn description(&self) -> &'static str {
        match self {
            OutfitStyle::Basic => "No more than one bright color; any number of neutral colors",
            OutfitStyle::Neutral => "Only neutral colors",
            OutfitStyle::Analogous => "All colors share the same temperature",
            OutfitStyle::Contrast => "At least one warm color; both dark and bright colors present",
            OutfitStyle::Summer => {
                "At least two warm colors, at least one bright color and at most one dark color"
            }
            OutfitStyle::Winter => "At least one dark color and no bright colors",
        }
    }

    /// Whether the style's predicate holds for `outfit`
    pub fn holds(&self, outfit: &[ColorDescriptor]) -> bool {
        let counts = Counts::of(outfit);
        match self {
            OutfitStyle::Basic => counts.bright <= 1,
            OutfitStyle::Neutral => counts.neutral == counts.total,
            OutfitStyle::Analogous => counts.warm == counts.total || counts.cool == counts.total,
            OutfitStyle::Contrast => counts.warm >= 1 && counts.dark >= 1 && counts.bright >= 1,
            OutfitStyle::Summer => {
                counts.non_neutral_warm >= 2
                    && counts.dark <= 1
                    && counts.non_neutral() - counts.dark >= 1
            }
            OutfitStyle::Winter => counts.dark >= 1 && counts.non_neutral() == counts.dark,
        }
    }
}

impl fmt::Display for OutfitStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tallies shared by the predicates.
///
/// DARK and BRIGHT descriptors are by definition non-neutral, so `dark` and
/// `bright` double as the non-neutral dark and bright counts.
#[derive(Debug, Default)]
struct Counts {
    total: usize,
    neutral: usize,
    dark: usize,
    bright: usize,
    warm: usize,
    cool: usize,
    non_neutral_warm: usize,
}

impl Counts {
    fn of(outfit: &[ColorDescriptor]) -> Self {
        let mut counts = Counts {
            total: outfit.len(),
            ..Counts::default()
        };
        for d in outfit {
            match d.tone {
                Tone::Neutral => counts.neutral += 1,
                Tone::Dark => counts.dark += 1,
                Tone::Bright => counts.bright += 1,
            }
            match d.temperature {
                Temperature::Warm => {
                    counts.warm += 1;
                    if d.tone != Tone::Neutral {
                        counts.non_neutral_warm += 1;
                    }
                }
                Temperature::Cool => counts.cool += 1,
            }
        }
        counts
    }

    fn non_neutral(&self) -> usize {
        self.total - self.neutral
    }
}

/// Styles whose predicate holds, in fixed order
pub fn match_styles(outfit: &[ColorDescriptor]) -> Vec<OutfitStyle> {
    OutfitStyle::ALL
        .into_iter()
        .filter(|style| style.holds(outfit))
        .collect()
}

/// Names of the styles whose predicate holds, in fixed order
pub fn match_names(outfit: &[ColorDescriptor]) -> Vec<&'static str> {
    match_styles(outfit).iter().map(OutfitStyle::name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use Temperature::{Cool, Warm};
    use Tone::{Bright, Dark, Neutral};

    fn outfit(items: &[(Tone, Temperature)]) -> Vec<ColorDescriptor> {
        items
            .iter()
            .map(|&(tone, temperature)| ColorDescriptor::new(tone, temperature))
            .collect()
    }

    #[test]
    fn test_all_neutral_outfit() {
        let o = outfit(&[(Neutral, Warm), (Neutral, Cool), (Neutral, Warm)]);
        assert_eq!(match_names(&o), vec!["Basic", "Neutral"]);
    }

    #[test]
    fn test_contrast_outfit() {
        let o = outfit(&[(Dark, Warm), (Bright, Warm), (Neutral, Cool)]);
        let names = match_names(&o);
        assert!(names.contains(&"Contrast"));
        assert_eq!(names, vec!["Basic", "Contrast", "Summer"]);
    }

    #[test]
    fn test_two_bright_warm_is_summer_not_basic() {
        let o = outfit(&[(Bright, Warm), (Bright, Warm)]);
        assert!(!OutfitStyle::Basic.holds(&o));
        assert!(OutfitStyle::Summer.holds(&o));
        assert_eq!(match_names(&o), vec!["Analogous", "Summer"]);
    }

    #[test]
    fn test_winter_requires_no_bright() {
        let o = outfit(&[(Dark, Cool), (Neutral, Warm), (Dark, Warm)]);
        assert!(OutfitStyle::Winter.holds(&o));

        let o = outfit(&[(Dark, Cool), (Bright, Cool)]);
        assert!(!OutfitStyle::Winter.holds(&o));
    }

    #[test]
    fn test_summer_ignores_neutral_warmth() {
        // Two warm colors, but one is neutral
        let o = outfit(&[(Bright, Warm), (Neutral, Warm), (Dark, Cool)]);
        assert!(!OutfitStyle::Summer.holds(&o));

        // Two dark colors is too many
        let o = outfit(&[(Bright, Warm), (Dark, Warm), (Dark, Warm)]);
        assert!(!OutfitStyle::Summer.holds(&o));
    }

    #[test]
    fn test_analogous_is_strict() {
        let o = outfit(&[(Bright, Cool), (Dark, Cool), (Neutral, Cool)]);
        assert!(OutfitStyle::Analogous.holds(&o));

        // Majority cool is not enough
        let o = outfit(&[(Bright, Cool), (Dark, Cool), (Neutral, Warm)]);
        assert!(!OutfitStyle::Analogous.holds(&o));
    }

    #[test]
    fn test_empty_outfit() {
        assert_eq!(match_names(&[]), vec!["Basic", "Neutral", "Analogous"]);
    }

    #[test]
    fn test_no_match_is_valid() {
        let o = outfit(&[(Bright, Cool), (Bright, Warm)]);
        assert!(match_names(&o).is_empty());
    }

    #[test]
    fn test_style_serializes_by_name() {
        let json = serde_json::to_string(&match_styles(&outfit(&[(Neutral, Cool)]))).unwrap();
        assert_eq!(json, r#"["Basic","Neutral","Analogous"]"#);
        for style in OutfitStyle::ALL {
            assert_eq!(style.to_string(), style.name());
            assert!(!style.description().is_empty());
        }
    }
}
