//! Fuzzy tone and temperature classification of a single color
//!
//! Temperature comes straight from hue: three Gaussian sets centered at 0°
//! (WARM), 180° (COOL) and 360° (the wrap-around copy of WARM) compete and
//! the strongest wins.
//!
//! Tone comes from a Mamdani inference over saturation and value: each rule
//! fires with the min (AND) or max (OR) of its input memberships, clips its
//! output set, the clipped sets are aggregated with max and the result is
//! defuzzified by centroid. The crisp value is then mapped back to whichever
//! output set has the highest membership there.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::membership::{bell, gaussian, trapezoid};
use crate::color::{Color, HsvColor};
use crate::constants::fuzzy::{
    BRIGHT_BELL, DARK_BELL, HUE_CENTERS, HUE_SIGMA, LEVEL_CENTERS, LEVEL_SIGMA,
    NEUTRAL_TRAPEZOID, TONE_SCALE_MAX, TONE_SCALE_SAMPLES,
};

/// Brightness/saturation class of a color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tone {
    Neutral,
    Dark,
    Bright,
}

/// Hue class of a color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Temperature {
    Warm,
    Cool,
}

/// (tone, temperature) pair describing one color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorDescriptor {
    pub tone: Tone,
    pub temperature: Temperature,
}

impl ColorDescriptor {
    pub const fn new(tone: Tone, temperature: Temperature) -> Self {
        Self { tone, temperature }
    }
}

impl Tone {
    pub const ALL: [Tone; 3] = [Tone::Neutral, Tone::Dark, Tone::Bright];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Neutral => "NEUTRAL",
            Tone::Dark => "DARK",
            Tone::Bright => "BRIGHT",
        }
    }

    /// Membership of this tone's output set at a point of the tone scale
    pub fn membership(&self, x: f64) -> f64 {
        match self {
            Tone::Neutral => trapezoid(x, NEUTRAL_TRAPEZOID),
            Tone::Dark => bell(x, DARK_BELL),
            Tone::Bright => bell(x, BRIGHT_BELL),
        }
    }
}

impl Temperature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Temperature::Warm => "WARM",
            Temperature::Cool => "COOL",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ColorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.tone, self.temperature)
    }
}

/// Hue sets, including the wrap-around copy of WARM
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HueSet {
    Warm,
    Cool,
    WarmWrap,
}

impl HueSet {
    const ALL: [HueSet; 3] = [HueSet::Warm, HueSet::Cool, HueSet::WarmWrap];

    fn membership(self, hue: f64) -> f64 {
        let center = match self {
            HueSet::Warm => HUE_CENTERS[0],
            HueSet::Cool => HUE_CENTERS[1],
            HueSet::WarmWrap => HUE_CENTERS[2],
        };
        gaussian(hue, center, HUE_SIGMA)
    }

    fn temperature(self) -> Temperature {
        match self {
            HueSet::Warm | HueSet::WarmWrap => Temperature::Warm,
            HueSet::Cool => Temperature::Cool,
        }
    }
}

/// Saturation input sets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaturationSet {
    Gray,
    VeryFaded,
    Faded,
    Saturated,
    VerySaturated,
}

/// Value (brightness) input sets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSet {
    Black,
    VeryDark,
    Dark,
    Bright,
    VeryBright,
}

/// A single fuzzy proposition over one input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Term {
    Saturation(SaturationSet),
    Value(ValueSet),
}

impl Term {
    fn membership(self, saturation: f64, value: f64) -> f64 {
        match self {
            Term::Saturation(set) => level(set as usize, saturation),
            Term::Value(set) => level(set as usize, value),
        }
    }
}

fn level(index: usize, x: f64) -> f64 {
    gaussian(x, LEVEL_CENTERS[index], LEVEL_SIGMA)
}

/// Rule premise: disjunction or conjunction of terms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Antecedent {
    AnyOf(&'static [Term]),
    AllOf(&'static [Term]),
}

/// `antecedent -> consequent` tone rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub antecedent: Antecedent,
    pub consequent: Tone,
}

impl Rule {
    /// Firing strength: max for OR, min for AND
    pub fn strength(&self, saturation: f64, value: f64) -> f64 {
        match self.antecedent {
            Antecedent::AnyOf(terms) => terms
                .iter()
                .map(|t| t.membership(saturation, value))
                .fold(0.0, f64::max),
            Antecedent::AllOf(terms) => terms
                .iter()
                .map(|t| t.membership(saturation, value))
                .fold(1.0, f64::min),
        }
    }
}

use SaturationSet as S;
use ValueSet as V;

/// The tone rule bank
pub const TONE_RULES: [Rule; 8] = [
    Rule {
        antecedent: Antecedent::AnyOf(&[
            Term::Value(V::Black),
            Term::Saturation(S::Gray),
            Term::Saturation(S::VeryFaded),
        ]),
        consequent: Tone::Neutral,
    },
    Rule {
        antecedent: Antecedent::AllOf(&[Term::Value(V::VeryDark), Term::Saturation(S::Saturated)]),
        consequent: Tone::Neutral,
    },
    Rule {
        antecedent: Antecedent::AllOf(&[Term::Value(V::Dark), Term::Saturation(S::Faded)]),
        consequent: Tone::Dark,
    },
    Rule {
        antecedent: Antecedent::AllOf(&[Term::Value(V::Dark), Term::Saturation(S::VerySaturated)]),
        consequent: Tone::Bright,
    },
    Rule {
        antecedent: Antecedent::AllOf(&[Term::Value(V::Bright), Term::Saturation(S::Saturated)]),
        consequent: Tone::Bright,
    },
    Rule {
        antecedent: Antecedent::AllOf(&[Term::Value(V::VeryBright), Term::Saturation(S::Faded)]),
        consequent: Tone::Bright,
    },
    Rule {
        antecedent: Antecedent::AllOf(&[
            Term::Value(V::VeryBright),
            Term::Saturation(S::VerySaturated),
        ]),
        consequent: Tone::Bright,
    },
    Rule {
        antecedent: Antecedent::AllOf(&[Term::Value(V::VeryDark), Term::Saturation(S::Faded)]),
        consequent: Tone::Neutral,
    },
];

/// Tone/temperature classifier
///
/// Holds the rule bank and the sampled tone scale with the output set
/// memberships precomputed at every sample. Built once and shared; all
/// methods take `&self`.
#[derive(Debug, Clone)]
pub struct FuzzyDescriber {
    rules: Vec<Rule>,
    samples: Vec<f64>,
    // memberships[tone][sample]
    memberships: [Vec<f64>; 3],
}

impl Default for FuzzyDescriber {
    fn default() -> Self {
        Self::new()
    }
}

impl FuzzyDescriber {
    pub fn new() -> Self {
        Self::with_rules(TONE_RULES.to_vec())
    }

    pub fn with_rules(rules: Vec<Rule>) -> Self {
        let step = TONE_SCALE_MAX / (TONE_SCALE_SAMPLES - 1) as f64;
        let samples: Vec<f64> = (0..TONE_SCALE_SAMPLES).map(|i| i as f64 * step).collect();
        let memberships: [Vec<f64>; 3] = Tone::ALL.map(|tone| samples.iter().map(|&x| tone.membership(x)).collect());
        Self {
            rules,
            samples,
            memberships,
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Describe an RGB color
    pub fn describe_color(&self, color: Color) -> ColorDescriptor {
        self.describe(color.to_hsv())
    }

    /// Describe an HSV color (0-360, 0-100, 0-100)
    pub fn describe(&self, hsv: HsvColor) -> ColorDescriptor {
        let descriptor = ColorDescriptor {
            tone: self.tone(hsv.saturation, hsv.value),
            temperature: self.temperature(hsv.hue),
        };
        debug!(
            hue = hsv.hue,
            saturation = hsv.saturation,
            value = hsv.value,
            %descriptor,
            "described color"
        );
        descriptor
    }

    /// Temperature of a hue in degrees
    pub fn temperature(&self, hue: f64) -> Temperature {
        hue_set(hue).temperature()
    }

    /// Tone of a (saturation, value) pair, both percentages
    pub fn tone(&self, saturation: f64, value: f64) -> Tone {
        let crisp = self.tone_scale(saturation, value);
        strongest(Tone::ALL.map(|tone| (tone, tone.membership(crisp))))
    }

    /// Defuzzified position on the internal tone scale
    pub fn tone_scale(&self, saturation: f64, value: f64) -> f64 {
        let saturation = sanitize(saturation);
        let value = sanitize(value);

        // Clipping level of each output set: max strength over its rules
        let mut activation = [0.0f64; 3];
        for rule in &self.rules {
            let slot = &mut activation[rule.consequent as usize];
            *slot = slot.max(rule.strength(saturation, value));
        }

        let mut area = 0.0;
        let mut moment = 0.0;
        for (i, &x) in self.samples.iter().enumerate() {
            let mu = (0..3)
                .map(|t| activation[t].min(self.memberships[t][i]))
                .fold(0.0, f64::max);
            area += mu;
            moment += x * mu;
        }

        if area > 0.0 {
            moment / area
        } else {
            0.0
        }
    }
}

fn sanitize(level: f64) -> f64 {
    if level.is_nan() {
        0.0
    } else {
        level.clamp(0.0, 100.0)
    }
}

fn hue_set(hue: f64) -> HueSet {
    let hue = if hue.is_finite() { hue.rem_euclid(360.0) } else { 0.0 };
    strongest(HueSet::ALL.map(|set| (set, set.membership(hue))))
}

/// First candidate with the highest membership
fn strongest<T: Copy, const N: usize>(candidates: [(T, f64); N]) -> T {
    let (mut best, mut best_membership) = candidates[0];
    for &(candidate, membership) in &candidates[1..] {
        if membership > best_membership {
            best = candidate;
            best_membership = membership;
        }
    }
    best
}
