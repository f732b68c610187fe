//! Nearest-name lookup against the CSS3 named colors
//!
//! The reference table is built once and indexed in a single color space
//! (RGB by default, optionally HLS). Queries are converted into the same
//! space before the Euclidean nearest-neighbor search.

use serde::{Deserialize, Serialize};

use super::conversion::Color;

/// Space the reference palette is indexed by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingSpace {
    /// Euclidean distance over 0-255 RGB channels
    #[default]
    Rgb,
    /// Euclidean distance over unit-scale hue, lightness, saturation
    Hls,
}

/// A named reference color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedColor {
    pub name: &'static str,
    pub rgb: [u8; 3],
}

/// Read-only nearest-neighbor index over the named colors
#[derive(Debug, Clone)]
pub struct ReferencePalette {
    space: NamingSpace,
    entries: Vec<(NamedColor, [f64; 3])>,
}

impl Default for ReferencePalette {
    fn default() -> Self {
        Self::css3(NamingSpace::default())
    }
}

impl ReferencePalette {
    /// Build the CSS3 palette indexed in `space`
    pub fn css3(space: NamingSpace) -> Self {
        let entries = CSS3_COLORS
            .iter()
            .map(|&(name, rgb)| {
                let named = NamedColor { name, rgb };
                (named, project(space, Color::from_rgb8(rgb)))
            })
            .collect();
        Self { space, entries }
    }

    pub fn space(&self) -> NamingSpace {
        self.space
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NamedColor> {
        self.entries.iter().map(|(named, _)| named)
    }

    /// Closest reference entry; ties go to the earlier entry
    pub fn nearest(&self, color: Color) -> &NamedColor {
        let query = project(self.space, color);
        let mut best = &self.entries[0];
        let mut best_distance = squared_distance(&query, &best.1);
        for entry in &self.entries[1..] {
            let distance = squared_distance(&query, &entry.1);
            if distance < best_distance {
                best = entry;
                best_distance = distance;
            }
        }
        &best.0
    }

    /// Name of the closest reference entry
    pub fn nearest_name(&self, color: Color) -> &'static str {
        self.nearest(color).name
    }
}

fn project(space: NamingSpace, color: Color) -> [f64; 3] {
    match space {
        NamingSpace::Rgb => [color.red, color.green, color.blue],
        NamingSpace::Hls => {
            let hls = color.to_hls();
            [hls.hue, hls.lightness, hls.saturation]
        }
    }
}

fn squared_distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// CSS3 extended color keywords, one name per distinct value.
///
/// Spelling aliases are collapsed onto a single entry so every value names
/// itself: `#00ffff` is cyan, `#ff00ff` magenta and the grays use `gray`.
const CSS3_COLORS: &[(&str, [u8; 3])] = &[
    ("aliceblue", [240, 248, 255]),
    ("antiquewhite", [250, 235, 215]),
    ("aquamarine", [127, 255, 212]),
    ("azure", [240, 255, 255]),
    ("beige", [245, 245, 220]),
    ("bisque", [255, 228, 196]),
    ("black", [0, 0, 0]),
    ("blanchedalmond", [255, 235, 205]),
    ("blue", [0, 0, 255]),
    ("blueviolet", [138, 43, 226]),
    ("brown", [165, 42, 42]),
    ("burlywood", [222, 184, 135]),
    ("cadetblue", [95, 158, 160]),
    ("chartreuse", [127, 255, 0]),
    ("chocolate", [210, 105, 30]),
    ("coral", [255, 127, 80]),
    ("cornflowerblue", [100, 149, 237]),
    ("cornsilk", [255, 248, 220]),
    ("crimson", [220, 20, 60]),
    ("cyan", [0, 255, 255]),
    ("darkblue", [0, 0, 139]),
    ("darkcyan", [0, 139, 139]),
    ("darkgoldenrod", [184, 134, 11]),
    ("darkgray", [169, 169, 169]),
    ("darkgreen", [0, 100, 0]),
    ("darkkhaki", [189, 183, 107]),
    ("darkmagenta", [139, 0, 139]),
    ("darkolivegreen", [85, 107, 47]),
    ("darkorange", [255, 140, 0]),
    ("darkorchid", [153, 50, 204]),
    ("darkred", [139, 0, 0]),
    ("darksalmon", [233, 150, 122]),
    ("darkseagreen", [143, 188, 143]),
    ("darkslateblue", [72, 61, 139]),
    ("darkslategray", [47, 79, 79]),
    ("darkturquoise", [0, 206, 209]),
    ("darkviolet", [148, 0, 211]),
    ("deeppink", [255, 20, 147]),
    ("deepskyblue", [0, 191, 255]),
    ("dimgray", [105, 105, 105]),
    ("dodgerblue", [30, 144, 255]),
    ("firebrick", [178, 34, 34]),
    ("floralwhite", [255, 250, 240]),
    ("forestgreen", [34, 139, 34]),
    ("gainsboro", [220, 220, 220]),
    ("ghostwhite", [248, 248, 255]),
    ("gold", [255, 215, 0]),
    ("goldenrod", [218, 165, 32]),
    ("gray", [128, 128, 128]),
    ("green", [0, 128, 0]),
    ("greenyellow", [173, 255, 47]),
    ("honeydew", [240, 255, 240]),
    ("hotpink", [255, 105, 180]),
    ("indianred", [205, 92, 92]),
    ("indigo", [75, 0, 130]),
    ("ivory", [255, 255, 240]),
    ("khaki", [240, 230, 140]),
    ("lavender", [230, 230, 250]),
    ("lavenderblush", [255, 240, 245]),
    ("lawngreen", [124, 252, 0]),
    ("lemonchiffon", [255, 250, 205]),
    ("lightblue", [173, 216, 230]),
    ("lightcoral", [240, 128, 128]),
    ("lightcyan", [224, 255, 255]),
    ("lightgoldenrodyellow", [250, 250, 210]),
    ("lightgray", [211, 211, 211]),
    ("lightgreen", [144, 238, 144]),
    ("lightpink", [255, 182, 193]),
    ("lightsalmon", [255, 160, 122]),
    ("lightseagreen", [32, 178, 170]),
    ("lightskyblue", [135, 206, 250]),
    ("lightslategray", [119, 136, 153]),
    ("lightsteelblue", [176, 196, 222]),
    ("lightyellow", [255, 255, 224]),
    ("lime", [0, 255, 0]),
    ("limegreen", [50, 205, 50]),
    ("linen", [250, 240, 230]),
    ("magenta", [255, 0, 255]),
    ("maroon", [128, 0, 0]),
    ("mediumaquamarine", [102, 205, 170]),
    ("mediumblue", [0, 0, 205]),
    ("mediumorchid", [186, 85, 211]),
    ("mediumpurple", [147, 112, 219]),
    ("mediumseagreen", [60, 179, 113]),
    ("mediumslateblue", [123, 104, 238]),
    ("mediumspringgreen", [0, 250, 154]),
    ("mediumturquoise", [72, 209, 204]),
    ("mediumvioletred", [199, 21, 133]),
    ("midnightblue", [25, 25, 112]),
    ("mintcream", [245, 255, 250]),
    ("mistyrose", [255, 228, 225]),
    ("moccasin", [255, 228, 181]),
    ("navajowhite", [255, 222, 173]),
    ("navy", [0, 0, 128]),
    ("oldlace", [253, 245, 230]),
    ("olive", [128, 128, 0]),
    ("olivedrab", [107, 142, 35]),
    ("orange", [255, 165, 0]),
    ("orangered", [255, 69, 0]),
    ("orchid", [218, 112, 214]),
    ("palegoldenrod", [238, 232, 170]),
    ("palegreen", [152, 251, 152]),
    ("paleturquoise", [175, 238, 238]),
    ("palevioletred", [219, 112, 147]),
    ("papayawhip", [255, 239, 213]),
    ("peachpuff", [255, 218, 185]),
    ("peru", [205, 133, 63]),
    ("pink", [255, 192, 203]),
    ("plum", [221, 160, 221]),
    ("powderblue", [176, 224, 230]),
    ("purple", [128, 0, 128]),
    ("red", [255, 0, 0]),
    ("rosybrown", [188, 143, 143]),
    ("royalblue", [65, 105, 225]),
    ("saddlebrown", [139, 69, 19]),
    ("salmon", [250, 128, 114]),
    ("sandybrown", [244, 164, 96]),
    ("seagreen", [46, 139, 87]),
    ("seashell", [255, 245, 238]),
    ("sienna", [160, 82, 45]),
    ("silver", [192, 192, 192]),
    ("skyblue", [135, 206, 235]),
    ("slateblue", [106, 90, 205]),
    ("slategray", [112, 128, 144]),
    ("snow", [255, 250, 250]),
    ("springgreen", [0, 255, 127]),
    ("steelblue", [70, 130, 180]),
    ("tan", [210, 180, 140]),
    ("teal", [0, 128, 128]),
    ("thistle", [216, 191, 216]),
    ("tomato", [255, 99, 71]),
    ("turquoise", [64, 224, 208]),
    ("violet", [238, 130, 238]),
    ("wheat", [245, 222, 179]),
    ("white", [255, 255, 255]),
    ("whitesmoke", [245, 245, 245]),
    ("yellow", [255, 255, 0]),
    ("yellowgreen", [154, 205, 50]),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_palette_values_are_distinct() {
        let palette = ReferencePalette::default();
        let values: HashSet<[u8; 3]> = palette.iter().map(|c| c.rgb).collect();
        assert_eq!(values.len(), palette.len());
        assert!(palette.len() > 130);
    }

    #[test]
    fn test_nearest_name_is_reflexive_rgb() {
        let palette = ReferencePalette::css3(NamingSpace::Rgb);
        for entry in palette.iter() {
            assert_eq!(palette.nearest_name(Color::from_rgb8(entry.rgb)), entry.name);
        }
    }

    #[test]
    fn test_nearest_name_is_reflexive_hls() {
        let palette = ReferencePalette::css3(NamingSpace::Hls);
        for entry in palette.iter() {
            assert_eq!(palette.nearest_name(Color::from_rgb8(entry.rgb)), entry.name);
        }
    }

    #[test]
    fn test_nearest_name_for_garment_centroids() {
        let palette = ReferencePalette::default();
        assert_eq!(palette.nearest_name(Color::new(123.98, 32.38, 46.37)), "brown");
        assert_eq!(palette.nearest_name(Color::new(31.97, 15.66, 24.17)), "black");
        assert_eq!(palette.nearest_name(Color::new(207.87, 42.57, 62.11)), "crimson");
        assert_eq!(palette.nearest_name(Color::new(250.66, 248.17, 248.13)), "snow");
    }

    #[test]
    fn test_alias_values_use_canonical_names() {
        let palette = ReferencePalette::default();
        assert_eq!(palette.nearest_name(Color::new(0.0, 255.0, 255.0)), "cyan");
        assert_eq!(palette.nearest_name(Color::new(255.0, 0.0, 255.0)), "magenta");
        assert_eq!(palette.nearest_name(Color::new(128.0, 128.0, 128.0)), "gray");
        assert!(palette.iter().all(|c| c.name != "aqua" && c.name != "fuchsia"));
    }

    #[test]
    fn test_nearest_returns_entry() {
        let palette = ReferencePalette::default();
        let entry = palette.nearest(Color::new(1.0, 2.0, 250.0));
        assert_eq!(entry.name, "blue");
        assert_eq!(entry.rgb, [0, 0, 255]);
    }
}
