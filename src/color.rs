use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.65, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    let rgb: Srgb<u8> = rgb.into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

// ---------------------------------------------------------------------------
// Category colours: region / item name → Color32
// ---------------------------------------------------------------------------

/// Maps the distinct values of a category column to distinct colours. Built
/// from the whole dataset so a value keeps its colour while filters change.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
}

impl ColorMap {
    pub fn new(values: &BTreeSet<String>) -> Self {
        let palette = generate_palette(values.len());
        ColorMap {
            mapping: values.iter().cloned().zip(palette).collect(),
        }
    }

    pub fn color_for(&self, value: &str) -> Color32 {
        self.mapping.get(value).copied().unwrap_or(Color32::GRAY)
    }
}

// ---------------------------------------------------------------------------
// Diverging map for the correlation heatmap
// ---------------------------------------------------------------------------

/// Blue → light grey → red, for values in `[-1, 1]` (matplotlib "coolwarm").
pub fn coolwarm(value: f64) -> Color32 {
    let cool: LinSrgb = Srgb::new(0.23f32, 0.30, 0.75).into_linear();
    let mid: LinSrgb = Srgb::new(0.87f32, 0.87, 0.87).into_linear();
    let warm: LinSrgb = Srgb::new(0.71f32, 0.02, 0.15).into_linear();

    let t = value.clamp(-1.0, 1.0) as f32;
    let mixed = if t < 0.0 {
        mid.mix(cool, -t)
    } else {
        mid.mix(warm, t)
    };
    to_color32(Srgb::from_linear(mixed))
}

/// Black or white, whichever reads better on `background`.
pub fn contrast_text(background: Color32) -> Color32 {
    let [r, g, b, _] = background.to_array();
    let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    if luma > 140.0 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_one_colour_per_value() {
        let values: BTreeSet<String> = ["East", "West", "Central"].map(String::from).into();
        let map = ColorMap::new(&values);
        assert_ne!(map.color_for("East"), map.color_for("West"));
        assert_eq!(map.color_for("Nowhere"), Color32::GRAY);
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn coolwarm_ends() {
        let [r, _, b, _] = coolwarm(1.0).to_array();
        assert!(r > b);
        let [r, _, b, _] = coolwarm(-1.0).to_array();
        assert!(b > r);
        assert_eq!(contrast_text(Color32::WHITE), Color32::BLACK);
    }
}
