use std::collections::BTreeMap;

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
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0).round() as u8,
    )
}

// ---------------------------------------------------------------------------
// Country → line colour for the comparison chart
// ---------------------------------------------------------------------------

/// Maps the compared countries to distinct colours.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
}

impl ColorMap {
    pub fn new<'a>(countries: impl IntoIterator<Item = &'a String>) -> Self {
        let names: Vec<&String> = countries.into_iter().collect();
        let palette = generate_palette(names.len());
        let mapping = names
            .into_iter()
            .zip(palette)
            .map(|(name, c)| (name.clone(), c))
            .collect();
        ColorMap { mapping }
    }

    pub fn color_for(&self, country: &str) -> Color32 {
        self.mapping.get(country).copied().unwrap_or(Color32::GRAY)
    }
}

// ---------------------------------------------------------------------------
// Continuous scales
// ---------------------------------------------------------------------------

/// Piecewise-linear colour scale over `[0, 1]`, interpolated in linear RGB.
#[derive(Debug, Clone)]
pub struct ContinuousScale {
    stops: Vec<LinSrgb>,
}

impl ContinuousScale {
    fn from_hex(stops: &[u32]) -> Self {
        let stops = stops
            .iter()
            .map(|&hex| -> LinSrgb {
                let srgb = Srgb::new(
                    ((hex >> 16) & 0xff) as f32 / 255.0,
                    ((hex >> 8) & 0xff) as f32 / 255.0,
                    (hex & 0xff) as f32 / 255.0,
                );
                srgb.into_linear()
            })
            .collect();
        Self { stops }
    }

    /// Sequential white → dark red, used for case counts.
    pub fn reds() -> Self {
        Self::from_hex(&[0xfff5f0, 0xfcbba1, 0xfb6a4a, 0xcb181d, 0x67000d])
    }

    /// Diverging blue → white → red, used for correlations in `[-1, 1]`.
    pub fn red_blue() -> Self {
        Self::from_hex(&[0x2166ac, 0x92c5de, 0xf7f7f7, 0xf4a582, 0xb2182b])
    }

    /// Colour at position `t`, clamped into `[0, 1]`.
    pub fn at(&self, t: f64) -> Color32 {
        let Some(last) = self.stops.len().checked_sub(1) else {
            return Color32::GRAY;
        };
        if last == 0 {
            return to_color32(Srgb::from_linear(self.stops[0]));
        }
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let pos = t as f32 * last as f32;
        let i = (pos.floor() as usize).min(last - 1);
        let mixed = self.stops[i].mix(self.stops[i + 1], pos - i as f32);
        to_color32(Srgb::from_linear(mixed))
    }

    /// Colour for `value` normalised over `min..=max`.
    pub fn for_value(&self, value: f64, min: f64, max: f64) -> Color32 {
        if max > min {
            self.at((value - min) / (max - min))
        } else {
            self.at(1.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_is_distinct() {
        let p = generate_palette(5);
        assert_eq!(p.len(), 5);
        for i in 0..p.len() {
            for j in i + 1..p.len() {
                assert_ne!(p[i], p[j]);
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn color_map_falls_back_to_gray() {
        let names = vec!["Italy".to_string(), "Spain".to_string()];
        let cm = ColorMap::new(&names);
        assert_ne!(cm.color_for("Italy"), cm.color_for("Spain"));
        assert_eq!(cm.color_for("Chad"), Color32::GRAY);
    }

    #[test]
    fn reds_darken_with_value() {
        let reds = ContinuousScale::reds();
        let low = reds.at(0.0);
        let high = reds.at(1.0);
        assert!(low.g() > high.g());
        assert_eq!(low, Color32::from_rgb(0xff, 0xf5, 0xf0));
        assert_eq!(reds.at(-3.0), low);
        assert_eq!(reds.at(f64::NAN), low);
        assert_eq!(reds.for_value(5.0, 5.0, 5.0), high);
    }

    #[test]
    fn diverging_midpoint_is_neutral() {
        let c = ContinuousScale::red_blue().for_value(0.0, -1.0, 1.0);
        assert_eq!(c, Color32::from_rgb(0xf7, 0xf7, 0xf7));
    }
}
