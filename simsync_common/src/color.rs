//! Scalar-to-color mapping for live property visualization.

use crate::types::Rgb;
use serde::{Deserialize, Serialize};

/// Named colormaps available to the property colorers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Palette {
    /// Blue through light grey to red; used for signed quantities
    /// (joint position, velocity, torque)
    Diverging,
    /// White to black; used for unsigned magnitudes (mass)
    Sequential,
}

/// Number of discrete entries in every palette lookup
const LUT_SIZE: f32 = 256.0;

// Anchor samples of a cool-to-warm diverging map, evenly spaced on [0, 1]
const DIVERGING_ANCHORS: [[f32; 3]; 5] = [
    [0.2298, 0.2987, 0.7537],
    [0.5543, 0.6901, 0.9955],
    [0.8674, 0.8644, 0.8626],
    [0.9567, 0.5980, 0.4773],
    [0.7057, 0.0156, 0.1502],
];

const SEQUENTIAL_ANCHORS: [[f32; 3]; 2] = [[1.0, 1.0, 1.0], [0.0, 0.0, 0.0]];

/// Where `value` falls inside `[min, max]`, clamped to `[0, 1]`.
///
/// A degenerate range (`max == min`) yields 0.
pub fn saturation(value: f32, min: f32, max: f32) -> f32 {
    let span = max - min;
    if span == 0.0 || !span.is_finite() {
        return 0.0;
    }
    let sat = (value - min) / span;
    if sat.is_nan() {
        return 0.0;
    }
    sat.clamp(0.0, 1.0)
}

/// Color of `value` within `[min, max]` under `palette`
pub fn color_for(value: f32, min: f32, max: f32, palette: Palette) -> Rgb {
    palette.sample(saturation(value, min, max))
}

impl Palette {
    /// Look up a saturation in `[0, 1]`. The saturation is quantized to one of
    /// 256 table entries before interpolation.
    pub fn sample(self, sat: f32) -> Rgb {
        let index = (sat.clamp(0.0, 1.0) * (LUT_SIZE - 1.0)).round();
        let t = index / (LUT_SIZE - 1.0);
        let [r, g, b] = match self {
            Palette::Diverging => interpolate(&DIVERGING_ANCHORS, t),
            Palette::Sequential => interpolate(&SEQUENTIAL_ANCHORS, t),
        };
        Rgb::from_unit(r, g, b)
    }
}

fn interpolate(anchors: &[[f32; 3]], t: f32) -> [f32; 3] {
    let segments = (anchors.len() - 1) as f32;
    let pos = t * segments;
    let lo = (pos.floor() as usize).min(anchors.len() - 2);
    let frac = pos - lo as f32;
    let (a, b) = (anchors[lo], anchors[lo + 1]);
    [
        a[0] + (b[0] - a[0]) * frac,
        a[1] + (b[1] - a[1]) * frac,
        a[2] + (b[2] - a[2]) * frac,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturation_is_clamped() {
        assert_eq!(saturation(-5.0, 0.0, 1.0), 0.0);
        assert_eq!(saturation(5.0, 0.0, 1.0), 1.0);
        assert_eq!(saturation(0.25, 0.0, 1.0), 0.25);
    }

    #[test]
    fn degenerate_range_maps_to_zero() {
        assert_eq!(saturation(3.0, 2.0, 2.0), 0.0);
        assert_eq!(
            color_for(3.0, 2.0, 2.0, Palette::Diverging),
            Palette::Diverging.sample(0.0)
        );
    }

    #[test]
    fn out_of_range_values_clamp_to_endpoints() {
        for palette in [Palette::Diverging, Palette::Sequential] {
            assert_eq!(color_for(-110.0, -10.0, 10.0, palette), color_for(-10.0, -10.0, 10.0, palette));
            assert_eq!(color_for(500.0, -10.0, 10.0, palette), color_for(10.0, -10.0, 10.0, palette));
        }
    }

    #[test]
    fn sequential_palette_is_monotonic() {
        let mut prev = color_for(0.0, 0.0, 10.0, Palette::Sequential);
        assert_eq!(prev, Rgb::new(255, 255, 255));
        for step in 1..=100 {
            let c = color_for(step as f32 * 0.1, 0.0, 10.0, Palette::Sequential);
            assert!(c.r <= prev.r && c.g <= prev.g && c.b <= prev.b);
            prev = c;
        }
        assert_eq!(prev, Rgb::BLACK);
    }

    #[test]
    fn diverging_palette_runs_blue_to_red() {
        let cold = Palette::Diverging.sample(0.0);
        let hot = Palette::Diverging.sample(1.0);
        assert!(cold.b > cold.r);
        assert!(hot.r > hot.b);
        let mid = Palette::Diverging.sample(0.5);
        assert!(mid.r > 200 && mid.g > 200 && mid.b > 200);
    }
}
