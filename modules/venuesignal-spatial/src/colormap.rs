use serde::Serialize;

use crate::stats::{min_max, percentile};

/// Nine-stop yellow → orange → red sequential ramp.
pub const YL_OR_RD_09: [&str; 9] = [
    "#ffffcc", "#ffeda0", "#fed976", "#feb24c", "#fd8d3c", "#fc4e2a", "#e31a1c", "#bd0026",
    "#800026",
];

/// Smallest domain width for a degenerate scale.
const MIN_SPAN: f64 = 1e-6;

/// Linear color scale over `[vmin, vmax]`. Always `vmin < vmax`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorScale {
    pub vmin: f64,
    pub vmax: f64,
}

impl ColorScale {
    /// Fit a scale to `scores` using the given percentiles as the domain.
    ///
    /// Falls back to min/max when the percentile domain is empty or not
    /// finite. A single distinct value widens `vmax` by `1e-6`, or by a
    /// relative `1e-9` when the value is too large for the absolute step to
    /// register.
    pub fn fit(scores: &[f64], lower_pct: f64, upper_pct: f64) -> Option<Self> {
        let (min, max) = min_max(scores)?;

        let (mut vmin, mut vmax) = match (percentile(scores, lower_pct), percentile(scores, upper_pct)) {
            (Some(lo), Some(hi)) if lo.is_finite() && hi.is_finite() && lo < hi => (lo, hi),
            _ => (min, max),
        };
        if vmin >= vmax {
            vmin = min;
            vmax = min + MIN_SPAN.max(min.abs() * 1e-9);
        }
        Some(Self { vmin, vmax })
    }

    /// Position of `value` in the domain, clipped to `[0, 1]`.
    pub fn normalize(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return 0.0;
        }
        ((value - self.vmin) / (self.vmax - self.vmin)).clamp(0.0, 1.0)
    }

    pub fn color(&self, value: f64) -> String {
        let t = self.normalize(value);
        let segments = (YL_OR_RD_09.len() - 1) as f64;
        let pos = t * segments;
        let i = (pos.floor() as usize).min(YL_OR_RD_09.len() - 2);
        let frac = pos - i as f64;

        let a = parse_hex(YL_OR_RD_09[i]);
        let b = parse_hex(YL_OR_RD_09[i + 1]);
        let mix = |x: u8, y: u8| (f64::from(x) + (f64::from(y) - f64::from(x)) * frac).round() as u8;
        format!("#{:02x}{:02x}{:02x}", mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
    }
}

fn parse_hex(color: &str) -> (u8, u8, u8) {
    let channel = |i: usize| {
        color
            .get(i..i + 2)
            .and_then(|c| u8::from_str_radix(c, 16).ok())
            .unwrap_or(0)
    };
    (channel(1), channel(3), channel(5))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_value_still_has_a_proper_domain() {
        let scale = ColorScale::fit(&[0.3], 5.0, 95.0).unwrap();
        assert!(scale.vmin < scale.vmax);
        assert_eq!(scale.vmin, 0.3);
    }

    #[test]
    fn large_single_value_still_has_a_proper_domain() {
        for value in [5e10, -5e10, 1e300] {
            let scale = ColorScale::fit(&[value, value], 5.0, 95.0).unwrap();
            assert_eq!(scale.vmin, value);
            assert!(scale.vmin < scale.vmax, "degenerate scale at {value}");
        }
    }

    #[test]
    fn identical_values_widen_the_domain() {
        let scale = ColorScale::fit(&[0.2, 0.2, 0.2], 5.0, 95.0).unwrap();
        assert!(scale.vmin < scale.vmax);
    }

    #[test]
    fn percentiles_trim_outliers() {
        let mut scores: Vec<f64> = (0..=100).map(|i| f64::from(i) / 100.0).collect();
        scores.push(50.0);
        let scale = ColorScale::fit(&scores, 5.0, 95.0).unwrap();
        assert!(scale.vmax < 50.0);
        assert!(scale.vmin > 0.0);
    }

    #[test]
    fn empty_scores_have_no_scale() {
        assert!(ColorScale::fit(&[], 5.0, 95.0).is_none());
        assert!(ColorScale::fit(&[f64::NAN], 5.0, 95.0).is_none());
    }

    #[test]
    fn colors_are_clipped_to_ramp_ends() {
        let scale = ColorScale { vmin: 0.0, vmax: 1.0 };
        assert_eq!(scale.color(-5.0), "#ffffcc");
        assert_eq!(scale.color(0.0), "#ffffcc");
        assert_eq!(scale.color(1.0), "#800026");
        assert_eq!(scale.color(9.0), "#800026");
        assert_eq!(scale.color(0.5), "#fd8d3c");
        assert_eq!(scale.color(f64::NAN), "#ffffcc");
    }
}
