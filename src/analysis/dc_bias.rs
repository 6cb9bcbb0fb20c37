//! # DC-Bias Saturation Point
//!
//! Finds the drive current at which inductance has dropped by a given
//! percentage from its zero-bias value `L0`:
//!
//! ```text
//! target = L0 * (1 - percent / 100)
//!
//!   L ▲
//!  L0 ┤━━━━━━━━━╮
//!     │          ╲
//! tgt ┤┈┈┈┈┈┈┈┈┈┈┈●            ← first crossing, linearly interpolated
//!     │           ┊╲
//!     └───────────┴──────▶ I
//!               I@-20%
//! ```
//!
//! Explicit curve samples win; the precomputed drop points are only used
//! when a payload carries no samples.
//! Every function here is pure and returns `None` instead of failing.

use std::sync::LazyLock;

use regex::Regex;

use super::types::{AxisRange, CurvePoint, DcBiasMeta};
use crate::core::format::format_number;
use crate::core::locale::Locale;

/// Inductance drop used by the saturation card.
pub const DEFAULT_DROP_PERCENT: f64 = 20.0;

static CURRENT_RANGE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)([0-9]+(?:\.[0-9]+)?)\s*A\s*[–-]\s*([0-9]+(?:\.[0-9]+)?)\s*A").ok()
});

/// Current at which the curve first reaches `target` inductance.
///
/// Samples are scanned in ascending current order. Needs at least two samples
/// and a bracketing pair; an exact hit counts only on the left of a pair, so
/// the last sample alone never matches.
pub fn interpolate_drop_current(points: &[CurvePoint], target: f64) -> Option<f64> {
    if points.len() < 2 {
        return None;
    }
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.current.total_cmp(&b.current));

    for pair in sorted.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if a.inductance == target {
            return Some(a.current);
        }
        let crosses = (a.inductance - target) * (b.inductance - target) < 0.0;
        if crosses {
            let t = (target - a.inductance) / (b.inductance - a.inductance);
            return Some(a.current + t * (b.current - a.current));
        }
    }

    None
}

/// Target inductance for a `percent` drop from `l0`.
pub fn target_inductance(l0: f64, percent: f64) -> f64 {
    l0 * (1.0 - percent / 100.0)
}

/// Drive current for a `percent` inductance drop.
///
/// A curve, when present, is authoritative: no crossing means no point. The
/// precomputed drop points are only read when there are no samples at all.
pub fn drop_current(meta: &DcBiasMeta, percent: f64) -> Option<f64> {
    let current = if meta.curve_points.is_empty() {
        meta.drop_points
            .iter()
            .find(|p| p.percent == percent)
            .map(|p| p.current)
    } else {
        let target = target_inductance(meta.l0.value, percent);
        interpolate_drop_current(&meta.curve_points, target)
    };
    current.filter(|c| c.is_finite())
}

/// Parse `"0 A – 4 A"`-style text into a current range.
pub fn parse_current_range(band: &str) -> Option<AxisRange> {
    let re = CURRENT_RANGE.as_ref()?;
    let caps = re.captures(band)?;
    let min: f64 = caps.get(1)?.as_str().parse().ok()?;
    let max: f64 = caps.get(2)?.as_str().parse().ok()?;
    Some(AxisRange::new(min, max, "A"))
}

/// Current axis: explicit axis range, then the meta's current range, then a
/// range parsed from the recommended band, then `0–3 A`.
pub fn resolve_current_axis(meta: &DcBiasMeta, recommended_band: &str) -> AxisRange {
    meta.axis_range
        .as_ref()
        .map(|a| a.current.clone())
        .or_else(|| meta.current_range.clone())
        .or_else(|| parse_current_range(recommended_band))
        .unwrap_or_else(|| AxisRange::new(0.0, 3.0, "A"))
}

/// Inductance axis: explicit, else `0.6·L0 .. 1.05·L0`.
pub fn resolve_inductance_axis(meta: &DcBiasMeta) -> AxisRange {
    meta.axis_range
        .as_ref()
        .map(|a| a.inductance.clone())
        .unwrap_or_else(|| {
            AxisRange::new(meta.l0.value * 0.6, meta.l0.value * 1.05, &meta.l0.unit)
        })
}

/// Everything needed to draw the saturation crosshair on a plot.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub percent: f64,
    pub current: f64,
    pub target_inductance: f64,
    pub l0: f64,
    pub l0_unit: String,
    pub current_axis: AxisRange,
    pub inductance_axis: AxisRange,
    /// Position of the crosshair inside the plot, each in `0.0..=1.0`,
    /// measured from the left and from the top.
    pub x_ratio: f64,
    pub y_ratio: f64,
}

impl Annotation {
    /// `L / L0` after the drop, e.g. `0.80`.
    pub fn ratio_text(&self) -> String {
        format_number(1.0 - self.percent / 100.0, 2)
    }

    pub fn current_label(&self, locale: Locale) -> String {
        let value = format!(
            "I@-{}% = {} {}",
            format_number(self.percent, 0),
            format_number(self.current, 2),
            self.current_axis.unit
        );
        match locale {
            Locale::Zh => format!("飽和點 {value}"),
            Locale::En => value,
        }
    }

    pub fn inductance_label(&self) -> String {
        format!(
            "{}*L0 = {} {}",
            self.ratio_text(),
            format_number(self.target_inductance, 2),
            self.l0_unit
        )
    }

    /// Heading for the card section, e.g. `-20% (L = 0.80 * L0)`.
    pub fn header(&self, locale: Locale) -> String {
        let pct = format_number(self.percent, 0);
        match locale {
            Locale::Zh => format!("下降 {pct}% (L = {} * L0)", self.ratio_text()),
            Locale::En => format!("-{pct}% (L = {} * L0)", self.ratio_text()),
        }
    }
}

/// Compute the saturation crosshair for `percent`, or `None` when no current
/// can be determined.
pub fn annotate(meta: &DcBiasMeta, percent: f64, recommended_band: &str) -> Option<Annotation> {
    let current = drop_current(meta, percent)?;
    let target = target_inductance(meta.l0.value, percent);
    let current_axis = resolve_current_axis(meta, recommended_band);
    let inductance_axis = resolve_inductance_axis(meta);

    let x_ratio = ((current - current_axis.min)
        / (current_axis.effective_max() - current_axis.min))
        .clamp(0.0, 1.0);
    let l_max = inductance_axis.effective_max();
    let y_ratio = ((l_max - target) / (l_max - inductance_axis.min)).clamp(0.0, 1.0);

    Some(Annotation {
        percent,
        current,
        target_inductance: target,
        l0: meta.l0.value,
        l0_unit: meta.l0.unit.clone(),
        current_axis,
        inductance_axis,
        x_ratio,
        y_ratio,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::types::{AxisRanges, DropPoint, Quantity};

    fn pt(current: f64, inductance: f64) -> CurvePoint {
        CurvePoint { current, inductance }
    }

    fn meta(curve: Vec<CurvePoint>, drops: Vec<DropPoint>) -> DcBiasMeta {
        DcBiasMeta {
            l0: Quantity {
                value: 10.0,
                unit: "µH".into(),
            },
            current_range: None,
            axis_range: None,
            plot_area_pct: None,
            drop_points: drops,
            curve_points: curve,
            test_conditions: None,
            knee_point: None,
        }
    }

    #[test]
    fn test_interpolates_midpoint_exactly() {
        let points = [pt(1.0, 10.0), pt(2.0, 8.0)];
        let target = target_inductance(10.0, 10.0);
        assert_eq!(target, 9.0);
        assert_eq!(interpolate_drop_current(&points, 9.0), Some(1.5));
    }

    #[test]
    fn test_unsorted_samples_are_sorted_by_current() {
        let points = [pt(2.0, 8.0), pt(0.0, 10.0), pt(1.0, 9.0)];
        assert_eq!(interpolate_drop_current(&points, 8.5), Some(1.5));
    }

    #[test]
    fn test_exact_sample_hit() {
        let points = [pt(0.0, 10.0), pt(1.0, 9.0), pt(2.0, 8.0)];
        assert_eq!(interpolate_drop_current(&points, 9.0), Some(1.0));
        assert_eq!(interpolate_drop_current(&points, 10.0), Some(0.0));
    }

    #[test]
    fn test_exact_hit_on_last_sample_is_none() {
        let points = [pt(0.0, 10.0), pt(1.0, 9.0), pt(2.0, 8.0)];
        assert_eq!(interpolate_drop_current(&points, 8.0), None);
    }

    #[test]
    fn test_first_crossing_wins() {
        // Curve dips below target, recovers, then drops again.
        let points = [pt(0.0, 10.0), pt(1.0, 7.0), pt(2.0, 10.0), pt(3.0, 6.0)];
        assert_eq!(interpolate_drop_current(&points, 8.5), Some(0.5));
    }

    #[test]
    fn test_fewer_than_two_samples_is_none() {
        assert_eq!(interpolate_drop_current(&[], 9.0), None);
        assert_eq!(interpolate_drop_current(&[pt(1.0, 9.0)], 9.0), None);
    }

    #[test]
    fn test_no_crossing_is_none() {
        let points = [pt(0.0, 10.0), pt(1.0, 9.8)];
        assert_eq!(interpolate_drop_current(&points, 8.0), None);
    }

    #[test]
    fn test_deterministic() {
        let points = [pt(0.3, 9.9), pt(1.7, 8.1), pt(2.9, 6.0)];
        let a = interpolate_drop_current(&points, 8.0);
        let b = interpolate_drop_current(&points, 8.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_drop_current_prefers_curve() {
        let m = meta(
            vec![pt(1.0, 10.0), pt(3.0, 6.0)],
            vec![DropPoint {
                percent: 20.0,
                current: 9.9,
            }],
        );
        assert_eq!(drop_current(&m, 20.0), Some(2.0));
    }

    #[test]
    fn test_drop_current_falls_back_to_drop_point() {
        let m = meta(
            Vec::new(),
            vec![DropPoint {
                percent: 20.0,
                current: 2.4,
            }],
        );
        assert_eq!(drop_current(&m, 20.0), Some(2.4));
        assert_eq!(drop_current(&m, 30.0), None);
    }

    #[test]
    fn test_curve_without_crossing_ignores_drop_point() {
        let drops = vec![DropPoint {
            percent: 20.0,
            current: 2.4,
        }];
        let m = meta(vec![pt(0.0, 10.0), pt(1.0, 9.8)], drops);
        assert_eq!(drop_current(&m, 20.0), None);
        assert!(annotate(&m, 20.0, "").is_none());
    }

    #[test]
    fn test_single_sample_ignores_drop_point() {
        let drops = vec![DropPoint {
            percent: 20.0,
            current: 2.4,
        }];
        let m = meta(vec![pt(0.0, 10.0)], drops);
        assert_eq!(drop_current(&m, 20.0), None);
    }

    #[test]
    fn test_parse_current_range() {
        let range = parse_current_range("Sweep 0 A – 4.5 A DC bias").unwrap();
        assert_eq!(range.min, 0.0);
        assert_eq!(range.max, 4.5);
        assert!(parse_current_range("100 kHz – 5 MHz").is_none());
    }

    #[test]
    fn test_current_axis_resolution_order() {
        let mut m = meta(Vec::new(), Vec::new());
        assert_eq!(resolve_current_axis(&m, "n/a"), AxisRange::new(0.0, 3.0, "A"));
        assert_eq!(resolve_current_axis(&m, "1 A - 5 A"), AxisRange::new(1.0, 5.0, "A"));
        m.current_range = Some(AxisRange::new(0.0, 6.0, "A"));
        assert_eq!(resolve_current_axis(&m, "1 A - 5 A").max, 6.0);
        m.axis_range = Some(AxisRanges {
            current: AxisRange::new(0.0, 8.0, "A"),
            inductance: AxisRange::new(4.0, 11.0, "µH"),
        });
        assert_eq!(resolve_current_axis(&m, "1 A - 5 A").max, 8.0);
    }

    #[test]
    fn test_annotate_positions_and_labels() {
        let mut m = meta(vec![pt(1.0, 10.0), pt(3.0, 6.0)], Vec::new());
        m.axis_range = Some(AxisRanges {
            current: AxisRange::new(0.0, 4.0, "A"),
            inductance: AxisRange::new(6.0, 10.0, "µH"),
        });
        let ann = annotate(&m, 20.0, "").unwrap();
        assert_eq!(ann.current, 2.0);
        assert_eq!(ann.target_inductance, 8.0);
        assert_eq!(ann.x_ratio, 0.5);
        assert_eq!(ann.y_ratio, 0.5);
        assert_eq!(ann.current_label(Locale::En), "I@-20% = 2.00 A");
        assert_eq!(ann.current_label(Locale::Zh), "飽和點 I@-20% = 2.00 A");
        assert_eq!(ann.inductance_label(), "0.80*L0 = 8.00 µH");
        assert_eq!(ann.header(Locale::En), "-20% (L = 0.80 * L0)");
    }

    #[test]
    fn test_annotate_without_any_source_is_none() {
        let m = meta(Vec::new(), Vec::new());
        assert!(annotate(&m, 20.0, "").is_none());
    }
}
