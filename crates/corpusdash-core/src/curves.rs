//! Confidence band curves
//!
//! Each confidence level has a lower and an upper bound curve, sampled
//! independently as right-continuous step functions. The bands the plot
//! draws are the merge of the two.

use crate::raw::{CodeMap, RawCurvePair, RawCurvePoint};
use facet::Facet;
use tracing::warn;

/// One breakpoint of a band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Facet)]
pub struct BandPoint {
    pub x: u64,
    /// Lower bound at `x`
    pub y0: u64,
    /// Upper bound at `x`
    pub y1: u64,
}

/// The band of one confidence level.
#[derive(Debug, Clone, PartialEq, Facet)]
pub struct Band {
    pub level: f64,
    pub points: Vec<BandPoint>,
}

/// All bands of a (corpus, dataset, stat), with the axis extent they need.
#[derive(Debug, Clone, PartialEq, Facet)]
pub struct CurveSet {
    pub maxx: u64,
    pub maxy: u64,
    /// Bands by ascending level
    pub bands: Vec<Band>,
}

impl Default for CurveSet {
    fn default() -> Self {
        Self {
            maxx: 1,
            maxy: 1,
            bands: Vec::new(),
        }
    }
}

/// Merge two step sequences sorted by `x` into one band.
///
/// The cursor with the smaller `x` advances; on equal `x` both advance
/// together so a shared breakpoint is emitted once. The other bound keeps
/// its last value.
pub fn merge_band(lower: &[RawCurvePoint], upper: &[RawCurvePoint]) -> Vec<BandPoint> {
    let (mut i, mut j) = (0, 0);
    let (mut y0, mut y1) = (0, 0);
    let mut out = Vec::with_capacity(lower.len().max(upper.len()));

    while i < lower.len() || j < upper.len() {
        let (advance_lower, advance_upper) = match (lower.get(i), upper.get(j)) {
            (Some(l), Some(u)) => (l.x <= u.x, l.x >= u.x),
            (Some(_), None) => (true, false),
            (None, _) => (false, true),
        };
        let x = if advance_lower { lower[i].x } else { upper[j].x };
        if advance_lower {
            y0 = lower[i].y;
            i += 1;
        }
        if advance_upper {
            y1 = upper[j].y;
            j += 1;
        }
        out.push(BandPoint { x, y0, y1 });
    }
    out
}

impl CurveSet {
    /// Build the bands of every level of one (corpus, dataset, stat).
    pub fn build(
        levels: &CodeMap<RawCurvePair>,
        curve_points: &CodeMap<Vec<RawCurvePoint>>,
    ) -> Self {
        let mut parsed: Vec<(f64, &RawCurvePair)> = Vec::with_capacity(levels.len());
        for (level, pair) in levels {
            match level.parse::<f64>() {
                Ok(level) => parsed.push((level, pair)),
                Err(_) => warn!(level = %level, "Skipping curve with non-numeric level"),
            }
        }
        parsed.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut set = CurveSet::default();
        for (level, pair) in parsed {
            let lower = curve_points.get(&pair.lower.id.to_string());
            let upper = curve_points.get(&pair.upper.id.to_string());
            let (Some(lower), Some(upper)) = (lower, upper) else {
                warn!(
                    level,
                    lower = pair.lower.id,
                    upper = pair.upper.id,
                    "Curve points missing, skipping band"
                );
                continue;
            };
            let points = merge_band(lower, upper);
            if let Some(last) = points.last() {
                set.maxx = set.maxx.max(last.x);
            }
            if let Some(top) = points.iter().map(|p| p.y1).max() {
                set.maxy = set.maxy.max(top);
            }
            set.bands.push(Band { level, points });
        }
        set
    }
}
