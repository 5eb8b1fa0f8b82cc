//! Age/sex-indexed growth reference tables
//!
//! WHO-style percentile reference data for height, weight, and head
//! circumference. A table is constructed once (typically at process
//! start), never mutated afterwards, and passed to the engines
//! explicitly, so tests can substitute synthetic curves and concurrent
//! report requests can share one table without synchronization.

use crate::models::{GrowthMetric, Sex};

/// Reference values at one age: one value per percentile band of the
/// owning curve, strictly increasing
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorPoint {
    pub age_days: i64,
    pub values: Vec<f64>,
}

/// One metric+sex reference curve
///
/// Invariants, enforced by [`ReferenceCurve::new`]: at least two bands,
/// bands strictly increasing within (0, 100); at least one anchor,
/// anchor ages strictly increasing; every anchor carries one strictly
/// increasing value per band.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceCurve {
    metric: GrowthMetric,
    sex: Sex,
    bands: Vec<f64>,
    anchors: Vec<AnchorPoint>,
}

/// Bracketing anchors for an age lookup
#[derive(Debug, Clone, PartialEq)]
pub enum AgeBracket {
    /// Age landed exactly on an anchor
    Exact(AnchorPoint),
    /// Age falls between two anchors
    Between(AnchorPoint, AnchorPoint),
    /// Age outside the table range; nearest anchor, to be reported as
    /// low-confidence extrapolation
    Clamped(AnchorPoint),
}

impl AgeBracket {
    /// Interpolated value-at-band row at the requested age
    pub fn values_at(&self, age_days: i64) -> Vec<f64> {
        match self {
            AgeBracket::Exact(a) | AgeBracket::Clamped(a) => a.values.clone(),
            AgeBracket::Between(lo, hi) => {
                let span = (hi.age_days - lo.age_days) as f64;
                let t = (age_days - lo.age_days) as f64 / span;
                lo.values
                    .iter()
                    .zip(hi.values.iter())
                    .map(|(&a, &b)| a + t * (b - a))
                    .collect()
            }
        }
    }

    /// Whether the age fell outside the table and was clamped to the
    /// nearest anchor
    pub fn is_clamped(&self) -> bool {
        matches!(self, AgeBracket::Clamped(_))
    }

    /// Whether the age landed exactly on an anchor
    pub fn is_exact(&self) -> bool {
        matches!(self, AgeBracket::Exact(_))
    }
}

impl ReferenceCurve {
    /// Build a curve, enforcing the band and anchor invariants
    pub fn new(
        metric: GrowthMetric,
        sex: Sex,
        bands: Vec<f64>,
        anchors: Vec<AnchorPoint>,
    ) -> Result<Self, String> {
        if bands.len() < 2 {
            return Err("a reference curve needs at least two percentile bands".to_string());
        }
        if bands.iter().any(|&b| !(b > 0.0 && b < 100.0)) {
            return Err("percentile bands must lie strictly between 0 and 100".to_string());
        }
        if bands.windows(2).any(|w| w[1] <= w[0]) {
            return Err("percentile bands must be strictly increasing".to_string());
        }
        if anchors.is_empty() {
            return Err("a reference curve needs at least one anchor point".to_string());
        }
        if anchors.windows(2).any(|w| w[1].age_days <= w[0].age_days) {
            return Err("anchor ages must be strictly increasing".to_string());
        }
        for anchor in &anchors {
            if anchor.values.len() != bands.len() {
                return Err(format!(
                    "anchor at {} days has {} values for {} bands",
                    anchor.age_days,
                    anchor.values.len(),
                    bands.len()
                ));
            }
            if anchor.values.windows(2).any(|w| w[1] <= w[0]) {
                return Err(format!(
                    "band values at {} days must be strictly increasing",
                    anchor.age_days
                ));
            }
        }
        Ok(Self {
            metric,
            sex,
            bands,
            anchors,
        })
    }

    pub fn metric(&self) -> GrowthMetric {
        self.metric
    }

    pub fn sex(&self) -> Sex {
        self.sex
    }

    /// Percentile bands, ascending
    pub fn bands(&self) -> &[f64] {
        &self.bands
    }

    pub fn anchors(&self) -> &[AnchorPoint] {
        &self.anchors
    }

    /// Find the anchors bracketing an age
    ///
    /// Ages beyond the table bounds clamp to the nearest anchor rather
    /// than erroring; callers surface that as a low-confidence flag.
    pub fn bracket(&self, age_days: i64) -> AgeBracket {
        let first = &self.anchors[0];
        let last = &self.anchors[self.anchors.len() - 1];
        if age_days < first.age_days {
            return AgeBracket::Clamped(first.clone());
        }
        if age_days > last.age_days {
            return AgeBracket::Clamped(last.clone());
        }
        match self
            .anchors
            .binary_search_by(|a| a.age_days.cmp(&age_days))
        {
            Ok(i) => AgeBracket::Exact(self.anchors[i].clone()),
            Err(i) => AgeBracket::Between(self.anchors[i - 1].clone(), self.anchors[i].clone()),
        }
    }
}

/// Immutable set of reference curves, one per metric/sex pair
#[derive(Debug, Clone)]
pub struct ReferenceTable {
    curves: Vec<ReferenceCurve>,
}

impl ReferenceTable {
    /// Build a table from pre-validated curves; rejects duplicate
    /// metric/sex pairs
    pub fn new(curves: Vec<ReferenceCurve>) -> Result<Self, String> {
        for (i, a) in curves.iter().enumerate() {
            for b in &curves[i + 1..] {
                if a.metric == b.metric && a.sex == b.sex {
                    return Err(format!(
                        "duplicate reference curve for {} ({:?})",
                        a.metric.label(),
                        a.sex
                    ));
                }
            }
        }
        Ok(Self { curves })
    }

    /// The curve for a metric/sex pair, if the table carries one
    pub fn curve(&self, metric: GrowthMetric, sex: Sex) -> Option<&ReferenceCurve> {
        self.curves
            .iter()
            .find(|c| c.metric == metric && c.sex == sex)
    }

    /// Bracket an age against the matching curve
    pub fn bracket(&self, metric: GrowthMetric, sex: Sex, age_days: i64) -> Option<AgeBracket> {
        self.curve(metric, sex).map(|c| c.bracket(age_days))
    }

    /// The bundled WHO-style growth standard, birth to five years
    ///
    /// Band values approximate the published WHO child growth standards
    /// at the {3, 15, 50, 85, 97} percentiles.
    pub fn who_standard() -> Self {
        let curves = vec![
            who_curve(GrowthMetric::Height, Sex::Female, &WHO_HEIGHT_GIRLS),
            who_curve(GrowthMetric::Height, Sex::Male, &WHO_HEIGHT_BOYS),
            who_curve(GrowthMetric::Weight, Sex::Female, &WHO_WEIGHT_GIRLS),
            who_curve(GrowthMetric::Weight, Sex::Male, &WHO_WEIGHT_BOYS),
            who_curve(
                GrowthMetric::HeadCircumference,
                Sex::Female,
                &WHO_HEAD_GIRLS,
            ),
            who_curve(GrowthMetric::HeadCircumference, Sex::Male, &WHO_HEAD_BOYS),
        ];
        Self { curves }
    }
}

/// Anchor ages (days) shared by the bundled curves: birth, quarterly
/// through the first year, then half-yearly/yearly to five years
const WHO_ANCHOR_AGES: [i64; 10] = [0, 91, 182, 274, 365, 548, 730, 1095, 1460, 1825];

/// Percentile bands of the bundled curves
const WHO_BANDS: [f64; 5] = [3.0, 15.0, 50.0, 85.0, 97.0];

// Rows follow WHO_ANCHOR_AGES; columns follow WHO_BANDS.

const WHO_HEIGHT_GIRLS: [[f64; 5]; 10] = [
    [45.6, 47.2, 49.1, 51.1, 52.7],
    [55.8, 57.6, 59.8, 62.0, 63.8],
    [61.5, 63.4, 65.7, 68.1, 70.0],
    [65.6, 67.7, 70.1, 72.6, 74.7],
    [69.2, 71.3, 74.0, 76.7, 78.9],
    [74.9, 77.2, 80.7, 83.7, 86.0],
    [80.1, 82.6, 86.4, 90.1, 92.4],
    [87.4, 90.5, 95.1, 99.5, 102.7],
    [94.1, 97.4, 102.7, 107.6, 111.3],
    [99.9, 103.7, 109.4, 114.9, 118.9],
];

const WHO_HEIGHT_BOYS: [[f64; 5]; 10] = [
    [46.3, 47.9, 49.9, 51.8, 53.4],
    [57.6, 59.4, 61.4, 63.5, 65.3],
    [63.3, 65.1, 67.6, 70.1, 71.9],
    [67.5, 69.5, 72.0, 74.5, 76.5],
    [71.0, 73.1, 75.7, 78.3, 80.5],
    [76.9, 79.2, 82.3, 85.4, 87.7],
    [81.7, 84.2, 87.8, 91.3, 93.9],
    [88.7, 91.7, 96.1, 100.5, 103.5],
    [94.9, 98.3, 103.3, 108.4, 111.7],
    [100.7, 104.4, 110.0, 115.6, 119.2],
];

const WHO_WEIGHT_GIRLS: [[f64; 5]; 10] = [
    [2.4, 2.8, 3.2, 3.7, 4.2],
    [4.7, 5.2, 5.8, 6.6, 7.5],
    [6.0, 6.5, 7.3, 8.3, 9.3],
    [6.9, 7.5, 8.2, 9.3, 10.5],
    [7.3, 8.1, 8.9, 10.1, 11.5],
    [8.2, 9.1, 10.2, 11.6, 13.2],
    [9.2, 10.2, 11.5, 13.1, 14.8],
    [10.8, 12.1, 13.9, 15.9, 18.1],
    [12.3, 13.7, 16.1, 18.5, 21.5],
    [13.7, 15.3, 18.2, 21.2, 24.9],
];

const WHO_WEIGHT_BOYS: [[f64; 5]; 10] = [
    [2.5, 2.9, 3.3, 3.9, 4.4],
    [5.1, 5.6, 6.4, 7.2, 8.0],
    [6.4, 7.1, 7.9, 8.8, 9.8],
    [7.2, 8.0, 8.9, 9.9, 11.0],
    [7.8, 8.6, 9.6, 10.8, 12.0],
    [8.8, 9.7, 10.9, 12.2, 13.7],
    [9.8, 10.8, 12.2, 13.7, 15.3],
    [11.4, 12.7, 14.3, 16.3, 18.3],
    [12.9, 14.3, 16.3, 18.7, 21.2],
    [14.3, 16.0, 18.3, 21.1, 24.2],
];

const WHO_HEAD_GIRLS: [[f64; 5]; 10] = [
    [31.7, 32.7, 33.9, 35.1, 36.1],
    [37.1, 38.2, 39.5, 40.8, 41.9],
    [40.2, 41.2, 42.2, 43.4, 44.3],
    [41.9, 42.8, 43.8, 44.9, 45.9],
    [42.8, 43.8, 44.9, 46.0, 47.0],
    [44.0, 45.0, 46.2, 47.4, 48.4],
    [44.9, 45.9, 47.2, 48.4, 49.5],
    [46.0, 47.0, 48.5, 49.8, 50.9],
    [46.7, 47.7, 49.3, 50.6, 51.8],
    [47.2, 48.2, 49.9, 51.3, 52.5],
];

const WHO_HEAD_BOYS: [[f64; 5]; 10] = [
    [32.1, 33.1, 34.5, 35.8, 36.9],
    [38.3, 39.3, 40.5, 41.7, 42.7],
    [41.5, 42.4, 43.3, 44.6, 45.6],
    [43.1, 43.9, 45.0, 46.2, 47.2],
    [44.1, 44.9, 46.1, 47.3, 48.3],
    [45.2, 46.1, 47.4, 48.6, 49.6],
    [46.0, 46.9, 48.3, 49.5, 50.5],
    [47.0, 47.9, 49.6, 50.8, 51.9],
    [47.6, 48.5, 50.2, 51.4, 52.5],
    [48.0, 48.9, 50.7, 51.9, 53.0],
];

// Bundled data upholds the curve invariants by construction, so this
// bypasses ReferenceCurve::new.
fn who_curve(metric: GrowthMetric, sex: Sex, values: &[[f64; 5]; 10]) -> ReferenceCurve {
    let anchors = WHO_ANCHOR_AGES
        .iter()
        .zip(values.iter())
        .map(|(&age_days, row)| AnchorPoint {
            age_days,
            values: row.to_vec(),
        })
        .collect();
    ReferenceCurve {
        metric,
        sex,
        bands: WHO_BANDS.to_vec(),
        anchors,
    }
}
