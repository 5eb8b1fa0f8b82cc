//! Percentile placement against growth reference curves
//!
//! Two linear interpolations: the band-value row is interpolated along
//! the age axis, then the measured value's percentile is interpolated
//! between the two bands that bracket it. Values outside the outer
//! bands clamp to 0 or 100.
//!
//! Banded tables carry no LMS distribution parameters, so no z-score is
//! derived; `z_score` stays `None` rather than guessing a correction
//! formula. See DESIGN.md.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::{AnalyticsError, AnalyticsResult};
use crate::models::{GrowthMetric, Measurement, Sex};
use crate::reference::ReferenceTable;
use crate::validation;

/// Percentile placement for a single measurement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PercentileResult {
    pub metric: GrowthMetric,
    /// Measured value in the metric's canonical unit
    pub value: f64,
    pub age_days: i64,
    /// Population percentile in [0, 100]; clamped outside the outer
    /// bands
    pub percentile: f64,
    /// Standardized deviation from the population median; `None` for
    /// banded tables without LMS parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_score: Option<f64>,
    /// Which reference bands the value fell between, e.g. "P50-P85"
    pub band_label: String,
    /// Set when the age fell outside the reference table and the
    /// nearest anchor was used; treat the percentile as low-confidence
    pub out_of_range: bool,
}

/// Compute the percentile placement for one measurement
pub fn compute_percentile(
    measurement: &Measurement,
    table: &ReferenceTable,
) -> AnalyticsResult<PercentileResult> {
    validation::check_measurement(measurement)?;
    let curve = table
        .curve(measurement.metric, measurement.sex)
        .ok_or_else(|| {
            AnalyticsError::InvalidInput(format!(
                "no reference curve for {} ({:?})",
                measurement.metric.label(),
                measurement.sex
            ))
        })?;

    let bracket = curve.bracket(measurement.age_days);
    let out_of_range = bracket.is_clamped();
    if out_of_range {
        warn!(
            metric = measurement.metric.label(),
            age_days = measurement.age_days,
            "age outside reference table, extrapolating from nearest anchor"
        );
    }

    let band_values = bracket.values_at(measurement.age_days);
    let value = measurement.canonical_value();
    let (percentile, band_label) = place_in_bands(value, curve.bands(), &band_values);

    Ok(PercentileResult {
        metric: measurement.metric,
        value,
        age_days: measurement.age_days,
        percentile,
        z_score: None,
        band_label,
        out_of_range,
    })
}

/// Inverse lookup: the canonical value a percentile corresponds to at
/// the given age
///
/// Percentiles outside the table's outer bands clamp to the outer band
/// values.
pub fn value_at_percentile(
    metric: GrowthMetric,
    sex: Sex,
    age_days: i64,
    percentile: f64,
    table: &ReferenceTable,
) -> AnalyticsResult<f64> {
    if percentile.is_nan() || !(0.0..=100.0).contains(&percentile) {
        return Err(AnalyticsError::InvalidInput(format!(
            "percentile {} outside [0, 100]",
            percentile
        )));
    }
    validation::validate_age_days(age_days).map_err(AnalyticsError::InvalidInput)?;
    let curve = table.curve(metric, sex).ok_or_else(|| {
        AnalyticsError::InvalidInput(format!(
            "no reference curve for {} ({:?})",
            metric.label(),
            sex
        ))
    })?;

    let values = curve.bracket(age_days).values_at(age_days);
    let bands = curve.bands();
    let last = bands.len() - 1;
    if percentile <= bands[0] {
        return Ok(values[0]);
    }
    if percentile >= bands[last] {
        return Ok(values[last]);
    }
    let mut seg = last - 1;
    for i in 0..last {
        if percentile <= bands[i + 1] {
            seg = i;
            break;
        }
    }
    let t = (percentile - bands[seg]) / (bands[seg + 1] - bands[seg]);
    Ok(values[seg] + t * (values[seg + 1] - values[seg]))
}

/// Locate `value` within an interpolated band row and interpolate its
/// percentile between the bracketing bands
fn place_in_bands(value: f64, bands: &[f64], values: &[f64]) -> (f64, String) {
    let last = bands.len() - 1;
    if value < values[0] {
        return (0.0, format!("<{}", band_name(bands[0])));
    }
    if value > values[last] {
        return (100.0, format!(">{}", band_name(bands[last])));
    }
    let mut seg = last - 1;
    for i in 0..last {
        if value <= values[i + 1] {
            seg = i;
            break;
        }
    }
    let span = values[seg + 1] - values[seg];
    let t = if span > 0.0 {
        (value - values[seg]) / span
    } else {
        0.0
    };
    let percentile = bands[seg] + t * (bands[seg + 1] - bands[seg]);
    let label = format!("{}-{}", band_name(bands[seg]), band_name(bands[seg + 1]));
    (percentile, label)
}

fn band_name(percentile: f64) -> String {
    if percentile.fract() == 0.0 {
        format!("P{}", percentile as i64)
    } else {
        format!("P{}", percentile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{AnchorPoint, ReferenceCurve};
    use crate::units::MeasurementUnit;
    use chrono::Utc;
    use proptest::prelude::*;
    use uuid::Uuid;

    fn measurement(
        metric: GrowthMetric,
        value: f64,
        unit: MeasurementUnit,
        age_days: i64,
        sex: Sex,
    ) -> Measurement {
        Measurement {
            child_id: Uuid::new_v4(),
            metric,
            value,
            unit,
            recorded_at: Utc::now(),
            age_days,
            sex,
        }
    }

    /// Height-for-age girls with the bands from the reference scenario:
    /// {P3: 71, P50: 74, P97: 79} at 365 days
    fn scenario_table() -> ReferenceTable {
        let curve = ReferenceCurve::new(
            GrowthMetric::Height,
            Sex::Female,
            vec![3.0, 50.0, 97.0],
            vec![
                AnchorPoint {
                    age_days: 0,
                    values: vec![46.0, 49.0, 53.0],
                },
                AnchorPoint {
                    age_days: 365,
                    values: vec![71.0, 74.0, 79.0],
                },
            ],
        )
        .unwrap();
        ReferenceTable::new(vec![curve]).unwrap()
    }

    #[test]
    fn test_scenario_75cm_at_one_year() {
        // 75 cm sits between P50 (74) and P97 (79):
        // 50 + (1/5) * 47 = 59.4
        let table = scenario_table();
        let m = measurement(
            GrowthMetric::Height,
            75.0,
            MeasurementUnit::Cm,
            365,
            Sex::Female,
        );
        let result = compute_percentile(&m, &table).unwrap();
        assert!((result.percentile - 59.4).abs() < 0.01);
        assert!(result.percentile > 50.0 && result.percentile < 60.0);
        assert_eq!(result.z_score, None);
        assert_eq!(result.band_label, "P50-P97");
        assert!(!result.out_of_range);
    }

    #[test]
    fn test_exact_band_value_returns_band_percentile() {
        let table = scenario_table();
        let m = measurement(
            GrowthMetric::Height,
            74.0,
            MeasurementUnit::Cm,
            365,
            Sex::Female,
        );
        let result = compute_percentile(&m, &table).unwrap();
        assert!((result.percentile - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_clamps_below_lowest_band() {
        let table = scenario_table();
        let m = measurement(
            GrowthMetric::Height,
            60.0,
            MeasurementUnit::Cm,
            365,
            Sex::Female,
        );
        let result = compute_percentile(&m, &table).unwrap();
        assert_eq!(result.percentile, 0.0);
        assert_eq!(result.band_label, "<P3");
    }

    #[test]
    fn test_clamps_above_highest_band() {
        let table = scenario_table();
        let m = measurement(
            GrowthMetric::Height,
            85.0,
            MeasurementUnit::Cm,
            365,
            Sex::Female,
        );
        let result = compute_percentile(&m, &table).unwrap();
        assert_eq!(result.percentile, 100.0);
        assert_eq!(result.band_label, ">P97");
    }

    #[test]
    fn test_out_of_range_age_extrapolates_and_flags() {
        let table = scenario_table();
        let m = measurement(
            GrowthMetric::Height,
            74.0,
            MeasurementUnit::Cm,
            1000,
            Sex::Female,
        );
        let result = compute_percentile(&m, &table).unwrap();
        assert!(result.out_of_range);
        // Nearest anchor is the 365-day row, so 74 cm is the median
        assert!((result.percentile - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_curve_is_invalid_input() {
        let table = scenario_table();
        let m = measurement(
            GrowthMetric::Weight,
            9.0,
            MeasurementUnit::Kg,
            365,
            Sex::Female,
        );
        assert!(matches!(
            compute_percentile(&m, &table),
            Err(AnalyticsError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_unit_normalization_matches_canonical() {
        let table = ReferenceTable::who_standard();
        let in_kg = measurement(
            GrowthMetric::Weight,
            9.6,
            MeasurementUnit::Kg,
            365,
            Sex::Male,
        );
        let in_lbs = measurement(
            GrowthMetric::Weight,
            9.6 / 0.453592,
            MeasurementUnit::Lbs,
            365,
            Sex::Male,
        );
        let a = compute_percentile(&in_kg, &table).unwrap();
        let b = compute_percentile(&in_lbs, &table).unwrap();
        assert!((a.percentile - b.percentile).abs() < 1e-6);
    }

    #[test]
    fn test_anchor_age_returns_table_bands_unmodified() {
        let table = ReferenceTable::who_standard();
        let curve = table.curve(GrowthMetric::Weight, Sex::Female).unwrap();
        // Every band value at every anchor maps back to its own
        // percentile with no interpolation error.
        for anchor in curve.anchors() {
            for (band, &value) in curve.bands().iter().zip(anchor.values.iter()) {
                let m = measurement(
                    GrowthMetric::Weight,
                    value,
                    MeasurementUnit::Kg,
                    anchor.age_days,
                    Sex::Female,
                );
                let result = compute_percentile(&m, &table).unwrap();
                assert!(
                    (result.percentile - band).abs() < 1e-9,
                    "band {} at {} days gave {}",
                    band,
                    anchor.age_days,
                    result.percentile
                );
            }
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property: percentile -> value -> percentile round-trips
        /// within interpolation tolerance inside the outer bands
        #[test]
        fn prop_round_trip(age in 0i64..=1825, pct in 3.0f64..=97.0) {
            let table = ReferenceTable::who_standard();
            let value = value_at_percentile(
                GrowthMetric::Height,
                Sex::Male,
                age,
                pct,
                &table,
            ).unwrap();
            let m = measurement(
                GrowthMetric::Height,
                value,
                MeasurementUnit::Cm,
                age,
                Sex::Male,
            );
            let result = compute_percentile(&m, &table).unwrap();
            prop_assert!((result.percentile - pct).abs() < 1e-6,
                "round trip {} -> {} -> {}", pct, value, result.percentile);
        }

        /// Property: percentile is always within [0, 100] and z-score
        /// stays unavailable for banded tables
        #[test]
        fn prop_percentile_bounded(
            age in 0i64..=3000,
            value in 1.0f64..150.0,
        ) {
            let table = ReferenceTable::who_standard();
            let m = measurement(
                GrowthMetric::Height,
                value,
                MeasurementUnit::Cm,
                age,
                Sex::Female,
            );
            let result = compute_percentile(&m, &table).unwrap();
            prop_assert!((0.0..=100.0).contains(&result.percentile));
            prop_assert!(result.z_score.is_none());
        }

        /// Property: percentile is monotone in the measured value at a
        /// fixed age
        #[test]
        fn prop_percentile_monotone_in_value(
            age in 0i64..=1825,
            v1 in 40.0f64..80.0,
            delta in 0.1f64..40.0,
        ) {
            let table = ReferenceTable::who_standard();
            let lo = measurement(
                GrowthMetric::Height, v1, MeasurementUnit::Cm, age, Sex::Male,
            );
            let hi = measurement(
                GrowthMetric::Height, v1 + delta, MeasurementUnit::Cm, age, Sex::Male,
            );
            let r1 = compute_percentile(&lo, &table).unwrap();
            let r2 = compute_percentile(&hi, &table).unwrap();
            prop_assert!(r2.percentile >= r1.percentile);
        }
    }
}
