//! Fail-closed input checks
//!
//! Records are validated by the persistence layer before they reach
//! this crate; these checks guard the invariants the engines depend on,
//! so malformed input raises instead of producing a misleading
//! percentile or trend.

use crate::errors::{AnalyticsError, AnalyticsResult};
use crate::models::{MealEntry, Measurement};

/// Upper bound on plausible child age: 20 years
const MAX_AGE_DAYS: i64 = 7300;

/// Validate a measurement magnitude (finite and strictly positive)
pub fn validate_magnitude(value: f64) -> Result<(), String> {
    if value.is_nan() || value.is_infinite() {
        return Err("measurement value must be a finite number".to_string());
    }
    if value <= 0.0 {
        return Err("measurement value must be positive".to_string());
    }
    Ok(())
}

/// Validate a child age in days
pub fn validate_age_days(age_days: i64) -> Result<(), String> {
    if age_days < 0 {
        return Err("age in days cannot be negative".to_string());
    }
    if age_days > MAX_AGE_DAYS {
        return Err("age in days exceeds the supported pediatric range".to_string());
    }
    Ok(())
}

/// Validate a nutrient amount (finite and non-negative)
pub fn validate_nutrient(value: f64) -> Result<(), String> {
    if value.is_nan() || value.is_infinite() {
        return Err("nutrient amount must be a finite number".to_string());
    }
    if value < 0.0 {
        return Err("nutrient amount cannot be negative".to_string());
    }
    Ok(())
}

/// Check a full measurement record, including unit/metric agreement
pub fn check_measurement(m: &Measurement) -> AnalyticsResult<()> {
    validate_magnitude(m.value).map_err(AnalyticsError::InvalidInput)?;
    validate_age_days(m.age_days).map_err(AnalyticsError::InvalidInput)?;
    if m.unit.dimension() != m.metric.dimension() {
        return Err(AnalyticsError::InvalidInput(format!(
            "unit {} does not measure {}",
            m.unit,
            m.metric.label()
        )));
    }
    Ok(())
}

/// Check every nutrient amount on a meal entry
pub fn check_meal_entry(entry: &MealEntry) -> AnalyticsResult<()> {
    let amounts = [
        ("calories", entry.calories),
        ("protein_g", entry.protein_g),
        ("carbs_g", entry.carbs_g),
        ("fat_g", entry.fat_g),
        ("fiber_g", entry.fiber_g),
        ("sodium_mg", entry.sodium_mg),
    ];
    for (name, value) in amounts {
        validate_nutrient(value)
            .map_err(|msg| AnalyticsError::InvalidInput(format!("{}: {}", name, msg)))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GrowthMetric, Sex};
    use crate::units::MeasurementUnit;
    use chrono::Utc;
    use uuid::Uuid;

    fn measurement(value: f64, unit: MeasurementUnit, metric: GrowthMetric) -> Measurement {
        Measurement {
            child_id: Uuid::new_v4(),
            metric,
            value,
            unit,
            recorded_at: Utc::now(),
            age_days: 365,
            sex: Sex::Female,
        }
    }

    #[test]
    fn test_magnitude_rejects_non_positive() {
        assert!(validate_magnitude(0.0).is_err());
        assert!(validate_magnitude(-1.0).is_err());
        assert!(validate_magnitude(f64::NAN).is_err());
        assert!(validate_magnitude(f64::INFINITY).is_err());
        assert!(validate_magnitude(74.0).is_ok());
    }

    #[test]
    fn test_age_bounds() {
        assert!(validate_age_days(-1).is_err());
        assert!(validate_age_days(0).is_ok());
        assert!(validate_age_days(7300).is_ok());
        assert!(validate_age_days(7301).is_err());
    }

    #[test]
    fn test_unit_metric_mismatch_fails_closed() {
        let m = measurement(9.5, MeasurementUnit::Kg, GrowthMetric::Height);
        assert!(check_measurement(&m).is_err());
    }

    #[test]
    fn test_matching_unit_passes() {
        let m = measurement(74.0, MeasurementUnit::Cm, GrowthMetric::Height);
        assert!(check_measurement(&m).is_ok());
    }

    #[test]
    fn test_nutrient_rejects_negative() {
        assert!(validate_nutrient(-0.1).is_err());
        assert!(validate_nutrient(0.0).is_ok());
    }
}
