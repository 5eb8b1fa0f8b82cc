//! Input records handed to the analytics core
//!
//! All records arrive pre-validated from the persistence layer. The
//! engines still re-check the invariants they depend on (see the
//! `validation` module) and fail closed on anything malformed.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::units::{Dimension, MeasurementUnit};

/// Biological sex used to select reference curves
/// Note: This is used for physiological calculations only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

/// Growth metric kind
///
/// A closed set: every lookup and trend path matches exhaustively, so
/// an unhandled metric is a compile error rather than a silent skip.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum GrowthMetric {
    Height,
    Weight,
    HeadCircumference,
}

impl GrowthMetric {
    /// The canonical unit this metric is computed in
    pub fn canonical_unit(&self) -> MeasurementUnit {
        match self {
            GrowthMetric::Height => MeasurementUnit::Cm,
            GrowthMetric::Weight => MeasurementUnit::Kg,
            GrowthMetric::HeadCircumference => MeasurementUnit::Cm,
        }
    }

    /// The dimension this metric measures
    pub fn dimension(&self) -> Dimension {
        self.canonical_unit().dimension()
    }

    /// Get a human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            GrowthMetric::Height => "height",
            GrowthMetric::Weight => "weight",
            GrowthMetric::HeadCircumference => "head_circumference",
        }
    }
}

/// A single growth measurement for one child
///
/// Immutable once produced by the persistence layer. Series are ordered
/// by `recorded_at` within a child+metric pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Measurement {
    pub child_id: Uuid,
    pub metric: GrowthMetric,
    /// Magnitude in `unit`
    pub value: f64,
    pub unit: MeasurementUnit,
    pub recorded_at: DateTime<Utc>,
    /// Child age at measurement time, derived upstream from the date of
    /// birth
    pub age_days: i64,
    pub sex: Sex,
}

impl Measurement {
    /// Value normalized to the metric's canonical unit (cm or kg)
    pub fn canonical_value(&self) -> f64 {
        self.unit.to_canonical(self.value)
    }
}

/// Meal category
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    /// Get a human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }
}

/// A food item within a meal entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodItem {
    pub name: String,
    /// Free-form quantity, e.g. "1 cup" or "2 slices"
    pub quantity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories_per_serving: Option<f64>,
}

/// A meal log entry with pre-computed nutrient totals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealEntry {
    pub child_id: Uuid,
    pub meal_type: MealType,
    pub foods: Vec<FoodItem>,
    pub consumed_at: DateTime<Utc>,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub fiber_g: f64,
    pub sodium_mg: f64,
}

/// Identity context for the child a report is built for
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildContext {
    pub child_id: Uuid,
    pub sex: Sex,
    pub date_of_birth: NaiveDate,
}

impl ChildContext {
    /// Age in whole days on the given date, clamped at zero
    pub fn age_in_days_on(&self, date: NaiveDate) -> i64 {
        (date - self.date_of_birth).num_days().max(0)
    }
}
