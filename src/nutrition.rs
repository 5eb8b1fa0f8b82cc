//! Meal-log aggregation into day and week windows
//!
//! Windows are aligned to UTC midnight; week windows additionally align
//! to a configurable week-start day. Only windows with at least one
//! entry are produced, in ascending window order.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AnalyticsResult;
use crate::models::{MealEntry, MealType};
use crate::validation;

/// Aggregation window granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowGranularity {
    Day,
    Week,
}

impl WindowGranularity {
    /// Window span in days
    pub fn span_days(&self) -> i64 {
        match self {
            WindowGranularity::Day => 1,
            WindowGranularity::Week => 7,
        }
    }
}

/// Aggregator configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatorConfig {
    /// First day of week windows
    pub week_start: Weekday,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            week_start: Weekday::Mon,
        }
    }
}

/// Tracked nutrient, in recommendation priority order
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Nutrient {
    Calories,
    Protein,
    Carbs,
    Fat,
    Fiber,
    Sodium,
}

impl Nutrient {
    /// All nutrients in the fixed recommendation priority order
    pub const PRIORITY: [Nutrient; 6] = [
        Nutrient::Calories,
        Nutrient::Protein,
        Nutrient::Carbs,
        Nutrient::Fat,
        Nutrient::Fiber,
        Nutrient::Sodium,
    ];

    /// Get a human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Nutrient::Calories => "calories",
            Nutrient::Protein => "protein",
            Nutrient::Carbs => "carbs",
            Nutrient::Fat => "fat",
            Nutrient::Fiber => "fiber",
            Nutrient::Sodium => "sodium",
        }
    }
}

/// Nutrient totals for one window (or averages per day)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NutrientTotals {
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub fiber_g: f64,
    pub sodium_mg: f64,
}

impl NutrientTotals {
    /// Accumulate one meal entry
    pub fn add_entry(&mut self, entry: &MealEntry) {
        self.calories += entry.calories;
        self.protein_g += entry.protein_g;
        self.carbs_g += entry.carbs_g;
        self.fat_g += entry.fat_g;
        self.fiber_g += entry.fiber_g;
        self.sodium_mg += entry.sodium_mg;
    }

    /// The amount tracked for a nutrient
    pub fn get(&self, nutrient: Nutrient) -> f64 {
        match nutrient {
            Nutrient::Calories => self.calories,
            Nutrient::Protein => self.protein_g,
            Nutrient::Carbs => self.carbs_g,
            Nutrient::Fat => self.fat_g,
            Nutrient::Fiber => self.fiber_g,
            Nutrient::Sodium => self.sodium_mg,
        }
    }

    /// Scale every amount by a factor
    pub fn scale(&self, factor: f64) -> NutrientTotals {
        NutrientTotals {
            calories: self.calories * factor,
            protein_g: self.protein_g * factor,
            carbs_g: self.carbs_g * factor,
            fat_g: self.fat_g * factor,
            fiber_g: self.fiber_g * factor,
            sodium_mg: self.sodium_mg * factor,
        }
    }
}

/// One aggregated time window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NutritionWindowSummary {
    pub child_id: Uuid,
    /// Inclusive window start, UTC midnight
    pub window_start: DateTime<Utc>,
    /// Exclusive window end
    pub window_end: DateTime<Utc>,
    pub totals: NutrientTotals,
    pub meal_count: usize,
    pub meals_by_type: BTreeMap<MealType, usize>,
}

/// Bucket meal entries into windows and sum their nutrient totals
///
/// Entries with identical timestamps are both counted; windows with no
/// entries are not synthesized. The result is ascending by
/// `window_start`.
pub fn aggregate_windows(
    entries: &[MealEntry],
    granularity: WindowGranularity,
    config: &AggregatorConfig,
) -> AnalyticsResult<Vec<NutritionWindowSummary>> {
    let mut windows: BTreeMap<DateTime<Utc>, NutritionWindowSummary> = BTreeMap::new();
    for entry in entries {
        validation::check_meal_entry(entry)?;
        let start = window_start_for(entry.consumed_at, granularity, config.week_start);
        let summary = windows
            .entry(start)
            .or_insert_with(|| NutritionWindowSummary {
                child_id: entry.child_id,
                window_start: start,
                window_end: start + Duration::days(granularity.span_days()),
                totals: NutrientTotals::default(),
                meal_count: 0,
                meals_by_type: BTreeMap::new(),
            });
        summary.totals.add_entry(entry);
        summary.meal_count += 1;
        *summary.meals_by_type.entry(entry.meal_type).or_insert(0) += 1;
    }
    Ok(windows.into_values().collect())
}

/// UTC-midnight start of the window containing a timestamp
fn window_start_for(
    ts: DateTime<Utc>,
    granularity: WindowGranularity,
    week_start: Weekday,
) -> DateTime<Utc> {
    let date = ts.date_naive();
    let start_date = match granularity {
        WindowGranularity::Day => date,
        WindowGranularity::Week => {
            let offset = (date.weekday().num_days_from_monday() as i64
                - week_start.num_days_from_monday() as i64)
                .rem_euclid(7);
            date - Duration::days(offset)
        }
    };
    start_date.and_time(NaiveTime::MIN).and_utc()
}
