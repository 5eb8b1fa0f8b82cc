//! Age-banded nutrition targets and adequacy evaluation
//!
//! Targets are daily ranges per age band; weekly windows are compared
//! against the range scaled by the window's span in days. The bundled
//! defaults approximate published reference intakes for ages 0-18 and
//! are injectable, like the growth reference table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::nutrition::{Nutrient, NutritionWindowSummary};

/// Inclusive daily target range for one nutrient
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetRange {
    pub low: f64,
    pub high: f64,
}

impl TargetRange {
    /// Scale both bounds, e.g. by a window's span in days
    pub fn scaled(&self, factor: f64) -> TargetRange {
        TargetRange {
            low: self.low * factor,
            high: self.high * factor,
        }
    }
}

/// Daily targets for one age band
///
/// Sodium carries a zero low bound: only its ceiling is meaningful, so
/// a deficient classification is unreachable for it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyTargets {
    pub calories: TargetRange,
    pub protein_g: TargetRange,
    pub carbs_g: TargetRange,
    pub fat_g: TargetRange,
    pub fiber_g: TargetRange,
    pub sodium_mg: TargetRange,
}

impl DailyTargets {
    /// The target range for a nutrient
    pub fn range(&self, nutrient: Nutrient) -> TargetRange {
        match nutrient {
            Nutrient::Calories => self.calories,
            Nutrient::Protein => self.protein_g,
            Nutrient::Carbs => self.carbs_g,
            Nutrient::Fat => self.fat_g,
            Nutrient::Fiber => self.fiber_g,
            Nutrient::Sodium => self.sodium_mg,
        }
    }
}

/// Age band in days, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeBand {
    pub min_days: i64,
    pub max_days: i64,
}

/// Age-banded daily target table; immutable after construction
#[derive(Debug, Clone)]
pub struct TargetTable {
    bands: Vec<(AgeBand, DailyTargets)>,
}

impl TargetTable {
    /// Build a table from ascending, non-overlapping bands
    pub fn new(bands: Vec<(AgeBand, DailyTargets)>) -> Result<Self, String> {
        if bands.is_empty() {
            return Err("a target table needs at least one age band".to_string());
        }
        for (band, _) in &bands {
            if band.min_days > band.max_days {
                return Err(format!(
                    "age band {}..{} is inverted",
                    band.min_days, band.max_days
                ));
            }
        }
        if bands.windows(2).any(|w| w[1].0.min_days <= w[0].0.max_days) {
            return Err("age bands must be ascending and non-overlapping".to_string());
        }
        Ok(Self { bands })
    }

    /// Daily targets for an age; ages outside every band clamp to the
    /// nearest band
    pub fn targets_for(&self, age_days: i64) -> &DailyTargets {
        for (band, targets) in &self.bands {
            if age_days <= band.max_days {
                return targets;
            }
        }
        debug!(age_days, "age beyond target table, using oldest band");
        &self.bands[self.bands.len() - 1].1
    }

    /// The bundled pediatric target table: 0-6 mo, 7-12 mo, 1-3 y,
    /// 4-8 y, 9-13 y, 14-18 y
    ///
    /// Approximate reference intakes pending clinical sourcing; see
    /// DESIGN.md.
    pub fn default_pediatric() -> Self {
        let bands = vec![
            (
                AgeBand {
                    min_days: 0,
                    max_days: 182,
                },
                DailyTargets {
                    calories: TargetRange {
                        low: 450.0,
                        high: 700.0,
                    },
                    protein_g: TargetRange { low: 8.0, high: 12.0 },
                    carbs_g: TargetRange {
                        low: 60.0,
                        high: 95.0,
                    },
                    fat_g: TargetRange {
                        low: 25.0,
                        high: 36.0,
                    },
                    fiber_g: TargetRange { low: 0.0, high: 5.0 },
                    sodium_mg: TargetRange {
                        low: 0.0,
                        high: 400.0,
                    },
                },
            ),
            (
                AgeBand {
                    min_days: 183,
                    max_days: 365,
                },
                DailyTargets {
                    calories: TargetRange {
                        low: 600.0,
                        high: 900.0,
                    },
                    protein_g: TargetRange {
                        low: 9.0,
                        high: 14.0,
                    },
                    carbs_g: TargetRange {
                        low: 75.0,
                        high: 110.0,
                    },
                    fat_g: TargetRange {
                        low: 28.0,
                        high: 40.0,
                    },
                    fiber_g: TargetRange { low: 0.0, high: 8.0 },
                    sodium_mg: TargetRange {
                        low: 0.0,
                        high: 800.0,
                    },
                },
            ),
            (
                AgeBand {
                    min_days: 366,
                    max_days: 1095,
                },
                DailyTargets {
                    calories: TargetRange {
                        low: 900.0,
                        high: 1400.0,
                    },
                    protein_g: TargetRange {
                        low: 13.0,
                        high: 20.0,
                    },
                    carbs_g: TargetRange {
                        low: 130.0,
                        high: 175.0,
                    },
                    fat_g: TargetRange {
                        low: 30.0,
                        high: 45.0,
                    },
                    fiber_g: TargetRange {
                        low: 14.0,
                        high: 25.0,
                    },
                    sodium_mg: TargetRange {
                        low: 0.0,
                        high: 1200.0,
                    },
                },
            ),
            (
                AgeBand {
                    min_days: 1096,
                    max_days: 2920,
                },
                DailyTargets {
                    calories: TargetRange {
                        low: 1200.0,
                        high: 1800.0,
                    },
                    protein_g: TargetRange {
                        low: 19.0,
                        high: 30.0,
                    },
                    carbs_g: TargetRange {
                        low: 130.0,
                        high: 200.0,
                    },
                    fat_g: TargetRange {
                        low: 35.0,
                        high: 55.0,
                    },
                    fiber_g: TargetRange {
                        low: 17.0,
                        high: 30.0,
                    },
                    sodium_mg: TargetRange {
                        low: 0.0,
                        high: 1500.0,
                    },
                },
            ),
            (
                AgeBand {
                    min_days: 2921,
                    max_days: 4745,
                },
                DailyTargets {
                    calories: TargetRange {
                        low: 1600.0,
                        high: 2200.0,
                    },
                    protein_g: TargetRange {
                        low: 34.0,
                        high: 46.0,
                    },
                    carbs_g: TargetRange {
                        low: 130.0,
                        high: 250.0,
                    },
                    fat_g: TargetRange {
                        low: 45.0,
                        high: 75.0,
                    },
                    fiber_g: TargetRange {
                        low: 22.0,
                        high: 34.0,
                    },
                    sodium_mg: TargetRange {
                        low: 0.0,
                        high: 1800.0,
                    },
                },
            ),
            (
                AgeBand {
                    min_days: 4746,
                    max_days: 6935,
                },
                DailyTargets {
                    calories: TargetRange {
                        low: 1800.0,
                        high: 2800.0,
                    },
                    protein_g: TargetRange {
                        low: 46.0,
                        high: 60.0,
                    },
                    carbs_g: TargetRange {
                        low: 130.0,
                        high: 300.0,
                    },
                    fat_g: TargetRange {
                        low: 50.0,
                        high: 90.0,
                    },
                    fiber_g: TargetRange {
                        low: 25.0,
                        high: 38.0,
                    },
                    sodium_mg: TargetRange {
                        low: 0.0,
                        high: 2300.0,
                    },
                },
            ),
        ];
        Self { bands }
    }
}

/// Nutrient adequacy classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NutrientStatus {
    Deficient,
    Adequate,
    Excessive,
}

/// Classify an intake against a target range
///
/// Deficient below 90% of the low bound, excessive above 110% of the
/// high bound, adequate otherwise.
pub fn classify_intake(intake: f64, target: TargetRange) -> NutrientStatus {
    if intake < 0.9 * target.low {
        NutrientStatus::Deficient
    } else if intake > 1.1 * target.high {
        NutrientStatus::Excessive
    } else {
        NutrientStatus::Adequate
    }
}

/// Adequacy map and recommendations for one aggregated window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakeAssessment {
    pub adequacy: BTreeMap<Nutrient, NutrientStatus>,
    /// Deterministic recommendation order: calories, protein, carbs,
    /// fat, fiber, sodium
    pub recommendations: Vec<String>,
}

/// Evaluate one window's intake against the child's age-banded targets
pub fn evaluate_intake(
    summary: &NutritionWindowSummary,
    age_days: i64,
    table: &TargetTable,
) -> IntakeAssessment {
    let targets = table.targets_for(age_days);
    let span_days = (summary.window_end - summary.window_start).num_days().max(1) as f64;

    let mut adequacy = BTreeMap::new();
    for nutrient in Nutrient::PRIORITY {
        let range = targets.range(nutrient).scaled(span_days);
        adequacy.insert(nutrient, classify_intake(summary.totals.get(nutrient), range));
    }

    let mut recommendations = Vec::new();
    for nutrient in Nutrient::PRIORITY {
        match adequacy[&nutrient] {
            NutrientStatus::Deficient => recommendations.push(deficient_text(nutrient)),
            NutrientStatus::Excessive => recommendations.push(excessive_text(nutrient)),
            NutrientStatus::Adequate => {}
        }
    }

    IntakeAssessment {
        adequacy,
        recommendations,
    }
}

fn deficient_text(nutrient: Nutrient) -> String {
    match nutrient {
        Nutrient::Calories => {
            "Consider increasing daily calories toward the target range.".to_string()
        }
        Nutrient::Protein => {
            "Increase protein intake with foods like eggs, dairy, and legumes.".to_string()
        }
        Nutrient::Carbs => "Add whole-grain carbohydrates to meals.".to_string(),
        Nutrient::Fat => "Include healthy fats such as avocado and olive oil.".to_string(),
        Nutrient::Fiber => {
            "Include more fruits, vegetables, and whole grains for fiber.".to_string()
        }
        Nutrient::Sodium => "Sodium intake is below the target range.".to_string(),
    }
}

fn excessive_text(nutrient: Nutrient) -> String {
    match nutrient {
        Nutrient::Calories => "Daily calorie intake seems high. Consider portion control.".to_string(),
        Nutrient::Protein => "Protein intake is above the target range.".to_string(),
        Nutrient::Carbs => {
            "Carbohydrate intake is above the target range. Limit sugary snacks.".to_string()
        }
        Nutrient::Fat => "Fat intake is above the target range. Favor lean proteins.".to_string(),
        Nutrient::Fiber => "Fiber intake is above the target range.".to_string(),
        Nutrient::Sodium => "Reduce sodium intake. Limit processed foods.".to_string(),
    }
}
