//! Nutrition report orchestration
//!
//! Chains the window aggregator and the adequacy advisor over a child's
//! meal history, then derives the cross-window summaries (daily
//! averages and most-logged foods).

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::errors::{AnalyticsError, AnalyticsResult};
use crate::models::{ChildContext, MealEntry};
use crate::nutrition::{
    aggregate_windows, AggregatorConfig, Nutrient, NutrientTotals, NutritionWindowSummary,
    WindowGranularity,
};
use crate::targets::{evaluate_intake, NutrientStatus, TargetTable};

/// Number of most-logged food names reported
const MOST_COMMON_FOODS_LIMIT: usize = 5;

/// Per-window section of a nutrition report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowReport {
    pub summary: NutritionWindowSummary,
    pub adequacy: BTreeMap<Nutrient, NutrientStatus>,
    /// Deterministic order: calories, protein, carbs, fat, fiber,
    /// sodium
    pub recommendations: Vec<String>,
}

/// Nutrition report over a child's meal history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NutritionReport {
    pub child_id: Uuid,
    pub granularity: WindowGranularity,
    /// Ascending by window start
    pub windows: Vec<WindowReport>,
    /// Average intake per day with at least one entry
    pub daily_averages: NutrientTotals,
    /// Up to five most frequently logged food names, by descending
    /// frequency then name
    pub most_common_foods: Vec<String>,
    pub total_entries: usize,
}

/// Nutrition analytics service
pub struct NutritionAnalyticsService;

impl NutritionAnalyticsService {
    /// Build the nutrition report for one child
    ///
    /// `report_date` fixes the child's age for target lookup.
    pub fn build_report(
        child: &ChildContext,
        entries: &[MealEntry],
        granularity: WindowGranularity,
        report_date: NaiveDate,
        targets: &TargetTable,
        config: &AggregatorConfig,
    ) -> AnalyticsResult<NutritionReport> {
        if entries.is_empty() {
            return Err(AnalyticsError::EmptyHistory(
                "no meal entries in the requested range".to_string(),
            ));
        }
        for entry in entries {
            if entry.child_id != child.child_id {
                return Err(AnalyticsError::InvalidInput(
                    "meal entry belongs to a different child".to_string(),
                ));
            }
        }

        let age_days = child.age_in_days_on(report_date);
        let summaries = aggregate_windows(entries, granularity, config)?;

        let mut grand_totals = NutrientTotals::default();
        let mut logged_days: BTreeSet<NaiveDate> = BTreeSet::new();
        for entry in entries {
            grand_totals.add_entry(entry);
            logged_days.insert(entry.consumed_at.date_naive());
        }
        let daily_averages = grand_totals.scale(1.0 / logged_days.len() as f64);

        let windows: Vec<WindowReport> = summaries
            .into_iter()
            .map(|summary| {
                let assessment = evaluate_intake(&summary, age_days, targets);
                WindowReport {
                    summary,
                    adequacy: assessment.adequacy,
                    recommendations: assessment.recommendations,
                }
            })
            .collect();

        debug!(
            entries = entries.len(),
            windows = windows.len(),
            age_days,
            "nutrition report built"
        );
        Ok(NutritionReport {
            child_id: child.child_id,
            granularity,
            windows,
            daily_averages,
            most_common_foods: most_common_foods(entries, MOST_COMMON_FOODS_LIMIT),
            total_entries: entries.len(),
        })
    }
}

/// Top-N food names by log frequency; ties break alphabetically
fn most_common_foods(entries: &[MealEntry], limit: usize) -> Vec<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for entry in entries {
        for food in &entry.foods {
            *counts.entry(food.name.as_str()).or_insert(0) += 1;
        }
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(limit)
        .map(|(name, _)| name.to_string())
        .collect()
}
