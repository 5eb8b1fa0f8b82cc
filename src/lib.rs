//! Pediatric Growth & Nutrition Analytics
//!
//! Turns raw, irregularly sampled per-child measurement and meal-log
//! series into percentile placements, growth trend classifications, and
//! nutrition adequacy reports.
//!
//! Everything here is synchronous, pure computation: no I/O, no shared
//! mutable state. The growth reference table and the nutrition target
//! table are constructed once (typically at process start), stay
//! immutable, and are passed to the engines explicitly, so concurrent
//! report requests need no coordination and tests can inject synthetic
//! tables.

pub mod errors;
pub mod models;
pub mod nutrition;
pub mod percentile;
pub mod reference;
pub mod services;
pub mod targets;
pub mod trend;
pub mod units;
pub mod validation;

// Re-export commonly used items
pub use errors::{AnalyticsError, AnalyticsResult};
pub use models::{ChildContext, FoodItem, GrowthMetric, MealEntry, MealType, Measurement, Sex};
pub use nutrition::{
    aggregate_windows, AggregatorConfig, Nutrient, NutrientTotals, NutritionWindowSummary,
    WindowGranularity,
};
pub use percentile::{compute_percentile, value_at_percentile, PercentileResult};
pub use reference::{AgeBracket, AnchorPoint, ReferenceCurve, ReferenceTable};
pub use services::growth::{
    GrowthAnalyticsService, GrowthReport, GrowthReportConfig, MetricGrowthSummary,
};
pub use services::nutrition::{NutritionAnalyticsService, NutritionReport, WindowReport};
pub use targets::{
    classify_intake, evaluate_intake, DailyTargets, IntakeAssessment, NutrientStatus, TargetRange,
    TargetTable,
};
pub use trend::{analyze_trend, Confidence, TrendClassification, TrendConfig, TrendResult};
pub use units::MeasurementUnit;
