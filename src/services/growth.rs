//! Growth report orchestration
//!
//! For each metric with data: percentile placement of the latest
//! measurement plus a trend over the full history or a configured
//! lookback. Metrics without measurements are omitted; the report fails
//! only when every metric series is empty.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::errors::{AnalyticsError, AnalyticsResult};
use crate::models::{ChildContext, GrowthMetric, Measurement};
use crate::percentile::{compute_percentile, PercentileResult};
use crate::reference::ReferenceTable;
use crate::trend::{analyze_trend, TrendConfig, TrendResult};

/// Per-metric section of a growth report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricGrowthSummary {
    pub metric: GrowthMetric,
    pub measurement_count: usize,
    /// Latest measurement in the metric's canonical unit
    pub latest_value: f64,
    pub latest_recorded_at: DateTime<Utc>,
    pub percentile: PercentileResult,
    pub trend: TrendResult,
}

/// Growth report across all metrics with data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthReport {
    pub child_id: Uuid,
    pub total_measurements: usize,
    /// One entry per metric with data, in metric order
    pub metrics: Vec<MetricGrowthSummary>,
}

/// Configuration for growth report assembly
#[derive(Debug, Clone, Copy, Default)]
pub struct GrowthReportConfig {
    /// Restrict trend analysis to the trailing window in days;
    /// `None` analyzes the full history
    pub trend_lookback_days: Option<i64>,
    pub trend: TrendConfig,
}

/// Growth analytics service
pub struct GrowthAnalyticsService;

impl GrowthAnalyticsService {
    /// Build the growth report for one child
    pub fn build_report(
        child: &ChildContext,
        measurements_by_metric: &BTreeMap<GrowthMetric, Vec<Measurement>>,
        table: &ReferenceTable,
        config: &GrowthReportConfig,
    ) -> AnalyticsResult<GrowthReport> {
        let mut metrics = Vec::new();
        let mut total_measurements = 0;

        for (&metric, series) in measurements_by_metric {
            if series.is_empty() {
                continue;
            }
            Self::check_series(child, metric, series)?;
            total_measurements += series.len();

            let latest = &series[series.len() - 1];
            let percentile = compute_percentile(latest, table)?;

            let window = Self::trend_window(series, config.trend_lookback_days, latest.age_days);
            let trend = analyze_trend(metric, window, &config.trend)?;

            debug!(
                metric = metric.label(),
                samples = series.len(),
                percentile = percentile.percentile,
                "metric summary built"
            );
            metrics.push(MetricGrowthSummary {
                metric,
                measurement_count: series.len(),
                latest_value: latest.canonical_value(),
                latest_recorded_at: latest.recorded_at,
                percentile,
                trend,
            });
        }

        if metrics.is_empty() {
            return Err(AnalyticsError::InsufficientData(
                "no growth measurements recorded for any metric".to_string(),
            ));
        }

        Ok(GrowthReport {
            child_id: child.child_id,
            total_measurements,
            metrics,
        })
    }

    /// Fail closed on records that cannot belong to this child/series
    fn check_series(
        child: &ChildContext,
        metric: GrowthMetric,
        series: &[Measurement],
    ) -> AnalyticsResult<()> {
        for m in series {
            if m.child_id != child.child_id {
                return Err(AnalyticsError::InvalidInput(
                    "measurement belongs to a different child".to_string(),
                ));
            }
            if m.sex != child.sex {
                return Err(AnalyticsError::InvalidInput(
                    "measurement sex does not match the child context".to_string(),
                ));
            }
            if m.metric != metric {
                return Err(AnalyticsError::InvalidInput(format!(
                    "series for {} contains a {} measurement",
                    metric.label(),
                    m.metric.label()
                )));
            }
        }
        if series.windows(2).any(|w| w[1].recorded_at < w[0].recorded_at) {
            return Err(AnalyticsError::InvalidInput(
                "measurements must be ordered by recording time".to_string(),
            ));
        }
        Ok(())
    }

    /// The trailing subsequence the trend is computed over
    fn trend_window<'a>(
        series: &'a [Measurement],
        lookback_days: Option<i64>,
        latest_age_days: i64,
    ) -> &'a [Measurement] {
        match lookback_days {
            None => series,
            Some(days) => {
                let cutoff = latest_age_days - days;
                let first_inside = series
                    .iter()
                    .position(|m| m.age_days >= cutoff)
                    .unwrap_or(0);
                &series[first_inside..]
            }
        }
    }
}
