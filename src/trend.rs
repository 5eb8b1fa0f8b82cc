//! Growth trend classification over measurement series
//!
//! The analyzer is stateless and windowless: callers hand it the
//! subsequence they care about (full history or a trailing window) and
//! it tolerates irregular sampling intervals. Slopes are classified
//! against per-metric expected velocity bands.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{AnalyticsError, AnalyticsResult};
use crate::models::{GrowthMetric, Measurement};
use crate::validation;

/// Trend classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendClassification {
    Accelerating,
    Stable,
    Declining,
    InsufficientData,
}

/// Confidence derived from sample count
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// Expected growth velocity band in canonical units per day
///
/// Slopes inside [lower, upper] classify as stable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VelocityBand {
    pub lower: f64,
    pub upper: f64,
}

/// Per-metric velocity bands
///
/// These are clinical domain constants, not derivable from first
/// principles; the defaults approximate expected velocities over the
/// first years of life and are injectable for tests and tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendConfig {
    /// cm/day
    pub height_band: VelocityBand,
    /// kg/day
    pub weight_band: VelocityBand,
    /// cm/day
    pub head_circumference_band: VelocityBand,
}

impl TrendConfig {
    /// The velocity band for a metric
    pub fn band(&self, metric: GrowthMetric) -> VelocityBand {
        match metric {
            GrowthMetric::Height => self.height_band,
            GrowthMetric::Weight => self.weight_band,
            GrowthMetric::HeadCircumference => self.head_circumference_band,
        }
    }
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            height_band: VelocityBand {
                lower: 0.010,
                upper: 0.080,
            },
            weight_band: VelocityBand {
                lower: 0.005,
                upper: 0.035,
            },
            head_circumference_band: VelocityBand {
                lower: 0.002,
                upper: 0.040,
            },
        }
    }
}

/// Trend analysis result for one metric series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendResult {
    pub metric: GrowthMetric,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_end: Option<DateTime<Utc>>,
    /// Rate of change in canonical units per day; `None` below two
    /// samples
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slope_per_day: Option<f64>,
    pub classification: TrendClassification,
    pub confidence: Confidence,
    pub sample_count: usize,
}

/// Analyze the trend of one metric series, ordered by recording time
///
/// Two samples use the two-point slope; three or more use a
/// least-squares fit of value against age. Fewer than two samples
/// classify as insufficient data with no slope.
pub fn analyze_trend(
    metric: GrowthMetric,
    measurements: &[Measurement],
    config: &TrendConfig,
) -> AnalyticsResult<TrendResult> {
    for m in measurements {
        validation::check_measurement(m)?;
        if m.metric != metric {
            return Err(AnalyticsError::InvalidInput(format!(
                "series for {} contains a {} measurement",
                metric.label(),
                m.metric.label()
            )));
        }
    }
    if measurements
        .windows(2)
        .any(|w| w[1].age_days < w[0].age_days)
    {
        return Err(AnalyticsError::InvalidInput(
            "measurement ages must be non-decreasing".to_string(),
        ));
    }

    let n = measurements.len();
    let window_start = measurements.first().map(|m| m.recorded_at);
    let window_end = measurements.last().map(|m| m.recorded_at);
    let confidence = match n {
        0..=2 => Confidence::Low,
        3..=5 => Confidence::Medium,
        _ => Confidence::High,
    };

    if n < 2 {
        return Ok(TrendResult {
            metric,
            window_start,
            window_end,
            slope_per_day: None,
            classification: TrendClassification::InsufficientData,
            confidence: Confidence::Low,
            sample_count: n,
        });
    }

    let points: Vec<(f64, f64)> = measurements
        .iter()
        .map(|m| (m.age_days as f64, m.canonical_value()))
        .collect();
    let age_span = points[n - 1].0 - points[0].0;
    if age_span <= 0.0 {
        // All samples on the same day: no rate is defined
        return Ok(TrendResult {
            metric,
            window_start,
            window_end,
            slope_per_day: None,
            classification: TrendClassification::InsufficientData,
            confidence: Confidence::Low,
            sample_count: n,
        });
    }

    let slope = if n == 2 {
        (points[1].1 - points[0].1) / age_span
    } else {
        least_squares_slope(&points)
    };

    let band = config.band(metric);
    let classification = if slope > band.upper {
        TrendClassification::Accelerating
    } else if slope < band.lower {
        TrendClassification::Declining
    } else {
        TrendClassification::Stable
    };

    Ok(TrendResult {
        metric,
        window_start,
        window_end,
        slope_per_day: Some(slope),
        classification,
        confidence,
        sample_count: n,
    })
}

/// Least-squares slope of y against x
///
/// Callers guarantee at least two distinct x values, so the variance
/// term is non-zero.
fn least_squares_slope(points: &[(f64, f64)]) -> f64 {
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;
    let sxx = points
        .iter()
        .map(|p| (p.0 - mean_x) * (p.0 - mean_x))
        .sum::<f64>();
    let sxy = points
        .iter()
        .map(|p| (p.0 - mean_x) * (p.1 - mean_y))
        .sum::<f64>();
    sxy / sxx
}
